//! Runs one concurrency tier: launches every probe, waits for all of them, aggregates.
mod aggregate;
mod collector;
mod plan;
mod targets;


use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::{Semaphore, mpsc};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::args::PositiveUsize;
use crate::probe::{ProbeResult, ProbeSettings, run_probe};

pub use aggregate::{FailureCounts, TierAggregate, TierReport};
pub use plan::{TierPhase, TierPlan};
pub use targets::TargetSet;

use collector::{MAX_PREALLOCATED_SAMPLES, TierCollector};

/// Buffered probe results between the probe tasks and the tier's collector.
const RESULT_CHANNEL_CAPACITY: usize = 1024;

/// Shared inputs of every tier in a run.
pub struct TierContext<'ctx> {
    pub targets: &'ctx TargetSet,
    pub probe: &'ctx Arc<ProbeSettings>,
    /// Caps probes alive at once; the rest queue for a permit. `None` runs all at once.
    pub max_concurrency: Option<PositiveUsize>,
}

fn enter_phase(plan: TierPlan, phase: TierPhase) {
    debug!(
        clients = plan.clients.get(),
        pings = plan.pings_per_client.get(),
        %phase,
        "tier phase"
    );
}

/// Runs one tier to completion.
///
/// Probe failures never surface as errors: they lower the succeeded count and show up in
/// [`TierReport::failures`]. Aggregation starts only after every launched probe has
/// terminated, so the tier takes at most as long as its slowest probe's timeouts allow.
pub async fn run_tier(plan: TierPlan, context: &TierContext<'_>) -> TierReport {
    enter_phase(plan, TierPhase::NotStarted);
    let clients = plan.clients.get();
    let pings = plan.pings_per_client;
    info!(clients, pings = pings.get(), "starting tier");

    let started = Instant::now();
    enter_phase(plan, TierPhase::Launching);

    let (results_tx, mut results_rx) = mpsc::channel::<ProbeResult>(RESULT_CHANNEL_CAPACITY);
    let limiter = context
        .max_concurrency
        .map(|limit| Arc::new(Semaphore::new(limit.get().min(Semaphore::MAX_PERMITS))));
    let mut probe_handles = Vec::with_capacity(clients.min(MAX_PREALLOCATED_SAMPLES));

    for index in 0..clients {
        let target = context.targets.for_probe(index).clone();
        let settings = Arc::clone(context.probe);
        let results_tx = results_tx.clone();
        let limiter = limiter.clone();

        let handle = tokio::spawn(async move {
            let _permit = match limiter {
                Some(limiter) => limiter.acquire_owned().await.ok(),
                None => None,
            };
            let result = run_probe(&target, &settings, pings).await;
            if results_tx.send(result).await.is_err() {
                debug!(%target, "tier collector closed before probe result was delivered");
            }
        });
        probe_handles.push(handle);
    }
    drop(results_tx);

    enter_phase(plan, TierPhase::AwaitingCompletion);
    let mut collector = TierCollector::new(plan);
    while let Some(result) = results_rx.recv().await {
        collector.absorb(result);
    }
    for joined in join_all(probe_handles).await {
        if let Err(err) = joined {
            error!("Probe task failed: {}", err);
            collector.absorb(ProbeResult::task_failed());
        }
    }
    let duration = started.elapsed();

    enter_phase(plan, TierPhase::Aggregating);
    debug!(
        probes = collector.accounted_probes(),
        samples = collector.sample_count(),
        "all probes accounted for"
    );
    let report = collector.into_report(duration);
    info!(
        clients,
        succeeded = report.succeeded_clients(),
        elapsed_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        "tier finished"
    );
    report
}
