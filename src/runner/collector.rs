use std::time::Duration;

use tracing::warn;

use crate::metrics::LatencyHistogram;
use crate::probe::ProbeResult;

use super::TierPlan;
use super::aggregate::{FailureCounts, TierAggregate, TierReport};

/// Upper bound on samples reserved up front; larger tiers grow the buffer as results arrive.
pub(super) const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// Single consumer of probe results for one tier. Every probe funnels its result through
/// the tier's channel, so absorption needs no locking.
#[derive(Debug)]
pub(super) struct TierCollector {
    plan: TierPlan,
    samples: Vec<Duration>,
    succeeded_clients: usize,
    accounted_probes: usize,
    failures: FailureCounts,
    unmatched_lines: u64,
    histogram: Option<LatencyHistogram>,
}

impl TierCollector {
    pub(super) fn new(plan: TierPlan) -> Self {
        let histogram = LatencyHistogram::new()
            .inspect_err(|err| warn!("Percentiles disabled for this tier: {}", err))
            .ok();
        let expected_samples = plan
            .clients
            .get()
            .saturating_mul(plan.pings_per_client.get())
            .min(MAX_PREALLOCATED_SAMPLES);
        Self {
            plan,
            samples: Vec::with_capacity(expected_samples),
            succeeded_clients: 0,
            accounted_probes: 0,
            failures: FailureCounts::default(),
            unmatched_lines: 0,
            histogram,
        }
    }

    pub(super) fn absorb(&mut self, result: ProbeResult) {
        self.accounted_probes = self.accounted_probes.saturating_add(1);
        self.failures.record(result.termination());
        self.unmatched_lines = self.unmatched_lines.saturating_add(result.unmatched_lines());
        if !result.succeeded() {
            return;
        }

        self.succeeded_clients = self.succeeded_clients.saturating_add(1);
        if let Some(histogram) = self.histogram.as_mut() {
            for sample in result.samples() {
                histogram.record(*sample);
            }
        }
        self.samples.extend(result.into_samples());
    }

    pub(super) const fn accounted_probes(&self) -> usize {
        self.accounted_probes
    }

    pub(super) fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub(super) fn into_report(self, duration: Duration) -> TierReport {
        let percentiles = self
            .histogram
            .as_ref()
            .map(LatencyHistogram::percentiles)
            .unwrap_or_default();
        let aggregate = TierAggregate::from_samples(
            self.plan,
            duration,
            self.succeeded_clients,
            &self.samples,
            percentiles,
        );
        TierReport {
            plan: self.plan,
            duration,
            failures: self.failures,
            unmatched_lines: self.unmatched_lines,
            aggregate,
        }
    }
}
