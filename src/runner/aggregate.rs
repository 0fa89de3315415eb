use std::time::Duration;

use crate::metrics::LatencyPercentiles;
use crate::probe::ProbeTermination;

use super::TierPlan;

/// Nanoseconds per second.
const NS_PER_SEC: u128 = 1_000_000_000;
/// Fixed-point scale for two-decimal values.
const HUNDREDTHS: u128 = 100;

/// Probes that stopped before sending every ping, by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureCounts {
    pub connect: usize,
    pub timeout: usize,
    pub io: usize,
    pub closed: usize,
    pub task: usize,
}

impl FailureCounts {
    pub const fn record(&mut self, termination: ProbeTermination) {
        let slot = match termination {
            ProbeTermination::Completed => return,
            ProbeTermination::ConnectFailed => &mut self.connect,
            ProbeTermination::ConnectTimedOut | ProbeTermination::TimedOut => &mut self.timeout,
            ProbeTermination::WriteFailed | ProbeTermination::ReadFailed => &mut self.io,
            ProbeTermination::PeerClosed => &mut self.closed,
            ProbeTermination::TaskFailed => &mut self.task,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.connect
            .saturating_add(self.timeout)
            .saturating_add(self.io)
            .saturating_add(self.closed)
            .saturating_add(self.task)
    }
}

/// Summary of a tier with at least one succeeded probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierAggregate {
    pub requested_clients: usize,
    pub succeeded_clients: usize,
    pub pings_per_client: usize,
    pub duration: Duration,
    pub sample_count: usize,
    pub mean_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub percentiles: LatencyPercentiles,
}

impl TierAggregate {
    /// Builds the aggregate from every sample of every succeeded probe.
    ///
    /// Returns `None` when no probe succeeded: latency and throughput are undefined then.
    #[must_use]
    pub fn from_samples(
        plan: TierPlan,
        duration: Duration,
        succeeded_clients: usize,
        samples: &[Duration],
        percentiles: LatencyPercentiles,
    ) -> Option<Self> {
        if succeeded_clients == 0 {
            return None;
        }
        let min_latency = samples.iter().min().copied()?;
        let max_latency = samples.iter().max().copied()?;
        let total_ns = samples
            .iter()
            .fold(0_u128, |sum, sample| sum.saturating_add(sample.as_nanos()));
        let count = u128::try_from(samples.len()).unwrap_or(u128::MAX);
        let mean_ns = total_ns.checked_div(count)?;

        Some(Self {
            requested_clients: plan.clients.get(),
            succeeded_clients,
            pings_per_client: plan.pings_per_client.get(),
            duration,
            sample_count: samples.len(),
            mean_latency: Duration::from_nanos(u64::try_from(mean_ns).unwrap_or(u64::MAX)),
            min_latency,
            max_latency,
            percentiles,
        })
    }

    /// Operations the tier was credited with: succeeded clients times pings per client.
    #[must_use]
    pub const fn operations(&self) -> usize {
        self.succeeded_clients.saturating_mul(self.pings_per_client)
    }

    /// Throughput in operations per second, times 100.
    #[must_use]
    pub fn throughput_x100(&self) -> u128 {
        let operations = u128::try_from(self.operations()).unwrap_or(u128::MAX);
        operations
            .saturating_mul(HUNDREDTHS)
            .saturating_mul(NS_PER_SEC)
            .checked_div(self.duration.as_nanos())
            .unwrap_or(0)
    }
}

/// Everything known about one finished tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub plan: TierPlan,
    pub duration: Duration,
    pub failures: FailureCounts,
    pub unmatched_lines: u64,
    /// `None` is the "no results" state: no probe measured a round trip.
    pub aggregate: Option<TierAggregate>,
}

impl TierReport {
    #[must_use]
    pub fn succeeded_clients(&self) -> usize {
        self.aggregate
            .as_ref()
            .map_or(0, |aggregate| aggregate.succeeded_clients)
    }

    #[must_use]
    pub const fn has_results(&self) -> bool {
        self.aggregate.is_some()
    }
}
