use std::fmt;

use crate::args::PositiveUsize;
use crate::error::ValidationError;

/// Client count and pings per client of the built-in escalation: baseline, high, extreme.
pub const DEFAULT_SCHEDULE: [(usize, usize); 3] = [(1, 10), (100, 5), (1000, 1)];

/// One concurrency level: how many probes run at once and how many pings each sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPlan {
    pub clients: PositiveUsize,
    pub pings_per_client: PositiveUsize,
}

impl TierPlan {
    /// # Errors
    ///
    /// Returns an error when either count is zero.
    pub fn new(clients: usize, pings_per_client: usize) -> Result<Self, ValidationError> {
        Ok(Self {
            clients: PositiveUsize::try_from(clients)?,
            pings_per_client: PositiveUsize::try_from(pings_per_client)?,
        })
    }

    #[must_use]
    pub fn default_schedule() -> Vec<TierPlan> {
        DEFAULT_SCHEDULE
            .iter()
            .filter_map(|(clients, pings)| TierPlan::new(*clients, *pings).ok())
            .collect()
    }
}

/// Lifecycle of one tier. Aggregation only happens after every probe is accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierPhase {
    NotStarted,
    Launching,
    AwaitingCompletion,
    Aggregating,
    Reported,
}

impl fmt::Display for TierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TierPhase::NotStarted => "not-started",
            TierPhase::Launching => "launching",
            TierPhase::AwaitingCompletion => "awaiting-completion",
            TierPhase::Aggregating => "aggregating",
            TierPhase::Reported => "reported",
        };
        f.write_str(label)
    }
}
