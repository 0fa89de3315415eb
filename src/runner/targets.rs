use crate::error::ValidationError;
use crate::probe::ProbeTarget;

/// Non-empty list of targets; probes are assigned round-robin by index.
///
/// The driver always builds a one-target set. Several targets let one tier mix reachable and
/// unreachable endpoints, which the tier tests use for partial-failure runs.
#[derive(Debug, Clone)]
pub struct TargetSet {
    primary: ProbeTarget,
    others: Vec<ProbeTarget>,
}

impl TargetSet {
    #[cfg(test)]
    pub(crate) const fn single(target: ProbeTarget) -> Self {
        Self {
            primary: target,
            others: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns an error when `targets` is empty.
    pub fn new(targets: Vec<ProbeTarget>) -> Result<Self, ValidationError> {
        let mut targets = targets.into_iter();
        let primary = targets.next().ok_or(ValidationError::EmptyTargetSet)?;
        Ok(Self {
            primary,
            others: targets.collect(),
        })
    }

    #[must_use]
    pub fn for_probe(&self, index: usize) -> &ProbeTarget {
        index
            .checked_rem(self.others.len().saturating_add(1))
            .and_then(|slot| slot.checked_sub(1))
            .and_then(|other| self.others.get(other))
            .unwrap_or(&self.primary)
    }
}
