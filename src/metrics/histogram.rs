use std::time::Duration;

use hdrhistogram::Histogram;

/// Highest trackable latency in microseconds (one hour); larger values saturate.
const MAX_TRACKABLE_US: u64 = 3_600_000_000;
const SIGNIFICANT_FIGURES: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatencyPercentiles {
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
}

/// Microsecond-resolution latency histogram.
#[derive(Debug)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, String> {
        let hist = Histogram::<u64>::new_with_bounds(1, MAX_TRACKABLE_US, SIGNIFICANT_FIGURES)
            .map_err(|err| format!("Failed to create histogram: {}", err))?;
        Ok(Self { hist })
    }

    /// Record one latency sample. Values outside the trackable range are clamped.
    pub fn record(&mut self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.hist.saturating_record(micros.clamp(1, MAX_TRACKABLE_US));
    }

    #[must_use]
    pub fn percentiles(&self) -> LatencyPercentiles {
        if self.count() == 0 {
            return LatencyPercentiles::default();
        }

        LatencyPercentiles {
            p50: Duration::from_micros(self.hist.value_at_quantile(0.5)),
            p90: Duration::from_micros(self.hist.value_at_quantile(0.9)),
            p99: Duration::from_micros(self.hist.value_at_quantile(0.99)),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_reports_zero_percentiles() -> Result<(), String> {
        let hist = LatencyHistogram::new()?;
        if hist.percentiles() != LatencyPercentiles::default() {
            return Err("Expected zero percentiles".to_owned());
        }
        Ok(())
    }

    #[test]
    fn percentiles_follow_recorded_samples() -> Result<(), String> {
        let mut hist = LatencyHistogram::new()?;
        for millis in 1..=100_u64 {
            hist.record(Duration::from_millis(millis));
        }
        let percentiles = hist.percentiles();
        let within = |value: Duration, expected_ms: u64| {
            let expected = Duration::from_millis(expected_ms);
            value >= expected.saturating_sub(Duration::from_millis(1))
                && value <= expected.saturating_add(Duration::from_millis(1))
        };
        if !within(percentiles.p50, 50) || !within(percentiles.p90, 90) || !within(percentiles.p99, 99)
        {
            return Err(format!("Unexpected percentiles: {:?}", percentiles));
        }
        if hist.count() != 100 {
            return Err(format!("Unexpected count: {}", hist.count()));
        }
        Ok(())
    }
}
