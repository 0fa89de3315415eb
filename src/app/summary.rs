use std::time::Duration;

use crate::runner::{FailureCounts, TierAggregate, TierReport};

/// Fixed-point scale for two-decimal output.
const HUNDREDTHS: u128 = 100;
/// Half of one output unit at the next finer resolution, for rounding.
const ROUNDING_BIAS: u128 = 5;
/// Finer units per hundredth (µs per 0.01 ms, ms per 0.01 s).
const FINE_PER_HUNDREDTH: u128 = 10;

pub(crate) const NO_RESULTS_LINE: &str = "No results collected, server may not be running";

pub(crate) fn tier_header(clients: usize, pings_per_client: usize) -> String {
    format!(
        "--- Testing {} Concurrent Clients ({} pings/client) ---",
        clients, pings_per_client
    )
}

/// Report lines for one finished tier.
pub(crate) fn summary_lines(report: &TierReport) -> Vec<String> {
    let mut lines = Vec::new();
    match report.aggregate.as_ref() {
        Some(aggregate) => push_aggregate_lines(&mut lines, aggregate),
        None => lines.push(NO_RESULTS_LINE.to_owned()),
    }
    if report.failures.total() > 0 {
        lines.push(failure_line(&report.failures));
    }
    lines
}

fn push_aggregate_lines(lines: &mut Vec<String>, aggregate: &TierAggregate) {
    lines.push(format!(
        "Success Rate: {}/{}",
        aggregate.succeeded_clients, aggregate.requested_clients
    ));
    lines.push(format!(
        "Total Duration: {}s",
        format_x100(secs_x100(aggregate.duration))
    ));
    lines.push(format!(
        "Average Latency: {}ms",
        format_x100(ms_x100(aggregate.mean_latency))
    ));
    lines.push(format!(
        "Min/Max Latency: {}ms / {}ms",
        format_x100(ms_x100(aggregate.min_latency)),
        format_x100(ms_x100(aggregate.max_latency))
    ));
    lines.push(format!(
        "P50/P90/P99 Latency: {}ms / {}ms / {}ms",
        format_x100(ms_x100(aggregate.percentiles.p50)),
        format_x100(ms_x100(aggregate.percentiles.p90)),
        format_x100(ms_x100(aggregate.percentiles.p99))
    ));
    lines.push(format!(
        "Throughput: {} ops/sec",
        format_x100(aggregate.throughput_x100())
    ));
}

fn failure_line(failures: &FailureCounts) -> String {
    format!(
        "Probe Failures: {} (connect {}, timeout {}, io {}, closed {}, task {})",
        failures.total(),
        failures.connect,
        failures.timeout,
        failures.io,
        failures.closed,
        failures.task
    )
}

/// Milliseconds times 100, rounded half up.
pub(crate) fn ms_x100(value: Duration) -> u128 {
    value
        .as_micros()
        .saturating_add(ROUNDING_BIAS)
        .checked_div(FINE_PER_HUNDREDTH)
        .unwrap_or(0)
}

/// Seconds times 100, rounded half up.
pub(crate) fn secs_x100(value: Duration) -> u128 {
    value
        .as_millis()
        .saturating_add(ROUNDING_BIAS)
        .checked_div(FINE_PER_HUNDREDTH)
        .unwrap_or(0)
}

pub(crate) fn format_x100(value: u128) -> String {
    let whole = value.checked_div(HUNDREDTHS).unwrap_or(0);
    let fraction = value.checked_rem(HUNDREDTHS).unwrap_or(0);
    format!("{}.{:02}", whole, fraction)
}
