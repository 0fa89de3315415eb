//! Driver: runs the tier schedule in order and prints each tier's report.
mod summary;

#[cfg(test)]
mod tests;

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::BenchConfig;
use crate::error::AppResult;
use crate::runner::{TargetSet, TierContext, TierPhase, run_tier};

use summary::{summary_lines, tier_header};

const REPORT_TITLE: &str = "Line Service Performance Benchmark";

/// Runs every configured tier against the configured target, writing each report to `out`
/// before the next tier starts.
///
/// Unreachable servers and failed probes only change what the report says; a tier never
/// aborts the schedule.
///
/// # Errors
///
/// Returns an error when writing to `out` fails.
pub async fn run_schedule<W: Write>(config: &BenchConfig, out: &mut W) -> AppResult<usize> {
    let targets = TargetSet::new(vec![config.target.clone()])?;
    let probe = Arc::new(config.probe.clone());
    let context = TierContext {
        targets: &targets,
        probe: &probe,
        max_concurrency: config.max_concurrency,
    };

    writeln!(out, "{}", REPORT_TITLE)?;
    let mut reported = 0_usize;
    for plan in &config.tiers {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            tier_header(plan.clients.get(), plan.pings_per_client.get())
        )?;
        out.flush()?;

        let report = run_tier(*plan, &context).await;
        if !report.has_results() {
            warn!(server = %config.target, "no probe completed a round trip in this tier");
        }
        if report.unmatched_lines > 0 {
            debug!(
                unmatched = report.unmatched_lines,
                "skipped response lines without the pong token"
            );
        }
        for line in summary_lines(&report) {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        debug!(clients = plan.clients.get(), phase = %TierPhase::Reported, "tier phase");
        reported = reported.saturating_add(1);
    }
    Ok(reported)
}
