use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::config::BenchConfig;
use crate::metrics::LatencyPercentiles;
use crate::probe::{ProbeSettings, ProbeTarget};
use crate::runner::{FailureCounts, TierAggregate, TierPlan, TierReport};

use super::run_schedule;
use super::summary::{NO_RESULTS_LINE, format_x100, ms_x100, secs_x100, summary_lines};

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

async fn spawn_pong_server() -> Result<(SocketAddr, JoinHandle<()>), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind pong server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read pong server addr: {}", err))?;
    let task = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (read_half, mut write_half) = stream.into_split();
                let mut lines = BufReader::new(read_half).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let reply = line.replacen("/ping", "/PONG", 1);
                    if write_half
                        .write_all(format!("{}\n", reply).as_bytes())
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            });
        }
    });
    Ok((addr, task))
}

fn closed_port() -> Result<u16, String> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("Failed to bind probe port: {}", err))?;
    let port = listener
        .local_addr()
        .map_err(|err| format!("Failed to read probe port: {}", err))?
        .port();
    drop(listener);
    Ok(port)
}

fn small_config(port: u16) -> Result<BenchConfig, String> {
    let tiers = vec![
        TierPlan::new(1, 2).map_err(|err| format!("{}", err))?,
        TierPlan::new(3, 1).map_err(|err| format!("{}", err))?,
    ];
    Ok(BenchConfig {
        target: ProbeTarget::new("127.0.0.1", port).map_err(|err| format!("{}", err))?,
        probe: ProbeSettings {
            connect_timeout: Duration::from_secs(2),
            read_timeout: Duration::from_secs(2),
            ping_pause: Duration::from_millis(1),
            ..ProbeSettings::default()
        },
        max_concurrency: None,
        tiers,
    })
}

async fn render_schedule(config: &BenchConfig) -> Result<(usize, String), String> {
    let mut out = Vec::new();
    let reported = run_schedule(config, &mut out)
        .await
        .map_err(|err| format!("run_schedule failed: {}", err))?;
    let text = String::from_utf8(out).map_err(|err| format!("Output not UTF-8: {}", err))?;
    Ok((reported, text))
}

#[test]
fn format_x100_pads_fraction() -> Result<(), String> {
    let cases = [(0, "0.00"), (5, "0.05"), (100, "1.00"), (12_345, "123.45")];
    for (value, expected) in cases {
        if format_x100(value) != expected {
            return Err(format!("{} formatted as {}", value, format_x100(value)));
        }
    }
    Ok(())
}

#[test]
fn fixed_point_conversions_round_half_up() -> Result<(), String> {
    if ms_x100(Duration::from_micros(12_344)) != 1_234 {
        return Err(format!("Unexpected ms: {}", ms_x100(Duration::from_micros(12_344))));
    }
    if ms_x100(Duration::from_micros(12_345)) != 1_235 {
        return Err(format!("Unexpected ms: {}", ms_x100(Duration::from_micros(12_345))));
    }
    if secs_x100(Duration::from_millis(1_234)) != 123 {
        return Err(format!("Unexpected secs: {}", secs_x100(Duration::from_millis(1_234))));
    }
    if secs_x100(Duration::from_millis(1_235)) != 124 {
        return Err(format!("Unexpected secs: {}", secs_x100(Duration::from_millis(1_235))));
    }
    Ok(())
}

#[test]
fn summary_lines_report_aggregate() -> Result<(), String> {
    let plan = TierPlan::new(4, 5).map_err(|err| format!("{}", err))?;
    let samples = [Duration::from_millis(20), Duration::from_millis(30)];
    let aggregate = TierAggregate::from_samples(
        plan,
        Duration::from_secs(2),
        2,
        &samples,
        LatencyPercentiles {
            p50: Duration::from_millis(20),
            p90: Duration::from_millis(30),
            p99: Duration::from_millis(30),
        },
    );
    let report = TierReport {
        plan,
        duration: Duration::from_secs(2),
        failures: FailureCounts {
            connect: 2,
            ..FailureCounts::default()
        },
        unmatched_lines: 0,
        aggregate,
    };

    let lines = summary_lines(&report);
    let expected = [
        "Success Rate: 2/4",
        "Total Duration: 2.00s",
        "Average Latency: 25.00ms",
        "Min/Max Latency: 20.00ms / 30.00ms",
        "P50/P90/P99 Latency: 20.00ms / 30.00ms / 30.00ms",
        "Throughput: 5.00 ops/sec",
        "Probe Failures: 2 (connect 2, timeout 0, io 0, closed 0, task 0)",
    ];
    if lines != expected {
        return Err(format!("Unexpected lines: {:?}", lines));
    }
    Ok(())
}

#[test]
fn summary_lines_without_results_print_no_numbers() -> Result<(), String> {
    let plan = TierPlan::new(3, 1).map_err(|err| format!("{}", err))?;
    let report = TierReport {
        plan,
        duration: Duration::from_millis(5),
        failures: FailureCounts {
            connect: 3,
            ..FailureCounts::default()
        },
        unmatched_lines: 0,
        aggregate: None,
    };

    let lines = summary_lines(&report);
    if lines.first().map(String::as_str) != Some(NO_RESULTS_LINE) {
        return Err(format!("Expected no-results line first: {:?}", lines));
    }
    if lines.iter().any(|line| line.contains("Latency") || line.contains("Throughput")) {
        return Err(format!("No-results report must not print numbers: {:?}", lines));
    }
    Ok(())
}

#[test]
fn schedule_reports_every_tier_against_live_server() -> Result<(), String> {
    run_async_test(async {
        let (addr, server) = spawn_pong_server().await?;
        let config = small_config(addr.port())?;
        let (reported, text) = render_schedule(&config).await?;
        server.abort();

        if reported != 2 {
            return Err(format!("Expected 2 tiers reported, got {}", reported));
        }
        for needle in [
            "--- Testing 1 Concurrent Clients (2 pings/client) ---",
            "--- Testing 3 Concurrent Clients (1 pings/client) ---",
            "Success Rate: 1/1",
            "Success Rate: 3/3",
        ] {
            if !text.contains(needle) {
                return Err(format!("Missing {:?} in output:\n{}", needle, text));
            }
        }
        if text.contains(NO_RESULTS_LINE) {
            return Err(format!("Unexpected no-results line:\n{}", text));
        }
        Ok(())
    })
}

#[test]
fn schedule_completes_when_server_is_down() -> Result<(), String> {
    run_async_test(async {
        let config = small_config(closed_port()?)?;
        let (reported, text) = render_schedule(&config).await?;

        if reported != 2 {
            return Err(format!("Expected 2 tiers reported, got {}", reported));
        }
        if text.matches(NO_RESULTS_LINE).count() != 2 {
            return Err(format!("Expected two no-results lines:\n{}", text));
        }
        Ok(())
    })
}
