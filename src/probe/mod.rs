//! A probe drives sequential `/ping` round trips over one dedicated TCP connection.
mod types;
pub mod wire;


use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

use crate::args::PositiveUsize;

pub use types::{ProbeResult, ProbeSettings, ProbeTarget, ProbeTermination};
use types::ProbeRecorder;

struct RoundTrip<'token> {
    start: Instant,
    limit: std::time::Duration,
    token: &'token str,
}

enum PongWait {
    Matched,
    Closed,
    Failed,
    TimedOut,
}

/// Runs `pings` sequential round trips against `target` and returns whatever was measured.
///
/// Never fails: connect errors, timeouts, I/O errors and a closing peer end the probe early
/// and are reported through [`ProbeResult::termination`]. The connection is dropped on
/// every exit path.
pub async fn run_probe(
    target: &ProbeTarget,
    settings: &ProbeSettings,
    pings: PositiveUsize,
) -> ProbeResult {
    let mut recorder = ProbeRecorder::with_capacity(pings.get());
    let termination = drive_probe(target, settings, pings.get(), &mut recorder).await;
    if termination.is_failure() {
        debug!(
            %target,
            reason = termination.label(),
            samples = recorder.len(),
            "probe terminated early"
        );
    }
    recorder.finish(termination)
}

async fn drive_probe(
    target: &ProbeTarget,
    settings: &ProbeSettings,
    pings: usize,
    recorder: &mut ProbeRecorder,
) -> ProbeTermination {
    let connect = TcpStream::connect((target.host(), target.port()));
    let stream = match timeout(settings.connect_timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(_)) => return ProbeTermination::ConnectFailed,
        Err(_) => return ProbeTermination::ConnectTimedOut,
    };
    if let Err(err) = stream.set_nodelay(true) {
        debug!(%target, "failed to disable Nagle: {}", err);
    }

    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    ping_loop(&mut reader, &mut write_half, settings, pings, recorder).await
}

async fn ping_loop<R, W>(
    reader: &mut R,
    writer: &mut W,
    settings: &ProbeSettings,
    pings: usize,
    recorder: &mut ProbeRecorder,
) -> ProbeTermination
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    for iteration in 0..pings {
        let start = Instant::now();
        let request = wire::ping_line(wire::wall_clock_ms());

        match timeout(settings.read_timeout, send_line(writer, request.as_bytes())).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return ProbeTermination::WriteFailed,
            Err(_) => return ProbeTermination::TimedOut,
        }

        let wait = RoundTrip {
            start,
            limit: settings.read_timeout,
            token: &settings.pong_token,
        };
        match await_pong(reader, &mut line, &wait, recorder).await {
            PongWait::Matched => recorder.record(start.elapsed()),
            PongWait::Closed => return ProbeTermination::PeerClosed,
            PongWait::Failed => return ProbeTermination::ReadFailed,
            PongWait::TimedOut => return ProbeTermination::TimedOut,
        }

        if iteration.saturating_add(1) < pings {
            sleep(settings.ping_pause).await;
        }
    }
    ProbeTermination::Completed
}

async fn send_line<W>(writer: &mut W, payload: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Reads lines until one carries the token. Lines without it are skipped, not fatal; the
/// whole wait shares the round trip's time limit.
///
/// A line without the token never advances the probe to its next ping: the same round trip
/// keeps waiting, and running out of time ends the probe with `TimedOut`.
async fn await_pong<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    round_trip: &RoundTrip<'_>,
    recorder: &mut ProbeRecorder,
) -> PongWait
where
    R: AsyncBufRead + Unpin,
{
    loop {
        line.clear();
        let remaining = round_trip.limit.saturating_sub(round_trip.start.elapsed());
        match timeout(remaining, reader.read_until(b'\n', line)).await {
            Err(_) => return PongWait::TimedOut,
            Ok(Err(_)) => return PongWait::Failed,
            Ok(Ok(0)) => return PongWait::Closed,
            Ok(Ok(_)) => {
                if wire::is_pong(line, round_trip.token) {
                    return PongWait::Matched;
                }
                recorder.note_unmatched();
            }
        }
    }
}
