//! Line framing for the `/ping` exchange.

/// Command word the target server answers with a pong line.
pub const PING_COMMAND: &str = "/ping";

/// Builds a newline-terminated request line carrying the wall-clock timestamp.
#[must_use]
pub fn ping_line(timestamp_ms: i64) -> String {
    format!("{} {}\n", PING_COMMAND, timestamp_ms)
}

/// Milliseconds since the Unix epoch. Only used as request payload, never for timing.
#[must_use]
pub fn wall_clock_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Returns true when `line` contains `token` anywhere. Case-sensitive; bytes that are not
/// valid UTF-8 are tolerated.
#[must_use]
pub fn is_pong(line: &[u8], token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    String::from_utf8_lossy(line).contains(token)
}
