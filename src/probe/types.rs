use std::fmt;
use std::time::Duration;

use crate::error::ValidationError;

/// Connect timeout applied when none is configured.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Bound on one round trip (write plus the wait for a pong line).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between consecutive pings on the same connection.
pub const DEFAULT_PING_PAUSE: Duration = Duration::from_millis(50);
/// Substring that marks a response line as a pong.
pub const DEFAULT_PONG_TOKEN: &str = "PONG";
/// Upper bound on samples reserved before a probe starts.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    host: String,
    port: u16,
}

impl ProbeTarget {
    /// Creates a target from a host name or address and a TCP port.
    ///
    /// # Errors
    ///
    /// Returns an error when the host is empty.
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ValidationError> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        Ok(Self { host, port })
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub ping_pause: Duration,
    pub pong_token: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            ping_pause: DEFAULT_PING_PAUSE,
            pong_token: DEFAULT_PONG_TOKEN.to_owned(),
        }
    }
}

/// Why a probe stopped. Only `Completed` means every ping got its pong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTermination {
    Completed,
    ConnectFailed,
    ConnectTimedOut,
    WriteFailed,
    ReadFailed,
    TimedOut,
    PeerClosed,
    /// The probe task itself died; assigned by the tier runner.
    TaskFailed,
}

impl ProbeTermination {
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, ProbeTermination::Completed)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ProbeTermination::Completed => "completed",
            ProbeTermination::ConnectFailed => "connect failed",
            ProbeTermination::ConnectTimedOut => "connect timed out",
            ProbeTermination::WriteFailed => "write failed",
            ProbeTermination::ReadFailed => "read failed",
            ProbeTermination::TimedOut => "response timed out",
            ProbeTermination::PeerClosed => "peer closed",
            ProbeTermination::TaskFailed => "task failed",
        }
    }
}

impl fmt::Display for ProbeTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Samples measured by one probe, in send order. Immutable once produced.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    samples: Vec<Duration>,
    termination: ProbeTermination,
    unmatched_lines: u64,
}

impl ProbeResult {
    pub(crate) const fn task_failed() -> Self {
        Self {
            samples: Vec::new(),
            termination: ProbeTermination::TaskFailed,
            unmatched_lines: 0,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[Duration] {
        &self.samples
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<Duration> {
        self.samples
    }

    #[must_use]
    pub const fn termination(&self) -> ProbeTermination {
        self.termination
    }

    /// Response lines skipped because they did not carry the pong token.
    #[must_use]
    pub const fn unmatched_lines(&self) -> u64 {
        self.unmatched_lines
    }

    /// A probe counts as succeeded once it measured at least one round trip.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !self.samples.is_empty()
    }
}

/// Mutable side of a probe while it runs; `finish` seals it into a `ProbeResult`.
#[derive(Debug)]
pub(super) struct ProbeRecorder {
    samples: Vec<Duration>,
    unmatched_lines: u64,
}

impl ProbeRecorder {
    pub(super) fn with_capacity(pings: usize) -> Self {
        Self {
            samples: Vec::with_capacity(pings.min(MAX_PREALLOCATED_SAMPLES)),
            unmatched_lines: 0,
        }
    }

    pub(super) fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    pub(super) const fn note_unmatched(&mut self) {
        self.unmatched_lines = self.unmatched_lines.saturating_add(1);
    }

    pub(super) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(super) fn finish(self, termination: ProbeTermination) -> ProbeResult {
        ProbeResult {
            samples: self.samples,
            termination,
            unmatched_lines: self.unmatched_lines,
        }
    }
}
