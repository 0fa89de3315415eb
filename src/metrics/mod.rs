//! Latency histogram utilities.
mod histogram;

pub use histogram::{LatencyHistogram, LatencyPercentiles};
