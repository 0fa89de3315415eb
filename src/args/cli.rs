use clap::Parser;

/// Port used when none is given on the command line.
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent load tester for line-oriented TCP services. Runs escalating connection tiers of /ping round trips against 127.0.0.1 and reports success rate, latency and throughput per tier."
)]
pub struct BenchArgs {
    /// Target TCP port on the configured host
    #[arg(value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
}
