//! CLI argument types and parsing helpers.
mod cli;
mod types;


pub use cli::BenchArgs;
pub use types::PositiveUsize;
