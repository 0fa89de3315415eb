//! Configuration loading and resolution.
mod loader;
mod parse;
mod settings;
pub mod types;


pub use loader::{CONFIG_PATH_ENV, load_config};
pub use settings::BenchConfig;

#[cfg(test)]
pub(crate) use loader::load_config_file;
pub(crate) use parse::parse_duration_value;
