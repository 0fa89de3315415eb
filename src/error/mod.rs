mod app;
mod config;
mod validation;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use validation::ValidationError;
