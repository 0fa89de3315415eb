use std::time::Duration;

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, ConfigError};
use crate::probe::{ProbeSettings, ProbeTarget};
use crate::runner::TierPlan;

use super::types::{ConfigFile, DurationValue};

/// Host every probe connects to unless the config names another.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Fully resolved run settings: config file values over built-in defaults, plus the CLI port.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub target: ProbeTarget,
    pub probe: ProbeSettings,
    pub max_concurrency: Option<PositiveUsize>,
    pub tiers: Vec<TierPlan>,
}

impl BenchConfig {
    /// Merges an optional config file over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured value is empty, zero, or not a valid duration.
    pub fn resolve(file: Option<ConfigFile>, port: u16) -> AppResult<Self> {
        let file = file.unwrap_or_default();
        let defaults = ProbeSettings::default();

        let host = match file.host {
            Some(host) if host.trim().is_empty() => {
                return Err(AppError::config(ConfigError::EmptyField { field: "host" }));
            }
            Some(host) => host,
            None => DEFAULT_HOST.to_owned(),
        };
        let target = ProbeTarget::new(host, port)?;

        let pong_token = match file.pong_token {
            Some(token) if token.is_empty() => {
                return Err(AppError::config(ConfigError::EmptyField {
                    field: "pong_token",
                }));
            }
            Some(token) => token,
            None => defaults.pong_token,
        };

        let probe = ProbeSettings {
            connect_timeout: duration_or(
                file.connect_timeout.as_ref(),
                "connect_timeout",
                defaults.connect_timeout,
            )?,
            read_timeout: duration_or(
                file.read_timeout.as_ref(),
                "read_timeout",
                defaults.read_timeout,
            )?,
            ping_pause: duration_or(file.ping_pause.as_ref(), "ping_pause", defaults.ping_pause)?,
            pong_token,
        };

        let max_concurrency = file
            .max_concurrency
            .map(|value| positive(value, "max_concurrency"))
            .transpose()?;

        let tiers = match file.tiers {
            None => TierPlan::default_schedule(),
            Some(tiers) if tiers.is_empty() => {
                return Err(AppError::config(ConfigError::NoTiers));
            }
            Some(tiers) => {
                let mut plans = Vec::with_capacity(tiers.len());
                for (index, tier) in tiers.iter().enumerate() {
                    plans.push(TierPlan {
                        clients: positive(tier.clients, &format!("tiers[{}].clients", index))?,
                        pings_per_client: positive(
                            tier.pings,
                            &format!("tiers[{}].pings", index),
                        )?,
                    });
                }
                plans
            }
        };

        Ok(Self {
            target,
            probe,
            max_concurrency,
            tiers,
        })
    }
}

fn duration_or(
    value: Option<&DurationValue>,
    field: &'static str,
    default: Duration,
) -> AppResult<Duration> {
    value.map_or(Ok(default), |value| {
        value
            .to_duration()
            .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
    })
}

fn positive(value: usize, field: &str) -> AppResult<PositiveUsize> {
    PositiveUsize::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
