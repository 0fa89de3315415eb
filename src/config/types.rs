use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;

/// On-disk configuration. Every field is optional; unset fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub connect_timeout: Option<DurationValue>,
    pub read_timeout: Option<DurationValue>,
    pub ping_pause: Option<DurationValue>,
    pub pong_token: Option<String>,
    #[serde(alias = "concurrency")]
    pub max_concurrency: Option<usize>,
    pub tiers: Option<Vec<TierConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierConfig {
    #[serde(alias = "connections")]
    pub clients: usize,
    #[serde(alias = "pings_per_client")]
    pub pings: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
