use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PASTE_COUNT_URL: &str = "https://paste.myst.rs/api/v2/data/numPastes";
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub token: String,
    pub paste_count_url: String,
    pub update_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup("TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("TOKEN".to_string()))?;

        let paste_count_url =
            lookup("PASTE_COUNT_URL").unwrap_or_else(|| DEFAULT_PASTE_COUNT_URL.to_string());

        let interval_secs = match lookup("PASTE_COUNT_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        name: "PASTE_COUNT_INTERVAL_SECS".to_string(),
                        reason: "must be greater than zero".to_string(),
                    })
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        name: "PASTE_COUNT_INTERVAL_SECS".to_string(),
                        reason: e.to_string(),
                    })
                }
            },
            None => DEFAULT_INTERVAL_SECS,
        };

        Ok(Self {
            token,
            paste_count_url,
            update_interval: Duration::from_secs(interval_secs),
        })
    }
}
