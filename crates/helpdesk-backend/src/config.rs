use std::time::Duration;

use crate::error::BackendError;

pub const ENV_API_URL: &str = "HELPDESK_API_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "HELPDESK_REQUEST_TIMEOUT_SECS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Connection settings for the backend, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub api_url: String,
    /// Hard ceiling on any single request, enforced by cancellation.
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, BackendError> {
        let api_url = std::env::var(ENV_API_URL).map_err(|_| {
            BackendError::Configuration(format!(
                "{ENV_API_URL} is not set. Export the backend base URL before starting."
            ))
        })?;
        let api_url = api_url.trim();
        if api_url.is_empty() {
            return Err(BackendError::Configuration(format!(
                "{ENV_API_URL} is empty. Provide a non-empty base URL."
            )));
        }

        let mut config = Self::new(api_url);
        if let Ok(raw) = std::env::var(ENV_REQUEST_TIMEOUT_SECS) {
            config.request_timeout = parse_timeout_secs(&raw)?;
        }
        Ok(config)
    }
}

fn parse_timeout_secs(value: &str) -> Result<Duration, BackendError> {
    let seconds = value.trim().parse::<u64>().map_err(|_| {
        BackendError::Configuration(format!(
            "{ENV_REQUEST_TIMEOUT_SECS} must be an unsigned integer."
        ))
    })?;
    if seconds == 0 {
        return Err(BackendError::Configuration(format!(
            "{ENV_REQUEST_TIMEOUT_SECS} must be greater than zero."
        )));
    }
    Ok(Duration::from_secs(seconds))
}
