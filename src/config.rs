//! Runtime configuration.
//!
//! Resolved once at startup and passed into the HTTP client and the list poller, so nothing
//! reads process environment while requests are in flight.

use std::time::Duration;

use reqwest::Url;

use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/fhir";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub const BASE_URL_ENV: &str = "FHIR_SERVER_URL";
pub const LEGACY_BASE_URL_ENV: &str = "API_BASE_URL";
pub const POLL_SECS_ENV: &str = "FHIRDESK_POLL_SECS";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeskConfig {
    base_url: String,
    poll_interval: Duration,
}

impl DeskConfig {
    /// Validate `base_url` (http or https, trailing `/` trimmed) and use the default poll interval.
    pub fn new(base_url: &str) -> ConfigResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {:?}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> ConfigResult<Self> {
        if poll_interval.is_zero() {
            return Err(ConfigError::InvalidPollInterval(format!(
                "{}",
                poll_interval.as_secs()
            )));
        }
        self.poll_interval = poll_interval;
        Ok(self)
    }

    /// Read `FHIR_SERVER_URL` (or `API_BASE_URL`) and `FHIRDESK_POLL_SECS`.
    pub fn from_env() -> ConfigResult<Self> {
        from_env_values(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(LEGACY_BASE_URL_ENV).ok(),
            std::env::var(POLL_SECS_ENV).ok(),
        )
    }

    /// Like [`from_env`](Self::from_env), but a non-blank `base_url` replaces both URL
    /// variables, so a bad value in either of them cannot fail the run.
    pub fn resolve(base_url: Option<String>) -> ConfigResult<Self> {
        match base_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => from_env_values(Some(url), None, std::env::var(POLL_SECS_ENV).ok()),
            None => Self::from_env(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Build a config from raw environment values. Empty or whitespace values count as unset.
pub fn from_env_values(
    base_url: Option<String>,
    legacy_base_url: Option<String>,
    poll_secs: Option<String>,
) -> ConfigResult<DeskConfig> {
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let base_url = non_empty(base_url)
        .or_else(|| non_empty(legacy_base_url))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let config = DeskConfig::new(&base_url)?;

    match non_empty(poll_secs) {
        Some(raw) => {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidPollInterval(raw.clone()))?;
            if secs == 0 {
                return Err(ConfigError::InvalidPollInterval(raw));
            }
            config.with_poll_interval(Duration::from_secs(secs))
        }
        None => Ok(config),
    }
}
