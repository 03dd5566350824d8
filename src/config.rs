use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Backend address used when neither `--backend-url` nor `BACKEND_URL` is set.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Settings for talking to the backend, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Overrides the default endpoint. Never ends with a slash.
    pub base_url: String,
    /// No timeout means the request waits for the transport to settle.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from a user supplied base URL.
    ///
    /// The URL must be an absolute `http` or `https` address. Trailing
    /// slashes are dropped so that endpoint paths can be appended directly.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            timeout,
        })
    }

    /// Full URL of a backend endpoint, e.g. `endpoint("ask")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
