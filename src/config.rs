//! Client configuration, resolved once at startup

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const API_URL_VAR: &str = "DATACHAT_API_URL";
const TENANT_ID_VAR: &str = "DATACHAT_TENANT_ID";
const TIMEOUT_VAR: &str = "DATACHAT_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },
}

/// Settings for reaching the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Sent as `tenant_id` with chat requests when set
    pub tenant_id: Option<String>,
    /// Transport timeout; `None` waits as long as the transport does
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tenant_id: None,
            request_timeout: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = match lookup(API_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(url) => {
                let url = url.trim().to_string();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidUrl {
                        var: API_URL_VAR,
                        value: url,
                    });
                }
                url
            }
            None => {
                tracing::warn!(
                    fallback = DEFAULT_API_URL,
                    "{API_URL_VAR} not set, using default"
                );
                DEFAULT_API_URL.to_string()
            }
        };

        let request_timeout = match lookup(TIMEOUT_VAR) {
            Some(value) => {
                let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: value.clone(),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            tenant_id: lookup(TENANT_ID_VAR).filter(|v| !v.trim().is_empty()),
            request_timeout,
            ..Self::new(base_url)
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
