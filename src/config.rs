//! Configuration for KnackApp
//!
//! Provides a builder pattern for configuring the client. Environment
//! lookup is a separate bootstrap step (`from_env`), never performed by the
//! client itself.

use std::fmt;
use std::time::Duration;

use crate::error::{KnackError, Result};

/// Public hosted API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.knackhq.com/v1";

pub const ENV_APP_ID: &str = "KNACKHQ_APP_ID";
pub const ENV_API_KEY: &str = "KNACKHQ_API_KEY";
pub const ENV_ENDPOINT: &str = "KNACKHQ_ENDPOINT";

/// Credentials and endpoint for one Knack application
#[derive(Clone)]
pub struct KnackConfig {
    /// Application identifier (`X-Knack-Application-Id`)
    pub app_id: String,
    /// REST API key (`X-Knack-REST-API-Key`)
    pub api_key: String,
    /// Base URL, without a trailing slash
    pub endpoint: String,
    /// Per-request timeout for the default transport
    pub timeout: Option<Duration>,
}

impl KnackConfig {
    /// Create a new configuration builder
    pub fn builder(app_id: impl Into<String>, api_key: impl Into<String>) -> KnackConfigBuilder {
        KnackConfigBuilder::new(app_id, api_key)
    }

    /// Read `KNACKHQ_APP_ID`, `KNACKHQ_API_KEY` and `KNACKHQ_ENDPOINT` from
    /// the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`KnackConfig::from_env`] with a caller-supplied variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let app_id = get(ENV_APP_ID)
            .ok_or_else(|| KnackError::config(format!("{} is not set", ENV_APP_ID)))?;
        let api_key = get(ENV_API_KEY)
            .ok_or_else(|| KnackError::config(format!("{} is not set", ENV_API_KEY)))?;

        let mut builder = Self::builder(app_id, api_key);
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            builder = builder.endpoint(endpoint);
        }
        Ok(builder.build())
    }
}

impl fmt::Debug for KnackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnackConfig")
            .field("app_id", &self.app_id)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for KnackConfig
#[derive(Debug)]
pub struct KnackConfigBuilder {
    app_id: String,
    api_key: String,
    endpoint: String,
    timeout: Option<Duration>,
}

impl KnackConfigBuilder {
    /// Create a new builder with the application credentials
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
        }
    }

    /// Set the API base URL (default: `https://api.knackhq.com/v1`)
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the per-request timeout used by the default transport
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> KnackConfig {
        KnackConfig {
            app_id: self.app_id,
            api_key: self.api_key,
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        }
    }
}
