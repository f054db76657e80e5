//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `SELFSERVICE_`; nested keys use `__` (`SELFSERVICE_HTTP__TIMEOUT_SECONDS`).

use chrono::TimeDelta;
use selfservice_integration::HttpClientConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Directory holding the operator configuration files.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Log the selected context of every service execution.
    #[serde(default)]
    pub context_trace: bool,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Values for `${...}` placeholders in API URLs and query parameters.
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Tokens expiring within this many seconds count as expired.
    #[serde(default = "default_token_skew_seconds")]
    pub token_skew_seconds: i64,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("CONFIGURATIONS")
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "SelfserviceBot/1.0".to_string()
}

fn default_token_skew_seconds() -> i64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Client settings for the outbound API client.
    #[must_use]
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_seconds),
            user_agent: self.user_agent.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_skew_seconds: default_token_skew_seconds(),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn token_skew(&self) -> TimeDelta {
        TimeDelta::seconds(self.token_skew_seconds.max(0))
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed into its field.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_config(
            config::Config::builder()
                .add_source(
                    config::Environment::with_prefix("SELFSERVICE")
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                )
                .build()?,
        )
    }

    /// Deserializes an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has the wrong type.
    pub fn from_config(config: config::Config) -> Result<Self, config::ConfigError> {
        config.try_deserialize()
    }
}
