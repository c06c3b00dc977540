use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default config file, looked up with any extension the `config` crate knows
pub const DEFAULT_CONFIG_PATH: &str = "config/call-review";

/// Environment override prefix, e.g. `CALL_REVIEW__SERVER__BASE_URL`
pub const ENV_PREFIX: &str = "CALL_REVIEW";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Review server root, without the `/api` suffix
    pub base_url: String,

    /// Pre-issued API token; skips the username/password sign-in
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between call list refreshes
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Config {
    /// Load `path` (optional) with environment overrides on top
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid call-review configuration")
    }
}
