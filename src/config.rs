//! Configuration management for the RAX FTP client
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `RAX_FTPC_*` environment variables.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Chunk size for binary transfers
    pub buffer_size: usize,

    /// Use PASV (true) or PORT (false) for data connections
    pub passive: bool,

    /// Timeout for establishing control and passive data connections
    pub connect_timeout_secs: u64,

    /// Upper bound on write-readiness polls per wait; 0 means unbounded
    pub max_wait_polls: usize,

    /// Pause between write-readiness polls
    pub wait_poll_interval_ms: u64,

    /// Accept attempts for active-mode data connections
    pub accept_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            passive: true,
            connect_timeout_secs: 10,
            max_wait_polls: 0,
            wait_poll_interval_ms: 0,
            accept_attempts: 10,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `<path>.toml` (optional) with environment overrides
    pub fn load(path: &str) -> Result<Self, config::ConfigError> {
        let defaults = ClientConfig::default();
        let settings = Config::builder()
            .set_default("buffer_size", defaults.buffer_size as u64)?
            .set_default("passive", defaults.passive)?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs)?
            .set_default("max_wait_polls", defaults.max_wait_polls as u64)?
            .set_default("wait_poll_interval_ms", defaults.wait_poll_interval_ms)?
            .set_default("accept_attempts", u64::from(defaults.accept_attempts))?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_FTPC").try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.accept_attempts == 0 {
            return Err(config::ConfigError::Message(
                "accept_attempts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get the poll bound, `None` when unbounded
    pub fn wait_poll_limit(&self) -> Option<usize> {
        (self.max_wait_polls > 0).then_some(self.max_wait_polls)
    }

    pub fn wait_poll_interval(&self) -> Duration {
        Duration::from_millis(self.wait_poll_interval_ms)
    }
}
