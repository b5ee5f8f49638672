//! Fetcher configuration types
//!
//! The defaults reproduce the fixed scenario: a one second delay and the
//! "Async Data" payload. Everything here only tunes how background units
//! are scheduled, never what gets delivered.

use crate::types::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How background units are scheduled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// One named OS thread per request
    Thread,
    /// A bounded worker pool shared by all requests of one fetcher
    #[default]
    Pool,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchMode::Thread => write!(f, "thread"),
            DispatchMode::Pool => write!(f, "pool"),
        }
    }
}

/// Configuration for a [`DataFetcher`](crate::DataFetcher)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Simulated work latency in milliseconds (default: 1000ms)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Scheduling model for background units
    #[serde(default)]
    pub dispatch: DispatchMode,

    /// Number of pool workers (only used with `DispatchMode::Pool`)
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Prefix for background thread names
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_worker_threads() -> usize {
    4
}

fn default_thread_name() -> String {
    "fetcher".to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            dispatch: DispatchMode::default(),
            worker_threads: default_worker_threads(),
            thread_name: default_thread_name(),
        }
    }
}

impl FetcherConfig {
    /// Create a new fetcher configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the simulated delay in milliseconds
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Builder method: set the dispatch mode
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Builder method: set the number of pool workers
    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }

    /// Builder method: set the background thread name prefix
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// The simulated delay as a `Duration`
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Check that the configuration can be used to build a fetcher
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(FetchError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(FetchError::InvalidConfig(
                "thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_scenario() {
        let config = FetcherConfig::new();
        assert_eq!(config.delay(), Duration::from_millis(1000));
        assert_eq!(config.dispatch, DispatchMode::Pool);
        assert_eq!(config.worker_threads, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fetcher_config_builder() {
        let config = FetcherConfig::new()
            .with_delay_ms(50)
            .with_dispatch(DispatchMode::Thread)
            .with_worker_threads(2)
            .with_thread_name("bg");

        assert_eq!(config.delay_ms, 50);
        assert_eq!(config.dispatch, DispatchMode::Thread);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.thread_name, "bg");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let no_workers = FetcherConfig::new().with_worker_threads(0);
        assert!(matches!(no_workers.validate(), Err(FetchError::InvalidConfig(_))));

        let no_name = FetcherConfig::new().with_thread_name("  ");
        assert!(matches!(no_name.validate(), Err(FetchError::InvalidConfig(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FetcherConfig = toml::from_str(r#"dispatch = "thread""#).unwrap();
        assert_eq!(config.dispatch, DispatchMode::Thread);
        assert_eq!(config.delay_ms, 1000);
        assert_eq!(config.thread_name, "fetcher");
    }
}
