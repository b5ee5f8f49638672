//! Configuration loading and parsing
//!
//! Every table is optional; an empty file runs the default scenario.

use anyhow::{Context, Result};
use async_fetcher::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// Number of independent requests to issue
    #[serde(default = "default_requests")]
    pub requests: usize,
    /// Interrupt every request this many milliseconds after dispatch
    pub interrupt_after_ms: Option<u64>,
    /// Run the chained-square demo starting from this number instead
    pub square: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            interrupt_after_ms: None,
            square: None,
        }
    }
}

fn default_requests() -> usize {
    1
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Txt,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .fetcher
        .validate()
        .with_context(|| format!("Invalid [fetcher] section in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_fetcher::DispatchMode;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [fetcher]
            delay_ms = 250
            dispatch = "thread"

            [scenario]
            requests = 3
            interrupt_after_ms = 100

            [report]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.fetcher.delay_ms, 250);
        assert_eq!(config.fetcher.dispatch, DispatchMode::Thread);
        assert_eq!(config.scenario.requests, 3);
        assert_eq!(config.scenario.interrupt_after_ms, Some(100));
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn test_empty_config_is_fixed_scenario() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.fetcher, FetcherConfig::default());
        assert_eq!(config.scenario.requests, 1);
        assert!(config.scenario.square.is_none());
        assert_eq!(config.report.format, ReportFormat::Txt);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetcher]\nworker_threads = 8").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.fetcher.worker_threads, 8);
    }

    #[test]
    fn test_load_config_rejects_invalid_fetcher() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[fetcher]\nworker_threads = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("worker_threads"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config(Path::new("does-not-exist.toml")).is_err());
    }
}
