//! Configuration loading and backend setup

use crate::backends::{FanOutClient, JsonLinesClient, LogClient};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use wpstats::{StatsClient, StatsConfig};

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendsConfig {
    /// Emit each stat as a log line
    #[serde(default = "default_true")]
    pub log: bool,
    /// Append JSON lines to this file ("-" for stdout)
    pub jsonl: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            log: true,
            jsonl: None,
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

/// Build the backend described by `config`
///
/// Returns `None` when every backend is switched off; one backend is returned
/// as is, several are wrapped in a [`FanOutClient`].
pub fn build_client(config: &BackendsConfig) -> Result<Option<Arc<dyn StatsClient>>> {
    let mut clients: Vec<Arc<dyn StatsClient>> = Vec::new();

    if config.log {
        clients.push(Arc::new(LogClient::new()));
    }

    if let Some(path) = &config.jsonl {
        let writer: Box<dyn Write + Send> = if path.as_os_str() == "-" {
            Box::new(io::stdout())
        } else {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open JSON lines output: {:?}", path))?;
            Box::new(file)
        };
        clients.push(Arc::new(JsonLinesClient::new(writer)));
    }

    log::debug!("Configured {} backend(s)", clients.len());

    Ok(match clients.len() {
        0 => None,
        1 => clients.pop(),
        _ => Some(Arc::new(FanOutClient::new(clients))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpstats::Stat;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [stats]
            enabled = true
            muted = ["reader_infinite_scroll"]

            [backends]
            log = false
            jsonl = "events.jsonl"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert!(config.stats.enabled);
        assert!(config.stats.is_muted(Stat::ReaderInfiniteScroll));
        assert!(!config.backends.log);
        assert_eq!(config.backends.jsonl, Some(PathBuf::from("events.jsonl")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.stats.enabled);
        assert!(config.stats.muted.is_empty());
        assert!(config.backends.log);
        assert!(config.backends.jsonl.is_none());
    }

    #[test]
    fn test_unknown_stat_in_config_is_rejected() {
        let result: std::result::Result<AppConfig, _> =
            toml::from_str("[stats]\nmuted = [\"reader_disliked_article\"]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.toml");
        fs::write(&path, "[stats]\nenabled = false\n").unwrap();

        let config = load_config(&path).unwrap();
        assert!(!config.stats.enabled);

        let missing = load_config(&dir.path().join("missing.toml"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_build_client() {
        let none = build_client(&BackendsConfig {
            log: false,
            jsonl: None,
        })
        .unwrap();
        assert!(none.is_none());

        let single = build_client(&BackendsConfig::default()).unwrap().unwrap();
        assert_eq!(single.name(), "log");

        let dir = tempfile::tempdir().unwrap();
        let both = build_client(&BackendsConfig {
            log: true,
            jsonl: Some(dir.path().join("events.jsonl")),
        })
        .unwrap()
        .unwrap();
        assert_eq!(both.name(), "fan-out");

        both.track(Stat::ApplicationOpened);
        let written = fs::read_to_string(dir.path().join("events.jsonl")).unwrap();
        assert!(written.contains("\"stat\":\"application_opened\""));
    }
}
