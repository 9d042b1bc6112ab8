//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then the optional YAML file, then
//! command-line flags and environment variables.
//!
//! # File format
//!
//! ```yaml
//! port: 3000
//! bind_address: 127.0.0.1
//! database_path: news_headlines.db
//! source_url: https://www.nytimes.com/
//! link_origin: https://www.nytimes.com
//! fetch_timeout_secs: 30
//! user_agent: news_headlines/0.1
//! ```
//!
//! Every key is optional.

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_DATABASE_PATH: &str = "news_headlines.db";
pub const DEFAULT_SOURCE_URL: &str = "https://www.nytimes.com/";
pub const DEFAULT_LINK_ORIGIN: &str = "https://www.nytimes.com";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_path: String,
    pub source_url: String,
    pub link_origin: String,
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            link_origin: DEFAULT_LINK_ORIGIN.to_string(),
            fetch_timeout_secs: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Partial configuration as read from the YAML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub database_path: Option<String>,
    pub source_url: Option<String>,
    pub link_origin: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let parsed = serde_yaml::from_str(&raw)
            .map_err(|e| AppError::Config(format!("invalid YAML in {}: {e}", path.display())))?;
        info!("Loaded config file");
        Ok(parsed)
    }
}

impl Config {
    /// Build the effective configuration from the CLI, reading `--config` if given.
    pub fn resolve(cli: &Cli) -> AppResult<Self> {
        let file = match cli.config.as_deref() {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(cli, file))
    }

    fn merge(cli: &Cli, file: FileConfig) -> Self {
        let defaults = Self::default();
        Self {
            port: cli.port.or(file.port).unwrap_or(defaults.port),
            bind_address: cli
                .bind_address
                .clone()
                .or(file.bind_address)
                .unwrap_or(defaults.bind_address),
            database_path: cli
                .database
                .clone()
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            source_url: cli
                .source_url
                .clone()
                .or(file.source_url)
                .unwrap_or(defaults.source_url),
            link_origin: cli
                .link_origin
                .clone()
                .or(file.link_origin)
                .map(|o| o.trim_end_matches('/').to_string())
                .unwrap_or(defaults.link_origin),
            fetch_timeout_secs: cli.fetch_timeout_secs.or(file.fetch_timeout_secs),
            user_agent: file.user_agent.unwrap_or(defaults.user_agent),
        }
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.bind_address.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = Config::resolve(&Cli::default()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.fetch_timeout(), None);
    }

    #[test]
    fn test_file_values_apply_and_cli_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "port: 4000\ndatabase_path: /tmp/from_file.db\nlink_origin: https://example.com/\nfetch_timeout_secs: 5"
        )
        .unwrap();

        let cli = Cli {
            config: Some(file.path().to_string_lossy().into_owned()),
            port: Some(5000),
            ..Cli::default()
        };
        let config = Config::resolve(&cli).unwrap();

        assert_eq!(config.port, 5000);
        assert_eq!(config.database_path, "/tmp/from_file.db");
        assert_eq!(config.link_origin, "https://example.com");
        assert_eq!(config.fetch_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.source_url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prot: 4000").unwrap();

        let cli = Cli {
            config: Some(file.path().to_string_lossy().into_owned()),
            ..Cli::default()
        };
        assert!(matches!(Config::resolve(&cli), Err(AppError::Config(_))));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let cli = Cli {
            config: Some("/definitely/not/here.yaml".to_string()),
            ..Cli::default()
        };
        assert!(matches!(Config::resolve(&cli), Err(AppError::Config(_))));
    }
}
