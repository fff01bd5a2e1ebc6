//! Dashboard configuration
//!
//! Configuration loaded from .blueocean-dashboard.toml.

use crate::config_file::{config_candidates, read_first};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dashboard configuration loaded from .blueocean-dashboard.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Log level used when RUST_LOG is not set (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Mirror log output to stderr in addition to the log file
    #[serde(default)]
    pub log_to_stderr: bool,

    /// JSON file with pipelines and their branches served by the fixture API
    #[serde(default)]
    pub fixtures_file: Option<PathBuf>,

    /// Pipelines whose branches are loaded at startup
    #[serde(default)]
    pub pipelines: Vec<String>,
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_to_stderr: false,
            fixtures_file: None,
            pipelines: Vec::new(),
        }
    }
}

/// Where the active configuration came from
///
/// Loading happens before logging is set up, so the outcome is kept here
/// and reported once the logger is installed.
#[derive(Debug)]
pub enum ConfigSource {
    Defaults,
    File(PathBuf),
    Invalid {
        path: PathBuf,
        error: toml::de::Error,
    },
}

impl ConfigSource {
    pub fn level(&self) -> log::Level {
        match self {
            ConfigSource::Defaults => log::Level::Debug,
            ConfigSource::File(_) => log::Level::Info,
            ConfigSource::Invalid { .. } => log::Level::Warn,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConfigSource::Defaults => "Using default dashboard config".to_string(),
            ConfigSource::File(path) => format!("Loaded dashboard config from {}", path.display()),
            ConfigSource::Invalid { path, error } => format!(
                "Failed to parse config file {}, using defaults: {}",
                path.display(),
                error
            ),
        }
    }

    /// Report the outcome through the installed logger
    pub fn log(&self) {
        log::log!(self.level(), "{}", self.message());
    }
}

impl DashboardConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> (Self, ConfigSource) {
        Self::load_from(&config_candidates())
    }

    /// Load the first readable candidate; a file that fails to parse is
    /// not skipped in favour of later candidates
    pub fn load_from<P: AsRef<Path>>(candidates: &[P]) -> (Self, ConfigSource) {
        let Some((path, content)) = read_first(candidates) else {
            return (Self::default(), ConfigSource::Defaults);
        };

        match Self::parse(&content) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(error) => (Self::default(), ConfigSource::Invalid { path, error }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Configured log level, falling back to debug for unknown names
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Debug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.log_level, "debug");
        assert!(!config.log_to_stderr);
        assert!(config.fixtures_file.is_none());
        assert!(config.pipelines.is_empty());
    }

    #[test]
    fn test_config_deserialize() {
        let toml = r#"
            log_level = "warn"
            fixtures_file = "fixtures/pipelines.json"
            pipelines = ["blueocean", "jenkins core"]
        "#;
        let config = DashboardConfig::parse(toml).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.level_filter(), log::LevelFilter::Warn);
        assert_eq!(
            config.fixtures_file,
            Some(PathBuf::from("fixtures/pipelines.json"))
        );
        assert_eq!(config.pipelines, vec!["blueocean", "jenkins core"]);
        // unset fields use defaults
        assert!(!config.log_to_stderr);
    }

    #[test]
    fn test_unknown_level_falls_back_to_debug() {
        let config = DashboardConfig {
            log_level: "chatty".to_string(),
            ..Default::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(DashboardConfig::parse("log_level = ").is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_from_file() {
        let dir = scratch_dir("blueocean-load-file");
        let file = dir.join(crate::CONFIG_FILE);
        std::fs::write(&file, "log_to_stderr = true").unwrap();

        let (config, source) = DashboardConfig::load_from(&[dir.join("absent.toml"), file.clone()]);

        assert!(config.log_to_stderr);
        assert!(matches!(source, ConfigSource::File(path) if path == file));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_from_nothing_uses_defaults() {
        let dir = scratch_dir("blueocean-load-none");

        let (config, source) = DashboardConfig::load_from(&[dir.join("absent.toml")]);

        assert_eq!(config, DashboardConfig::default());
        assert!(matches!(source, ConfigSource::Defaults));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = scratch_dir("blueocean-load-malformed");
        let broken = dir.join("broken.toml");
        let valid = dir.join("valid.toml");
        std::fs::write(&broken, "log_level = ").unwrap();
        std::fs::write(&valid, "log_level = \"warn\"").unwrap();

        let (config, source) = DashboardConfig::load_from(&[broken.clone(), valid]);

        assert_eq!(config, DashboardConfig::default());
        assert_eq!(source.level(), log::Level::Warn);
        assert!(source.message().contains(&broken.display().to_string()));
        match source {
            ConfigSource::Invalid { path, .. } => assert_eq!(path, broken),
            other => panic!("expected an invalid config source, got {:?}", other),
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
