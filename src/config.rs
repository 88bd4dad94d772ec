use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub gate: GateConfig,
    pub log_level: LogLevel,
    /// Notification template overrides, keyed by localization key
    pub messages: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// YAML file holding actors and their flags
    pub store: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Id of the user this client submits for; other users' messages are ignored
    pub local_user: Option<String>,
    /// Validate OOC, emote, whisper and roll messages too
    pub validate_all_styles: bool,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: Config::mannerisms_dir().join("actors.yaml"),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check MANNERISMS_CONFIG env var
        if let Ok(env_path) = std::env::var("MANNERISMS_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from MANNERISMS_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try MANNERISMS_DIR/mannerisms.yaml
        if let Ok(dir) = std::env::var("MANNERISMS_DIR") {
            let path = PathBuf::from(dir).join("mannerisms.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from MANNERISMS_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/mannerisms/mannerisms.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("mannerisms").join("mannerisms.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./mannerisms.yaml (for development)
        let local_config = PathBuf::from("mannerisms.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Directory holding config and the actor store
    pub fn mannerisms_dir() -> PathBuf {
        std::env::var("MANNERISMS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("mannerisms"))
    }

    /// Store path with ~ and env vars expanded
    pub fn store_path(&self) -> PathBuf {
        Self::expand_path(&self.paths.store)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.gate.local_user.is_none());
        assert!(!config.gate.validate_all_styles);
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.paths.store.ends_with("actors.yaml"));
    }

    #[test]
    fn test_expand_path_no_expansion() {
        let path = PathBuf::from("/usr/local/share/actors.yaml");
        let expanded = Config::expand_path(&path);
        assert_eq!(expanded, PathBuf::from("/usr/local/share/actors.yaml"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/actors.yaml");
        let expanded = Config::expand_path(&path);
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.to_string_lossy().contains("actors.yaml"));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("gate:\n  local_user: u1\nlog_level: debug\n").unwrap();
        assert_eq!(config.gate.local_user.as_deref(), Some("u1"));
        assert!(!config.gate.validate_all_styles);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.messages.is_empty());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mannerisms.yaml");
        fs::write(
            &path,
            "paths:\n  store: /tmp/esm/actors.yaml\ngate:\n  validate_all_styles: true\nmessages:\n  esm.init: ready\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/tmp/esm/actors.yaml"));
        assert!(config.gate.validate_all_styles);
        assert_eq!(config.messages["esm.init"], "ready");
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let path = PathBuf::from("/nonexistent/mannerisms.yaml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.gate.local_user = Some("u1".to_string());
        let yaml_str = serde_yaml::to_string(&config).expect("Failed to serialize");
        let parsed: Config = serde_yaml::from_str(&yaml_str).expect("Failed to deserialize");
        assert_eq!(parsed.gate.local_user, config.gate.local_user);
        assert_eq!(parsed.paths.store, config.paths.store);
    }
}
