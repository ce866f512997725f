use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::sync::DeviceRole;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    /// Relay URL (e.g., "ws://localhost:8093" or "wss://relay.example.com")
    pub relay_url: Option<String>,
    /// Code shared by the two paired devices
    pub pair_code: Option<String>,
}

impl SyncConfig {
    /// Returns true if sync is configured (has both relay_url and pair_code)
    pub fn is_configured(&self) -> bool {
        self.relay_url.is_some() && self.pair_code.is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Which side of the pairing this device is
    pub device_role: ConfigValue<String>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    device_role: Option<String>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let default_db_path = Self::default_data_dir().join("gymtrack.db");
        let default_role = DeviceRole::Primary.to_string();

        // Start with defaults
        let mut database_path = ConfigValue::new(default_db_path.clone(), ConfigSource::Default);
        let mut device_role = ConfigValue::new(default_role, ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(role) = file_config.device_role {
                device_role = ConfigValue::new(role, ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("GYMTRACK_DB_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(role) = std::env::var("GYMTRACK_DEVICE_ROLE") {
            device_role = ConfigValue::new(role, ConfigSource::Environment);
        }
        // Sync env var overrides
        if let Ok(url) = std::env::var("GYMTRACK_RELAY_URL") {
            sync.relay_url = Some(url);
        }
        if let Ok(code) = std::env::var("GYMTRACK_PAIR_CODE") {
            sync.pair_code = Some(code);
        }

        Ok(Self {
            database_path,
            device_role,
            config_file,
            sync,
        })
    }

    /// The parsed device role.
    pub fn role(&self) -> Result<DeviceRole, ConfigError> {
        self.device_role
            .value
            .parse()
            .map_err(ConfigError::InvalidRole)
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/gymtrack/
    /// - macOS: ~/Library/Application Support/gymtrack/
    /// - Windows: %APPDATA%/gymtrack/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymtrack")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/gymtrack/
    /// - macOS: ~/Library/Application Support/gymtrack/
    /// - Windows: %APPDATA%/gymtrack/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gymtrack")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidRole(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidRole(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("gymtrack.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.device_role.value, "primary");
        assert_eq!(config.role().unwrap(), DeviceRole::Primary);
        assert!(!config.sync.is_configured());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "device_role: companion").unwrap();
        writeln!(file, "sync:").unwrap();
        writeln!(file, "  relay_url: ws://localhost:8093").unwrap();
        writeln!(file, "  pair_code: gym-1234").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.role().unwrap(), DeviceRole::Companion);
        assert_eq!(config.config_file, Some(config_path));
        assert!(config.sync.is_configured());
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_partial_file_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "device_role: companion").unwrap();
        // database_path not specified

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.device_role.value, "companion");
        assert_eq!(config.device_role.source, ConfigSource::File);
    }

    #[test]
    fn test_invalid_role_is_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "device_role: smartwatch").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config.role().is_err());
    }
}
