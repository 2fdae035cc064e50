use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::TableStyle;
use crate::logging::LogConfig;
use crate::store::USER_DATA_KEY;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Where the profile lives
    pub storage: StorageSettings,

    /// Logging setup
    pub logging: LogConfig,

    /// Terminal output preferences
    pub display: DisplaySettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Profile storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding `<key>.json` payloads
    pub data_dir: PathBuf,

    /// Key the profile is stored under
    pub profile_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Colored terminal output
    pub color: bool,

    /// Border style for tables
    pub table_style: TableStyle,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            metadata: ConfigMetadata::default(),
            storage: StorageSettings::default(),
            logging: LogConfig::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        let now = Utc::now();

        ConfigMetadata {
            version: "1.0".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: default_data_dir(),
            profile_key: USER_DATA_KEY.to_string(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            color: true,
            table_style: TableStyle::Rounded,
        }
    }
}

fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gainrs")
}

fn default_data_dir() -> PathBuf {
    app_dir().join("data")
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        app_dir().join("config.toml")
    }

    /// Load `path` if it exists, defaults otherwise. A file that exists but
    /// does not parse is an error.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to default location
    pub fn save_default(&mut self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to_file(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.storage, deserialized.storage);
        assert_eq!(config.display, deserialized.display);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let toml_str = r#"
            [storage]
            data_dir = "/tmp/gainrs-data"

            [display]
            table_style = "markdown"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/gainrs-data"));
        assert_eq!(config.storage.profile_key, "user-data");
        assert_eq!(config.display.table_style, TableStyle::Markdown);
        assert!(config.display.color);
        assert_eq!(config.logging.level, LogLevel::Warn);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original_config = AppConfig::default();
        original_config.storage.profile_key = "athlete-2".to_string();
        original_config.display.color = false;

        original_config.save_to_file(&config_path).unwrap();
        let loaded_config = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded_config.storage.profile_key, "athlete-2");
        assert!(!loaded_config.display.color);
    }

    #[test]
    fn test_load_or_default_from() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let config = AppConfig::load_or_default_from(&missing).unwrap();
        assert_eq!(config.storage.profile_key, "user-data");

        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "storage = [").unwrap();
        assert!(AppConfig::load_or_default_from(&broken).is_err());
    }

    #[test]
    fn test_default_paths() {
        assert!(AppConfig::default_config_path().ends_with(".gainrs/config.toml"));
        assert!(AppConfig::default().storage.data_dir.ends_with(".gainrs/data"));
    }
}
