//! Configuration file support.
//!
//! This module provides serialization and deserialization of the settings
//! that shape a project session: log verbosity, undo depth and the file
//! extension tables used to classify dropped files.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_HISTORY, SURFACE_EXTENSIONS, VOLUME_EXTENSIONS};
use crate::model::FileTypes;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get all log levels in order from least to most verbose.
    pub fn all() -> &'static [LogLevel] {
        &[
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ]
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Session configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub file_types: FileTypeConfig,
}

fn default_app_name() -> String {
    "Neurofiles".to_string()
}

/// Undo history section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept for undo
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

/// Extensions used to classify dropped files as volumes or surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileTypeConfig {
    #[serde(default = "default_volume_extensions")]
    pub volume_extensions: Vec<String>,

    #[serde(default = "default_surface_extensions")]
    pub surface_extensions: Vec<String>,
}

fn default_volume_extensions() -> Vec<String> {
    VOLUME_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_surface_extensions() -> Vec<String> {
    SURFACE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

impl Default for FileTypeConfig {
    fn default() -> Self {
        Self {
            volume_extensions: default_volume_extensions(),
            surface_extensions: default_surface_extensions(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            log_level: LogLevel::default(),
            history: HistoryConfig::default(),
            file_types: FileTypeConfig::default(),
        }
    }

    /// Build the file classifier described by this config.
    pub fn file_types(&self) -> FileTypes {
        FileTypes::new(
            &self.file_types.volume_extensions,
            &self.file_types.surface_extensions,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    pub fn default_filename() -> &'static str {
        "neurofiles-config.json"
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        // XDG config directory first, then ~/.config
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("neurofiles").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("neurofiles")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`. Returns None if the file is missing
    /// or unreadable.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: &std::path::Path) -> Option<Self> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        Self::load_from_path(&Self::default_path()?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }

    /// LocalStorage key for WASM config persistence.
    #[cfg(target_arch = "wasm32")]
    const LOCALSTORAGE_KEY: &'static str = "neurofiles-config";

    /// Try to load configuration from localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn load_from_local_storage() -> Option<Self> {
        let window = web_sys::window()?;
        let storage = window.local_storage().ok()??;

        match storage.get_item(Self::LOCALSTORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from localStorage");
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config from localStorage: {}", e);
                    None
                }
            },
            Ok(None) => {
                log::debug!("No config found in localStorage");
                None
            }
            Err(e) => {
                log::warn!("Failed to read from localStorage: {:?}", e);
                None
            }
        }
    }

    /// Save configuration to localStorage (WASM only).
    #[cfg(target_arch = "wasm32")]
    pub fn save_to_local_storage(&self) -> Result<(), ConfigError> {
        let window = web_sys::window()
            .ok_or_else(|| ConfigError::StorageError("No window object available".to_string()))?;

        let storage = window
            .local_storage()
            .map_err(|e| ConfigError::StorageError(format!("localStorage access error: {:?}", e)))?
            .ok_or_else(|| ConfigError::StorageError("localStorage not available".to_string()))?;

        let json = self.to_json()?;
        storage
            .set_item(Self::LOCALSTORAGE_KEY, &json)
            .map_err(|e| {
                ConfigError::StorageError(format!("Failed to save to localStorage: {:?}", e))
            })?;

        log::info!("Saved configuration to localStorage");
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Storage error (localStorage in WASM)
    #[error("Storage error: {0}")]
    StorageError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileType;

    #[test]
    fn test_round_trip() {
        let mut config = AppConfig::new();
        config.log_level = LogLevel::Debug;
        config.history.max_history = 5;

        let parsed = AppConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = AppConfig::from_json(r#"{ "version": 1 }"#).unwrap();
        assert_eq!(config.app_name, "Neurofiles");
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.history.max_history, DEFAULT_MAX_HISTORY);
        assert_eq!(config.file_types, FileTypeConfig::default());
    }

    #[test]
    fn test_version_too_new() {
        let err = AppConfig::from_json(r#"{ "version": 99 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::VersionTooNew {
                file_version: 99,
                supported_version: CONFIG_VERSION
            }
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            AppConfig::from_json("not json"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_custom_file_types() {
        let config = AppConfig::from_json(
            r#"{ "version": 1, "file_types": { "volume_extensions": ["nrrd"] } }"#,
        )
        .unwrap();
        let types = config.file_types();
        assert_eq!(types.classify("head.nrrd"), Some(FileType::Volume));
        assert_eq!(types.classify("head.nii"), None);
        assert_eq!(types.classify("lh.pial"), Some(FileType::Surface));
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::all().len(), 5);
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_path() {
        let path = std::env::temp_dir()
            .join(format!("neurofiles-config-test-{}", std::process::id()))
            .join(AppConfig::default_filename());
        let config = AppConfig {
            log_level: LogLevel::Trace,
            ..AppConfig::new()
        };

        config.save_to_path(&path).unwrap();
        assert_eq!(AppConfig::load_from_path(&path), Some(config));

        let _ = std::fs::remove_file(&path);
    }
}
