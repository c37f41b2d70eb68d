//! Configuration management for riskline.
//!
//! Loads configuration from TOML files: button screen positions, label
//! visibility flags and the logging level. The [`ConfigStore`] trait is the
//! narrow contract the tool controller consumes; the controller receives it
//! by injection rather than through a process-wide singleton.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub buttons: ButtonConfig,
    pub options: OptionsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from default locations.
    ///
    /// Searches in order:
    /// 1. `./riskline.toml`
    /// 2. `~/.config/riskline/riskline.toml`
    ///
    /// Returns default config if no file found.
    pub fn load_default() -> Self {
        if let Ok(config) = Self::load("riskline.toml") {
            return config;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("riskline").join("riskline.toml");
            if let Ok(config) = Self::load(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    /// Save configuration to a file path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Screen position of a button, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ButtonPosition {
    pub x: f32,
    pub y: f32,
}

/// On-screen placement of the two action buttons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ButtonConfig {
    /// Primary-action (show/hide) button position.
    pub primary: ButtonPosition,
    /// Confirm-action button position.
    pub confirm: ButtonPosition,
    /// Button width in pixels.
    pub width: f32,
    /// Button height in pixels.
    pub height: f32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            primary: ButtonPosition { x: 20.0, y: 20.0 },
            confirm: ButtonPosition { x: 20.0, y: 56.0 },
            width: 96.0,
            height: 28.0,
        }
    }
}

/// Label visibility and button linkage flags.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OptionsConfig {
    /// Hide level labels while the pointer is outside the tool.
    pub hide_labels_when_unfocused: bool,
    /// Hide level labels while a level is being dragged.
    pub hide_labels_while_editing: bool,
    /// Drag both buttons together via a connecting handle.
    pub linked_buttons: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter, e.g. "info" or "riskline=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Durable key/value contract consumed by the tool controller.
///
/// Only button placement and option flags pass through this boundary;
/// persistence format and hot-reload mechanics stay behind it.
pub trait ConfigStore {
    fn buttons(&self) -> ButtonConfig;
    fn options(&self) -> OptionsConfig;
    fn set_buttons(&mut self, buttons: ButtonConfig);
    fn set_options(&mut self, options: OptionsConfig);
    /// Write the current values to durable storage.
    fn persist(&self) -> Result<(), ConfigError>;
}

/// File-backed [`ConfigStore`] over the TOML [`Config`].
#[derive(Debug)]
pub struct TomlConfigStore {
    config: Config,
    path: PathBuf,
}

impl TomlConfigStore {
    /// Open a store at the given path, loading existing values if present.
    pub fn open<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let config = Config::load(&path).unwrap_or_default();
        Self { config, path }
    }

    /// Create a store from an already-loaded config.
    pub fn with_config(config: Config, path: PathBuf) -> Self {
        Self { config, path }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ConfigStore for TomlConfigStore {
    fn buttons(&self) -> ButtonConfig {
        self.config.buttons
    }

    fn options(&self) -> OptionsConfig {
        self.config.options
    }

    fn set_buttons(&mut self, buttons: ButtonConfig) {
        self.config.buttons = buttons;
    }

    fn set_options(&mut self, options: OptionsConfig) {
        self.config.options = options;
    }

    fn persist(&self) -> Result<(), ConfigError> {
        self.config.save(&self.path)
    }
}

/// In-memory [`ConfigStore`] for tests and scripted sessions.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Config,
}

impl MemoryConfigStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn buttons(&self) -> ButtonConfig {
        self.config.buttons
    }

    fn options(&self) -> OptionsConfig {
        self.config.options
    }

    fn set_buttons(&mut self, buttons: ButtonConfig) {
        self.config.buttons = buttons;
    }

    fn set_options(&mut self, options: OptionsConfig) {
        self.config.options = options;
    }

    fn persist(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}
