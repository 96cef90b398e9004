//! Configuration management for fedportal.
//!
//! This module handles loading and validating the TOML config file, which
//! holds application settings and the list of backends.

mod backend;
mod settings;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

pub use backend::Backend;
pub use settings::Settings;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "FEDPORTAL_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform config directory could be found.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    ReadError(std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value in the config is invalid.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// The requested backend is not configured.
    #[error("backend '{0}' not found")]
    BackendNotFound(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full configuration file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Application settings.
    #[serde(default)]
    pub settings: Settings,
    /// Configured backends.
    #[serde(default)]
    pub backends: Vec<Backend>,
}

impl Config {
    /// Path of the config file.
    ///
    /// `$FEDPORTAL_CONFIG` if set, else `<config dir>/fedportal/config.toml`.
    pub fn path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("fedportal").join("config.toml"))
    }

    /// Load the config from its default location.
    ///
    /// A missing file yields the default config.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load the config from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), backends = config.backends.len(), "Loaded config");
        Ok(config)
    }

    /// Validate every backend and the settings.
    pub fn validate(&self) -> Result<()> {
        for (i, backend) in self.backends.iter().enumerate() {
            backend.validate()?;
            if self.backends[..i].iter().any(|b| b.name == backend.name) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate backend name '{}'",
                    backend.name
                )));
            }
        }

        if self.settings.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be at least 1".to_string(),
            ));
        }

        if let Some(name) = &self.settings.default_backend {
            if self.backend(name).is_none() {
                return Err(ConfigError::BackendNotFound(name.clone()));
            }
        }

        Ok(())
    }

    /// Look up a backend by name.
    pub fn backend(&self, name: &str) -> Option<&Backend> {
        self.backends.iter().find(|b| b.name == name)
    }

    /// Pick the backend to use.
    ///
    /// An explicit name wins, then `default_backend`, then the only backend
    /// if exactly one is configured.
    pub fn resolve_backend(&self, name: Option<&str>) -> Result<&Backend> {
        let wanted = name.or(self.settings.default_backend.as_deref());
        match wanted {
            Some(name) => self
                .backend(name)
                .ok_or_else(|| ConfigError::BackendNotFound(name.to_string())),
            None => match self.backends.as_slice() {
                [only] => Ok(only),
                [] => Err(ConfigError::ValidationError(
                    "no backends configured".to_string(),
                )),
                _ => Err(ConfigError::ValidationError(
                    "several backends configured; pass --backend or set default_backend"
                        .to_string(),
                )),
            },
        }
    }
}
