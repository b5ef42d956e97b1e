//! Configuration file loading and saving
//!
//! Configuration structs implement [`Config`] to gain TOML / RON persistence;
//! the format is picked from the file extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// File persistence for run configurations
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load from `path`, picking the format from its extension
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;

        let config = match format {
            ConfigFormat::Toml => {
                toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            ConfigFormat::Ron => {
                ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, picking the format from its extension
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Errors loading, saving or checking a run configuration
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Cannot access configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// File contents do not match the configuration layout
    #[error("Cannot parse configuration: {0}")]
    Parse(String),

    /// Configuration could not be rendered as text
    #[error("Cannot serialize configuration: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
