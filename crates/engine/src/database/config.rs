//! Store configuration via `durakv.toml`
//!
//! On first open, a default `durakv.toml` is created in the store directory.
//! To change settings, edit the file and restart.

use durakv_core::Error;
use durakv_durability::DurabilityMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

/// Default number of logged operations between automatic checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1000;

/// Errors from reading, validating or writing the config file
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file could not be written
    #[error("failed to write config file '{}': {source}", .path.display())]
    Write {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this config
    #[error("failed to parse config file '{}': {source}", .path.display())]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// The config could not be rendered as TOML
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Unrecognized durability mode
    #[error("invalid durability mode '{0}' in durakv.toml, expected \"sync\" or \"buffered\"")]
    InvalidDurability(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Store configuration loaded from `durakv.toml`
///
/// # Example
///
/// ```toml
/// durability = "sync"
/// checkpoint_interval = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Durability mode: `"sync"` or `"buffered"` (`"async"` is an alias)
    #[serde(default = "default_durability_str")]
    pub durability: String,
    /// Logged operations between automatic checkpoints, `0` disables them
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,
}

fn default_durability_str() -> String {
    DurabilityMode::default().as_str().to_string()
}

fn default_checkpoint_interval() -> u64 {
    DEFAULT_CHECKPOINT_INTERVAL
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            durability: default_durability_str(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Config with fsync on every log record
    pub fn sync() -> Self {
        Self::default().with_durability(DurabilityMode::Sync)
    }

    /// Config with buffered log writes
    pub fn buffered() -> Self {
        Self::default().with_durability(DurabilityMode::Buffered)
    }

    /// Set the durability mode
    pub fn with_durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode.as_str().to_string();
        self
    }

    /// Set the checkpoint interval (`0` disables automatic checkpoints)
    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Parse the durability string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a known mode.
    pub fn durability_mode(&self) -> Result<DurabilityMode, ConfigError> {
        DurabilityMode::parse(&self.durability)
            .ok_or_else(|| ConfigError::InvalidDurability(self.durability.clone()))
    }

    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# durakv store configuration
#
# Durability mode: "sync" (default) or "buffered"
#   "sync"     = fsync every log record, nothing acknowledged is lost
#   "buffered" = OS-buffered log writes, recent records may be lost on power loss
durability = "sync"

# Logged operations between automatic checkpoints (snapshot + log truncation).
# 0 disables automatic checkpoints.
checkpoint_interval = 1000
"#
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: StoreConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Validate the durability value eagerly
        config.durability_mode()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path
    pub fn write_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
