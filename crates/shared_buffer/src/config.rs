use std::path::PathBuf;
use std::time::Duration;

use derive_more::derive::From;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

#[derive(Debug, From)]
pub enum ConfigError {
    #[from(ignore)]
    IOError(std::io::Error),

    #[from(ignore)]
    DeserializationFailed(toml::de::Error),

    InvalidPath(PathBuf),

    #[from(ignore)]
    CapacityTooLarge(usize),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::DeserializationFailed(value)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Largest `initial_capacity` a config document may ask for.
pub const MAX_INITIAL_CAPACITY: usize = 1 << 24;

/// `BufferConfig` carries the tunables of a [`crate::SharedBuffer`].
///
/// In TOML form every key is optional:
///
/// ```toml
/// wait_timeout_ms = 250
/// initial_capacity = 64
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// How long [`crate::SharedBuffer::pop_wait`] blocks before giving up.
    #[serde(rename = "wait_timeout_ms")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub wait_timeout: Duration,

    /// Number of values the buffer can hold before it first reallocates.
    pub initial_capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            initial_capacity: 0,
        }
    }
}

impl BufferConfig {
    #[must_use]
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = wait_timeout;
        self
    }

    #[must_use]
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::CapacityTooLarge`] if `initial_capacity` is
    /// above [`MAX_INITIAL_CAPACITY`].
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(ConfigError::CapacityTooLarge(self.initial_capacity));
        }
        Ok(())
    }

    /// Parses a config from TOML text, filling missing keys with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DeserializationFailed`] if the text is not a
    /// valid config document and [`ConfigError::CapacityTooLarge`] if it
    /// asks for more than [`MAX_INITIAL_CAPACITY`] values up front.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses the TOML file at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if `target` is not an existing
    /// file, [`ConfigError::IOError`] if it cannot be read, and otherwise the
    /// same errors as [`BufferConfig::from_toml_str`].
    pub fn from_path<V>(target: V) -> ConfigResult<Self>
    where
        V: Into<PathBuf>,
    {
        let target_path = target.into();
        if !target_path.is_file() {
            return Err(ConfigError::InvalidPath(target_path));
        }

        let config_content = std::fs::read_to_string(&target_path)?;
        let config = Self::from_toml_str(&config_content)?;

        tracing::debug!(
            path = %target_path.display(),
            wait_timeout = ?config.wait_timeout,
            initial_capacity = config.initial_capacity,
            "loaded shared buffer config"
        );
        Ok(config)
    }
}
