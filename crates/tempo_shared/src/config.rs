//! # Application Configuration
//!
//! TOML-backed configuration for a headless application. Every field has a
//! default, so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! app_name = "relay"
//! render_interval = 0.05   # 20 updates per second; 0 = uncapped, < 0 = no updates
//! data_dir = "/var/lib/relay"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{APP_NAME, DEFAULT_RENDER_INTERVAL_SECS, LOOP_THREAD_NAME};

/// Errors raised while loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`AppConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration for a headless application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Application name. Names the default data directory.
    pub app_name: String,
    /// Seconds between updates. Positive paces at a fixed rate, zero runs
    /// uncapped, negative never updates.
    pub render_interval: f32,
    /// Name of the loop thread.
    pub thread_name: String,
    /// Where settings are persisted. Defaults to the platform data directory
    /// joined with `app_name`.
    pub data_dir: Option<PathBuf>,
    /// Root for internal (read-only) files.
    pub internal_root: PathBuf,
    /// Root for local (read-write) files.
    pub local_root: PathBuf,
    /// Initial logical width reported by the graphics surface.
    pub width: u32,
    /// Initial logical height reported by the graphics surface.
    pub height: u32,
    /// Save modified settings automatically at shutdown.
    pub autosave: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            render_interval: DEFAULT_RENDER_INTERVAL_SECS,
            thread_name: LOOP_THREAD_NAME.to_string(),
            data_dir: None,
            internal_root: PathBuf::from("."),
            local_root: PathBuf::from("."),
            width: 0,
            height: 0,
            autosave: true,
        }
    }
}

impl AppConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.render_interval.is_finite() {
            return Err(ConfigError::Invalid {
                field: "render_interval",
                reason: format!("must be finite, got {}", self.render_interval),
            });
        }
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "app_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(ConfigError::Invalid {
                field: "thread_name",
                reason: "must be non-empty and contain no NUL bytes".to_string(),
            });
        }
        Ok(())
    }

    /// Returns a copy with a different pacing interval.
    #[must_use]
    pub fn with_render_interval(mut self, secs: f32) -> Self {
        self.render_interval = secs;
        self
    }
}
