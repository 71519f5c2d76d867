//! # Mock Subsystem Errors
//!
//! Errors from the file resolver and the settings store. The graphics, input
//! and audio mocks never fail.

use std::path::PathBuf;

use thiserror::Error;

use crate::files::FileType;

/// Errors raised by [`crate::HeadlessFiles`] and [`crate::Settings`].
#[derive(Error, Debug)]
pub enum MockError {
    /// A read-only file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Attempted to write through a read-only file type.
    #[error("cannot write {kind:?} file {path}: read-only")]
    ReadOnly {
        /// The path that was rejected.
        path: PathBuf,
        /// The file type it was resolved with.
        kind: FileType,
    },

    /// No home directory could be determined for external files.
    #[error("external storage is not available")]
    ExternalUnavailable,

    /// Filesystem failure.
    #[error("io error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A settings file exists but is not a flat table of supported values.
    #[error("corrupt settings file {path}: {source}")]
    SettingsParse {
        /// The settings file.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be encoded.
    #[error("failed to encode settings: {0}")]
    SettingsEncode(#[from] toml::ser::Error),
}

impl MockError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for mock subsystem operations.
pub type MockResult<T> = Result<T, MockError>;
