//! # Tempo Shared
//!
//! Constants and configuration used by both the library and the headless
//! binary.
//!
//! ## Rule
//!
//! This crate holds plain data only. Anything that spawns threads or touches
//! a subsystem belongs in `tempo` or `tempo_mock`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;

pub use config::{AppConfig, ConfigError, ConfigResult};
pub use constants::{
    APP_NAME, DEFAULT_RENDER_INTERVAL_SECS, LOOP_THREAD_NAME, SETTINGS_BACKUP_FILE_NAME,
    SETTINGS_FILE_NAME,
};
