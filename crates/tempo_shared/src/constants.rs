//! # Runtime Constants
//!
//! Defaults baked into the binary. Every one of them can be overridden from
//! [`crate::AppConfig`] except the settings file names.

// =============================================================================
// LOOP CONFIGURATION
// =============================================================================

/// Default application name, also the settings directory name.
pub const APP_NAME: &str = "tempo";

/// Default pacing interval in seconds (60 updates per second).
pub const DEFAULT_RENDER_INTERVAL_SECS: f32 = 1.0 / 60.0;

/// Name given to the loop thread.
pub const LOOP_THREAD_NAME: &str = "HeadlessApplication";

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Settings file inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Backup copy written before the primary settings file.
pub const SETTINGS_BACKUP_FILE_NAME: &str = "settings_backup.toml";

/// Sub-directory of the local root used for cache files.
pub const CACHE_DIR_NAME: &str = "cache";
