//! # Context
//!
//! The environment one application instance hands its listeners. Two
//! applications in the same process get two independent contexts.

use std::path::PathBuf;

use tempo_mock::{HeadlessFiles, MockAudio, MockGraphics, MockInput, Settings};
use tempo_shared::AppConfig;

use crate::handle::AppHandle;

/// Subsystems and the application handle, passed to every listener callback.
#[derive(Debug)]
pub struct Context {
    /// Post work, request exit, manage listeners.
    pub app: AppHandle,
    /// Frame counter and timing.
    pub graphics: MockGraphics,
    /// Inert input.
    pub input: MockInput,
    /// Inert audio.
    pub audio: MockAudio,
    /// File resolution.
    pub files: HeadlessFiles,
    /// Persisted settings. Call [`Settings::load`] before relying on stored
    /// values; nothing is saved for a store that was never loaded.
    pub settings: Settings,
}

impl Context {
    pub(crate) fn new(app: AppHandle, config: &AppConfig) -> Self {
        let settings = Settings::new(data_dir(config));
        settings.set_autosave(config.autosave);

        Self {
            app,
            graphics: MockGraphics::new(config.width, config.height),
            input: MockInput::new(),
            audio: MockAudio::new(),
            files: HeadlessFiles::new(&config.internal_root, &config.local_root),
            settings,
        }
    }
}

/// Where settings for `config` are stored: the configured directory, or the
/// platform data directory joined with the application name.
#[must_use]
pub fn data_dir(config: &AppConfig) -> PathBuf {
    config.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&config.app_name)
    })
}
