//! # Mock Audio
//!
//! Sound and music handles that accept every call and produce no output.
//! Ids are still handed out so code that tracks playing instances keeps
//! working unchanged in headless mode.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Identifier of one playing instance of a sound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoundId(pub u64);

/// Audio surface handing out silent handles.
#[derive(Debug, Default)]
pub struct MockAudio {
    next_instance: Arc<AtomicU64>,
    created: AtomicU64,
}

impl MockAudio {
    /// Creates the surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a silent sound for `path`. The file is never opened.
    #[must_use]
    pub fn new_sound(&self, path: impl AsRef<Path>) -> MockSound {
        self.created.fetch_add(1, Ordering::Relaxed);
        MockSound {
            path: path.as_ref().to_path_buf(),
            next_instance: Arc::clone(&self.next_instance),
        }
    }

    /// Creates a silent music stream for `path`. The file is never opened.
    #[must_use]
    pub fn new_music(&self, path: impl AsRef<Path>) -> MockMusic {
        self.created.fetch_add(1, Ordering::Relaxed);
        MockMusic {
            path: path.as_ref().to_path_buf(),
            playing: AtomicBool::new(false),
            volume: Mutex::new(1.0),
        }
    }

    /// Handles created so far.
    #[must_use]
    pub fn handles_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}

/// Silent short sound.
#[derive(Debug)]
pub struct MockSound {
    path: PathBuf,
    next_instance: Arc<AtomicU64>,
}

impl MockSound {
    /// Path the sound was created from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// "Plays" the sound, returning a fresh instance id.
    pub fn play(&self, _volume: f32) -> SoundId {
        SoundId(self.next_instance.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Stops one instance. No-op.
    pub fn stop(&self, _id: SoundId) {}
}

/// Silent streamed music that still tracks play state and volume.
#[derive(Debug)]
pub struct MockMusic {
    path: PathBuf,
    playing: AtomicBool,
    volume: Mutex<f32>,
}

impl MockMusic {
    /// Path the music was created from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks the stream as playing.
    pub fn play(&self) {
        self.playing.store(true, Ordering::Relaxed);
    }

    /// Marks the stream as paused.
    pub fn pause(&self) {
        self.playing.store(false, Ordering::Relaxed);
    }

    /// Whether [`play`](Self::play) was called more recently than [`pause`](Self::pause).
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    /// Sets the volume, clamped to `0.0..=1.0`.
    pub fn set_volume(&self, volume: f32) {
        *self.volume.lock() = volume.clamp(0.0, 1.0);
    }

    /// Current volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        *self.volume.lock()
    }

    /// Playback position. Always zero: nothing advances.
    #[must_use]
    pub fn position(&self) -> f32 {
        0.0
    }
}
