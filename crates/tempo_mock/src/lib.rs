//! # Tempo Mock Subsystems
//!
//! The surfaces a headless application exposes to its listeners in place of
//! real devices:
//!
//! ```text
//! ┌──────────────┬────────────────────────────────────────────────┐
//! │ MockGraphics │ frame id, delta/elapsed time, FPS, logical size │
//! │ MockInput    │ nothing pressed, pointer at origin              │
//! │ MockAudio    │ handles that accept every call and play nothing │
//! │ HeadlessFiles│ path resolution by FileType, read-only rules    │
//! │ Settings     │ typed key/value store, persisted as TOML        │
//! └──────────────┴────────────────────────────────────────────────┘
//! ```
//!
//! All of them are `Send + Sync` and take `&self`, so one instance can be
//! shared by the loop thread and any producer thread.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod audio;
pub mod error;
pub mod files;
pub mod graphics;
pub mod input;
pub mod settings;

pub use audio::{MockAudio, MockMusic, MockSound, SoundId};
pub use error::{MockError, MockResult};
pub use files::{FileType, HeadlessFiles};
pub use graphics::MockGraphics;
pub use input::MockInput;
pub use settings::{SettingValue, Settings};
