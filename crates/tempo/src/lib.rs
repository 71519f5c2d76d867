//! # Tempo
//!
//! A headless application loop: lifecycle listeners updated at a fixed rate
//! on a dedicated thread, with deferred work posted from anywhere.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              TEMPO                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │   any thread                       loop thread                   │
//! │  ┌────────────┐  post / exit   ┌──────────────────────────────┐  │
//! │  │ AppHandle  │───────────────>│ HeadlessApplication          │  │
//! │  │            │  add / remove  │  • FramePacer   (tempo_core) │  │
//! │  └────────────┘───────────────>│  • TaskQueue    (tempo_core) │  │
//! │                                │  • Registry     (tempo_core) │  │
//! │                                └──────────────┬───────────────┘  │
//! │                                               │ &Context         │
//! │                                               ▼                  │
//! │                                ┌──────────────────────────────┐  │
//! │                                │ ApplicationListener          │  │
//! │                                │  graphics, input, audio,     │  │
//! │                                │  files, settings (tempo_mock)│  │
//! │                                └──────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tempo::{ApplicationListener, Context, HeadlessApplication, ListenerError};
//!
//! struct Counter(u64);
//!
//! impl ApplicationListener for Counter {
//!     fn update(&mut self, ctx: &Context) -> Result<(), ListenerError> {
//!         self.0 += 1;
//!         if self.0 == 120 {
//!             ctx.app.exit();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let app = HeadlessApplication::new(Counter(0)).unwrap();
//! let summary = app.join().unwrap();
//! assert!(summary.frames >= 120);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod application;
pub mod context;
pub mod error;
pub mod handle;
pub mod listener;

pub use tempo_core as core;
pub use tempo_mock as mock;
pub use tempo_shared as shared;

pub use application::{ExceptionHandler, HeadlessApplication, LoopSummary};
pub use context::Context;
pub use error::{AppError, AppResult, ListenerError, Phase};
pub use handle::{AppHandle, ApplicationType};
pub use listener::ApplicationListener;
pub use tempo_core::{ListenerId, RegistryError};
pub use tempo_shared::AppConfig;
