//! # Tempo Core
//!
//! The primitives a headless application loop is assembled from:
//!
//! ```text
//!   Producer threads                 Loop thread
//!  ┌────────────────┐          ┌──────────────────────────────┐
//!  │ post(task) ────┼────────> │ FramePacer::wait()           │
//!  │ post(task) ────┼──┐      │ TaskQueue::drain()           │
//!  └────────────────┘  └─────>│ ListenerRegistry passes      │
//!                              └──────────────────────────────┘
//! ```
//!
//! - [`registry::ListenerRegistry`]: ordered listeners behind one lock
//! - [`queue::TaskQueue`]: FIFO deferred work, snapshot-drained per frame
//! - [`pacing::FramePacer`]: sleep-based fixed-rate pacing over a [`pacing::Clock`]
//!
//! Nothing in this crate spawns threads. The loop driver in `tempo` owns the
//! thread and wires these together.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod pacing;
pub mod queue;
pub mod registry;

pub use error::{CoreError, CoreResult, RegistryError};
pub use pacing::{Clock, FramePacer, Pacing, PacerStats, SystemClock};
pub use queue::{Task, TaskQueue};
pub use registry::{ListenerId, ListenerRegistry};
