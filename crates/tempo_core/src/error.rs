//! # Core Error Types
//!
//! Errors raised by the loop primitives.

use thiserror::Error;

use crate::registry::ListenerId;

/// Errors raised by [`crate::registry::ListenerRegistry`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry is in the middle of a listener pass on this thread.
    ///
    /// Raised when a listener calls back into the registry from inside its
    /// own callback. Post the mutation instead.
    #[error("listener registry is busy: mutation from inside a listener callback")]
    Busy,

    /// No listener is registered under this id.
    #[error("unknown listener: {0}")]
    UnknownListener(ListenerId),
}

/// Errors raised by the core primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Registry access failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A pacing interval that is neither a number nor a sign.
    #[error("invalid pacing interval: {0}")]
    InvalidInterval(f32),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
