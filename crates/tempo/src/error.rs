//! # Application Errors
//!
//! Everything that can end a headless application early. Errors raised on
//! the loop thread go to the exception handler; errors raised while
//! constructing or joining come back to the caller.

use std::any::Any;
use std::fmt;

use tempo_core::{CoreError, RegistryError};
use tempo_mock::MockError;
use tempo_shared::ConfigError;
use thiserror::Error;

/// Error type listener callbacks return.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Lifecycle callback that was running when a listener failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `init`
    Init,
    /// `resize`
    Resize,
    /// `update`
    Update,
    /// `pause`
    Pause,
    /// `resume`
    Resume,
    /// `dispose`
    Dispose,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Resize => "resize",
            Self::Update => "update",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Dispose => "dispose",
        };
        f.write_str(name)
    }
}

/// Errors raised by the headless application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Construction requires at least one listener.
    #[error("a headless application needs at least one listener")]
    NoListeners,

    /// The loop thread could not be spawned.
    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// A listener callback returned an error.
    #[error("listener failed during {phase}: {source}")]
    Listener {
        /// The callback that failed.
        phase: Phase,
        /// What the listener reported.
        #[source]
        source: ListenerError,
    },

    /// A listener callback panicked.
    #[error("listener panicked during {phase}: {message}")]
    Panicked {
        /// The callback that panicked.
        phase: Phase,
        /// The panic payload, if it was a string.
        message: String,
    },

    /// Registry access failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Invalid pacing.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Settings could not be saved at shutdown.
    #[error(transparent)]
    Mock(#[from] MockError),

    /// The loop ended through the exception handler instead of a clean
    /// shutdown.
    #[error("loop aborted: the error was delivered to the exception handler")]
    LoopAborted,

    /// The loop thread panicked outside any listener callback, or the
    /// exception handler panicked.
    #[error("loop thread panicked: {0}")]
    LoopPanicked(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_extraction() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(&*payload), "boom");

        let payload = std::panic::catch_unwind(|| panic!("frame {}", 7)).unwrap_err();
        assert_eq!(panic_message(&*payload), "frame 7");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(42_u8)).unwrap_err();
        assert_eq!(panic_message(&*payload), "non-string panic payload");
    }

    #[test]
    fn test_listener_error_display() {
        let err = AppError::Listener {
            phase: Phase::Update,
            source: "disk full".into(),
        };
        assert_eq!(err.to_string(), "listener failed during update: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
