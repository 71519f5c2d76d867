//! # Application Listener
//!
//! The lifecycle a headless application drives:
//!
//! ```text
//! init ──► (resize)* ──► update ──► update ──► ... ──► pause ──► dispose
//! ```
//!
//! Every callback runs on the loop thread. A headless application never
//! loses focus, so `resume` is never called by the loop; it exists for
//! listeners shared with other backends.

use crate::context::Context;
use crate::error::ListenerError;

/// Receives lifecycle callbacks from a [`crate::HeadlessApplication`].
///
/// All methods default to doing nothing. Returning an error (or panicking)
/// abandons the loop and hands the failure to the exception handler.
pub trait ApplicationListener: Send {
    /// Called once, before the first `update`.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn init(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called when the logical size changes.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn resize(&mut self, _ctx: &Context, _width: u32, _height: u32) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called once per frame.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn update(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called at shutdown, right before `dispose`.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn pause(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Never called by the headless loop.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn resume(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        Ok(())
    }

    /// Called once at shutdown. Release resources here.
    ///
    /// # Errors
    ///
    /// Any error aborts the loop.
    fn dispose(&mut self, _ctx: &Context) -> Result<(), ListenerError> {
        Ok(())
    }
}
