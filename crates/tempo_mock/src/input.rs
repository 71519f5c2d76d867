//! # Mock Input
//!
//! A headless process has no keyboard, mouse or touch screen. Every query
//! answers "nothing happened".

use std::sync::atomic::{AtomicU64, Ordering};

/// Input surface that never reports any input.
#[derive(Debug, Default)]
pub struct MockInput {
    polls: AtomicU64,
}

impl MockInput {
    /// Creates the surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes pending input events. There never are any.
    pub fn poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    /// How many times [`poll`](Self::poll) ran.
    #[must_use]
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    /// Always `false`.
    #[must_use]
    pub fn is_key_pressed(&self, _key: u32) -> bool {
        false
    }

    /// Always `false`.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        false
    }

    /// Pointer position, always the origin.
    #[must_use]
    pub fn pointer(&self) -> (i32, i32) {
        (0, 0)
    }
}
