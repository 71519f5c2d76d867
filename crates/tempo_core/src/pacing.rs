//! # Frame Pacing
//!
//! Sleep-based fixed-rate pacing for the loop thread.
//!
//! ## Regimes
//!
//! | Interval (s) | [`Pacing`]   | Behaviour                                   |
//! |--------------|--------------|---------------------------------------------|
//! | `> 0`        | `Fixed(d)`   | sleep until the next target, one update per `d` |
//! | `== 0`       | `Uncapped`   | never sleep, update as fast as possible     |
//! | `< 0`        | `Disabled`   | no frames at all: init, then straight to teardown |
//!
//! ## Target Schedule
//!
//! ```text
//! start ──── d ────┬──── d ────┬──── d ────┬─── (stall) ───────┬──── d ────┬
//!               target₁     target₂     target₃            now > target₄
//!               sleep       sleep       sleep             reset: now + d
//! ```
//!
//! After a sleep the target advances by exactly one interval, so frame starts
//! stay on a fixed grid regardless of how long each frame's work took. When a
//! frame starts after its target the grid is abandoned and restarted at
//! `now + d`: a long stall costs one late frame, never a burst of catch-up
//! frames.

use std::time::{Duration, Instant};

use crate::error::{CoreError, CoreResult};

/// Default interval: 60 updates per second.
pub const DEFAULT_INTERVAL: Duration = Duration::from_nanos(16_666_667);

/// Overruns are logged on the first occurrence and then once per this many.
const OVERRUN_LOG_EVERY: u64 = 600;

/// How the loop paces its frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// One frame per interval, sleeping in between.
    Fixed(Duration),
    /// Frames back to back without sleeping.
    Uncapped,
    /// No frames: listeners are initialised and torn down, never updated.
    Disabled,
}

impl Pacing {
    /// Converts a signed interval in seconds into a pacing regime.
    ///
    /// Positive values shorter than one nanosecond round down to
    /// [`Pacing::Uncapped`].
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidInterval`] for NaN, infinities, and positive values
    /// too large for a [`Duration`].
    pub fn from_secs_f32(secs: f32) -> CoreResult<Self> {
        if !secs.is_finite() {
            return Err(CoreError::InvalidInterval(secs));
        }
        if secs < 0.0 {
            return Ok(Self::Disabled);
        }
        let interval =
            Duration::try_from_secs_f32(secs).map_err(|_| CoreError::InvalidInterval(secs))?;
        if interval.is_zero() {
            Ok(Self::Uncapped)
        } else {
            Ok(Self::Fixed(interval))
        }
    }

    /// The interval between frame starts, or `None` when frames are disabled.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        match self {
            Self::Fixed(interval) => Some(*interval),
            Self::Uncapped => Some(Duration::ZERO),
            Self::Disabled => None,
        }
    }

    /// Returns `true` if the loop runs frames at all.
    #[must_use]
    pub const fn runs_frames(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::Fixed(DEFAULT_INTERVAL)
    }
}

/// Time source and sleeper used by [`FramePacer`].
pub trait Clock {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Pacing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacerStats {
    /// Frames started.
    pub frames: u64,
    /// Frames that slept before starting.
    pub sleeps: u64,
    /// Frames that started after their target (fixed pacing only).
    pub overruns: u64,
    /// Total time spent sleeping.
    pub slept: Duration,
}

/// Computes frame start times and sleeps until them.
pub struct FramePacer<C = SystemClock> {
    clock: C,
    interval: Duration,
    target: Instant,
    stats: PacerStats,
}

impl<C: Clock> FramePacer<C> {
    /// Creates a pacer whose first target is one interval from now.
    ///
    /// # Arguments
    ///
    /// * `interval` - Time between frame starts; zero never sleeps
    /// * `clock` - Time source
    #[must_use]
    pub fn new(interval: Duration, clock: C) -> Self {
        let target = clock.now() + interval;
        Self {
            clock,
            interval,
            target,
            stats: PacerStats::default(),
        }
    }

    /// Creates a pacer for `pacing`, or `None` if frames are disabled.
    #[must_use]
    pub fn for_pacing(pacing: Pacing, clock: C) -> Option<Self> {
        pacing.interval().map(|interval| Self::new(interval, clock))
    }

    /// Waits for the start of the next frame.
    pub fn wait(&mut self) {
        let now = self.clock.now();
        if self.target > now {
            let remaining = self.target - now;
            self.clock.sleep(remaining);
            self.stats.sleeps += 1;
            self.stats.slept += remaining;
            self.target += self.interval;
        } else {
            if !self.interval.is_zero() && now > self.target {
                self.stats.overruns += 1;
                if self.stats.overruns == 1 || self.stats.overruns % OVERRUN_LOG_EVERY == 0 {
                    tracing::warn!(
                        behind_us = (now - self.target).as_micros() as u64,
                        overruns = self.stats.overruns,
                        "frame started late, resetting schedule"
                    );
                }
            }
            self.target = now + self.interval;
        }
        self.stats.frames += 1;
    }

    /// The configured interval.
    #[inline]
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The start time of the next frame.
    #[inline]
    #[must_use]
    pub const fn next_target(&self) -> Instant {
        self.target
    }

    /// Statistics so far.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> PacerStats {
        self.stats
    }

    /// The pacer's clock.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}
