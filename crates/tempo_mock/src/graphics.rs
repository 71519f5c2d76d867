//! # Mock Graphics
//!
//! No GPU, no window. What remains of a graphics surface in headless mode is
//! frame bookkeeping: which frame this is, how long the last one took, and
//! how many ran in the last second.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

const ONE_SECOND: Duration = Duration::from_secs(1);

#[derive(Debug)]
struct FrameTiming {
    last_frame: Option<Instant>,
    delta: Duration,
    elapsed: Duration,
    second_start: Option<Instant>,
    frames_this_second: u32,
    fps: u32,
}

/// Frame counter and timing source for a headless application.
///
/// The loop calls [`begin_frame`](Self::begin_frame) once per frame before
/// updating listeners. Everything else is read-only for listeners.
#[derive(Debug)]
pub struct MockGraphics {
    frame_id: AtomicU64,
    timing: Mutex<FrameTiming>,
    size: Mutex<(u32, u32)>,
}

impl MockGraphics {
    /// Creates a surface reporting the given logical size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame_id: AtomicU64::new(0),
            timing: Mutex::new(FrameTiming {
                last_frame: None,
                delta: Duration::ZERO,
                elapsed: Duration::ZERO,
                second_start: None,
                frames_this_second: 0,
                fps: 0,
            }),
            size: Mutex::new((width, height)),
        }
    }

    /// Per-frame bookkeeping: increments the frame id and updates timing.
    pub fn begin_frame(&self) {
        self.begin_frame_at(Instant::now());
    }

    /// [`begin_frame`](Self::begin_frame) with an explicit timestamp.
    pub fn begin_frame_at(&self, now: Instant) {
        self.frame_id.fetch_add(1, Ordering::Relaxed);

        let mut guard = self.timing.lock();
        let timing = &mut *guard;
        let delta = timing
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        timing.delta = delta;
        timing.last_frame = Some(now);
        timing.elapsed += delta;

        let second_start = *timing.second_start.get_or_insert(now);
        if now.saturating_duration_since(second_start) >= ONE_SECOND {
            timing.fps = timing.frames_this_second;
            timing.frames_this_second = 0;
            timing.second_start = Some(now);
        }
        timing.frames_this_second += 1;
    }

    /// Frames begun so far. Zero before the first frame.
    #[inline]
    #[must_use]
    pub fn frame_id(&self) -> u64 {
        self.frame_id.load(Ordering::Relaxed)
    }

    /// Time between the last two frames. Zero on the first frame.
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.timing.lock().delta
    }

    /// [`delta`](Self::delta) in seconds.
    #[must_use]
    pub fn delta_time(&self) -> f32 {
        self.delta().as_secs_f32()
    }

    /// Sum of all deltas since the first frame.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.timing.lock().elapsed
    }

    /// Frames counted over the last complete second.
    #[must_use]
    pub fn frames_per_second(&self) -> u32 {
        self.timing.lock().fps
    }

    /// Logical width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.size.lock().0
    }

    /// Logical height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.size.lock().1
    }

    /// Changes the reported logical size.
    pub fn set_size(&self, width: u32, height: u32) {
        *self.size.lock() = (width, height);
    }
}

impl Default for MockGraphics {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_zero_delta() {
        let graphics = MockGraphics::default();
        assert_eq!(graphics.frame_id(), 0);

        graphics.begin_frame_at(Instant::now());
        assert_eq!(graphics.frame_id(), 1);
        assert_eq!(graphics.delta(), Duration::ZERO);
        assert_eq!(graphics.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_delta_and_elapsed() {
        let graphics = MockGraphics::default();
        let start = Instant::now();

        graphics.begin_frame_at(start);
        graphics.begin_frame_at(start + Duration::from_millis(16));
        graphics.begin_frame_at(start + Duration::from_millis(40));

        assert_eq!(graphics.frame_id(), 3);
        assert_eq!(graphics.delta(), Duration::from_millis(24));
        assert_eq!(graphics.elapsed(), Duration::from_millis(40));
        assert!((graphics.delta_time() - 0.024).abs() < 1e-6);
    }

    #[test]
    fn test_fps_counts_one_second_window() {
        let graphics = MockGraphics::default();
        let start = Instant::now();

        // 60 frames spread over the first second.
        for i in 0..60u64 {
            graphics.begin_frame_at(start + Duration::from_micros(i * 16_000));
        }
        assert_eq!(graphics.frames_per_second(), 0);

        graphics.begin_frame_at(start + ONE_SECOND);
        assert_eq!(graphics.frames_per_second(), 60);
    }

    #[test]
    fn test_size() {
        let graphics = MockGraphics::new(800, 600);
        assert_eq!((graphics.width(), graphics.height()), (800, 600));
        graphics.set_size(1024, 768);
        assert_eq!((graphics.width(), graphics.height()), (1024, 768));
    }
}
