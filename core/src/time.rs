//! Frame timing.
//!
//! [`GameTimer`] measures wall-clock time between ticks and excludes time
//! spent stopped (paused). [`FrameTime`] is the per-frame snapshot handed
//! to update code.

use std::time::{Duration, Instant};

/// Time values for one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub delta: f32,
    /// Seconds since the timer was reset, excluding paused time.
    pub total: f32,
}

impl FrameTime {
    /// Create a frame time snapshot.
    pub fn new(delta: f32, total: f32) -> Self {
        Self { delta, total }
    }

    /// Snapshot for a fixed-rate loop: frame `frame` at `delta` seconds per frame.
    pub fn fixed(delta: f32, frame: u64) -> Self {
        Self {
            delta,
            total: delta * frame as f32,
        }
    }
}

/// Wall-clock game timer with pause support.
///
/// # Example
///
/// ```
/// use ripple_core::time::GameTimer;
///
/// let mut timer = GameTimer::new();
/// timer.tick();
/// assert!(timer.delta_time() >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GameTimer {
    base: Instant,
    previous: Instant,
    stop_time: Option<Instant>,
    paused: Duration,
    delta: Duration,
}

impl GameTimer {
    /// Create a running timer starting now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            base: now,
            previous: now,
            stop_time: None,
            paused: Duration::ZERO,
            delta: Duration::ZERO,
        }
    }

    /// Restart the timer from now. Clears paused time and the last delta.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Resume a stopped timer. The stopped interval is excluded from
    /// [`total_time`](Self::total_time).
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Pause the timer.
    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    /// Whether the timer is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stop_time.is_some()
    }

    /// Advance to a new frame, measuring the delta since the previous tick.
    ///
    /// While stopped, the delta is zero.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Seconds between the last two ticks.
    pub fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Seconds since reset, excluding paused time.
    pub fn total_time(&self) -> f32 {
        let end = self.stop_time.unwrap_or(self.previous);
        end.saturating_duration_since(self.base)
            .saturating_sub(self.paused)
            .as_secs_f32()
    }

    /// Snapshot of the current frame's time values.
    pub fn frame_time(&self) -> FrameTime {
        FrameTime::new(self.delta_time(), self.total_time())
    }

    fn start_at(&mut self, now: Instant) {
        if let Some(stopped) = self.stop_time.take() {
            self.paused += now.saturating_duration_since(stopped);
            self.previous = now;
        }
    }

    fn stop_at(&mut self, now: Instant) {
        if self.stop_time.is_none() {
            self.stop_time = Some(now);
        }
    }

    fn tick_at(&mut self, now: Instant) {
        if self.is_stopped() {
            self.delta = Duration::ZERO;
            return;
        }
        self.delta = now.saturating_duration_since(self.previous);
        self.previous = now;
    }
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new()
    }
}
