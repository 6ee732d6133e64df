//! Wall-clock to simulation-step conversion.

use serde::{Deserialize, Serialize};

/// Result of one [`FrameTimer::step`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameStep {
    /// Step to feed the simulation, clamped to the timer's maximum.
    pub delta: f32,
    /// Unclamped time since the previous step.
    pub raw_delta: f32,
    /// Smoothed frames per second.
    pub fps: f32,
}

/// Turns timestamps into clamped simulation steps.
///
/// The first step only records the start time and returns a zero delta,
/// which the world treats as a no-op.
///
/// ```
/// use shatter_core::frame::FrameTimer;
///
/// let mut timer = FrameTimer::new(1.0 / 30.0, 0.1);
/// assert_eq!(timer.step(10.0).delta, 0.0);
/// assert!((timer.step(10.016).delta - 0.016).abs() < 1e-6);
/// // A one-second hitch is clamped.
/// assert!((timer.step(11.016).delta - 1.0 / 30.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct FrameTimer {
    max_delta: f32,
    smoothing: f32,
    last: Option<f64>,
    fps: f32,
}

impl FrameTimer {
    /// FPS reported before any real frame has been measured.
    pub const INITIAL_FPS: f32 = 60.0;

    /// Creates a timer. `smoothing` is clamped to `0..=1`.
    #[must_use]
    pub fn new(max_delta: f32, smoothing: f32) -> Self {
        Self {
            max_delta,
            smoothing: smoothing.clamp(0.0, 1.0),
            last: None,
            fps: Self::INITIAL_FPS,
        }
    }

    /// Restarts timing from `now_seconds`.
    pub fn reset(&mut self, now_seconds: f64) {
        self.last = Some(now_seconds);
        self.fps = Self::INITIAL_FPS;
    }

    /// Advances to `now_seconds`.
    pub fn step(&mut self, now_seconds: f64) -> FrameStep {
        let Some(last) = self.last else {
            self.reset(now_seconds);
            return FrameStep {
                delta: 0.0,
                raw_delta: 0.0,
                fps: self.fps,
            };
        };

        #[allow(clippy::cast_possible_truncation)]
        let raw_delta = (now_seconds - last).max(0.0) as f32;
        self.last = Some(now_seconds);
        let delta = raw_delta.min(self.max_delta);

        if raw_delta > 0.0 {
            self.fps += (1.0 / raw_delta - self.fps) * self.smoothing;
        }

        FrameStep {
            delta,
            raw_delta,
            fps: self.fps,
        }
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(1.0 / 30.0, 0.1)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn first_step_is_zero() {
        let mut timer = FrameTimer::default();
        let step = timer.step(123.0);
        assert_eq!(step.delta, 0.0);
        assert_eq!(step.raw_delta, 0.0);
        assert_eq!(step.fps, FrameTimer::INITIAL_FPS);
    }

    #[test]
    fn backwards_time_is_zero() {
        let mut timer = FrameTimer::default();
        timer.step(5.0);
        let step = timer.step(4.0);
        assert_eq!(step.delta, 0.0);
        assert_eq!(step.fps, FrameTimer::INITIAL_FPS);
    }

    #[test]
    fn fps_is_smoothed() {
        let mut timer = FrameTimer::new(1.0, 0.5);
        timer.step(0.0);
        let step = timer.step(0.05);
        // 60 + (20 - 60) * 0.5
        assert!((step.fps - 40.0).abs() < 1e-3);
    }

    #[test]
    fn smoothing_is_clamped() {
        let mut timer = FrameTimer::new(1.0, 3.0);
        timer.step(0.0);
        let step = timer.step(0.1);
        assert!((step.fps - 10.0).abs() < 1e-3);
    }
}
