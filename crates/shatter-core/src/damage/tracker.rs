//! Rolling damage meter for the training dummy.
//!
//! The window opens on the first recorded hit, runs for
//! [`TRACK_DURATION_SECONDS`] of simulated time and then locks. A locked
//! tracker ignores further hits until [`DamageTracker::reset`].

use serde::{Deserialize, Serialize};

/// Length of the measurement window, in seconds.
pub const TRACK_DURATION_SECONDS: f32 = 60.0;

/// Snapshot of the meter for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageTrackerState {
    /// Damage recorded inside the window.
    pub total_damage: f32,
    /// Seconds elapsed in the window (the full window once locked).
    pub elapsed: f32,
    /// Window length.
    pub duration: f32,
    /// True once the first hit opened the window.
    pub active: bool,
    /// True once the window has run out.
    pub locked: bool,
    /// Damage per second over the elapsed part of the window.
    pub dps: f32,
}

/// Damage-per-second meter.
#[derive(Debug, Clone, Default)]
pub struct DamageTracker {
    total_damage: f32,
    elapsed: f32,
    active: bool,
    locked: bool,
}

impl DamageTracker {
    /// Creates an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the window while it is open.
    pub fn update(&mut self, dt: f32) {
        if !self.active || self.locked {
            return;
        }
        self.elapsed = (self.elapsed + dt).min(TRACK_DURATION_SECONDS);
        if self.elapsed >= TRACK_DURATION_SECONDS {
            self.locked = true;
        }
    }

    /// Adds a hit. The first hit opens the window.
    pub fn record(&mut self, amount: f32) {
        if self.locked {
            return;
        }
        if !self.active {
            self.active = true;
            self.elapsed = 0.0;
        }
        self.total_damage += amount;
    }

    /// Clears the meter back to idle.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current meter readings.
    #[must_use]
    pub fn state(&self) -> DamageTrackerState {
        let elapsed = if self.locked {
            TRACK_DURATION_SECONDS
        } else {
            self.elapsed
        };
        let dps = if elapsed > 0.0 {
            self.total_damage / elapsed
        } else {
            0.0
        };
        DamageTrackerState {
            total_damage: self.total_damage,
            elapsed,
            duration: TRACK_DURATION_SECONDS,
            active: self.active,
            locked: self.locked,
            dps,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_first_hit() {
        let mut tracker = DamageTracker::new();
        tracker.update(5.0);
        let state = tracker.state();
        assert!(!state.active);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.dps, 0.0);
    }

    #[test]
    fn dps_over_elapsed_window() {
        let mut tracker = DamageTracker::new();
        tracker.record(30.0);
        assert_eq!(tracker.state().dps, 0.0);

        tracker.update(2.0);
        tracker.record(10.0);
        let state = tracker.state();
        assert!(state.active);
        assert_eq!(state.total_damage, 40.0);
        assert!((state.dps - 20.0).abs() < 1e-5);
    }

    #[test]
    fn locks_after_window_and_ignores_hits() {
        let mut tracker = DamageTracker::new();
        tracker.record(120.0);
        for _ in 0..70 {
            tracker.update(1.0);
        }
        tracker.record(1_000.0);

        let state = tracker.state();
        assert!(state.locked);
        assert_eq!(state.elapsed, TRACK_DURATION_SECONDS);
        assert_eq!(state.total_damage, 120.0);
        assert!((state.dps - 2.0).abs() < 1e-5);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut tracker = DamageTracker::new();
        tracker.record(5.0);
        tracker.update(61.0);
        tracker.reset();
        let state = tracker.state();
        assert!(!state.active && !state.locked);
        assert_eq!(state.total_damage, 0.0);
        tracker.record(5.0);
        assert_eq!(tracker.state().total_damage, 5.0);
    }
}
