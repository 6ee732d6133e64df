//! Fixed-interval damage-over-time timers.

use serde::{Deserialize, Serialize};

/// Slack absorbing float drift when a tick lands exactly on a frame boundary.
const TICK_EPSILON: f32 = 1e-4;

/// A timer that fires one tick per whole interval that fits in `duration`.
///
/// Ticks are counted rather than derived from elapsed time, so the total
/// number of ticks does not depend on how the duration is sliced into
/// frames: one 12 s step fires the same 12 ticks as 720 steps of 1/60 s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodicEffect {
    interval: f32,
    remaining: f32,
    total: f32,
    tick_timer: f32,
    ticks_left: u32,
}

impl PeriodicEffect {
    /// Starts an effect lasting `duration` seconds, ticking every `interval`.
    ///
    /// The first tick fires one interval after the start. A trailing
    /// partial interval fires nothing.
    #[must_use]
    pub fn start(duration: f32, interval: f32) -> Self {
        let interval = interval.max(f32::EPSILON);
        let duration = duration.max(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let ticks = (duration / interval + TICK_EPSILON).floor() as u32;
        Self {
            interval,
            remaining: duration,
            total: duration,
            tick_timer: interval,
            ticks_left: ticks,
        }
    }

    /// True while time or ticks remain.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0 || self.ticks_left > 0
    }

    /// Seconds left.
    #[must_use]
    pub const fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Full duration.
    #[must_use]
    pub const fn total(&self) -> f32 {
        self.total
    }

    /// Ticks still to fire.
    #[must_use]
    pub const fn ticks_left(&self) -> u32 {
        self.ticks_left
    }

    /// Advances by `dt` and returns how many ticks fired.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.is_active() || dt <= 0.0 {
            return 0;
        }

        self.remaining = (self.remaining - dt).max(0.0);
        self.tick_timer -= dt;

        let mut fired = 0;
        while self.tick_timer <= TICK_EPSILON && self.ticks_left > 0 {
            self.tick_timer += self.interval;
            self.ticks_left -= 1;
            fired += 1;
        }

        if self.remaining <= 0.0 {
            // Any tick still owed at expiry fires now.
            fired += self.ticks_left;
            self.ticks_left = 0;
            self.tick_timer = 0.0;
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_large_step_fires_every_tick() {
        let mut bleed = PeriodicEffect::start(12.0, 1.0);
        assert_eq!(bleed.advance(12.0), 12);
        assert!(!bleed.is_active());
        assert_eq!(bleed.advance(1.0), 0);
    }

    #[test]
    fn frame_sized_steps_fire_every_tick() {
        let mut bleed = PeriodicEffect::start(12.0, 1.0);
        let mut fired = 0;
        for _ in 0..(13 * 60) {
            fired += bleed.advance(1.0 / 60.0);
        }
        assert_eq!(fired, 12);
    }

    #[test]
    fn first_tick_after_one_interval() {
        let mut bleed = PeriodicEffect::start(4.0, 1.0);
        assert_eq!(bleed.advance(0.5), 0);
        assert_eq!(bleed.advance(0.5), 1);
        assert_eq!(bleed.ticks_left(), 3);
        assert!((bleed.remaining() - 3.0).abs() < 1e-5);
        assert!((bleed.total() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_trailing_interval_fires_nothing() {
        let mut bleed = PeriodicEffect::start(4.5, 1.0);
        assert_eq!(bleed.ticks_left(), 4);
        let mut fired = 0;
        for _ in 0..600 {
            fired += bleed.advance(0.01);
        }
        assert_eq!(fired, 4);
        assert!(!bleed.is_active());
    }

    #[test]
    fn partial_trailing_interval_in_one_step() {
        let mut bleed = PeriodicEffect::start(4.5, 1.0);
        assert_eq!(bleed.advance(10.0), 4);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut bleed = PeriodicEffect::start(4.0, 1.0);
        let before = bleed;
        assert_eq!(bleed.advance(0.0), 0);
        assert_eq!(bleed, before);
    }
}
