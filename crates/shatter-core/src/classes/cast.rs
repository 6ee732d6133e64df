//! Interruptible cast bars.
//!
//! A [`CastBar`] holds at most one [`ActiveCast`]. Moving cancels the cast;
//! standing still long enough completes it. The bar only reports what
//! happened: spending the snapshotted cost, running the effect and starting
//! the cooldown are up to the owning class.

use super::context::ClassContext;

/// A cast in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveCast<E> {
    /// Slot that started the cast.
    pub slot: usize,
    /// Channel length in seconds.
    pub cast_time: f32,
    /// Seconds channelled so far.
    pub elapsed: f32,
    /// Resource cost snapshotted at cast start.
    pub cost: f32,
    /// What to do on completion.
    pub effect: E,
}

impl<E> ActiveCast<E> {
    /// A fresh cast with nothing channelled yet.
    #[must_use]
    pub const fn new(slot: usize, cast_time: f32, cost: f32, effect: E) -> Self {
        Self {
            slot,
            cast_time,
            elapsed: 0.0,
            cost,
            effect,
        }
    }

    fn progress(&self) -> f32 {
        if self.cast_time <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.cast_time).min(1.0)
        }
    }
}

/// Outcome of advancing a cast bar by one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum CastProgress<E> {
    /// No cast was active.
    Idle,
    /// Still channelling; carries the reported progress.
    Channeling(f32),
    /// The player moved; nothing is spent and no effect fires.
    Cancelled(ActiveCast<E>),
    /// The channel finished; the caller applies the effect.
    Completed(ActiveCast<E>),
}

/// Single-slot cast state.
#[derive(Debug, Clone, PartialEq)]
pub struct CastBar<E> {
    active: Option<ActiveCast<E>>,
}

impl<E> Default for CastBar<E> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<E> CastBar<E> {
    /// An idle cast bar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a cast is active.
    #[must_use]
    pub fn is_casting(&self) -> bool {
        self.active.is_some()
    }

    /// The active cast, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveCast<E>> {
        self.active.as_ref()
    }

    /// Starts `cast`. Returns false, leaving the current cast untouched, if
    /// one is already active.
    pub fn begin(&mut self, cast: ActiveCast<E>, ctx: &mut dyn ClassContext) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(cast);
        ctx.set_cast_progress(Some(0.0));
        true
    }

    /// Advances the active cast by `dt`.
    pub fn advance(&mut self, dt: f32, ctx: &mut dyn ClassContext) -> CastProgress<E> {
        let Some(cast) = self.active.as_mut() else {
            return CastProgress::Idle;
        };

        if ctx.is_player_moving() {
            ctx.set_cast_progress(None);
            return self.active.take().map_or(CastProgress::Idle, CastProgress::Cancelled);
        }

        cast.elapsed += dt;
        let progress = cast.progress();
        ctx.set_cast_progress(Some(progress));
        if cast.elapsed < cast.cast_time {
            return CastProgress::Channeling(progress);
        }

        ctx.set_cast_progress(None);
        self.active.take().map_or(CastProgress::Idle, CastProgress::Completed)
    }

    /// Drops the active cast without spending anything.
    pub fn cancel(&mut self, ctx: &mut dyn ClassContext) -> Option<ActiveCast<E>> {
        let cancelled = self.active.take();
        if cancelled.is_some() {
            ctx.set_cast_progress(None);
        }
        cancelled
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::helpers::RecordingContext;

    #[test]
    fn begin_rejects_second_cast() {
        let mut ctx = RecordingContext::new();
        let mut bar = CastBar::new();
        assert!(bar.begin(ActiveCast::new(0, 2.0, 5.0, "first"), &mut ctx));
        bar.advance(0.5, &mut ctx);

        assert!(!bar.begin(ActiveCast::new(1, 1.0, 0.0, "second"), &mut ctx));

        let active = bar.active().unwrap();
        assert_eq!(active.effect, "first");
        assert!((active.elapsed - 0.5).abs() < 1e-6);
        assert_eq!(ctx.cast_progress_log[0], Some(0.0));
    }

    #[test]
    fn channel_reports_progress_then_completes() {
        let mut ctx = RecordingContext::new();
        let mut bar = CastBar::new();
        bar.begin(ActiveCast::new(3, 2.0, 0.0, ()), &mut ctx);

        assert_eq!(bar.advance(1.0, &mut ctx), CastProgress::Channeling(0.5));
        match bar.advance(1.5, &mut ctx) {
            CastProgress::Completed(cast) => assert_eq!(cast.slot, 3),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(!bar.is_casting());
        assert_eq!(ctx.cast_progress_log, vec![Some(0.0), Some(0.5), Some(1.0), None]);
        assert_eq!(bar.advance(1.0, &mut ctx), CastProgress::Idle);
    }

    #[test]
    fn moving_cancels() {
        let mut ctx = RecordingContext::new();
        let mut bar = CastBar::new();
        bar.begin(ActiveCast::new(0, 2.0, 15.0, ()), &mut ctx);
        ctx.moving = true;

        match bar.advance(0.1, &mut ctx) {
            CastProgress::Cancelled(cast) => assert_eq!(cast.cost, 15.0),
            other => panic!("expected cancel, got {other:?}"),
        }
        assert!(!bar.is_casting());
        assert_eq!(ctx.cast_progress_log.last(), Some(&None));
    }

    #[test]
    fn cancel_is_quiet_when_idle() {
        let mut ctx = RecordingContext::new();
        let mut bar: CastBar<()> = CastBar::new();
        assert!(bar.cancel(&mut ctx).is_none());
        assert!(ctx.cast_progress_log.is_empty());
    }
}
