//! Black Mage: a slow cast that Flow State charges make instant.

use tracing::trace;

use super::ability::{AbilityBar, AbilityDefinition, AbilityStatus, GaugeState};
use super::cast::{ActiveCast, CastBar, CastProgress};
use super::context::{aim_direction, ClassContext, ProjectileSpawn};
use super::PlayerClass;
use crate::damage::{AbilityId, DamageParams, DamageTags};

const DARK_BOLT_ID: AbilityId = AbilityId::from_static("black-mage-dark-bolt");
const FLOW_STATE_ID: AbilityId = AbilityId::from_static("black-mage-flow-state");

const DARK_BOLT_SLOT: usize = 0;
const FLOW_STATE_SLOT: usize = 1;

const DARK_BOLT_CAST_TIME: f32 = 2.0;
const DARK_BOLT_COOLDOWN: f32 = 2.0;
const DARK_BOLT_DAMAGE: f32 = 18.0;
const DARK_BOLT_SPEED: f32 = 12.0;
const DARK_BOLT_COLOR: u32 = 0x11_18_27;
const FLOW_STATE_COOLDOWN: f32 = 10.0;

/// Charges granted by Flow State.
pub const MAX_FLOW_CHARGES: u32 = 3;

/// The Black Mage class.
#[derive(Debug, Clone)]
pub struct BlackMage {
    abilities: AbilityBar,
    cast: CastBar<()>,
    charges: u32,
}

impl BlackMage {
    /// A Black Mage with no charges and all abilities ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            abilities: AbilityBar::new([
                AbilityDefinition::new(DARK_BOLT_ID, 1, DARK_BOLT_COOLDOWN)
                    .with_damage(DARK_BOLT_DAMAGE),
                AbilityDefinition::new(FLOW_STATE_ID, 2, FLOW_STATE_COOLDOWN),
                AbilityDefinition::placeholder("black-mage-placeholder-3", 3),
                AbilityDefinition::placeholder("black-mage-placeholder-4", 4),
            ]),
            cast: CastBar::new(),
            charges: 0,
        }
    }

    /// Instant-cast charges left.
    #[must_use]
    pub const fn charges(&self) -> u32 {
        self.charges
    }

    /// True while Dark Bolt is channelling.
    #[must_use]
    pub fn is_casting(&self) -> bool {
        self.cast.is_casting()
    }

    fn try_dark_bolt(&mut self, ctx: &mut dyn ClassContext) -> bool {
        if self.cast.is_casting() {
            trace!("black mage: already casting");
            return false;
        }
        if aim_direction(ctx).is_none() {
            trace!("black mage: no aim");
            return false;
        }

        if self.charges > 0 {
            self.charges -= 1;
            Self::fire_dark_bolt(self.abilities.base_damage(DARK_BOLT_SLOT), ctx);
            self.abilities.start_cooldown(DARK_BOLT_SLOT);
            return true;
        }
        self.cast.begin(
            ActiveCast::new(DARK_BOLT_SLOT, DARK_BOLT_CAST_TIME, 0.0, ()),
            ctx,
        )
    }

    fn fire_dark_bolt(base_damage: f32, ctx: &mut dyn ClassContext) {
        // Aim is re-read on completion: the target may have moved.
        let Some(direction) = aim_direction(ctx) else {
            trace!("black mage: dark bolt lost its aim");
            return;
        };
        let damage = ctx.create_damage_instance(
            DamageParams::new(DARK_BOLT_ID, base_damage)
                .with_tags(DamageTags::MAGIC | DamageTags::PROJECTILE),
        );
        let origin = ctx.player_position() + direction * 0.6;
        ctx.spawn_projectile(
            origin,
            direction * DARK_BOLT_SPEED,
            ProjectileSpawn::with_damage(damage).color(DARK_BOLT_COLOR),
        );
    }
}

impl Default for BlackMage {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerClass for BlackMage {
    fn update(&mut self, dt: f32, ctx: &mut dyn ClassContext) {
        if dt <= 0.0 {
            return;
        }
        self.abilities.tick(dt);
        match self.cast.advance(dt, ctx) {
            CastProgress::Completed(cast) => {
                Self::fire_dark_bolt(self.abilities.base_damage(DARK_BOLT_SLOT), ctx);
                self.abilities.start_cooldown(cast.slot);
            }
            CastProgress::Cancelled(_) => trace!("black mage: cast interrupted"),
            CastProgress::Idle | CastProgress::Channeling(_) => {}
        }
    }

    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        if !self.abilities.is_ready(slot) {
            trace!(slot, "black mage: not ready");
            return false;
        }
        match slot {
            DARK_BOLT_SLOT => self.try_dark_bolt(ctx),
            FLOW_STATE_SLOT => {
                self.charges = MAX_FLOW_CHARGES;
                self.abilities.start_cooldown(slot);
                true
            }
            _ => {
                self.abilities.start_cooldown(slot);
                true
            }
        }
    }

    fn ability_statuses(&self) -> Vec<AbilityStatus> {
        self.abilities.statuses(|_| false)
    }

    fn gauge_state(&self) -> Option<GaugeState> {
        Some(GaugeState::Charges {
            current: self.charges,
            max: MAX_FLOW_CHARGES,
            secondary: None,
        })
    }

    fn cancel_cast(&mut self, ctx: &mut dyn ClassContext) {
        self.cast.cancel(ctx);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::helpers::RecordingContext;

    #[test]
    fn dark_bolt_casts_then_fires_and_cools_down() {
        let mut ctx = RecordingContext::new();
        let mut mage = BlackMage::new();

        assert!(mage.try_use_ability(0, &mut ctx));
        assert!(mage.is_casting());
        assert!(ctx.projectiles.is_empty());
        assert!(!mage.try_use_ability(0, &mut ctx));

        mage.update(1.0, &mut ctx);
        assert!(ctx.projectiles.is_empty());
        mage.update(1.0, &mut ctx);

        assert!(!mage.is_casting());
        assert_eq!(ctx.projectiles.len(), 1);
        let damage = ctx.projectiles[0].damage.as_ref().unwrap().resolve();
        assert_eq!(damage.amount, DARK_BOLT_DAMAGE);
        assert!(damage.tags.contains(DamageTags::MAGIC | DamageTags::PROJECTILE));
        assert_eq!(
            mage.ability_statuses()[0].remaining_cooldown,
            DARK_BOLT_COOLDOWN
        );
        assert_eq!(ctx.cast_progress_log.last(), Some(&None));
    }

    #[test]
    fn moving_cancels_dark_bolt() {
        let mut ctx = RecordingContext::new();
        let mut mage = BlackMage::new();
        mage.try_use_ability(0, &mut ctx);
        mage.update(1.5, &mut ctx);

        ctx.moving = true;
        mage.update(0.1, &mut ctx);

        assert!(!mage.is_casting());
        assert!(ctx.projectiles.is_empty());
        assert!(mage.abilities.is_ready(0));
    }

    #[test]
    fn flow_state_charges_make_bolts_instant() {
        let mut ctx = RecordingContext::new();
        let mut mage = BlackMage::new();

        assert!(mage.try_use_ability(1, &mut ctx));
        assert_eq!(mage.charges(), MAX_FLOW_CHARGES);
        assert!(!mage.try_use_ability(1, &mut ctx));

        for expected in (0..MAX_FLOW_CHARGES).rev() {
            assert!(mage.try_use_ability(0, &mut ctx));
            assert!(!mage.is_casting());
            assert_eq!(mage.charges(), expected);
            mage.update(DARK_BOLT_COOLDOWN, &mut ctx);
        }
        assert_eq!(ctx.projectiles.len(), 3);

        assert!(mage.try_use_ability(0, &mut ctx));
        assert!(mage.is_casting());
    }

    #[test]
    fn gauge_reports_charges() {
        let mut ctx = RecordingContext::new();
        let mut mage = BlackMage::new();
        mage.try_use_ability(1, &mut ctx);
        assert_eq!(
            mage.gauge_state(),
            Some(GaugeState::Charges {
                current: 3,
                max: 3,
                secondary: None
            })
        );
    }

    #[test]
    fn zero_dt_update_is_a_no_op() {
        let mut ctx = RecordingContext::new();
        let mut mage = BlackMage::new();
        mage.try_use_ability(0, &mut ctx);
        ctx.moving = true;
        mage.update(0.0, &mut ctx);
        assert!(mage.is_casting());
        assert_eq!(ctx.cast_progress_log, vec![Some(0.0)]);
    }
}
