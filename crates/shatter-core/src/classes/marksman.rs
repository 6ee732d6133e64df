//! Marksman: instant shots feeding a focus gauge.
//!
//! Every shot builds focus. The shot whose gain would fill the gauge is
//! empowered instead: the gauge empties, the projectile is larger and the
//! damage is doubled.

use tracing::trace;

use super::ability::{AbilityBar, AbilityDefinition, AbilityStatus, GaugeState};
use super::context::{aim_direction, ClassContext, ProjectileSpawn};
use super::PlayerClass;
use crate::damage::{AbilityId, DamageInstance, DamageParams, DamageTags};

const QUICK_SHOT_ID: AbilityId = AbilityId::from_static("marksman-quick-shot");
const PIERCING_ARROW_ID: AbilityId = AbilityId::from_static("marksman-piercing-arrow");

/// Maximum focus.
pub const FOCUS_MAX: f32 = 100.0;
/// Focus gained per shot.
pub const FOCUS_PER_SHOT: f32 = 10.0;

const MUZZLE_OFFSET: f32 = 0.6;
const EMPOWERED_SCALE: f32 = 1.8;
const EMPOWERED_MULTIPLIER: f32 = 2.0;
const QUICK_SHOT_DAMAGE: f32 = 8.0;
const PIERCING_ARROW_DAMAGE: f32 = 14.0;

/// Per-shot tuning.
struct Shot {
    id: AbilityId,
    speed: f32,
    color: u32,
}

const QUICK_SHOT: Shot = Shot {
    id: QUICK_SHOT_ID,
    speed: 14.0,
    color: 0x38_bd_f8,
};

const PIERCING_ARROW: Shot = Shot {
    id: PIERCING_ARROW_ID,
    speed: 20.0,
    color: 0xa3_e6_35,
};

/// The Marksman class.
#[derive(Debug, Clone)]
pub struct Marksman {
    abilities: AbilityBar,
    focus: f32,
}

impl Marksman {
    /// A Marksman with empty focus and all abilities ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            abilities: AbilityBar::new([
                AbilityDefinition::new(QUICK_SHOT_ID, 1, 0.35).with_damage(QUICK_SHOT_DAMAGE),
                AbilityDefinition::new(PIERCING_ARROW_ID, 2, 4.0)
                    .with_damage(PIERCING_ARROW_DAMAGE),
                AbilityDefinition::placeholder("marksman-placeholder-3", 3),
                AbilityDefinition::placeholder("marksman-placeholder-4", 4),
            ]),
            focus: 0.0,
        }
    }

    /// Current focus.
    #[must_use]
    pub const fn focus(&self) -> f32 {
        self.focus
    }

    fn fire(&mut self, shot: &Shot, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        let Some(direction) = aim_direction(ctx) else {
            trace!(slot, "marksman: no aim");
            return false;
        };

        let empowered = self.focus + FOCUS_PER_SHOT >= FOCUS_MAX;
        self.focus = if empowered {
            0.0
        } else {
            self.focus + FOCUS_PER_SHOT
        };

        let base = ctx.create_damage_instance(
            DamageParams::new(shot.id.clone(), self.abilities.base_damage(slot))
                .with_tags(DamageTags::PROJECTILE | DamageTags::PHYSICAL),
        );
        let (damage, scale) = if empowered {
            (
                DamageInstance::scaled_with_tags(base, EMPOWERED_MULTIPLIER, DamageTags::EMPOWERED),
                EMPOWERED_SCALE,
            )
        } else {
            (base, 1.0)
        };

        let origin = ctx.player_position() + direction * MUZZLE_OFFSET;
        ctx.spawn_projectile(
            origin,
            direction * shot.speed,
            ProjectileSpawn::with_damage(damage).scale(scale).color(shot.color),
        );
        self.abilities.start_cooldown(slot);
        true
    }
}

impl Default for Marksman {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerClass for Marksman {
    fn update(&mut self, dt: f32, _ctx: &mut dyn ClassContext) {
        if dt <= 0.0 {
            return;
        }
        self.abilities.tick(dt);
    }

    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        if !self.abilities.is_ready(slot) {
            trace!(slot, "marksman: not ready");
            return false;
        }
        match slot {
            0 => self.fire(&QUICK_SHOT, slot, ctx),
            1 => self.fire(&PIERCING_ARROW, slot, ctx),
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
        Some(GaugeState::Bar {
            current: self.focus,
            max: FOCUS_MAX,
        })
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::tests::helpers::RecordingContext;
    use glam::Vec3;

    #[test]
    fn tenth_shot_is_empowered() {
        let mut ctx = RecordingContext::new();
        let mut marksman = Marksman::new();

        for shot in 1..=10 {
            assert!(marksman.try_use_ability(0, &mut ctx), "shot {shot}");
            marksman.update(1.0, &mut ctx);
            if shot < 10 {
                assert!((marksman.focus() - 10.0 * shot as f32).abs() < 1e-4);
            }
        }

        assert_eq!(marksman.focus(), 0.0);
        assert_eq!(ctx.projectiles.len(), 10);
        let last = &ctx.projectiles[9];
        assert!((last.scale - EMPOWERED_SCALE).abs() < 1e-6);
        let result = last.damage.as_ref().unwrap().resolve();
        assert_eq!(result.amount, 16.0);
        assert!(result.tags.contains(DamageTags::EMPOWERED));
        assert!(!ctx.projectiles[8]
            .damage
            .as_ref()
            .unwrap()
            .resolve()
            .tags
            .contains(DamageTags::EMPOWERED));
    }

    #[test]
    fn projectile_leaves_from_muzzle_toward_target() {
        let mut ctx = RecordingContext::new();
        ctx.player = Vec3::new(-5.0, 0.0, 0.0);
        let mut marksman = Marksman::new();

        assert!(marksman.try_use_ability(1, &mut ctx));

        let shot = &ctx.projectiles[0];
        assert!((shot.origin - Vec3::new(-4.4, 0.0, 0.0)).length() < 1e-5);
        assert!((shot.velocity - Vec3::new(20.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn cooldown_blocks_and_recovers() {
        let mut ctx = RecordingContext::new();
        let mut marksman = Marksman::new();
        assert!(marksman.try_use_ability(0, &mut ctx));
        assert!(!marksman.try_use_ability(0, &mut ctx));
        assert_eq!(marksman.focus(), FOCUS_PER_SHOT);

        marksman.update(0.35, &mut ctx);
        assert!(marksman.try_use_ability(0, &mut ctx));
    }

    #[test]
    fn degenerate_aim_rejects_without_side_effects() {
        let mut ctx = RecordingContext::new();
        ctx.player = ctx.target;
        let mut marksman = Marksman::new();

        assert!(!marksman.try_use_ability(0, &mut ctx));
        assert_eq!(marksman.focus(), 0.0);
        assert!(marksman.abilities.is_ready(0));
        assert!(ctx.projectiles.is_empty());
    }

    #[test]
    fn placeholders_only_cool_down() {
        let mut ctx = RecordingContext::new();
        let mut marksman = Marksman::new();
        assert!(marksman.try_use_ability(3, &mut ctx));
        assert!(!marksman.try_use_ability(3, &mut ctx));
        assert!(!marksman.try_use_ability(4, &mut ctx));
        assert!(ctx.projectiles.is_empty());
        assert_eq!(marksman.ability_statuses()[3].remaining_cooldown, 5.0);
    }
}
