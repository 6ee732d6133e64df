//! Scripted play: which keys to hold given the current HUD.

use glam::Vec3;
use shatter_core::classes::{ClassId, GaugeState};
use shatter_core::game::{HudState, InputState};

/// Distance the Lancer closes to before swinging.
const MELEE_APPROACH: f32 = 2.0;
/// Per-axis dead zone for walking toward the target.
const STEER_DEAD_ZONE: f32 = 0.3;
/// Mana under which the Arcanist channels Evocation.
const LOW_MANA: f32 = 20.0;

/// Picks the input for one frame.
pub fn choose(hud: &HudState, player: Vec3, target: Vec3) -> InputState {
    if hud.class == ClassId::Lancer {
        let offset = target - player;
        if offset.x.hypot(offset.z) > MELEE_APPROACH {
            return InputState {
                right: offset.x > STEER_DEAD_ZONE,
                left: offset.x < -STEER_DEAD_ZONE,
                down: offset.z > STEER_DEAD_ZONE,
                up: offset.z < -STEER_DEAD_ZONE,
                ..InputState::default()
            };
        }
    }

    // Pressing during a cast would be rejected anyway.
    if hud.cast_progress.is_some() {
        return InputState::default();
    }
    InputState::default().with_ability(pick_slot(hud))
}

fn pick_slot(hud: &HudState) -> usize {
    let ready = |slot: usize| {
        hud.abilities
            .get(slot)
            .is_some_and(|status| status.remaining_cooldown <= 0.0)
    };
    let highlighted = |slot: usize| hud.abilities.get(slot).is_some_and(|status| status.highlighted);

    match (hud.class, hud.gauge) {
        (
            ClassId::Arcanist,
            Some(GaugeState::ManaHunger {
                mana_current,
                hunger_current,
                hunger_max,
                ..
            }),
        ) => {
            if mana_current < LOW_MANA && ready(3) {
                3
            } else if highlighted(2) {
                2
            } else if hunger_current >= hunger_max {
                1
            } else {
                0
            }
        }
        (
            ClassId::Lancer,
            Some(GaugeState::Charges {
                current,
                max,
                secondary,
            }),
        ) if current >= max => {
            if secondary.is_none() && ready(1) {
                1
            } else if ready(2) {
                2
            } else {
                0
            }
        }
        (ClassId::Marksman | ClassId::BlackMage, _) if ready(1) => 1,
        _ => 0,
    }
}
