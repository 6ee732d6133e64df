//! Lancer: melee builders and combo-point finishers.
//!
//! Slice builds combo points. Rupture spends them on a bleed whose length
//! grows with the points consumed; Pierce spends them on a heavier
//! projectile.

use std::f32::consts::PI;

use tracing::trace;

use super::ability::{AbilityBar, AbilityDefinition, AbilityStatus, GaugeBar, GaugeState};
use super::context::{
    aim_direction, planar_offset, ClassContext, MeleeAttack, MeleeStyle, ProjectileSpawn,
};
use super::periodic::PeriodicEffect;
use super::PlayerClass;
use crate::damage::{AbilityId, DamageParams, DamageTags};

/// Maximum combo points.
pub const MAX_COMBO_POINTS: u32 = 4;

const SLICE_ID: AbilityId = AbilityId::from_static("lancer-slice");
const SLICE_SLOT: usize = 0;
const SLICE_COOLDOWN: f32 = 1.0;
const SLICE_DAMAGE: f32 = 10.0;
const SLICE_RANGE: f32 = 2.5;

const RUPTURE_ID: AbilityId = AbilityId::from_static("lancer-rupture");
const RUPTURE_SLOT: usize = 1;
const RUPTURE_COOLDOWN: f32 = 8.0;
const RUPTURE_RANGE: f32 = 2.5;
const BLEED_ID: AbilityId = AbilityId::from_static("lancer-rupture-bleed");
const BLEED_BASE_DURATION: f32 = 4.0;
const BLEED_DURATION_PER_POINT: f32 = 4.0;
const BLEED_TICK_DAMAGE: f32 = 10.0;
const BLEED_INTERVAL: f32 = 1.0;

const PIERCE_ID: AbilityId = AbilityId::from_static("lancer-pierce");
const PIERCE_SLOT: usize = 2;
const PIERCE_COOLDOWN: f32 = 6.0;
const PIERCE_BASE_DAMAGE: f32 = 20.0;
const PIERCE_DAMAGE_PER_POINT: f32 = 10.0;
const PIERCE_SPEED: f32 = 18.0;
const PIERCE_SCALE: f32 = 0.9;

/// The Lancer class.
#[derive(Debug, Clone)]
pub struct Lancer {
    abilities: AbilityBar,
    combo_points: u32,
    bleed: Option<PeriodicEffect>,
}

impl Lancer {
    /// A Lancer with no combo points and all abilities ready.
    #[must_use]
    pub fn new() -> Self {
        Self {
            abilities: AbilityBar::new([
                AbilityDefinition::new(SLICE_ID, 1, SLICE_COOLDOWN).with_damage(SLICE_DAMAGE),
                AbilityDefinition::new(RUPTURE_ID, 2, RUPTURE_COOLDOWN)
                    .with_damage(BLEED_TICK_DAMAGE),
                AbilityDefinition::new(PIERCE_ID, 3, PIERCE_COOLDOWN)
                    .with_damage(PIERCE_BASE_DAMAGE),
                AbilityDefinition::placeholder("lancer-placeholder-4", 4),
            ]),
            combo_points: 0,
            bleed: None,
        }
    }

    /// Current combo points.
    #[must_use]
    pub const fn combo_points(&self) -> u32 {
        self.combo_points
    }

    /// The running bleed, if any.
    #[must_use]
    pub const fn bleed(&self) -> Option<&PeriodicEffect> {
        self.bleed.as_ref()
    }

    fn take_combo_points(&mut self) -> u32 {
        std::mem::take(&mut self.combo_points)
    }

    #[allow(clippy::cast_precision_loss)]
    fn points_f32(points: u32) -> f32 {
        points as f32
    }

    fn slice(&mut self, ctx: &mut dyn ClassContext) -> bool {
        let Some(direction) = aim_direction(ctx) else {
            trace!("lancer: no aim");
            return false;
        };
        ctx.play_melee_attack(MeleeAttack {
            direction,
            arc: Some(PI),
            duration: 0.25,
            length: 2.4,
            width: 0.16,
            color: 0xfa_cc_15,
            style: MeleeStyle::Swing,
        });

        // Out of range still whiffs: the swing plays and the cooldown runs.
        if planar_offset(ctx).length_squared() <= SLICE_RANGE * SLICE_RANGE {
            let damage = ctx.create_damage_instance(
                DamageParams::new(SLICE_ID, self.abilities.base_damage(SLICE_SLOT))
                    .with_tags(DamageTags::MELEE | DamageTags::PHYSICAL),
            );
            ctx.deal_damage(&damage);
            self.combo_points = (self.combo_points + 1).min(MAX_COMBO_POINTS);
        }
        self.abilities.start_cooldown(SLICE_SLOT);
        true
    }

    fn rupture(&mut self, ctx: &mut dyn ClassContext) -> bool {
        let Some(direction) = aim_direction(ctx) else {
            trace!("lancer: no aim");
            return false;
        };
        if planar_offset(ctx).length_squared() > RUPTURE_RANGE * RUPTURE_RANGE {
            trace!("lancer: rupture out of range");
            return false;
        }
        ctx.play_melee_attack(MeleeAttack {
            direction,
            arc: None,
            duration: 0.35,
            length: 2.6,
            width: 0.14,
            color: 0x38_bd_f8,
            style: MeleeStyle::Thrust,
        });

        let points = self.take_combo_points();
        let duration = BLEED_BASE_DURATION + BLEED_DURATION_PER_POINT * Self::points_f32(points);
        self.bleed = Some(PeriodicEffect::start(duration, BLEED_INTERVAL));
        self.abilities.start_cooldown(RUPTURE_SLOT);
        true
    }

    fn pierce(&mut self, ctx: &mut dyn ClassContext) -> bool {
        let Some(direction) = aim_direction(ctx) else {
            trace!("lancer: no aim");
            return false;
        };
        let points = self.take_combo_points();
        let damage = ctx.create_damage_instance(
            DamageParams::new(
                PIERCE_ID,
                self.abilities.base_damage(PIERCE_SLOT)
                    + PIERCE_DAMAGE_PER_POINT * Self::points_f32(points),
            )
            .with_tags(DamageTags::PROJECTILE | DamageTags::PHYSICAL),
        );
        let origin = ctx.player_position() + direction * 0.6;
        ctx.spawn_projectile(
            origin,
            direction * PIERCE_SPEED,
            ProjectileSpawn::with_damage(damage)
                .scale(PIERCE_SCALE)
                .color(0xf5_9e_0b),
        );
        self.abilities.start_cooldown(PIERCE_SLOT);
        true
    }

    fn update_bleed(&mut self, dt: f32, ctx: &mut dyn ClassContext) {
        // Rupture declares the per-tick damage.
        let tick_damage = self.abilities.base_damage(RUPTURE_SLOT);
        let Some(bleed) = self.bleed.as_mut() else {
            return;
        };
        for _ in 0..bleed.advance(dt) {
            let damage = ctx.create_damage_instance(
                DamageParams::new(BLEED_ID, tick_damage).with_tags(DamageTags::PHYSICAL),
            );
            ctx.deal_damage(&damage);
        }
        if !bleed.is_active() {
            self.bleed = None;
        }
    }
}

impl Default for Lancer {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerClass for Lancer {
    fn update(&mut self, dt: f32, ctx: &mut dyn ClassContext) {
        if dt <= 0.0 {
            return;
        }
        self.abilities.tick(dt);
        self.update_bleed(dt, ctx);
    }

    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        if !self.abilities.is_ready(slot) {
            trace!(slot, "lancer: not ready");
            return false;
        }
        match slot {
            SLICE_SLOT => self.slice(ctx),
            RUPTURE_SLOT => self.rupture(ctx),
            PIERCE_SLOT => self.pierce(ctx),
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
            current: self.combo_points,
            max: MAX_COMBO_POINTS,
            secondary: self.bleed.map(|bleed| GaugeBar {
                current: bleed.remaining(),
                max: bleed.total(),
            }),
        })
    }
}
