//! Arcanist: mana spending that builds hunger stacks.
//!
//! Arcane Blast costs more and casts faster with every hunger stack it adds.
//! Arcane Barrage cashes the stacks in for a burst. Blast completions may
//! proc clearcasting, which unlocks a volley of Arcane Missiles. Evocation
//! refills mana.
//!
//! Damage scales with both resources:
//! `(1 + mana / max_mana) * (1 + stacks * 0.25)`, snapshotted when a cast
//! starts or an instant ability fires.

use std::f32::consts::PI;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use super::ability::{AbilityBar, AbilityDefinition, AbilityStatus, GaugeState};
use super::cast::{ActiveCast, CastBar, CastProgress};
use super::context::{aim_direction, ClassContext, ProjectileSpawn, ProjectileVisual};
use super::PlayerClass;
use crate::damage::{AbilityId, DamageInstance, DamageParams, DamageTags};

/// Maximum (and starting) mana.
pub const MAX_MANA: f32 = 100.0;
/// Maximum hunger stacks.
pub const MAX_HUNGER_STACKS: u32 = 4;
/// Default chance for a Blast completion to grant clearcasting.
pub const CLEARCAST_CHANCE: f32 = 0.15;

const HUNGER_DAMAGE_BONUS: f32 = 0.25;
const HUNGER_COST_BONUS: f32 = 0.25;

const BLAST_ID: AbilityId = AbilityId::from_static("arcanist-arcane-blast");
const BLAST_SLOT: usize = 0;
const BLAST_CAST_TIME: f32 = 2.0;
const BLAST_DAMAGE: f32 = 10.0;
const BLAST_COST: f32 = 15.0;

const BARRAGE_ID: AbilityId = AbilityId::from_static("arcanist-arcane-barrage");
const BARRAGE_SLOT: usize = 1;
const BARRAGE_DAMAGE: f32 = 10.0;
const BARRAGE_SPEED: f32 = 20.0;
const BARRAGE_SCALE: f32 = 1.15;
const BARRAGE_LIFETIME: f32 = 2.4;

const MISSILES_ID: AbilityId = AbilityId::from_static("arcanist-arcane-missiles");
const MISSILES_SLOT: usize = 2;
const MISSILE_COUNT: usize = 3;
const MISSILE_DAMAGE: f32 = 5.0;
const MISSILE_MANA_GAIN: f32 = 10.0;
const MISSILE_SPEED: f32 = 16.0;
const MISSILE_LIFETIME: f32 = 3.0;
const MISSILE_SPREAD: f32 = 0.22;

const EVOCATION_ID: AbilityId = AbilityId::from_static("arcanist-evocation");
const EVOCATION_SLOT: usize = 3;
const EVOCATION_CAST_TIME: f32 = 5.0;
const EVOCATION_COOLDOWN: f32 = 20.0;

/// What a finished Arcanist cast does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcanistCast {
    /// Arcane Blast with the multiplier snapshotted at cast start.
    Blast {
        /// Damage multiplier.
        multiplier: f32,
    },
    /// Refill mana.
    Evocation,
}

/// The Arcanist class.
#[derive(Debug, Clone)]
pub struct Arcanist {
    abilities: AbilityBar,
    cast: CastBar<ArcanistCast>,
    mana: f32,
    hunger_stacks: u32,
    clearcasting: bool,
    clearcast_chance: f32,
    rng: ChaCha8Rng,
}

impl Arcanist {
    /// An Arcanist at full mana whose procs are drawn from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_clearcast_chance(seed, CLEARCAST_CHANCE)
    }

    /// Like [`Arcanist::new`] with a custom proc chance in `0..=1`.
    #[must_use]
    pub fn with_clearcast_chance(seed: u64, chance: f32) -> Self {
        Self {
            abilities: AbilityBar::new([
                AbilityDefinition::new(BLAST_ID, 1, 0.0).with_damage(BLAST_DAMAGE),
                AbilityDefinition::new(BARRAGE_ID, 2, 0.0).with_damage(BARRAGE_DAMAGE),
                AbilityDefinition::new(MISSILES_ID, 3, 0.0).with_damage(MISSILE_DAMAGE),
                AbilityDefinition::new(EVOCATION_ID, 4, EVOCATION_COOLDOWN),
            ]),
            cast: CastBar::new(),
            mana: MAX_MANA,
            hunger_stacks: 0,
            clearcasting: false,
            clearcast_chance: chance.clamp(0.0, 1.0),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Current mana.
    #[must_use]
    pub const fn mana(&self) -> f32 {
        self.mana
    }

    /// Current hunger stacks.
    #[must_use]
    pub const fn hunger_stacks(&self) -> u32 {
        self.hunger_stacks
    }

    /// True while Arcane Missiles is available.
    #[must_use]
    pub const fn has_clearcasting(&self) -> bool {
        self.clearcasting
    }

    /// True while a cast is channelling.
    #[must_use]
    pub fn is_casting(&self) -> bool {
        self.cast.is_casting()
    }

    #[allow(clippy::cast_precision_loss)]
    fn stacks(&self) -> f32 {
        self.hunger_stacks as f32
    }

    /// Current damage multiplier from mana and stacks.
    #[must_use]
    pub fn damage_multiplier(&self) -> f32 {
        (1.0 + self.mana / MAX_MANA) * (1.0 + self.stacks() * HUNGER_DAMAGE_BONUS)
    }

    /// Mana cost of Arcane Blast at the current stack count.
    #[must_use]
    pub fn blast_cost(&self) -> f32 {
        BLAST_COST * (1.0 + self.stacks() * HUNGER_COST_BONUS)
    }

    /// Cast time of Arcane Blast at the current stack count.
    #[must_use]
    pub fn blast_cast_time(&self) -> f32 {
        BLAST_CAST_TIME * (1.0 - self.stacks() * 0.1).max(0.0)
    }

    fn scaled_damage(
        &self,
        ctx: &dyn ClassContext,
        slot: usize,
        id: AbilityId,
        tags: DamageTags,
        multiplier: f32,
    ) -> DamageInstance {
        let base = self.abilities.base_damage(slot);
        let instance = ctx.create_damage_instance(DamageParams::new(id, base).with_tags(tags));
        DamageInstance::scaled(instance, multiplier)
    }

    fn try_blast(&mut self, ctx: &mut dyn ClassContext) -> bool {
        let cost = self.blast_cost();
        if self.mana < cost {
            trace!(mana = self.mana, cost, "arcanist: not enough mana");
            return false;
        }
        let cast = ActiveCast::new(
            BLAST_SLOT,
            self.blast_cast_time(),
            cost,
            ArcanistCast::Blast {
                multiplier: self.damage_multiplier(),
            },
        );
        self.cast.begin(cast, ctx)
    }

    fn try_barrage(&mut self, ctx: &mut dyn ClassContext) -> bool {
        let Some(direction) = aim_direction(ctx) else {
            trace!("arcanist: no aim");
            return false;
        };
        let multiplier = self.damage_multiplier() * (1.0 + self.stacks());
        self.hunger_stacks = 0;

        let damage = self.scaled_damage(
            ctx,
            BARRAGE_SLOT,
            BARRAGE_ID,
            DamageTags::MAGIC | DamageTags::PROJECTILE,
            multiplier,
        );
        let origin = ctx.player_position() + direction * 0.65;
        ctx.spawn_projectile(
            origin,
            direction * BARRAGE_SPEED,
            ProjectileSpawn::with_damage(damage)
                .scale(BARRAGE_SCALE)
                .color(0xf4_72_b6)
                .lifetime(BARRAGE_LIFETIME)
                .visual(ProjectileVisual::Pulse {
                    rate: 8.0,
                    strength: 0.12,
                }),
        );
        self.abilities.start_cooldown(BARRAGE_SLOT);
        true
    }

    fn try_missiles(&mut self, ctx: &mut dyn ClassContext) -> bool {
        if !self.clearcasting {
            trace!("arcanist: missiles need clearcasting");
            return false;
        }
        let Some(direction) = aim_direction(ctx) else {
            trace!("arcanist: no aim");
            return false;
        };
        let multiplier = self.damage_multiplier();
        self.mana = (self.mana + MISSILE_MANA_GAIN).min(MAX_MANA);

        // Perpendicular in the ground plane; `direction` is planar and unit.
        let lateral = Vec3::new(-direction.z, 0.0, direction.x);
        let muzzle = ctx.player_position() + direction * 0.6;
        for i in 0..MISSILE_COUNT {
            #[allow(clippy::cast_precision_loss)]
            let offset = (i as f32 - 1.0) * MISSILE_SPREAD;
            let visual = match i {
                0 => ProjectileVisual::Pulse {
                    rate: 10.0,
                    strength: 0.08,
                },
                _ => ProjectileVisual::Wave {
                    lateral,
                    amplitude: 0.8,
                    frequency: 7.5,
                    phase: if i == 1 { 0.0 } else { PI },
                },
            };
            let damage = self.scaled_damage(
                ctx,
                MISSILES_SLOT,
                MISSILES_ID,
                DamageTags::MAGIC | DamageTags::PROJECTILE,
                multiplier,
            );
            ctx.spawn_projectile(
                muzzle + lateral * offset,
                direction * MISSILE_SPEED,
                ProjectileSpawn::with_damage(damage)
                    .color(0xc7_d2_fe)
                    .lifetime(MISSILE_LIFETIME)
                    .visual(visual),
            );
        }

        self.clearcasting = false;
        self.abilities.start_cooldown(MISSILES_SLOT);
        true
    }

    fn complete(&mut self, cast: &ActiveCast<ArcanistCast>, ctx: &mut dyn ClassContext) {
        if cast.cost > 0.0 {
            self.mana = (self.mana - cast.cost).max(0.0);
        }
        match cast.effect {
            ArcanistCast::Blast { multiplier } => {
                let damage = self.scaled_damage(
                    ctx,
                    BLAST_SLOT,
                    BLAST_ID,
                    DamageTags::MAGIC,
                    multiplier,
                );
                ctx.deal_damage(&damage);
                self.hunger_stacks = (self.hunger_stacks + 1).min(MAX_HUNGER_STACKS);
                if self.rng.gen::<f32>() < self.clearcast_chance {
                    trace!("arcanist: clearcasting");
                    self.clearcasting = true;
                }
            }
            ArcanistCast::Evocation => self.mana = MAX_MANA,
        }
        self.abilities.start_cooldown(cast.slot);
    }
}

impl PlayerClass for Arcanist {
    fn update(&mut self, dt: f32, ctx: &mut dyn ClassContext) {
        if dt <= 0.0 {
            return;
        }
        self.abilities.tick(dt);
        match self.cast.advance(dt, ctx) {
            CastProgress::Completed(cast) => self.complete(&cast, ctx),
            CastProgress::Cancelled(_) => trace!("arcanist: cast interrupted"),
            CastProgress::Idle | CastProgress::Channeling(_) => {}
        }
    }

    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        if !self.abilities.is_ready(slot) {
            trace!(slot, "arcanist: not ready");
            return false;
        }
        if self.cast.is_casting() {
            trace!(slot, "arcanist: already casting");
            return false;
        }
        match slot {
            BLAST_SLOT => self.try_blast(ctx),
            BARRAGE_SLOT => self.try_barrage(ctx),
            MISSILES_SLOT => self.try_missiles(ctx),
            EVOCATION_SLOT => self.cast.begin(
                ActiveCast::new(slot, EVOCATION_CAST_TIME, 0.0, ArcanistCast::Evocation),
                ctx,
            ),
            _ => false,
        }
    }

    fn ability_statuses(&self) -> Vec<AbilityStatus> {
        self.abilities
            .statuses(|slot| slot == MISSILES_SLOT && self.clearcasting)
    }

    fn gauge_state(&self) -> Option<GaugeState> {
        Some(GaugeState::ManaHunger {
            mana_current: self.mana,
            mana_max: MAX_MANA,
            hunger_current: self.hunger_stacks,
            hunger_max: MAX_HUNGER_STACKS,
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

    fn finish_cast(arcanist: &mut Arcanist, ctx: &mut RecordingContext) {
        while arcanist.is_casting() {
            arcanist.update(0.25, ctx);
        }
    }

    #[test]
    fn blast_spends_snapshotted_cost_and_stacks() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::with_clearcast_chance(7, 0.0);

        assert!(arcanist.try_use_ability(0, &mut ctx));
        assert!(!arcanist.try_use_ability(0, &mut ctx));
        finish_cast(&mut arcanist, &mut ctx);

        assert_eq!(arcanist.mana(), 85.0);
        assert_eq!(arcanist.hunger_stacks(), 1);
        // Full mana doubles damage.
        assert_eq!(ctx.dealt.len(), 1);
        assert!((ctx.dealt[0].amount - 20.0).abs() < 1e-4);
        assert_eq!(ctx.dealt[0].base_damage, BLAST_DAMAGE);
    }

    #[test]
    fn stacks_raise_cost_and_shorten_cast() {
        let mut arcanist = Arcanist::with_clearcast_chance(1, 0.0);
        arcanist.hunger_stacks = 4;
        assert!((arcanist.blast_cost() - 30.0).abs() < 1e-5);
        assert!((arcanist.blast_cast_time() - 1.2).abs() < 1e-5);
        assert!((arcanist.damage_multiplier() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn stacks_are_capped() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::with_clearcast_chance(3, 0.0);
        for _ in 0..5 {
            arcanist.mana = MAX_MANA;
            assert!(arcanist.try_use_ability(0, &mut ctx));
            finish_cast(&mut arcanist, &mut ctx);
        }
        assert_eq!(arcanist.hunger_stacks(), MAX_HUNGER_STACKS);
    }

    #[test]
    fn moving_cancels_without_spending() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::with_clearcast_chance(7, 1.0);
        arcanist.try_use_ability(0, &mut ctx);
        arcanist.update(1.0, &mut ctx);
        ctx.moving = true;
        arcanist.update(0.1, &mut ctx);

        assert!(!arcanist.is_casting());
        assert_eq!(arcanist.mana(), MAX_MANA);
        assert_eq!(arcanist.hunger_stacks(), 0);
        assert!(!arcanist.has_clearcasting());
        assert!(ctx.dealt.is_empty());
    }

    #[test]
    fn insufficient_mana_rejects() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::new(0);
        arcanist.mana = 14.0;
        assert!(!arcanist.try_use_ability(0, &mut ctx));
        assert!(!arcanist.is_casting());
        assert!(ctx.cast_progress_log.is_empty());
    }

    #[test]
    fn barrage_cashes_in_stacks() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::new(0);
        arcanist.hunger_stacks = 2;
        arcanist.mana = 50.0;

        assert!(arcanist.try_use_ability(1, &mut ctx));

        assert_eq!(arcanist.hunger_stacks(), 0);
        let projectile = &ctx.projectiles[0];
        assert!((projectile.scale - BARRAGE_SCALE).abs() < 1e-6);
        assert!((projectile.lifetime - BARRAGE_LIFETIME).abs() < 1e-6);
        // (1 + 0.5) * (1 + 0.5) * (1 + 2) = 6.75
        let amount = projectile.damage.as_ref().unwrap().resolve().amount;
        assert!((amount - 67.5).abs() < 1e-3);
    }

    #[test]
    fn clearcasting_unlocks_missiles_once() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::with_clearcast_chance(11, 1.0);
        assert!(!arcanist.try_use_ability(2, &mut ctx));

        arcanist.try_use_ability(0, &mut ctx);
        finish_cast(&mut arcanist, &mut ctx);
        assert!(arcanist.has_clearcasting());
        assert!(arcanist.ability_statuses()[2].highlighted);

        assert!(arcanist.try_use_ability(2, &mut ctx));
        assert_eq!(ctx.projectiles.len(), MISSILE_COUNT);
        assert_eq!(arcanist.mana(), 95.0);
        assert!(!arcanist.has_clearcasting());
        assert!(!arcanist.ability_statuses()[2].highlighted);
        assert!(!arcanist.try_use_ability(2, &mut ctx));

        // Missiles fan out sideways around the muzzle.
        let spread = ctx.projectiles[2].origin - ctx.projectiles[0].origin;
        assert!((spread.length() - 2.0 * MISSILE_SPREAD).abs() < 1e-4);
    }

    #[test]
    fn evocation_refills_mana_and_cools_down() {
        let mut ctx = RecordingContext::new();
        let mut arcanist = Arcanist::new(0);
        arcanist.mana = 5.0;

        assert!(arcanist.try_use_ability(3, &mut ctx));
        finish_cast(&mut arcanist, &mut ctx);

        assert_eq!(arcanist.mana(), MAX_MANA);
        assert_eq!(
            arcanist.ability_statuses()[3].remaining_cooldown,
            EVOCATION_COOLDOWN
        );
        assert!(!arcanist.try_use_ability(3, &mut ctx));
    }

    #[test]
    fn same_seed_same_procs() {
        let run = |seed| {
            let mut ctx = RecordingContext::new();
            let mut arcanist = Arcanist::new(seed);
            let mut procs = Vec::new();
            for _ in 0..20 {
                arcanist.mana = MAX_MANA;
                arcanist.try_use_ability(0, &mut ctx);
                finish_cast(&mut arcanist, &mut ctx);
                procs.push(arcanist.has_clearcasting());
                arcanist.clearcasting = false;
            }
            procs
        };
        assert_eq!(run(42), run(42));
    }
}
