//! Test doubles.

use glam::Vec3;

use crate::classes::{ClassContext, MeleeAttack, ProjectileSpawn, ProjectileVisual};
use crate::damage::{DamageEngine, DamageInstance, DamageParams, DamageResult};

/// A projectile as it was handed to the context, before any flight.
#[derive(Debug)]
pub struct RecordedProjectile {
    pub origin: Vec3,
    pub velocity: Vec3,
    pub scale: f32,
    pub color: Option<u32>,
    pub damage: Option<DamageInstance>,
    pub lifetime: f32,
    pub visual: ProjectileVisual,
}

/// A [`ClassContext`] that records every side effect.
///
/// The player stands two units west of a target at the origin and is not
/// moving. Tests move either one by assigning the public fields.
#[derive(Debug)]
pub struct RecordingContext {
    pub player: Vec3,
    pub target: Vec3,
    pub moving: bool,
    pub engine: DamageEngine,
    pub projectiles: Vec<RecordedProjectile>,
    pub melee: Vec<MeleeAttack>,
    pub cast_progress_log: Vec<Option<f32>>,
    pub dealt: Vec<DamageResult>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self {
            player: Vec3::new(-2.0, 0.0, 0.0),
            target: Vec3::ZERO,
            moving: false,
            engine: DamageEngine::new(),
            projectiles: Vec::new(),
            melee: Vec::new(),
            cast_progress_log: Vec::new(),
            dealt: Vec::new(),
        }
    }
}

impl ClassContext for RecordingContext {
    fn player_position(&self) -> Vec3 {
        self.player
    }

    fn target_position(&self) -> Vec3 {
        self.target
    }

    fn is_player_moving(&self) -> bool {
        self.moving
    }

    fn spawn_projectile(&mut self, origin: Vec3, velocity: Vec3, spawn: ProjectileSpawn) {
        self.projectiles.push(RecordedProjectile {
            origin,
            velocity,
            scale: spawn.scale,
            color: spawn.color,
            damage: spawn.damage,
            lifetime: spawn.lifetime,
            visual: spawn.visual,
        });
    }

    fn play_melee_attack(&mut self, attack: MeleeAttack) {
        self.melee.push(attack);
    }

    fn set_cast_progress(&mut self, progress: Option<f32>) {
        self.cast_progress_log.push(progress);
    }

    fn create_damage_instance(&self, params: DamageParams) -> DamageInstance {
        self.engine.create_instance(params)
    }

    fn deal_damage(&mut self, instance: &DamageInstance) -> DamageResult {
        let result = instance.resolve().clone();
        self.dealt.push(result.clone());
        result
    }
}
