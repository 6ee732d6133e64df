//! Stock blueprints for the arena.

use glam::Vec3;

use crate::config::{EncounterConfig, PlayerConfig};
use crate::entity::{
    Blueprint, Collider, CollisionLayers, Motion, Telegraph, TelegraphSegment, Transform,
};

/// Tag carried by the player token.
pub const PLAYER_TAG: &str = "player";
/// Tag carried by the encounter target.
pub const BOSS_TAG: &str = "boss";
/// Tag carried by telegraphed hazards.
pub const HAZARD_TAG: &str = "hazard";

/// Collider radius of the training dummy.
pub const BOSS_COLLIDER_RADIUS: f32 = 0.6;
/// Collider radius of a hazard orb.
pub const HAZARD_RADIUS: f32 = 0.6;

/// The player token: movable, collides with everything but other players.
#[must_use]
pub fn player(config: &PlayerConfig) -> Blueprint {
    Blueprint::new("Player")
        .with_tag(PLAYER_TAG)
        .with(Transform::at(config.spawn))
        .with(Motion {
            max_speed: config.max_speed,
            acceleration: config.acceleration,
            friction: config.friction,
            ..Motion::default()
        })
        .with(Collider {
            radius: config.collider_radius,
            layer: CollisionLayers::PLAYER,
            mask: CollisionLayers::ALL.difference(CollisionLayers::PLAYER),
        })
}

/// The passive training dummy.
#[must_use]
pub fn training_dummy(config: &EncounterConfig) -> Blueprint {
    Blueprint::new(config.id.clone())
        .with_tag(BOSS_TAG)
        .with(Transform::at(config.boss_position))
        .with(Collider {
            radius: BOSS_COLLIDER_RADIUS,
            layer: CollisionLayers::ENEMY,
            mask: CollisionLayers::ALL,
        })
}

/// A stationary orb that winds up ("Charge", then "Pulse") before going off.
#[must_use]
pub fn hazard_orb(position: Vec3) -> Blueprint {
    Blueprint::new("Clockwise Orb")
        .with_tag(HAZARD_TAG)
        .with(Transform::at(position))
        .with(Collider {
            radius: HAZARD_RADIUS,
            layer: CollisionLayers::HAZARD,
            mask: CollisionLayers::ALL.difference(CollisionLayers::HAZARD),
        })
        .with(Telegraph::sequence([
            TelegraphSegment::new("Charge", 1.2).with_color("#ffcc00"),
            TelegraphSegment::new("Pulse", 1.8).with_color("#ff3300"),
        ]))
}
