//! Narrow-phase collision detection over the spatial index.
//!
//! Detection only: the system reports overlapping pairs to a listener and
//! never separates entities. Response (push-out, damage on contact) belongs
//! in the listener.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::entity::{Collider, EntityId, Transform};
use crate::spatial::SpatialIndex;
use crate::system::System;
use crate::world::World;

/// A detected contact between two colliders.
///
/// `a` always has the lower id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionPair {
    /// Lower entity id.
    pub a: EntityId,
    /// Higher entity id.
    pub b: EntityId,
    /// Centre-to-centre distance.
    pub distance: f32,
    /// Penetration depth: combined radius minus distance. Zero when touching.
    pub overlap: f32,
}

/// Callback invoked for every detected pair, with mutable world access.
pub type CollisionListener = Box<dyn FnMut(&CollisionPair, &mut World)>;

/// Tests two placed colliders against each other.
///
/// Returns `(distance, overlap)` when both layer/mask tests pass and the
/// spheres touch or intersect.
///
/// ```
/// use glam::Vec3;
/// use shatter_core::entity::Collider;
/// use shatter_core::systems::detect_collision;
///
/// let c = Collider::default();
/// let mut ghost = Collider::default();
/// ghost.layer = shatter_core::entity::CollisionLayers::ENEMY;
///
/// let (distance, overlap) = detect_collision(Vec3::ZERO, &ghost, Vec3::new(0.9, 0.0, 0.0), &c).unwrap();
/// assert!((distance - 0.9).abs() < 1e-6);
/// assert!((overlap - 0.1).abs() < 1e-6);
/// ```
#[must_use]
pub fn detect_collision(
    a_position: glam::Vec3,
    a: &Collider,
    b_position: glam::Vec3,
    b: &Collider,
) -> Option<(f32, f32)> {
    if !a.accepts(b) {
        return None;
    }
    let combined = a.radius + b.radius;
    let distance = a_position.distance(b_position);
    (distance <= combined).then_some((distance, combined - distance))
}

/// Rebuilds the spatial index each tick and reports overlapping pairs.
pub struct CollisionSystem {
    index: SpatialIndex,
    scratch: Vec<EntityId>,
    listener: Option<CollisionListener>,
}

impl CollisionSystem {
    /// Creates a collision system with no listener.
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: SpatialIndex::new(),
            scratch: Vec::new(),
            listener: None,
        }
    }

    /// Creates a collision system that reports pairs to `listener`.
    #[must_use]
    pub fn with_listener(listener: impl FnMut(&CollisionPair, &mut World) + 'static) -> Self {
        Self {
            listener: Some(Box::new(listener)),
            ..Self::new()
        }
    }

    /// The index as rebuilt on the most recent tick.
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Looks up the placed collider of a living entity.
fn placed_collider(world: &World, id: EntityId) -> Option<(glam::Vec3, Collider)> {
    let entity = world.get(id).filter(|entity| entity.is_alive())?;
    let transform = entity.try_get::<Transform>()?;
    let collider = entity.try_get::<Collider>()?;
    Some((transform.position, *collider))
}

impl System for CollisionSystem {
    fn id(&self) -> &str {
        "collision"
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        self.index.rebuild_from(world, &mut self.scratch);

        // Listeners may destroy entities mid-pass, so every pair re-checks
        // liveness against the world rather than the index snapshot.
        let pairs: Vec<(EntityId, EntityId)> = self.index.pairs().collect();
        for (a, b) in pairs {
            let (Some((a_position, a_collider)), Some((b_position, b_collider))) =
                (placed_collider(world, a), placed_collider(world, b))
            else {
                continue;
            };
            let Some((distance, overlap)) =
                detect_collision(a_position, &a_collider, b_position, &b_collider)
            else {
                continue;
            };

            let pair = CollisionPair {
                a,
                b,
                distance,
                overlap,
            };
            trace!(a = %a, b = %b, overlap, "collision");
            if let Some(listener) = self.listener.as_mut() {
                listener(&pair, world);
            }
        }
    }
}

impl std::fmt::Debug for CollisionSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionSystem")
            .field("indexed", &self.index.len())
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}
