//! Broad-phase spatial index for collision detection and area queries.
//!
//! The index maps entity ids to a bounding sphere (position + radius). Users
//! rebuild it from the world whenever they need it, so it never has to be kept
//! in sync with component mutations.
//!
//! # Scaling
//!
//! [`SpatialIndex::pairs`] enumerates every unordered pair, which is O(n²).
//! That is fine for the handful of entities in an arena encounter and is the
//! first thing to replace (grid hashing, sweep-and-prune) if entity counts
//! grow.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Collider, ComponentKind, EntityId, Transform};
use crate::world::World;

/// A bounding sphere stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialEntry {
    /// Sphere centre.
    pub position: Vec3,
    /// Sphere radius.
    pub radius: f32,
}

/// Sphere index keyed by entity id.
///
/// Entries are kept in a `BTreeMap` so that iteration, radius queries and
/// pair enumeration all come out in ascending id order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    entries: BTreeMap<EntityId, SpatialEntry>,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces the contents with every entity holding a transform and a
    /// collider. `scratch` is reused for the world query.
    pub fn rebuild_from(&mut self, world: &World, scratch: &mut Vec<EntityId>) {
        self.clear();
        world.query_into(&[ComponentKind::Transform, ComponentKind::Collider], scratch);
        for &id in scratch.iter() {
            if let Some(entity) = world.get(id) {
                let position = entity.get::<Transform>().position;
                self.insert(id, position, entity.get::<Collider>().radius);
            }
        }
    }

    /// Inserts or replaces an entity's sphere.
    pub fn insert(&mut self, id: EntityId, position: Vec3, radius: f32) {
        self.entries.insert(id, SpatialEntry { position, radius });
    }

    /// Removes an entity from the index.
    pub fn remove(&mut self, id: EntityId) {
        self.entries.remove(&id);
    }

    /// Returns an entity's sphere, if indexed.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<SpatialEntry> {
        self.entries.get(&id).copied()
    }

    /// Returns the ids whose sphere intersects the query sphere.
    ///
    /// Touching spheres count as intersecting. Results are sorted by id.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        self.entries
            .iter()
            .filter(|(_, entry)| {
                let combined = radius + entry.radius;
                center.distance_squared(entry.position) <= combined * combined
            })
            .map(|(id, _)| *id)
            .collect()
    }

    /// Enumerates every unordered pair of indexed ids exactly once.
    ///
    /// Pairs come out as `(lower, higher)` in ascending order of the first
    /// element, then the second.
    pub fn pairs(&self) -> impl Iterator<Item = (EntityId, EntityId)> + '_ {
        self.entries.keys().enumerate().flat_map(move |(i, &a)| {
            self.entries.keys().skip(i + 1).map(move |&b| (a, b))
        })
    }

    /// Returns the number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
