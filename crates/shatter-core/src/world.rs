//! The entity store and tick driver.
//!
//! The [`World`] owns every entity, the registered systems and the deferred
//! destruction queue. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Blueprint instantiation with spawn/destroy hooks
//! - Component queries into caller-owned scratch buffers
//! - The tick algorithm (update pass, post-update pass, destruction flush)
//!
//! # Deferred Destruction
//!
//! [`World::destroy`] only flags the entity dead and queues it. The entity is
//! removed after every system has finished both passes of the tick, so no
//! system ever observes a half-removed entity. Dead entities are already
//! excluded from queries and tag lookups.
//!
//! # Example
//!
//! ```
//! use shatter_core::entity::{Blueprint, ComponentKind, Transform};
//! use shatter_core::world::World;
//!
//! let mut world = World::new();
//! let a = world.spawn(&Blueprint::new("A").with(Transform::default()));
//! let b = world.spawn(&Blueprint::new("B"));
//!
//! assert_eq!(world.query(&[ComponentKind::Transform]), vec![a]);
//!
//! assert!(world.destroy(b));
//! assert!(!world.destroy(b)); // idempotent
//! world.update(1.0 / 60.0);
//! assert!(world.get(b).is_none());
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::entity::{Blueprint, ComponentKind, Entity, EntityHook, EntityId};
use crate::system::System;

/// Entity store and system runner.
pub struct World {
    /// Next identifier to hand out. Identifiers start at 1.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Blueprint destroy hooks, keyed by the entity they belong to.
    destroy_hooks: HashMap<EntityId, EntityHook>,
    /// Systems in registration order.
    systems: Vec<Box<dyn System>>,
    /// Entities flagged dead this tick, removed at end of tick.
    destroy_queue: Vec<EntityId>,
    /// Number of non-empty ticks run so far.
    tick: u64,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            destroy_hooks: HashMap::new(),
            systems: Vec::new(),
            destroy_queue: Vec::new(),
            tick: 0,
        }
    }

    /// Instantiates a blueprint and registers the resulting entity.
    ///
    /// The blueprint's `on_spawn` hook runs after registration.
    pub fn spawn(&mut self, blueprint: &Blueprint) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = blueprint.instantiate(id);
        if let Some(hook) = blueprint.destroy_hook() {
            self.destroy_hooks.insert(id, hook.clone());
        }
        self.entities.insert(id, entity);
        debug!(entity = %id, name = blueprint.name().unwrap_or("<unnamed>"), "spawned entity");

        if let Some(hook) = blueprint.spawn_hook() {
            if let Some(entity) = self.entities.get(&id).cloned() {
                hook(&entity, self);
            }
        }
        id
    }

    /// Registers a system. It runs after every previously added system.
    pub fn add_system<S: System + 'static>(&mut self, mut system: S) {
        system.initialize(self);
        debug!(system = system.id(), "registered system");
        self.systems.push(Box::new(system));
    }

    /// Returns the ids of the registered systems in run order.
    #[must_use]
    pub fn system_ids(&self) -> Vec<&str> {
        self.systems.iter().map(|system| system.id()).collect()
    }

    /// Steps the world by `dt` seconds.
    ///
    /// Runs every system's `update`, then every system's `post_update`, then
    /// removes entities destroyed during the tick. A non-positive `dt` is a
    /// no-op, which absorbs the zero-length first frame of a frame timer.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        // Systems need `&mut World` while they run, so take them out for the
        // duration of the tick.
        let mut systems = std::mem::take(&mut self.systems);
        for system in &mut systems {
            system.update(self, dt);
        }
        for system in &mut systems {
            system.post_update(self, dt);
        }
        // Systems registered mid-tick start running next tick.
        systems.append(&mut self.systems);
        self.systems = systems;

        self.flush_destroyed();
        self.tick += 1;
        trace!(tick = self.tick, dt, entities = self.entities.len(), "world tick");
    }

    /// Collects the ids of living entities holding every listed kind.
    ///
    /// `out` is cleared first; its previous contents are invalidated by every
    /// call. Results are in ascending id order.
    pub fn query_into(&self, kinds: &[ComponentKind], out: &mut Vec<EntityId>) {
        out.clear();
        out.extend(
            self.entities
                .values()
                .filter(|entity| entity.is_alive() && entity.has_all(kinds))
                .map(Entity::id),
        );
    }

    /// Returns the ids of living entities holding every listed kind.
    #[must_use]
    pub fn query(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.query_into(kinds, &mut out);
        out
    }

    /// Returns the ids of living entities carrying `tag`.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.is_alive() && entity.has_tag(tag))
            .map(Entity::id)
            .collect()
    }

    /// Returns an entity by id.
    ///
    /// Entities destroyed this tick are still returned (with
    /// [`Entity::is_alive`] false) until the end-of-tick flush.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable entity by id.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Requests destruction of an entity.
    ///
    /// Returns true if the request was queued. Destroying an unknown or
    /// already-dead entity is a no-op and returns false.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        if !entity.is_alive() {
            return false;
        }
        entity.mark_dead();
        self.destroy_queue.push(id);
        debug!(entity = %id, "queued entity for destruction");
        true
    }

    /// Returns the number of stored entities, including ones pending removal.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the world stores no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns the number of ticks run so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    fn flush_destroyed(&mut self) {
        // Destroy hooks may queue more destructions; drain until quiet.
        while !self.destroy_queue.is_empty() {
            self.flush_queue_once();
        }
    }

    fn flush_queue_once(&mut self) {
        for id in std::mem::take(&mut self.destroy_queue) {
            let Some(mut entity) = self.entities.remove(&id) else {
                continue;
            };
            entity.mark_dead();
            if let Some(hook) = self.destroy_hooks.remove(&id) {
                hook(&entity, self);
            }
            debug!(entity = %id, "removed entity");
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("systems", &self.system_ids())
            .field("pending_destroy", &self.destroy_queue.len())
            .finish()
    }
}
