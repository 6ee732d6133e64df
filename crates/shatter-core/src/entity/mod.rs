//! Entity types for the arena ECS.
//!
//! This module provides:
//! - [`EntityId`]: opaque identifier assigned by the [`World`](crate::world::World)
//! - [`Entity`]: an identifier plus a [`ComponentBag`], name and tags
//! - [`Blueprint`]: an ordered recipe used to instantiate entities atomically
//!
//! # Composition
//!
//! There is no entity hierarchy. Behavior is decided purely by which
//! components are present: the movement system runs on everything with a
//! [`Transform`] and a [`Motion`], the collision system on everything with a
//! [`Transform`] and a [`Collider`], and so on.
//!
//! # Example
//!
//! ```
//! use shatter_core::entity::{Blueprint, Motion, Transform};
//! use shatter_core::world::World;
//! use glam::Vec3;
//!
//! let blueprint = Blueprint::new("Player")
//!     .with_tag("player")
//!     .with(Transform::at(Vec3::new(-5.0, 0.0, 0.0)))
//!     .with(Motion { max_speed: 6.0, ..Motion::default() });
//!
//! let mut world = World::new();
//! let id = world.spawn(&blueprint);
//! let player = world.get(id).unwrap();
//!
//! assert!(player.has_tag("player"));
//! assert_eq!(player.get::<Transform>().position.x, -5.0);
//! ```

pub mod components;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::world::World;

pub use components::{
    Collider, CollisionLayers, Component, ComponentBag, ComponentKind, ComponentValue, Motion,
    Telegraph, TelegraphSegment, Transform,
};

/// Unique identifier for an entity.
///
/// Identifiers are assigned monotonically by the world and never reused, so
/// ordering by id is ordering by spawn time.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A game object: identifier, components, name and tags.
///
/// Entities are owned by the [`World`](crate::world::World). Systems borrow
/// them for the duration of one tick.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    name: Option<String>,
    tags: Vec<String>,
    components: ComponentBag,
    alive: bool,
}

impl Entity {
    /// Returns the entity's identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the blueprint name, if one was given.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the entity's tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if the entity carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Returns false once destruction has been requested.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns true if a component of `kind` is present.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components.has(kind)
    }

    /// Returns true if every listed kind is present.
    #[must_use]
    pub fn has_all(&self, kinds: &[ComponentKind]) -> bool {
        kinds.iter().all(|kind| self.components.has(*kind))
    }

    /// Borrows a required component.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no component of type `C`. Asking for a
    /// component that is not there is a programming error, not a recoverable
    /// condition; use [`Entity::try_get`] when absence is expected.
    #[must_use]
    #[track_caller]
    pub fn get<C: Component>(&self) -> &C {
        match C::slot(&self.components) {
            Some(component) => component,
            None => panic!("entity {} is missing component {}", self.id, C::KIND),
        }
    }

    /// Mutably borrows a required component.
    ///
    /// # Panics
    ///
    /// Panics if the entity has no component of type `C`.
    #[must_use]
    #[track_caller]
    pub fn get_mut<C: Component>(&mut self) -> &mut C {
        let id = self.id;
        match C::slot_mut(&mut self.components) {
            Some(component) => component,
            None => panic!("entity {id} is missing component {}", C::KIND),
        }
    }

    /// Borrows a component if present.
    #[must_use]
    pub fn try_get<C: Component>(&self) -> Option<&C> {
        C::slot(&self.components)
    }

    /// Mutably borrows a component if present.
    #[must_use]
    pub fn try_get_mut<C: Component>(&mut self) -> Option<&mut C> {
        C::slot_mut(&mut self.components)
    }

    /// Returns the underlying component storage.
    #[must_use]
    pub const fn components(&self) -> &ComponentBag {
        &self.components
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }
}

// =============================================================================
// Blueprint
// =============================================================================

/// Callback invoked with an entity at spawn or destruction time.
///
/// The hook gets the world too, so it may spawn follow-up entities or
/// destroy others. At spawn it sees a snapshot of the new entity; at
/// destruction the entity has already left the world.
pub type EntityHook = Arc<dyn Fn(&Entity, &mut World) + Send + Sync>;

/// Ordered recipe for instantiating an entity.
///
/// Each listed component starts from its `Default` and is customised by the
/// blueprint author (usually with struct update syntax). Listing the same
/// component type twice keeps the last value.
#[derive(Clone, Default)]
pub struct Blueprint {
    name: Option<String>,
    tags: Vec<String>,
    components: Vec<ComponentValue>,
    on_spawn: Option<EntityHook>,
    on_destroy: Option<EntityHook>,
}

impl Blueprint {
    /// Creates an empty named blueprint.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Appends a component, replacing an earlier entry of the same kind.
    #[must_use]
    pub fn with<C: Component>(mut self, component: C) -> Self {
        self.components.retain(|value| value.kind() != C::KIND);
        self.components.push(component.into());
        self
    }

    /// Sets the hook run right after the entity is registered.
    #[must_use]
    pub fn on_spawn(mut self, hook: impl Fn(&Entity, &mut World) + Send + Sync + 'static) -> Self {
        self.on_spawn = Some(Arc::new(hook));
        self
    }

    /// Sets the hook run when the entity is removed at end of tick.
    #[must_use]
    pub fn on_destroy(
        mut self,
        hook: impl Fn(&Entity, &mut World) + Send + Sync + 'static,
    ) -> Self {
        self.on_destroy = Some(Arc::new(hook));
        self
    }

    /// Returns the blueprint name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the component entries in order.
    #[must_use]
    pub fn components(&self) -> &[ComponentValue] {
        &self.components
    }

    pub(crate) fn spawn_hook(&self) -> Option<&EntityHook> {
        self.on_spawn.as_ref()
    }

    pub(crate) fn destroy_hook(&self) -> Option<&EntityHook> {
        self.on_destroy.as_ref()
    }

    /// Builds the entity in one step; nothing is observable until it returns.
    pub(crate) fn instantiate(&self, id: EntityId) -> Entity {
        let mut components = ComponentBag::default();
        for value in &self.components {
            components.insert(value.clone());
        }
        Entity {
            id,
            name: self.name.clone(),
            tags: self.tags.clone(),
            components,
            alive: true,
        }
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .field("components", &self.components)
            .field("on_spawn", &self.on_spawn.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering_follows_raw_value() {
            assert!(EntityId::new(1) < EntityId::new(2));
            assert_eq!(EntityId::from(7).as_u64(), 7);
        }

        #[test]
        fn formatting() {
            assert_eq!(format!("{:?}", EntityId::new(3)), "EntityId(3)");
            assert_eq!(EntityId::new(3).to_string(), "3");
        }
    }

    mod blueprint_tests {
        use super::*;

        #[test]
        fn instantiate_applies_components_in_order() {
            let blueprint = Blueprint::new("Orb")
                .with_tag("hazard")
                .with(Transform::at(Vec3::new(2.0, 0.0, 2.0)))
                .with(Collider {
                    radius: 0.6,
                    ..Collider::default()
                });

            let entity = blueprint.instantiate(EntityId::new(1));

            assert_eq!(entity.name(), Some("Orb"));
            assert!(entity.has_tag("hazard"));
            assert!(entity.has_all(&[ComponentKind::Transform, ComponentKind::Collider]));
            assert!(!entity.has(ComponentKind::Motion));
            assert!((entity.get::<Collider>().radius - 0.6).abs() < f32::EPSILON);
        }

        #[test]
        fn duplicate_component_keeps_last_value() {
            let blueprint = Blueprint::new("Dup")
                .with(Transform::at(Vec3::X))
                .with(Motion::default())
                .with(Transform::at(Vec3::Z));

            assert_eq!(blueprint.components().len(), 2);
            let entity = blueprint.instantiate(EntityId::new(1));
            assert_eq!(entity.get::<Transform>().position, Vec3::Z);
        }

        #[test]
        fn debug_hides_hooks() {
            let blueprint = Blueprint::new("Hooked").on_destroy(|_, _| {});
            let text = format!("{blueprint:?}");
            assert!(text.contains("on_destroy: true"));
            assert!(text.contains("on_spawn: false"));
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn try_get_returns_none_when_absent() {
            let entity = Blueprint::new("Bare").instantiate(EntityId::new(1));
            assert!(entity.try_get::<Motion>().is_none());
            assert!(entity.is_alive());
        }

        #[test]
        #[should_panic(expected = "entity 4 is missing component core.motion")]
        fn get_panics_when_absent() {
            let entity = Blueprint::new("Bare").instantiate(EntityId::new(4));
            let _ = entity.get::<Motion>();
        }

        #[test]
        fn get_mut_mutates_in_place() {
            let mut entity = Blueprint::new("Mover")
                .with(Motion::default())
                .instantiate(EntityId::new(1));
            entity.get_mut::<Motion>().target_velocity = Vec3::X;
            assert_eq!(entity.get::<Motion>().target_velocity, Vec3::X);
        }
    }
}
