//! Component types that make up an entity.
//!
//! Components are plain data with a `Default` factory. The [`Component`]
//! trait binds each concrete type to its [`ComponentKind`] key and to its slot
//! in a [`ComponentBag`], which is what guarantees that an entity holds at
//! most one component of each kind.
//!
//! | Kind        | Key               | Mutated by                          |
//! |-------------|-------------------|-------------------------------------|
//! | `Transform` | `core.transform`  | movement system, teleports          |
//! | `Motion`    | `core.motion`     | movement system, input intent       |
//! | `Collider`  | `core.collider`   | blueprint authors only              |
//! | `Telegraph` | `core.telegraph`  | telegraph system                    |

use std::fmt;

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};

// =============================================================================
// Component Kind
// =============================================================================

/// Identity of a component type.
///
/// Used for queries ([`World::query`](crate::world::World::query)) and for
/// the keyed lookups that back [`ComponentBag::has`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position, yaw and scale.
    Transform,
    /// Velocity integration parameters.
    Motion,
    /// Collision sphere and layer masks.
    Collider,
    /// Wind-up timer for hazards.
    Telegraph,
}

impl ComponentKind {
    /// Every component kind, in declaration order.
    pub const ALL: [Self; 4] = [Self::Transform, Self::Motion, Self::Collider, Self::Telegraph];

    /// Stable string key for this component type.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Transform => "core.transform",
            Self::Motion => "core.motion",
            Self::Collider => "core.collider",
            Self::Telegraph => "core.telegraph",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// Transform
// =============================================================================

/// World-space placement of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world units.
    pub position: Vec3,
    /// Rotation around the vertical axis, in radians.
    pub yaw: f32,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// Creates a transform at `position` with no rotation and unit scale.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            scale: Vec3::ONE,
        }
    }
}

// =============================================================================
// Motion
// =============================================================================

/// Velocity state integrated by the movement system.
///
/// `target_velocity` is written by input or intent each tick; `velocity` is
/// owned by the movement system and approaches the target over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Current integrated velocity.
    pub velocity: Vec3,
    /// Desired velocity.
    pub target_velocity: Vec3,
    /// Exponential approach rate toward the target (per second). Zero snaps.
    pub acceleration: f32,
    /// Exponential decay rate when there is no target (per second).
    pub friction: f32,
    /// Upper bound on the target velocity magnitude. Infinite means unbounded.
    pub max_speed: f32,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            target_velocity: Vec3::ZERO,
            acceleration: 0.0,
            friction: 0.0,
            max_speed: f32::INFINITY,
        }
    }
}

// =============================================================================
// Collider
// =============================================================================

bitflags! {
    /// Collision layer bits.
    ///
    /// A collider's `layer` says what it *is*; its `mask` says what it
    /// *collides with*. Arbitrary bits are allowed, the named constants are
    /// the ones the arena uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CollisionLayers: u32 {
        /// The player token.
        const PLAYER = 1 << 0;
        /// Telegraphed hazards.
        const HAZARD = 1 << 1;
        /// Enemies and training dummies.
        const ENEMY = 1 << 2;
        /// In-flight projectiles.
        const PROJECTILE = 1 << 3;
        /// Every layer.
        const ALL = u32::MAX;
    }
}

/// Collision sphere with layer filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    /// Sphere radius in world units.
    pub radius: f32,
    /// Layers this collider belongs to.
    pub layer: CollisionLayers,
    /// Layers this collider collides with.
    pub mask: CollisionLayers,
}

impl Collider {
    /// Returns true when both directional layer/mask tests pass.
    ///
    /// The test is symmetric: `a.accepts(&b) == b.accepts(&a)`.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        self.mask.intersects(other.layer) && other.mask.intersects(self.layer)
    }
}

impl Default for Collider {
    fn default() -> Self {
        Self {
            radius: 0.5,
            layer: CollisionLayers::PLAYER,
            mask: CollisionLayers::ALL,
        }
    }
}

// =============================================================================
// Telegraph
// =============================================================================

/// One cue in a telegraph sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegraphSegment {
    /// Player-facing label ("Charge", "Pulse").
    pub label: String,
    /// Length of this cue in seconds.
    pub duration: f32,
    /// Optional CSS-style colour for presentation.
    pub color: Option<String>,
}

impl TelegraphSegment {
    /// Creates an uncoloured segment.
    #[must_use]
    pub fn new(label: impl Into<String>, duration: f32) -> Self {
        Self {
            label: label.into(),
            duration,
            color: None,
        }
    }

    /// Sets the presentation colour.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Timed wind-up preceding a hazard's effect.
///
/// `completed` flips to `true` exactly once, when `elapsed` reaches
/// `duration`, and never resets for the lifetime of the entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telegraph {
    /// Seconds elapsed since the telegraph started.
    pub elapsed: f32,
    /// Total duration in seconds.
    pub duration: f32,
    /// Ordered cues to play.
    pub segments: Vec<TelegraphSegment>,
    /// Set once the telegraph has run to completion.
    pub completed: bool,
}

impl Telegraph {
    /// Builds a telegraph whose duration is the sum of its segments.
    #[must_use]
    pub fn sequence(segments: impl IntoIterator<Item = TelegraphSegment>) -> Self {
        let segments: Vec<TelegraphSegment> = segments.into_iter().collect();
        let duration = segments.iter().map(|s| s.duration).sum();
        Self {
            elapsed: 0.0,
            duration,
            segments,
            completed: false,
        }
    }

    /// Fraction of the wind-up that has elapsed, in `0..=1`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return if self.completed { 1.0 } else { 0.0 };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// The cue that is currently playing, if any.
    ///
    /// Returns the last segment once the telegraph has completed.
    #[must_use]
    pub fn active_segment(&self) -> Option<&TelegraphSegment> {
        let mut start = 0.0;
        for segment in &self.segments {
            let end = start + segment.duration;
            if self.elapsed < end {
                return Some(segment);
            }
            start = end;
        }
        self.segments.last()
    }
}

// =============================================================================
// Component Bag
// =============================================================================

/// Storage for one entity's components, one optional slot per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentBag {
    transform: Option<Transform>,
    motion: Option<Motion>,
    collider: Option<Collider>,
    telegraph: Option<Telegraph>,
}

impl ComponentBag {
    /// Returns true if a component of `kind` is present.
    #[must_use]
    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Transform => self.transform.is_some(),
            ComponentKind::Motion => self.motion.is_some(),
            ComponentKind::Collider => self.collider.is_some(),
            ComponentKind::Telegraph => self.telegraph.is_some(),
        }
    }

    /// Stores a component value, replacing any previous one of the same kind.
    pub fn insert(&mut self, value: ComponentValue) {
        match value {
            ComponentValue::Transform(c) => self.transform = Some(c),
            ComponentValue::Motion(c) => self.motion = Some(c),
            ComponentValue::Collider(c) => self.collider = Some(c),
            ComponentValue::Telegraph(c) => self.telegraph = Some(c),
        }
    }

    /// Kinds present in this bag, in [`ComponentKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        ComponentKind::ALL.into_iter().filter(|kind| self.has(*kind))
    }
}

/// A type-erased component value, as listed in a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A [`Transform`].
    Transform(Transform),
    /// A [`Motion`].
    Motion(Motion),
    /// A [`Collider`].
    Collider(Collider),
    /// A [`Telegraph`].
    Telegraph(Telegraph),
}

impl ComponentValue {
    /// The kind of the wrapped component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::Transform(_) => ComponentKind::Transform,
            Self::Motion(_) => ComponentKind::Motion,
            Self::Collider(_) => ComponentKind::Collider,
            Self::Telegraph(_) => ComponentKind::Telegraph,
        }
    }
}

/// A concrete component type stored in a [`ComponentBag`].
pub trait Component: Into<ComponentValue> + Sized + 'static {
    /// Key identifying this component type.
    const KIND: ComponentKind;

    /// Borrows this component's slot.
    fn slot(bag: &ComponentBag) -> Option<&Self>;

    /// Mutably borrows this component's slot.
    fn slot_mut(bag: &mut ComponentBag) -> Option<&mut Self>;
}

macro_rules! impl_component {
    ($ty:ident, $field:ident) => {
        impl Component for $ty {
            const KIND: ComponentKind = ComponentKind::$ty;

            fn slot(bag: &ComponentBag) -> Option<&Self> {
                bag.$field.as_ref()
            }

            fn slot_mut(bag: &mut ComponentBag) -> Option<&mut Self> {
                bag.$field.as_mut()
            }
        }

        impl From<$ty> for ComponentValue {
            fn from(component: $ty) -> Self {
                Self::$ty(component)
            }
        }
    };
}

impl_component!(Transform, transform);
impl_component!(Motion, motion);
impl_component!(Collider, collider);
impl_component!(Telegraph, telegraph);
