//! Damage resolution.
//!
//! Abilities never compute final damage numbers themselves. They declare a
//! [`DamageInstance`] (ability id, base damage, tags) through the
//! [`DamageEngine`], and whoever applies the hit calls
//! [`DamageInstance::resolve`]. Resolution runs the engine's modifier
//! pipeline exactly once; every later call returns the cached
//! [`DamageResult`].
//!
//! # Scaling
//!
//! Class mechanics that multiply damage (empowered shots, mana bonuses) wrap
//! the engine's instance with [`DamageInstance::scaled`]. The wrapper resolves
//! its base once, multiplies the final amount and memoizes independently.
//!
//! # Example
//!
//! ```
//! use shatter_core::damage::{AbilityId, DamageEngine, DamageInstance, DamageParams, DamageTags};
//!
//! let engine = DamageEngine::new();
//! engine.register_modifier(|ctx| {
//!     if ctx.tags().contains(DamageTags::MAGIC) {
//!         ctx.amount += 2.0;
//!     }
//! });
//!
//! let bolt = engine.create_instance(
//!     DamageParams::new(AbilityId::from_static("dark-bolt"), 18.0).with_tags(DamageTags::MAGIC),
//! );
//! let doubled = DamageInstance::scaled(bolt, 2.0);
//!
//! assert_eq!(doubled.resolve().amount, 40.0);
//! assert_eq!(doubled.resolve().base_damage, 18.0);
//! ```

mod tracker;

pub use tracker::{DamageTracker, DamageTrackerState, TRACK_DURATION_SECONDS};

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

// =============================================================================
// Identifiers and Tags
// =============================================================================

/// Stable identifier of the ability that produced a hit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(Cow<'static, str>);

impl AbilityId {
    /// Creates an id from a static string without allocating.
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Creates an id from an owned or borrowed string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

bitflags! {
    /// Classification tags carried by a damage instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DamageTags: u8 {
        /// Delivered by a projectile.
        const PROJECTILE = 1 << 0;
        /// Delivered by a melee swing.
        const MELEE = 1 << 1;
        /// Boosted by a class mechanic.
        const EMPOWERED = 1 << 2;
        /// Magical damage.
        const MAGIC = 1 << 3;
        /// Physical damage.
        const PHYSICAL = 1 << 4;
    }
}

// =============================================================================
// Params, Context, Result
// =============================================================================

/// What an ability declares when it creates a damage instance.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageParams {
    /// Producing ability.
    pub ability_id: AbilityId,
    /// Declared damage before modifiers.
    pub base_damage: f32,
    /// Classification tags.
    pub tags: DamageTags,
}

impl DamageParams {
    /// Creates untagged params.
    #[must_use]
    pub fn new(ability_id: AbilityId, base_damage: f32) -> Self {
        Self {
            ability_id,
            base_damage,
            tags: DamageTags::empty(),
        }
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: DamageTags) -> Self {
        self.tags = tags;
        self
    }
}

/// View handed to modifiers during resolution. Only `amount` is writable.
#[derive(Debug)]
pub struct DamageContext<'a> {
    ability_id: &'a AbilityId,
    base_damage: f32,
    tags: DamageTags,
    /// Running damage amount; starts at `base_damage`.
    pub amount: f32,
}

impl DamageContext<'_> {
    /// Producing ability.
    #[must_use]
    pub fn ability_id(&self) -> &AbilityId {
        self.ability_id
    }

    /// Declared damage before modifiers.
    #[must_use]
    pub fn base_damage(&self) -> f32 {
        self.base_damage
    }

    /// Classification tags.
    #[must_use]
    pub fn tags(&self) -> DamageTags {
        self.tags
    }
}

/// Immutable snapshot of a resolved hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageResult {
    /// Producing ability.
    pub ability_id: AbilityId,
    /// Declared damage before modifiers.
    pub base_damage: f32,
    /// Final damage amount.
    pub amount: f32,
    /// Classification tags.
    pub tags: DamageTags,
}

// =============================================================================
// Pipeline
// =============================================================================

type Modifier = Rc<dyn Fn(&mut DamageContext<'_>)>;

/// Ordered modifier list shared between an engine and its instances.
#[derive(Default)]
struct ModifierPipeline {
    modifiers: RefCell<Vec<Modifier>>,
}

impl ModifierPipeline {
    fn evaluate(&self, ability_id: &AbilityId, base_damage: f32, tags: DamageTags) -> DamageResult {
        // Snapshot so a modifier may register further modifiers without
        // holding the borrow.
        let modifiers: Vec<Modifier> = self.modifiers.borrow().clone();
        let mut context = DamageContext {
            ability_id,
            base_damage,
            tags,
            amount: base_damage,
        };
        for modifier in &modifiers {
            modifier(&mut context);
        }
        DamageResult {
            ability_id: ability_id.clone(),
            base_damage,
            amount: context.amount,
            tags,
        }
    }
}

// =============================================================================
// Damage Instance
// =============================================================================

enum Source {
    Pipeline(Rc<ModifierPipeline>),
    Scaled {
        base: Box<DamageInstance>,
        multiplier: f32,
    },
}

/// A lazily resolved, memoized damage computation.
///
/// Not `Clone`: a copy would carry its own cache and could be resolved (and
/// recorded) twice.
pub struct DamageInstance {
    ability_id: AbilityId,
    base_damage: f32,
    tags: DamageTags,
    source: Source,
    cached: OnceCell<DamageResult>,
}

impl DamageInstance {
    /// Wraps `base` so that its final amount is multiplied by `multiplier`.
    ///
    /// Identity (ability id, base damage, tags) is inherited from `base`.
    #[must_use]
    pub fn scaled(base: DamageInstance, multiplier: f32) -> Self {
        Self::scaled_with_tags(base, multiplier, DamageTags::empty())
    }

    /// Like [`DamageInstance::scaled`], adding `extra` tags to the result.
    #[must_use]
    pub fn scaled_with_tags(base: DamageInstance, multiplier: f32, extra: DamageTags) -> Self {
        Self {
            ability_id: base.ability_id.clone(),
            base_damage: base.base_damage,
            tags: base.tags | extra,
            source: Source::Scaled {
                base: Box::new(base),
                multiplier,
            },
            cached: OnceCell::new(),
        }
    }

    /// Producing ability.
    #[must_use]
    pub fn ability_id(&self) -> &AbilityId {
        &self.ability_id
    }

    /// Declared damage before modifiers.
    #[must_use]
    pub fn base_damage(&self) -> f32 {
        self.base_damage
    }

    /// Classification tags.
    #[must_use]
    pub fn tags(&self) -> DamageTags {
        self.tags
    }

    /// True once [`DamageInstance::resolve`] has run.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cached.get().is_some()
    }

    /// Resolves the instance, running the pipeline on first call only.
    ///
    /// # Panics
    ///
    /// Panics if a modifier re-enters `resolve` on this same instance.
    pub fn resolve(&self) -> &DamageResult {
        self.cached.get_or_init(|| {
            let result = match &self.source {
                Source::Pipeline(pipeline) => {
                    pipeline.evaluate(&self.ability_id, self.base_damage, self.tags)
                }
                Source::Scaled { base, multiplier } => {
                    let inner = base.resolve();
                    DamageResult {
                        ability_id: inner.ability_id.clone(),
                        base_damage: inner.base_damage,
                        amount: inner.amount * multiplier,
                        tags: self.tags,
                    }
                }
            };
            trace!(ability = %result.ability_id, amount = result.amount, "resolved damage");
            result
        })
    }
}

impl fmt::Debug for DamageInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageInstance")
            .field("ability_id", &self.ability_id)
            .field("base_damage", &self.base_damage)
            .field("tags", &self.tags)
            .field("resolved", &self.is_resolved())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Damage Engine
// =============================================================================

/// Creates damage instances and owns the modifier pipeline.
///
/// Instances keep a shared handle to the pipeline, so a modifier registered
/// after an instance was created still applies if the instance has not been
/// resolved yet.
#[derive(Default)]
pub struct DamageEngine {
    pipeline: Rc<ModifierPipeline>,
}

impl DamageEngine {
    /// Creates an engine with an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a new unresolved instance.
    #[must_use]
    pub fn create_instance(&self, params: DamageParams) -> DamageInstance {
        DamageInstance {
            ability_id: params.ability_id,
            base_damage: params.base_damage,
            tags: params.tags,
            source: Source::Pipeline(Rc::clone(&self.pipeline)),
            cached: OnceCell::new(),
        }
    }

    /// Appends a modifier. Modifiers run in registration order.
    ///
    /// A modifier may register further modifiers; they apply from the next
    /// resolution on. It must not resolve the instance it is modifying.
    ///
    /// # Panics
    ///
    /// Resolving an instance from inside its own pipeline panics.
    pub fn register_modifier(&self, modifier: impl Fn(&mut DamageContext<'_>) + 'static) {
        self.pipeline.modifiers.borrow_mut().push(Rc::new(modifier));
    }

    /// Resolves `instance`. Equivalent to [`DamageInstance::resolve`].
    pub fn resolve<'a>(&self, instance: &'a DamageInstance) -> &'a DamageResult {
        instance.resolve()
    }

    /// Number of registered modifiers.
    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.pipeline.modifiers.borrow().len()
    }
}

impl fmt::Debug for DamageEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DamageEngine")
            .field("modifiers", &self.modifier_count())
            .finish()
    }
}
