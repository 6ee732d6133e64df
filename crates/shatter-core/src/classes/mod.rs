//! Player class state machines.
//!
//! Each class owns four ability slots with cooldowns plus its own resource
//! (focus, charges, mana and hunger, combo points). Classes talk to the game
//! only through [`ClassContext`], so they can be driven by the real
//! [`Game`](crate::game::Game) or by a recording test double.
//!
//! | Class      | Mechanic                        | Gauge        |
//! |------------|---------------------------------|--------------|
//! | Marksman   | every 10th shot empowered       | `Bar`        |
//! | Black Mage | charges make a cast instant     | `Charges`    |
//! | Arcanist   | mana spend builds hunger stacks | `ManaHunger` |
//! | Lancer     | combo points and bleeds         | `Charges`    |
//!
//! # Rejections
//!
//! `try_use_ability` returns `false` for an unknown slot, a slot on
//! cooldown, an active cast, missing resources, an unusable aim, a target out
//! of range or a missing proc. A rejected call changes nothing.

mod ability;
mod arcanist;
mod black_mage;
mod cast;
mod context;
mod lancer;
mod marksman;
mod periodic;

pub use ability::{
    AbilityBar, AbilityDefinition, AbilityState, AbilityStatus, GaugeBar, GaugeState,
    PLACEHOLDER_COOLDOWN, SLOT_COUNT,
};
pub use arcanist::{Arcanist, ArcanistCast};
pub use black_mage::BlackMage;
pub use cast::{ActiveCast, CastBar, CastProgress};
pub use context::{
    aim_direction, planar_offset, ClassContext, MeleeAttack, MeleeStyle, ProjectileSpawn,
    ProjectileVisual,
};
pub use lancer::Lancer;
pub use marksman::Marksman;
pub use periodic::PeriodicEffect;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClassError;

/// Behaviour shared by every class.
pub trait PlayerClass {
    /// Advances cooldowns, casts and timed effects. A non-positive `dt` is a
    /// no-op.
    fn update(&mut self, dt: f32, ctx: &mut dyn ClassContext);

    /// Attempts to use the ability in `slot`. Returns whether it fired or
    /// started casting.
    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool;

    /// HUD snapshot of every slot, in slot order.
    fn ability_statuses(&self) -> Vec<AbilityStatus>;

    /// HUD snapshot of the class resource.
    fn gauge_state(&self) -> Option<GaugeState>;

    /// Drops any active cast without spending resources.
    fn cancel_cast(&mut self, _ctx: &mut dyn ClassContext) {}
}

// =============================================================================
// Class Id
// =============================================================================

/// Names of the playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassId {
    /// [`Marksman`].
    #[default]
    Marksman,
    /// [`BlackMage`].
    BlackMage,
    /// [`Arcanist`].
    Arcanist,
    /// [`Lancer`].
    Lancer,
}

impl ClassId {
    /// Every class, in menu order.
    pub const ALL: [Self; 4] = [Self::Marksman, Self::BlackMage, Self::Arcanist, Self::Lancer];

    /// Stable kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marksman => "marksman",
            Self::BlackMage => "black-mage",
            Self::Arcanist => "arcanist",
            Self::Lancer => "lancer",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Marksman => "Marksman",
            Self::BlackMage => "Black Mage",
            Self::Arcanist => "Arcanist",
            Self::Lancer => "Lancer",
        }
    }

    /// Builds a fresh instance. `seed` drives any random procs.
    #[must_use]
    pub fn instantiate(self, seed: u64) -> ClassInstance {
        match self {
            Self::Marksman => ClassInstance::Marksman(Marksman::new()),
            Self::BlackMage => ClassInstance::BlackMage(BlackMage::new()),
            Self::Arcanist => ClassInstance::Arcanist(Arcanist::new(seed)),
            Self::Lancer => ClassInstance::Lancer(Lancer::new()),
        }
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassId {
    type Err = ClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ClassError::UnknownClass(s.to_string()))
    }
}

// =============================================================================
// Class Instance
// =============================================================================

/// A live class of any kind.
#[derive(Debug, Clone)]
pub enum ClassInstance {
    /// A [`Marksman`].
    Marksman(Marksman),
    /// A [`BlackMage`].
    BlackMage(BlackMage),
    /// An [`Arcanist`].
    Arcanist(Arcanist),
    /// A [`Lancer`].
    Lancer(Lancer),
}

impl ClassInstance {
    /// Which class this is.
    #[must_use]
    pub const fn id(&self) -> ClassId {
        match self {
            Self::Marksman(_) => ClassId::Marksman,
            Self::BlackMage(_) => ClassId::BlackMage,
            Self::Arcanist(_) => ClassId::Arcanist,
            Self::Lancer(_) => ClassId::Lancer,
        }
    }

    fn as_class(&self) -> &dyn PlayerClass {
        match self {
            Self::Marksman(class) => class,
            Self::BlackMage(class) => class,
            Self::Arcanist(class) => class,
            Self::Lancer(class) => class,
        }
    }

    fn as_class_mut(&mut self) -> &mut dyn PlayerClass {
        match self {
            Self::Marksman(class) => class,
            Self::BlackMage(class) => class,
            Self::Arcanist(class) => class,
            Self::Lancer(class) => class,
        }
    }
}

impl PlayerClass for ClassInstance {
    fn update(&mut self, dt: f32, ctx: &mut dyn ClassContext) {
        self.as_class_mut().update(dt, ctx);
    }

    fn try_use_ability(&mut self, slot: usize, ctx: &mut dyn ClassContext) -> bool {
        self.as_class_mut().try_use_ability(slot, ctx)
    }

    fn ability_statuses(&self) -> Vec<AbilityStatus> {
        self.as_class().ability_statuses()
    }

    fn gauge_state(&self) -> Option<GaugeState> {
        self.as_class().gauge_state()
    }

    fn cancel_cast(&mut self, ctx: &mut dyn ClassContext) {
        self.as_class_mut().cancel_cast(ctx);
    }
}
