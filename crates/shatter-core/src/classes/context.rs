//! The boundary between class state machines and the game.
//!
//! Classes never touch the [`World`](crate::world::World) directly. Everything
//! they need to read (positions, movement) and every side effect they produce
//! (projectiles, melee swings, cast bar, damage) goes through a
//! [`ClassContext`] supplied by the caller for the duration of one call.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::damage::{DamageInstance, DamageParams, DamageResult};

/// Services a class may use while updating or firing an ability.
pub trait ClassContext {
    /// Current player position.
    fn player_position(&self) -> Vec3;

    /// Current position of the encounter target.
    fn target_position(&self) -> Vec3;

    /// True when the player is moving fast enough to interrupt casts.
    fn is_player_moving(&self) -> bool;

    /// Launches a projectile.
    fn spawn_projectile(&mut self, origin: Vec3, velocity: Vec3, spawn: ProjectileSpawn);

    /// Plays a melee swing or thrust.
    fn play_melee_attack(&mut self, attack: MeleeAttack);

    /// Shows (`Some`) or hides (`None`) the cast bar.
    fn set_cast_progress(&mut self, progress: Option<f32>);

    /// Declares a damage instance through the game's damage engine.
    fn create_damage_instance(&self, params: DamageParams) -> DamageInstance;

    /// Applies damage to the target and returns the resolved result.
    fn deal_damage(&mut self, instance: &DamageInstance) -> DamageResult;
}

// =============================================================================
// Projectiles
// =============================================================================

/// Cosmetic motion layered on top of a projectile's linear flight.
///
/// Visuals only change where a projectile is *displayed*; the game tests hits
/// against the displayed position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ProjectileVisual {
    /// No extra motion.
    #[default]
    Plain,
    /// Scale oscillates as `1 + strength * sin(age * rate)`.
    Pulse {
        /// Angular rate in radians per second.
        rate: f32,
        /// Relative amplitude.
        strength: f32,
    },
    /// Sideways weave along `lateral` that fades out over the lifetime.
    Wave {
        /// Unit direction of the weave.
        lateral: Vec3,
        /// Peak sideways offset in world units.
        amplitude: f32,
        /// Angular rate in radians per second.
        frequency: f32,
        /// Phase offset in radians.
        phase: f32,
    },
}

impl ProjectileVisual {
    /// Offset from the flight path at `age` for a projectile living `lifetime`.
    #[must_use]
    pub fn display_offset(&self, age: f32, lifetime: f32) -> Vec3 {
        match *self {
            Self::Plain | Self::Pulse { .. } => Vec3::ZERO,
            Self::Wave {
                lateral,
                amplitude,
                frequency,
                phase,
            } => {
                let progress = if lifetime > 0.0 {
                    (age / lifetime).min(1.0)
                } else {
                    1.0
                };
                lateral * ((age * frequency + phase).sin() * amplitude * (1.0 - progress))
            }
        }
    }

    /// Multiplier applied to the base scale at `age`.
    #[must_use]
    pub fn scale_factor(&self, age: f32) -> f32 {
        match *self {
            Self::Pulse { rate, strength } => 1.0 + strength * (age * rate).sin(),
            Self::Plain | Self::Wave { .. } => 1.0,
        }
    }
}

/// Options for a projectile launched by a class.
#[derive(Debug)]
pub struct ProjectileSpawn {
    /// Base display scale.
    pub scale: f32,
    /// Display colour as `0xRRGGBB`.
    pub color: Option<u32>,
    /// Damage applied on hit. `None` makes a purely cosmetic projectile.
    pub damage: Option<DamageInstance>,
    /// Seconds before the projectile expires.
    pub lifetime: f32,
    /// Cosmetic motion.
    pub visual: ProjectileVisual,
}

impl ProjectileSpawn {
    /// Default projectile lifetime in seconds.
    pub const DEFAULT_LIFETIME: f32 = 2.0;

    /// Creates a projectile carrying `damage`.
    #[must_use]
    pub fn with_damage(damage: DamageInstance) -> Self {
        Self {
            damage: Some(damage),
            ..Self::default()
        }
    }

    /// Sets the base scale.
    #[must_use]
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the colour.
    #[must_use]
    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the lifetime.
    #[must_use]
    pub fn lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Sets the cosmetic motion.
    #[must_use]
    pub fn visual(mut self, visual: ProjectileVisual) -> Self {
        self.visual = visual;
        self
    }
}

impl Default for ProjectileSpawn {
    fn default() -> Self {
        Self {
            scale: 1.0,
            color: None,
            damage: None,
            lifetime: Self::DEFAULT_LIFETIME,
            visual: ProjectileVisual::Plain,
        }
    }
}

// =============================================================================
// Melee
// =============================================================================

/// Shape of a melee animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeleeStyle {
    /// Sweeping arc.
    Swing,
    /// Straight stab.
    Thrust,
}

/// A melee animation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeleeAttack {
    /// Unit planar direction toward the target.
    pub direction: Vec3,
    /// Sweep angle in radians, for swings.
    pub arc: Option<f32>,
    /// Animation length in seconds.
    pub duration: f32,
    /// Blade length in world units.
    pub length: f32,
    /// Blade width in world units.
    pub width: f32,
    /// Display colour as `0xRRGGBB`.
    pub color: u32,
    /// Animation shape.
    pub style: MeleeStyle,
}

// =============================================================================
// Aiming
// =============================================================================

/// Planar (y = 0) vector from the player to the target.
#[must_use]
pub fn planar_offset(ctx: &dyn ClassContext) -> Vec3 {
    let mut offset = ctx.target_position() - ctx.player_position();
    offset.y = 0.0;
    offset
}

/// Unit planar direction from the player to the target.
///
/// Returns `None` when the two coincide, which every class treats as a
/// rejection.
#[must_use]
pub fn aim_direction(ctx: &dyn ClassContext) -> Option<Vec3> {
    planar_offset(ctx).try_normalize()
}
