//! Frame orchestration for a training session.
//!
//! [`Game`] owns the [`World`], the active class and the damage meter, and
//! steps them in a fixed order every frame:
//!
//! 1. input intent becomes the player's target velocity
//! 2. [`World::update`] (movement, telegraphs, collision), then finished
//!    hazards go off
//! 3. the player is clamped to the arena
//! 4. the class ticks, then pressed ability slots fire in slot order
//! 5. projectiles fly, expire or hit the dummy
//! 6. the damage meter advances
//!
//! Nothing here renders. Presentation code drains [`GameEvent`]s and reads
//! [`Game::hud_state`].
//!
//! ```
//! use shatter_core::config::GameConfig;
//! use shatter_core::game::{Game, InputState};
//!
//! let mut game = Game::new(GameConfig::default()).unwrap();
//! let fire = InputState::default().with_ability(0);
//! game.update(1.0 / 60.0, &fire);
//! for _ in 0..120 {
//!     game.update(1.0 / 60.0, &InputState::default());
//! }
//!
//! assert!(game.tracker_state().total_damage > 0.0);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use serde::Serialize;
use tracing::{debug, trace};

use crate::blueprints;
use crate::classes::{
    AbilityStatus, ClassContext, ClassId, ClassInstance, GaugeState, MeleeAttack, PlayerClass,
    ProjectileSpawn, ProjectileVisual, SLOT_COUNT,
};
use crate::config::{ArenaBounds, GameConfig};
use crate::damage::{
    DamageEngine, DamageInstance, DamageParams, DamageResult, DamageTracker, DamageTrackerState,
};
use crate::entity::{Collider, ComponentKind, EntityId, Motion, Telegraph, Transform};
use crate::error::ConfigError;
use crate::spatial::SpatialIndex;
use crate::systems::{CollisionPair, CollisionSystem, MovementSystem, TelegraphSystem};
use crate::world::World;

/// Height at which projectiles fly.
pub const PROJECTILE_HEIGHT: f32 = 0.25;

// =============================================================================
// Input
// =============================================================================

/// Player intent for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    /// Move toward -z.
    pub up: bool,
    /// Move toward +z.
    pub down: bool,
    /// Move toward -x.
    pub left: bool,
    /// Move toward +x.
    pub right: bool,
    /// Ability slots pressed this frame.
    pub abilities: [bool; SLOT_COUNT],
}

impl InputState {
    /// Presses `slot`. Out-of-range slots are ignored.
    #[must_use]
    pub fn with_ability(mut self, slot: usize) -> Self {
        if let Some(pressed) = self.abilities.get_mut(slot) {
            *pressed = true;
        }
        self
    }

    /// Unit planar direction of the movement keys, or zero.
    #[must_use]
    pub fn movement_direction(&self) -> Vec3 {
        let axis = |positive: bool, negative: bool| match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };
        Vec3::new(axis(self.right, self.left), 0.0, axis(self.down, self.up)).normalize_or_zero()
    }
}

// =============================================================================
// Events and Snapshots
// =============================================================================

/// Something presentation code may want to show.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// The cast bar changed. `None` hides it.
    CastProgress {
        /// Fraction complete.
        progress: Option<f32>,
    },
    /// A projectile was launched.
    ProjectileSpawned {
        /// Projectile id.
        id: u64,
        /// Launch point.
        origin: Vec3,
        /// Planar velocity.
        velocity: Vec3,
        /// Base display scale.
        scale: f32,
        /// Display colour.
        color: Option<u32>,
    },
    /// A projectile expired (`hit == false`) or struck the dummy.
    ProjectileRemoved {
        /// Projectile id.
        id: u64,
        /// Whether it hit.
        hit: bool,
    },
    /// A melee animation should play.
    MeleeAttack(MeleeAttack),
    /// The dummy took damage.
    DamageDealt {
        /// Resolved hit.
        result: DamageResult,
        /// Where to show the number.
        position: Vec3,
    },
    /// The active class changed.
    ClassChanged {
        /// New class.
        class: ClassId,
    },
    /// A hazard finished winding up and was removed.
    HazardTriggered {
        /// The hazard entity.
        entity: EntityId,
        /// Colliders inside the blast that the hazard's mask accepts.
        caught: Vec<EntityId>,
    },
}

/// Everything the ability HUD and damage meter display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudState {
    /// Active class.
    pub class: ClassId,
    /// Slot statuses in slot order.
    pub abilities: Vec<AbilityStatus>,
    /// Class resource.
    pub gauge: Option<GaugeState>,
    /// Cast bar fraction, if casting.
    pub cast_progress: Option<f32>,
    /// Damage meter.
    pub tracker: DamageTrackerState,
    /// Hazards still winding up, in id order.
    pub telegraphs: Vec<TelegraphStatus>,
}

/// A pending hazard's wind-up as the HUD shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegraphStatus {
    /// The hazard entity.
    pub entity: EntityId,
    /// Where to draw the warning.
    pub position: Vec3,
    /// Label of the cue currently playing.
    pub label: Option<String>,
    /// Colour of the cue currently playing.
    pub color: Option<String>,
    /// Wind-up fraction in `0..=1`.
    pub progress: f32,
}

// =============================================================================
// Projectiles
// =============================================================================

/// A projectile in flight.
#[derive(Debug)]
pub struct Projectile {
    id: u64,
    position: Vec3,
    display_position: Vec3,
    velocity: Vec3,
    age: f32,
    lifetime: f32,
    scale: f32,
    color: Option<u32>,
    visual: ProjectileVisual,
    damage: Option<DamageInstance>,
}

impl Projectile {
    fn launch(id: u64, origin: Vec3, velocity: Vec3, spawn: ProjectileSpawn) -> Self {
        let position = Vec3::new(origin.x, PROJECTILE_HEIGHT, origin.z);
        Self {
            id,
            position,
            display_position: position,
            velocity: Vec3::new(velocity.x, 0.0, velocity.z),
            age: 0.0,
            lifetime: spawn.lifetime,
            scale: spawn.scale,
            color: spawn.color,
            visual: spawn.visual,
            damage: spawn.damage,
        }
    }

    /// Projectile id, unique within a session.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Position on the straight flight path.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Displayed position, including any weave. Hits are tested here.
    #[must_use]
    pub fn display_position(&self) -> Vec3 {
        self.display_position
    }

    /// Planar velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Seconds since launch.
    #[must_use]
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Seconds the projectile lives for.
    #[must_use]
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Current display scale, including any pulse.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale * self.visual.scale_factor(self.age)
    }

    /// Display colour.
    #[must_use]
    pub fn color(&self) -> Option<u32> {
        self.color
    }

    /// Cosmetic motion.
    #[must_use]
    pub fn visual(&self) -> ProjectileVisual {
        self.visual
    }

    /// Damage applied on hit.
    #[must_use]
    pub fn damage(&self) -> Option<&DamageInstance> {
        self.damage.as_ref()
    }

    /// Advances flight. Returns false once the projectile has expired.
    fn advance(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.position += self.velocity * dt;
        self.display_position = self.position + self.visual.display_offset(self.age, self.lifetime);
        self.age < self.lifetime
    }
}

// =============================================================================
// Game
// =============================================================================

/// A training session: one player, one dummy, one class.
pub struct Game {
    config: GameConfig,
    world: World,
    player: EntityId,
    boss: EntityId,
    class: ClassInstance,
    damage: DamageEngine,
    tracker: DamageTracker,
    projectiles: Vec<Projectile>,
    next_projectile_id: u64,
    events: Vec<GameEvent>,
    contacts: Rc<RefCell<Vec<CollisionPair>>>,
    triggered: Rc<RefCell<Vec<EntityId>>>,
    blast_index: SpatialIndex,
    scratch: Vec<EntityId>,
    player_moving: bool,
    cast_progress: Option<f32>,
}

impl Game {
    /// Builds a session from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let contacts = Rc::new(RefCell::new(Vec::new()));
        let triggered = Rc::new(RefCell::new(Vec::new()));

        let mut world = World::new();
        world.add_system(MovementSystem::new());
        let sink = Rc::clone(&triggered);
        world.add_system(TelegraphSystem::with_listener(move |id| sink.borrow_mut().push(id)));
        let sink = Rc::clone(&contacts);
        world.add_system(CollisionSystem::with_listener(move |pair, _world| {
            sink.borrow_mut().push(*pair);
        }));

        let player = world.spawn(&blueprints::player(&config.player));
        let boss = world.spawn(&blueprints::training_dummy(&config.encounter));
        let class = config.starting_class.instantiate(config.seed);
        debug!(class = %class.id(), encounter = %config.encounter.id, "game created");

        Ok(Self {
            config,
            world,
            player,
            boss,
            class,
            damage: DamageEngine::new(),
            tracker: DamageTracker::new(),
            projectiles: Vec::new(),
            next_projectile_id: 1,
            events: Vec::new(),
            contacts,
            triggered,
            blast_index: SpatialIndex::new(),
            scratch: Vec::new(),
            player_moving: false,
            cast_progress: None,
        })
    }

    /// Steps one frame. A non-positive `dt` is a no-op.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        if dt <= 0.0 {
            return;
        }

        let player = self.player;
        if let Some(motion) = self.world.get_mut(player).and_then(|e| e.try_get_mut::<Motion>()) {
            motion.target_velocity = input.movement_direction() * motion.max_speed;
        }

        self.contacts.borrow_mut().clear();
        self.world.update(dt);
        self.handle_triggered_hazards();
        self.enforce_arena_bounds();

        let threshold = self.config.player.idle_speed_threshold;
        self.player_moving = self
            .world
            .get(player)
            .and_then(|e| e.try_get::<Motion>())
            .is_some_and(|motion| motion.velocity.length_squared() > threshold * threshold);

        let (class, mut ctx) = self.split();
        class.update(dt, &mut ctx);
        for (slot, _) in input.abilities.iter().enumerate().filter(|(_, pressed)| **pressed) {
            if !class.try_use_ability(slot, &mut ctx) {
                trace!(slot, class = %class.id(), "ability rejected");
            }
        }

        self.update_projectiles(dt);
        self.tracker.update(dt);
    }

    /// Switches class, discarding the previous class's state.
    ///
    /// Returns false if `id` is already active.
    pub fn set_class(&mut self, id: ClassId) -> bool {
        if self.class.id() == id {
            return false;
        }
        self.class = id.instantiate(self.config.seed);
        self.player_moving = false;
        self.clear_cast_progress();
        self.events.push(GameEvent::ClassChanged { class: id });
        debug!(class = %id, "class changed");
        true
    }

    /// Puts the player back on the spawn point at rest, cancels any cast and
    /// clears projectiles in flight.
    pub fn reset_player(&mut self) {
        let spawn = self.config.player.spawn;
        if let Some(entity) = self.world.get_mut(self.player) {
            if let Some(motion) = entity.try_get_mut::<Motion>() {
                motion.velocity = Vec3::ZERO;
                motion.target_velocity = Vec3::ZERO;
            }
            if let Some(transform) = entity.try_get_mut::<Transform>() {
                transform.position = spawn;
            }
        }

        let (class, mut ctx) = self.split();
        class.cancel_cast(&mut ctx);
        self.clear_cast_progress();
        self.clear_projectiles();
        self.enforce_arena_bounds();
        debug!(position = %spawn, "player reset");
    }

    /// Clears the damage meter.
    pub fn reset_damage_tracking(&mut self) {
        self.tracker.reset();
    }

    /// Places a telegraphed hazard. It is removed when its wind-up completes.
    pub fn spawn_hazard(&mut self, position: Vec3) -> EntityId {
        self.world.spawn(&blueprints::hazard_orb(position))
    }

    /// Snapshot for the ability HUD and damage meter.
    #[must_use]
    pub fn hud_state(&self) -> HudState {
        HudState {
            class: self.class.id(),
            abilities: self.class.ability_statuses(),
            gauge: self.class.gauge_state(),
            cast_progress: self.cast_progress,
            tracker: self.tracker.state(),
            telegraphs: self.telegraph_statuses(),
        }
    }

    /// Takes every event emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Collider contacts reported during the most recent frame.
    #[must_use]
    pub fn contacts(&self) -> Vec<CollisionPair> {
        self.contacts.borrow().clone()
    }

    /// Current player position.
    #[must_use]
    pub fn player_position(&self) -> Vec3 {
        self.position_of(self.player).unwrap_or(self.config.player.spawn)
    }

    /// Current dummy position.
    #[must_use]
    pub fn boss_position(&self) -> Vec3 {
        self.position_of(self.boss).unwrap_or(self.config.encounter.boss_position)
    }

    /// Current player velocity.
    #[must_use]
    pub fn player_velocity(&self) -> Vec3 {
        self.world
            .get(self.player)
            .and_then(|e| e.try_get::<Motion>())
            .map_or(Vec3::ZERO, |motion| motion.velocity)
    }

    /// Whether the player moved fast enough last frame to interrupt casts.
    #[must_use]
    pub fn is_player_moving(&self) -> bool {
        self.player_moving
    }

    /// Projectiles in flight, oldest first.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Damage meter readings.
    #[must_use]
    pub fn tracker_state(&self) -> DamageTrackerState {
        self.tracker.state()
    }

    /// Active class.
    #[must_use]
    pub fn class(&self) -> &ClassInstance {
        &self.class
    }

    /// The damage engine, for registering modifiers.
    #[must_use]
    pub fn damage_engine(&self) -> &DamageEngine {
        &self.damage
    }

    /// The entity store.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Player entity id.
    #[must_use]
    pub fn player(&self) -> EntityId {
        self.player
    }

    /// Dummy entity id.
    #[must_use]
    pub fn boss(&self) -> EntityId {
        self.boss
    }

    /// Session config.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn position_of(&self, id: EntityId) -> Option<Vec3> {
        self.world
            .get(id)
            .and_then(|e| e.try_get::<Transform>())
            .map(|transform| transform.position)
    }

    /// Splits the class from everything it may touch through its context.
    fn split(&mut self) -> (&mut ClassInstance, FrameContext<'_>) {
        let ctx = FrameContext {
            player_position: self.player_position(),
            target_position: self.boss_position(),
            moving: self.player_moving,
            damage: &self.damage,
            tracker: &mut self.tracker,
            projectiles: &mut self.projectiles,
            next_projectile_id: &mut self.next_projectile_id,
            events: &mut self.events,
            cast_progress: &mut self.cast_progress,
        };
        (&mut self.class, ctx)
    }

    fn clear_cast_progress(&mut self) {
        if self.cast_progress.take().is_some() {
            self.events.push(GameEvent::CastProgress { progress: None });
        }
    }

    fn clear_projectiles(&mut self) {
        for projectile in self.projectiles.drain(..) {
            self.events.push(GameEvent::ProjectileRemoved {
                id: projectile.id,
                hit: false,
            });
        }
    }

    fn handle_triggered_hazards(&mut self) {
        let triggered = std::mem::take(&mut *self.triggered.borrow_mut());
        if triggered.is_empty() {
            return;
        }
        self.blast_index.rebuild_from(&self.world, &mut self.scratch);
        for entity in triggered {
            let caught = self.caught_by(entity);
            // A spent hazard cannot be caught by the next one.
            self.blast_index.remove(entity);
            self.world.destroy(entity);
            debug!(%entity, caught = caught.len(), "hazard triggered");
            self.events.push(GameEvent::HazardTriggered { entity, caught });
        }
    }

    fn caught_by(&self, hazard: EntityId) -> Vec<EntityId> {
        let (Some(area), Some(collider)) = (
            self.blast_index.get(hazard),
            self.world.get(hazard).and_then(|e| e.try_get::<Collider>()),
        ) else {
            return Vec::new();
        };
        self.blast_index
            .query_radius(area.position, area.radius)
            .into_iter()
            .filter(|&id| id != hazard)
            .filter(|&id| {
                self.world
                    .get(id)
                    .and_then(|e| e.try_get::<Collider>())
                    .is_some_and(|other| collider.accepts(other))
            })
            .collect()
    }

    fn telegraph_statuses(&self) -> Vec<TelegraphStatus> {
        self.world
            .query(&[ComponentKind::Transform, ComponentKind::Telegraph])
            .into_iter()
            .filter_map(|id| {
                let entity = self.world.get(id).filter(|e| e.is_alive())?;
                let telegraph = entity.get::<Telegraph>();
                if telegraph.completed {
                    return None;
                }
                let segment = telegraph.active_segment();
                Some(TelegraphStatus {
                    entity: id,
                    position: entity.get::<Transform>().position,
                    label: segment.map(|s| s.label.clone()),
                    color: segment.and_then(|s| s.color.clone()),
                    progress: telegraph.progress(),
                })
            })
            .collect()
    }

    fn enforce_arena_bounds(&mut self) {
        let bounds = self.config.arena;
        let Some(entity) = self.world.get_mut(self.player) else {
            return;
        };
        let mut position = entity.get::<Transform>().position;
        let mut velocity = entity.try_get::<Motion>().map_or(Vec3::ZERO, |m| m.velocity);
        if !clamp_to_arena(&bounds, &mut position, &mut velocity) {
            return;
        }
        entity.get_mut::<Transform>().position = position;
        if let Some(motion) = entity.try_get_mut::<Motion>() {
            motion.velocity = velocity;
        }
    }

    fn update_projectiles(&mut self, dt: f32) {
        let target = self.boss_position();
        let hit_radius = self.config.encounter.hit_radius;
        let mut index = 0;
        while index < self.projectiles.len() {
            let projectile = &mut self.projectiles[index];
            let alive = projectile.advance(dt);
            let hit = alive && {
                let mut offset = projectile.display_position - target;
                offset.y = 0.0;
                offset.length_squared() < hit_radius * hit_radius
            };
            if alive && !hit {
                index += 1;
                continue;
            }

            let projectile = self.projectiles.remove(index);
            if hit {
                trace!(id = projectile.id, "projectile hit");
                if let Some(damage) = &projectile.damage {
                    apply_damage(&mut self.tracker, &mut self.events, target, damage);
                }
            }
            self.events.push(GameEvent::ProjectileRemoved {
                id: projectile.id,
                hit,
            });
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("class", &self.class.id())
            .field("player", &self.player_position())
            .field("projectiles", &self.projectiles.len())
            .field("tracker", &self.tracker.state())
            .finish_non_exhaustive()
    }
}

/// Clamps `position` into `bounds`, zeroing velocity that points back out.
/// Returns whether anything changed.
fn clamp_to_arena(bounds: &ArenaBounds, position: &mut Vec3, velocity: &mut Vec3) -> bool {
    let mut clamped = false;
    if position.x < bounds.min_x {
        position.x = bounds.min_x;
        velocity.x = velocity.x.max(0.0);
        clamped = true;
    } else if position.x > bounds.max_x {
        position.x = bounds.max_x;
        velocity.x = velocity.x.min(0.0);
        clamped = true;
    }
    if position.z < bounds.min_z {
        position.z = bounds.min_z;
        velocity.z = velocity.z.max(0.0);
        clamped = true;
    } else if position.z > bounds.max_z {
        position.z = bounds.max_z;
        velocity.z = velocity.z.min(0.0);
        clamped = true;
    }
    clamped
}

/// Resolves `instance` against the dummy. Only the first resolution is
/// recorded on the meter.
fn apply_damage(
    tracker: &mut DamageTracker,
    events: &mut Vec<GameEvent>,
    position: Vec3,
    instance: &DamageInstance,
) -> DamageResult {
    let first = !instance.is_resolved();
    let result = instance.resolve().clone();
    if first {
        tracker.record(result.amount);
        events.push(GameEvent::DamageDealt {
            result: result.clone(),
            position,
        });
    }
    result
}

// =============================================================================
// Class Context
// =============================================================================

struct FrameContext<'a> {
    player_position: Vec3,
    target_position: Vec3,
    moving: bool,
    damage: &'a DamageEngine,
    tracker: &'a mut DamageTracker,
    projectiles: &'a mut Vec<Projectile>,
    next_projectile_id: &'a mut u64,
    events: &'a mut Vec<GameEvent>,
    cast_progress: &'a mut Option<f32>,
}

impl ClassContext for FrameContext<'_> {
    fn player_position(&self) -> Vec3 {
        self.player_position
    }

    fn target_position(&self) -> Vec3 {
        self.target_position
    }

    fn is_player_moving(&self) -> bool {
        self.moving
    }

    fn spawn_projectile(&mut self, origin: Vec3, velocity: Vec3, spawn: ProjectileSpawn) {
        let id = *self.next_projectile_id;
        *self.next_projectile_id += 1;
        let projectile = Projectile::launch(id, origin, velocity, spawn);
        self.events.push(GameEvent::ProjectileSpawned {
            id,
            origin: projectile.position,
            velocity: projectile.velocity,
            scale: projectile.scale,
            color: projectile.color,
        });
        self.projectiles.push(projectile);
    }

    fn play_melee_attack(&mut self, attack: MeleeAttack) {
        self.events.push(GameEvent::MeleeAttack(attack));
    }

    fn set_cast_progress(&mut self, progress: Option<f32>) {
        *self.cast_progress = progress;
        self.events.push(GameEvent::CastProgress { progress });
    }

    fn create_damage_instance(&self, params: DamageParams) -> DamageInstance {
        self.damage.create_instance(params)
    }

    fn deal_damage(&mut self, instance: &DamageInstance) -> DamageResult {
        apply_damage(self.tracker, self.events, self.target_position, instance)
    }
}
