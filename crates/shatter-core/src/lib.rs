//! # Shatter Core
//!
//! Simulation core for a top-down arena combat game.
//!
//! The crate carries the logic only; rendering, HUD widgets and keyboard
//! mapping live elsewhere and talk to it through [`game::Game`].
//!
//! ## Architecture
//!
//! - **ECS runtime** ([`world`], [`entity`], [`system`], [`systems`]):
//!   entities are ids plus a bag of typed components, built from
//!   [`entity::Blueprint`]s and stepped by systems in registration order.
//!   Destruction is deferred to the end of the tick.
//! - **Class state machines** ([`classes`]): four classes with cooldowns,
//!   interruptible casts and class resources. They reach the game only
//!   through [`classes::ClassContext`].
//! - **Damage resolution** ([`damage`]): damage instances resolve once
//!   through a modifier pipeline and feed a DPS meter.
//!
//! ## Usage
//!
//! ```
//! use shatter_core::classes::ClassId;
//! use shatter_core::config::GameConfig;
//! use shatter_core::game::{Game, InputState};
//!
//! let config = GameConfig {
//!     starting_class: ClassId::BlackMage,
//!     ..GameConfig::default()
//! };
//! let mut game = Game::new(config)?;
//! game.update(1.0 / 60.0, &InputState::default().with_ability(0));
//! assert!(game.hud_state().cast_progress.is_some());
//! # Ok::<(), shatter_core::error::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod blueprints;
pub mod classes;
pub mod config;
pub mod damage;
pub mod entity;
pub mod error;
pub mod frame;
pub mod game;
pub mod spatial;
pub mod system;
pub mod systems;
pub mod world;

#[cfg(test)]
mod tests;

pub use config::GameConfig;
pub use entity::{Blueprint, Entity, EntityId};
pub use error::{ClassError, ConfigError};
pub use game::{Game, GameEvent, InputState};
pub use system::System;
pub use world::World;
