//! The system trait run by the [`World`] every tick.
//!
//! Systems are stateless between ticks (apart from reusable scratch buffers
//! and listeners). The world runs them in registration order, and that order
//! is load-bearing: a system sees every mutation made by the systems that ran
//! before it in the same tick. The arena registers movement, then telegraph,
//! then collision, so collision always tests post-movement positions.
//!
//! # Example
//!
//! ```
//! use shatter_core::system::System;
//! use shatter_core::world::World;
//!
//! struct CountTicks {
//!     ticks: u32,
//! }
//!
//! impl System for CountTicks {
//!     fn id(&self) -> &str {
//!         "count_ticks"
//!     }
//!
//!     fn update(&mut self, _world: &mut World, _dt: f32) {
//!         self.ticks += 1;
//!     }
//! }
//!
//! let mut world = World::new();
//! world.add_system(CountTicks { ticks: 0 });
//! world.update(1.0 / 60.0);
//! assert_eq!(world.system_ids(), vec!["count_ticks"]);
//! ```

use crate::world::World;

/// A per-tick transformer over world state.
pub trait System {
    /// Stable identifier used in logs.
    fn id(&self) -> &str;

    /// Called once when the system is added to a world.
    fn initialize(&mut self, _world: &mut World) {}

    /// Primary pass, run for every system in registration order.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Optional second pass, run after every system's `update`.
    fn post_update(&mut self, _world: &mut World, _dt: f32) {}
}
