//! Built-in systems for the arena world.
//!
//! - [`MovementSystem`]: integrates [`Motion`](crate::entity::Motion) into
//!   [`Transform`](crate::entity::Transform) positions
//! - [`TelegraphSystem`]: advances hazard wind-up timers
//! - [`CollisionSystem`]: detects overlapping colliders and reports pairs
//!
//! # Registration Order
//!
//! Register them in the order listed above. Collision must run after
//! movement so that it tests the positions for the current tick.

mod collision;
mod movement;
mod telegraph;

pub use collision::{detect_collision, CollisionListener, CollisionPair, CollisionSystem};
pub use movement::{step_motion, MovementSystem, MOTION_EPSILON};
pub use telegraph::{TelegraphListener, TelegraphSystem};
