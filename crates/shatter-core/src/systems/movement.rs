//! Velocity smoothing and position integration.
//!
//! Each tick, for every entity with a `Transform` and a `Motion`:
//!
//! 1. Clamp the target velocity to `max_speed` (when finite)
//! 2. With a target: approach it exponentially (`acceleration > 0`) or snap
//!    to it (`acceleration == 0`)
//! 3. Without a target: decay velocity by friction, snapping tiny speeds to 0
//! 4. Integrate `position += velocity * dt`
//!
//! The exponential forms make the result independent of how a span of time
//! is split into ticks, up to floating-point error.

use glam::Vec3;

use crate::entity::{ComponentKind, EntityId, Motion, Transform};
use crate::system::System;
use crate::world::World;

/// Squared-speed threshold below which a velocity counts as zero.
pub const MOTION_EPSILON: f32 = 1e-5;

/// Advances one entity's motion by `dt` and returns the displacement.
///
/// Pure helper used by [`MovementSystem`]; exposed for tests and tooling.
///
/// # Example
///
/// ```
/// use glam::Vec3;
/// use shatter_core::entity::Motion;
/// use shatter_core::systems::step_motion;
///
/// let mut motion = Motion { target_velocity: Vec3::X * 10.0, max_speed: 6.0, ..Motion::default() };
/// let displacement = step_motion(&mut motion, 0.5);
/// assert!((motion.velocity.x - 6.0).abs() < 1e-5);
/// assert!((displacement.x - 3.0).abs() < 1e-5);
/// ```
pub fn step_motion(motion: &mut Motion, dt: f32) -> Vec3 {
    let mut target = motion.target_velocity;
    if motion.max_speed.is_finite() {
        target = target.clamp_length_max(motion.max_speed.max(0.0));
    }

    if target.length_squared() > MOTION_EPSILON {
        if motion.acceleration > 0.0 {
            let blend = 1.0 - (-motion.acceleration * dt).exp();
            motion.velocity = motion.velocity.lerp(target, blend);
        } else {
            motion.velocity = target;
        }
    } else if motion.friction > 0.0 {
        motion.velocity *= (-motion.friction * dt).exp();
        if motion.velocity.length_squared() < MOTION_EPSILON {
            motion.velocity = Vec3::ZERO;
        }
    }

    motion.velocity * dt
}

/// Integrates motion for every entity holding `Transform` and `Motion`.
#[derive(Debug, Default)]
pub struct MovementSystem {
    scratch: Vec<EntityId>,
}

impl MovementSystem {
    /// Creates a movement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for MovementSystem {
    fn id(&self) -> &str {
        "movement"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        world.query_into(&[ComponentKind::Transform, ComponentKind::Motion], &mut self.scratch);
        for &id in &self.scratch {
            let Some(entity) = world.get_mut(id) else {
                continue;
            };
            let displacement = step_motion(entity.get_mut::<Motion>(), dt);
            entity.get_mut::<Transform>().position += displacement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Blueprint;

    const DT: f32 = 1.0 / 60.0;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    mod step_motion_tests {
        use super::*;

        #[test]
        fn snaps_to_target_without_acceleration() {
            let mut motion = Motion {
                target_velocity: Vec3::new(2.0, 0.0, 1.0),
                ..Motion::default()
            };
            let displacement = step_motion(&mut motion, 0.5);
            assert_eq!(motion.velocity, Vec3::new(2.0, 0.0, 1.0));
            assert_eq!(displacement, Vec3::new(1.0, 0.0, 0.5));
        }

        #[test]
        fn clamps_target_to_max_speed() {
            let mut motion = Motion {
                target_velocity: Vec3::new(30.0, 0.0, 40.0),
                max_speed: 5.0,
                ..Motion::default()
            };
            step_motion(&mut motion, DT);
            assert!((motion.velocity.length() - 5.0).abs() < 1e-5);
            // The stored target is intent and is not rewritten.
            assert_eq!(motion.target_velocity, Vec3::new(30.0, 0.0, 40.0));
        }

        #[test]
        fn acceleration_blends_exponentially() {
            let mut motion = Motion {
                target_velocity: Vec3::X * 6.0,
                acceleration: 24.0,
                ..Motion::default()
            };
            step_motion(&mut motion, 0.1);
            let expected = 6.0 * (1.0 - (-2.4_f32).exp());
            assert!((motion.velocity.x - expected).abs() < 1e-5);
        }

        #[test]
        fn acceleration_is_split_invariant() {
            let base = Motion {
                target_velocity: Vec3::Z * 4.0,
                acceleration: 10.0,
                ..Motion::default()
            };
            let mut once = base;
            step_motion(&mut once, 0.2);
            let mut twice = base;
            step_motion(&mut twice, 0.1);
            step_motion(&mut twice, 0.1);
            assert!(approx(once.velocity, twice.velocity));
        }

        #[test]
        fn friction_decays_and_snaps_to_zero() {
            let mut motion = Motion {
                velocity: Vec3::X * 6.0,
                friction: 18.0,
                ..Motion::default()
            };
            step_motion(&mut motion, 0.1);
            let expected = 6.0 * (-1.8_f32).exp();
            assert!((motion.velocity.x - expected).abs() < 1e-5);

            for _ in 0..60 {
                step_motion(&mut motion, DT);
            }
            assert_eq!(motion.velocity, Vec3::ZERO);
        }

        #[test]
        fn no_target_no_friction_coasts() {
            let mut motion = Motion {
                velocity: Vec3::X,
                ..Motion::default()
            };
            let displacement = step_motion(&mut motion, 2.0);
            assert_eq!(motion.velocity, Vec3::X);
            assert_eq!(displacement, Vec3::X * 2.0);
        }

        #[test]
        fn tiny_target_counts_as_no_target() {
            let mut motion = Motion {
                velocity: Vec3::X,
                target_velocity: Vec3::X * 1e-4,
                friction: 1.0,
                ..Motion::default()
            };
            step_motion(&mut motion, 0.5);
            assert!(motion.velocity.x < 1.0);
        }
    }

    #[test]
    fn system_moves_only_entities_with_both_components() {
        let mut world = World::new();
        let mover = world.spawn(
            &Blueprint::new("mover")
                .with(Transform::default())
                .with(Motion {
                    velocity: Vec3::X * 2.0,
                    ..Motion::default()
                }),
        );
        let statue = world.spawn(&Blueprint::new("statue").with(Transform::at(Vec3::Z)));
        world.add_system(MovementSystem::new());

        world.update(0.5);

        let position = world.get(mover).unwrap().get::<Transform>().position;
        assert!(approx(position, Vec3::X));
        assert_eq!(world.get(statue).unwrap().get::<Transform>().position, Vec3::Z);
    }
}
