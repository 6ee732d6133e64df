//! Property tests for the invariants the runtime promises.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use proptest::prelude::*;

use crate::classes::{
    AbilityDefinition, AbilityState, ActiveCast, CastBar, ClassId, PeriodicEffect, PlayerClass,
};
use crate::damage::{AbilityId, DamageEngine, DamageParams};
use crate::entity::{Blueprint, Collider, CollisionLayers, Transform};
use crate::systems::detect_collision;
use crate::tests::helpers::RecordingContext;
use crate::world::World;

fn vec3() -> impl Strategy<Value = Vec3> {
    (-20.0f32..20.0, -2.0f32..2.0, -20.0f32..20.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn collider() -> impl Strategy<Value = Collider> {
    (0.01f32..5.0, any::<u32>(), any::<u32>()).prop_map(|(radius, layer, mask)| Collider {
        radius,
        layer: CollisionLayers::from_bits_retain(layer),
        mask: CollisionLayers::from_bits_retain(mask),
    })
}

proptest! {
    #[test]
    fn collision_is_symmetric_and_exact(
        a_position in vec3(),
        a in collider(),
        b_position in vec3(),
        b in collider(),
    ) {
        let forward = detect_collision(a_position, &a, b_position, &b);
        let backward = detect_collision(b_position, &b, a_position, &a);
        prop_assert_eq!(forward, backward);

        let expected = a.accepts(&b) && a_position.distance(b_position) <= a.radius + b.radius;
        prop_assert_eq!(forward.is_some(), expected);
        if let Some((_, overlap)) = forward {
            prop_assert!(overlap >= 0.0);
        }
    }

    #[test]
    fn destroy_twice_equals_once(count in 1usize..20, picks in prop::collection::vec(0usize..20, 1..10)) {
        let mut world = World::new();
        let blueprint = Blueprint::new("sample").with(Transform::default());
        let ids: Vec<_> = (0..count).map(|_| world.spawn(&blueprint)).collect();

        let mut destroyed = std::collections::BTreeSet::new();
        for pick in picks {
            let id = ids[pick % count];
            let first = world.destroy(id);
            prop_assert_eq!(first, destroyed.insert(id));
            prop_assert!(!world.destroy(id));
        }

        world.update(0.1);
        prop_assert_eq!(world.entity_count(), count - destroyed.len());
        for id in destroyed {
            prop_assert!(world.get(id).is_none());
        }
    }

    #[test]
    fn resolve_runs_pipeline_once(base in 0.0f32..500.0, modifiers in 0usize..5, calls in 1usize..10) {
        let runs = Rc::new(Cell::new(0));
        let engine = DamageEngine::new();
        for _ in 0..modifiers {
            let runs = Rc::clone(&runs);
            engine.register_modifier(move |ctx| {
                runs.set(runs.get() + 1);
                ctx.amount *= 1.5;
            });
        }
        let instance = engine.create_instance(DamageParams::new(AbilityId::from_static("sample"), base));

        let first = instance.resolve().clone();
        for _ in 0..calls {
            prop_assert_eq!(instance.resolve(), &first);
        }
        prop_assert_eq!(runs.get(), modifiers);
    }

    #[test]
    fn cooldown_never_negative(cooldown in 0.0f32..30.0, steps in prop::collection::vec(0.0f32..5.0, 1..50)) {
        let mut state = AbilityState::new(AbilityDefinition::new(AbilityId::from_static("sample"), 1, cooldown));
        state.start_cooldown();
        for dt in steps {
            state.tick(dt);
            prop_assert!(state.remaining_cooldown() >= 0.0);
        }
    }

    #[test]
    fn periodic_ticks_do_not_depend_on_frame_size(
        ticks in 1u32..20,
        interval in prop::sample::select(vec![0.25f32, 0.5, 1.0, 2.0]),
        steps in prop::collection::vec(0.001f32..5.0, 1..20),
    ) {
        #[allow(clippy::cast_precision_loss)]
        let mut effect = PeriodicEffect::start(ticks as f32 * interval, interval);
        let mut fired = 0;
        let mut index = 0;
        while effect.is_active() {
            fired += effect.advance(steps[index % steps.len()]);
            index += 1;
        }
        prop_assert_eq!(fired, ticks);
    }

    #[test]
    fn second_cast_is_rejected(first in 0.1f32..5.0, second in 0.1f32..5.0, dt in 0.0f32..0.09) {
        let mut ctx = RecordingContext::new();
        let mut bar = CastBar::new();
        prop_assert!(bar.begin(ActiveCast::new(0, first, 10.0, ()), &mut ctx));
        bar.advance(dt, &mut ctx);
        let elapsed = bar.active().map(|cast| cast.elapsed);

        prop_assert!(!bar.begin(ActiveCast::new(1, second, 20.0, ()), &mut ctx));
        let active = bar.active().unwrap();
        prop_assert_eq!(active.slot, 0);
        prop_assert_eq!(Some(active.elapsed), elapsed);
    }

    #[test]
    fn zero_dt_leaves_every_class_unchanged(seed in any::<u64>(), warmup in 0.0f32..2.0) {
        for id in ClassId::ALL {
            let mut ctx = RecordingContext::new();
            let mut class = id.instantiate(seed);
            class.try_use_ability(0, &mut ctx);
            class.update(warmup, &mut ctx);

            let statuses = class.ability_statuses();
            let gauge = class.gauge_state();
            let projectiles = ctx.projectiles.len();
            let melee = ctx.melee.len();
            let dealt = ctx.dealt.len();

            class.update(0.0, &mut ctx);
            prop_assert_eq!(class.ability_statuses(), statuses, "{} statuses", id);
            prop_assert_eq!(class.gauge_state(), gauge, "{} gauge", id);
            prop_assert_eq!(ctx.projectiles.len(), projectiles);
            prop_assert_eq!(ctx.melee.len(), melee);
            prop_assert_eq!(ctx.dealt.len(), dealt);
        }
    }
}
