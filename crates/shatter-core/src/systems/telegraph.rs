//! Hazard wind-up timers.

use tracing::debug;

use crate::entity::{ComponentKind, EntityId, Telegraph};
use crate::system::System;
use crate::world::World;

/// Callback invoked once when an entity's telegraph completes.
pub type TelegraphListener = Box<dyn FnMut(EntityId)>;

/// Advances every incomplete [`Telegraph`] and fires the completion listener.
#[derive(Default)]
pub struct TelegraphSystem {
    scratch: Vec<EntityId>,
    on_complete: Option<TelegraphListener>,
}

impl TelegraphSystem {
    /// Creates a telegraph system with no listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a telegraph system that reports completions to `listener`.
    #[must_use]
    pub fn with_listener(listener: impl FnMut(EntityId) + 'static) -> Self {
        Self {
            scratch: Vec::new(),
            on_complete: Some(Box::new(listener)),
        }
    }
}

impl System for TelegraphSystem {
    fn id(&self) -> &str {
        "telegraph"
    }

    fn update(&mut self, world: &mut World, dt: f32) {
        world.query_into(&[ComponentKind::Telegraph], &mut self.scratch);
        for &id in &self.scratch {
            let Some(entity) = world.get_mut(id) else {
                continue;
            };
            let telegraph = entity.get_mut::<Telegraph>();
            if telegraph.completed {
                continue;
            }
            telegraph.elapsed = (telegraph.elapsed + dt).min(telegraph.duration);
            if telegraph.elapsed >= telegraph.duration {
                telegraph.completed = true;
                debug!(entity = %id, "telegraph completed");
                if let Some(listener) = self.on_complete.as_mut() {
                    listener(id);
                }
            }
        }
    }
}

impl std::fmt::Debug for TelegraphSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegraphSystem")
            .field("has_listener", &self.on_complete.is_some())
            .finish()
    }
}
