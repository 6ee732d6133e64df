//! Ability slots, cooldowns and HUD snapshots.

use serde::{Deserialize, Serialize};

use crate::damage::AbilityId;

/// Number of ability slots every class exposes.
pub const SLOT_COUNT: usize = 4;

/// Cooldown given to unused slots.
pub const PLACEHOLDER_COOLDOWN: f32 = 5.0;

/// Static description of one ability slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Stable ability id.
    pub id: AbilityId,
    /// Key shown on the HUD (slot + 1).
    pub hotkey: u8,
    /// Cooldown started when the ability fires, in seconds.
    pub cooldown: f32,
    /// Declared base damage, when the ability deals any.
    pub base_damage: Option<f32>,
}

impl AbilityDefinition {
    /// Creates a definition with no declared damage.
    #[must_use]
    pub const fn new(id: AbilityId, hotkey: u8, cooldown: f32) -> Self {
        Self {
            id,
            hotkey,
            cooldown,
            base_damage: None,
        }
    }

    /// Declares base damage.
    #[must_use]
    pub const fn with_damage(mut self, base_damage: f32) -> Self {
        self.base_damage = Some(base_damage);
        self
    }

    /// An inert filler for an unused slot.
    #[must_use]
    pub fn placeholder(id: &'static str, hotkey: u8) -> Self {
        Self::new(AbilityId::from_static(id), hotkey, PLACEHOLDER_COOLDOWN)
    }
}

/// A definition paired with its running cooldown.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityState {
    definition: AbilityDefinition,
    remaining_cooldown: f32,
}

impl AbilityState {
    /// Creates a ready ability.
    #[must_use]
    pub const fn new(definition: AbilityDefinition) -> Self {
        Self {
            definition,
            remaining_cooldown: 0.0,
        }
    }

    /// The static definition.
    #[must_use]
    pub const fn definition(&self) -> &AbilityDefinition {
        &self.definition
    }

    /// Seconds until the ability is ready again. Never negative.
    #[must_use]
    pub const fn remaining_cooldown(&self) -> f32 {
        self.remaining_cooldown
    }

    /// True when the cooldown has run out.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.remaining_cooldown <= 0.0
    }

    /// Counts the cooldown down, flooring at zero.
    pub fn tick(&mut self, dt: f32) {
        if self.remaining_cooldown > 0.0 {
            self.remaining_cooldown = (self.remaining_cooldown - dt).max(0.0);
        }
    }

    /// Restarts the cooldown from the definition.
    pub fn start_cooldown(&mut self) {
        self.remaining_cooldown = self.definition.cooldown.max(0.0);
    }
}

/// The four slots of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityBar {
    slots: [AbilityState; SLOT_COUNT],
}

impl AbilityBar {
    /// Builds a bar from four definitions, in slot order.
    #[must_use]
    pub fn new(definitions: [AbilityDefinition; SLOT_COUNT]) -> Self {
        Self {
            slots: definitions.map(AbilityState::new),
        }
    }

    /// Borrows a slot, `None` for an unknown slot.
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&AbilityState> {
        self.slots.get(slot)
    }

    /// Mutably borrows a slot.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut AbilityState> {
        self.slots.get_mut(slot)
    }

    /// True when `slot` exists and is off cooldown.
    #[must_use]
    pub fn is_ready(&self, slot: usize) -> bool {
        self.get(slot).is_some_and(AbilityState::is_ready)
    }

    /// Declared base damage of `slot`; zero for unknown or harmless slots.
    #[must_use]
    pub fn base_damage(&self, slot: usize) -> f32 {
        self.get(slot)
            .and_then(|state| state.definition.base_damage)
            .unwrap_or(0.0)
    }

    /// Starts the cooldown of `slot`, if it exists.
    pub fn start_cooldown(&mut self, slot: usize) {
        if let Some(state) = self.get_mut(slot) {
            state.start_cooldown();
        }
    }

    /// Counts every cooldown down.
    pub fn tick(&mut self, dt: f32) {
        for state in &mut self.slots {
            state.tick(dt);
        }
    }

    /// HUD snapshots; `highlighted(slot)` marks slots with an active proc.
    #[must_use]
    pub fn statuses(&self, highlighted: impl Fn(usize) -> bool) -> Vec<AbilityStatus> {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, state)| AbilityStatus {
                id: state.definition.id.clone(),
                slot,
                hotkey: state.definition.hotkey,
                cooldown: state.definition.cooldown,
                remaining_cooldown: state.remaining_cooldown,
                highlighted: highlighted(slot),
            })
            .collect()
    }
}

/// HUD snapshot of one ability slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityStatus {
    /// Stable ability id.
    pub id: AbilityId,
    /// Slot index.
    pub slot: usize,
    /// Displayed key.
    pub hotkey: u8,
    /// Full cooldown.
    pub cooldown: f32,
    /// Seconds left on the cooldown.
    pub remaining_cooldown: f32,
    /// True when a proc makes this ability available or stronger.
    pub highlighted: bool,
}

/// A filled bar, used on its own or under a charge row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaugeBar {
    /// Current fill.
    pub current: f32,
    /// Full value.
    pub max: f32,
}

/// HUD snapshot of a class resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GaugeState {
    /// A single bar (Marksman focus).
    Bar {
        /// Current fill.
        current: f32,
        /// Full value.
        max: f32,
    },
    /// A row of pips with an optional bar underneath.
    Charges {
        /// Lit pips.
        current: u32,
        /// Total pips.
        max: u32,
        /// Secondary timer bar (Lancer bleed).
        secondary: Option<GaugeBar>,
    },
    /// Mana bar plus hunger stacks (Arcanist).
    ManaHunger {
        /// Current mana.
        mana_current: f32,
        /// Maximum mana.
        mana_max: f32,
        /// Current hunger stacks.
        hunger_current: u32,
        /// Maximum hunger stacks.
        hunger_max: u32,
    },
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn bar() -> AbilityBar {
        AbilityBar::new([
            AbilityDefinition::new(AbilityId::from_static("a"), 1, 1.0).with_damage(4.0),
            AbilityDefinition::new(AbilityId::from_static("b"), 2, 0.0),
            AbilityDefinition::placeholder("c", 3),
            AbilityDefinition::placeholder("d", 4),
        ])
    }

    #[test]
    fn cooldown_floors_at_zero() {
        let mut bar = bar();
        bar.start_cooldown(0);
        assert!(!bar.is_ready(0));
        bar.tick(0.4);
        assert!((bar.get(0).unwrap().remaining_cooldown() - 0.6).abs() < 1e-6);
        bar.tick(10.0);
        assert_eq!(bar.get(0).unwrap().remaining_cooldown(), 0.0);
        assert!(bar.is_ready(0));
    }

    #[test]
    fn base_damage_comes_from_the_definition() {
        let bar = bar();
        assert!((bar.base_damage(0) - 4.0).abs() < f32::EPSILON);
        assert!(bar.base_damage(1).abs() < f32::EPSILON);
        assert!(bar.base_damage(9).abs() < f32::EPSILON);
    }

    #[test]
    fn zero_cooldown_is_always_ready() {
        let mut bar = bar();
        bar.start_cooldown(1);
        assert!(bar.is_ready(1));
    }

    #[test]
    fn unknown_slot_is_never_ready() {
        let mut bar = bar();
        assert!(!bar.is_ready(SLOT_COUNT));
        bar.start_cooldown(SLOT_COUNT);
        assert!(bar.get(SLOT_COUNT).is_none());
    }

    #[test]
    fn statuses_follow_slots() {
        let statuses = bar().statuses(|slot| slot == 2);
        assert_eq!(statuses.len(), SLOT_COUNT);
        assert_eq!(statuses[2].id.as_str(), "c");
        assert_eq!(statuses[2].hotkey, 3);
        assert_eq!(statuses[2].cooldown, PLACEHOLDER_COOLDOWN);
        assert!(statuses[2].highlighted);
        assert!(!statuses[0].highlighted);
    }

    #[test]
    fn gauge_serializes_with_type_tag() {
        let gauge = GaugeState::Charges {
            current: 2,
            max: 4,
            secondary: Some(GaugeBar {
                current: 3.0,
                max: 8.0,
            }),
        };
        let json = serde_json::to_value(gauge).unwrap();
        assert_eq!(json["type"], "charges");
        assert_eq!(json["secondary"]["max"], 8.0);
    }
}
