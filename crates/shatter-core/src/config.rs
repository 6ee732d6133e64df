//! Tuning values for an arena session.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides:
//!
//! ```
//! use shatter_core::config::GameConfig;
//! use shatter_core::classes::ClassId;
//!
//! let config = GameConfig::from_json_str(r#"{
//!     "starting_class": "lancer",
//!     "player": { "max_speed": 8.0 }
//! }"#).unwrap();
//!
//! assert_eq!(config.starting_class, ClassId::Lancer);
//! assert_eq!(config.player.max_speed, 8.0);
//! assert_eq!(config.player.acceleration, 24.0);
//! ```

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::classes::ClassId;
use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Player movement and collider tuning.
    pub player: PlayerConfig,
    /// Playable area.
    pub arena: ArenaBounds,
    /// Target dummy placement.
    pub encounter: EncounterConfig,
    /// Frame pacing.
    pub timing: TimingConfig,
    /// Class selected at startup.
    pub starting_class: ClassId,
    /// Seed for every random roll in the session.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            arena: ArenaBounds::default(),
            encounter: EncounterConfig::default(),
            timing: TimingConfig::default(),
            starting_class: ClassId::Marksman,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`GameConfig::from_json_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let player = &self.player;
        non_negative("player.max_speed", player.max_speed)?;
        non_negative("player.acceleration", player.acceleration)?;
        non_negative("player.friction", player.friction)?;
        positive("player.collider_radius", player.collider_radius)?;
        non_negative("player.idle_speed_threshold", player.idle_speed_threshold)?;

        if self.arena.min_x >= self.arena.max_x || self.arena.min_z >= self.arena.max_z {
            return Err(ConfigError::Invalid {
                field: "arena",
                reason: format!("empty bounds {:?}", self.arena),
            });
        }
        if !self.arena.contains(player.spawn) {
            return Err(ConfigError::Invalid {
                field: "player.spawn",
                reason: format!("{} lies outside the arena", player.spawn),
            });
        }

        positive("encounter.hit_radius", self.encounter.hit_radius)?;
        positive("timing.max_frame_delta", self.timing.max_frame_delta)?;
        if !(0.0..=1.0).contains(&self.timing.fps_smoothing) {
            return Err(ConfigError::Invalid {
                field: "timing.fps_smoothing",
                reason: format!("{} is not within 0..=1", self.timing.fps_smoothing),
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is negative"),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} is not positive"),
        })
    }
}

/// Player token tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn and reset position.
    pub spawn: Vec3,
    /// Top speed in units per second.
    pub max_speed: f32,
    /// Exponential approach rate toward the input velocity.
    pub acceleration: f32,
    /// Exponential decay rate with no input.
    pub friction: f32,
    /// Collider radius.
    pub collider_radius: f32,
    /// Speed at or below which the player counts as standing still.
    pub idle_speed_threshold: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(-5.0, 0.0, 0.0),
            max_speed: 6.0,
            acceleration: 24.0,
            friction: 18.0,
            collider_radius: 0.45,
            idle_speed_threshold: 0.1,
        }
    }
}

/// Axis-aligned playable rectangle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaBounds {
    /// Lowest x.
    pub min_x: f32,
    /// Highest x.
    pub max_x: f32,
    /// Lowest z.
    pub min_z: f32,
    /// Highest z.
    pub max_z: f32,
}

impl ArenaBounds {
    /// True if `point` lies inside or on the boundary (y ignored).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_z..=self.max_z).contains(&point.z)
    }
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: -12.0,
            max_x: 12.0,
            min_z: -12.0,
            max_z: 12.0,
        }
    }
}

/// Target dummy placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    /// Encounter name, used in logs.
    pub id: String,
    /// Where the dummy stands.
    pub boss_position: Vec3,
    /// Planar distance under which a projectile hits the dummy.
    pub hit_radius: f32,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            id: "training-dummy".to_string(),
            boss_position: Vec3::ZERO,
            hit_radius: 0.35,
        }
    }
}

/// Frame pacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Longest step the simulation will take, in seconds.
    pub max_frame_delta: f32,
    /// Exponential smoothing factor for the FPS readout.
    pub fps_smoothing: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: 1.0 / 30.0,
            fps_smoothing: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.player.spawn, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(config.encounter.id, "training-dummy");
        assert!((config.timing.max_frame_delta - 1.0 / 30.0).abs() < 1e-7);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GameConfig::from_json_str("{ player: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_class_is_a_parse_error() {
        let err = GameConfig::from_json_str(r#"{ "starting_class": "paladin" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_speed_is_invalid() {
        let err = GameConfig::from_json_str(r#"{ "player": { "max_speed": -1.0 } }"#).unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "player.max_speed"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn empty_arena_is_invalid() {
        let mut config = GameConfig::default();
        config.arena.max_x = config.arena.min_x;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "arena", .. })
        ));
    }

    #[test]
    fn zero_frame_delta_is_invalid() {
        let mut config = GameConfig::default();
        config.timing.max_frame_delta = 0.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config value for timing.max_frame_delta: 0 is not positive"
        );
    }

    #[test]
    fn spawn_outside_arena_is_invalid() {
        let mut config = GameConfig::default();
        config.player.spawn = Vec3::new(50.0, 0.0, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "player.spawn",
                ..
            })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
