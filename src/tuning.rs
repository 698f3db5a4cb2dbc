//! Game balance and configuration
//!
//! Every number the simulation uses lives here so runs can be tuned from a
//! JSON file without recompiling. Missing fields fall back to [`crate::consts`].

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Map ===
    pub map_width: i32,
    pub map_height: i32,
    /// Leaving the map kills the snake instead of wrapping
    pub solid_borders: bool,

    // === Snake ===
    pub min_speed: f32,
    pub max_speed: f32,
    pub start_speed_ratio: f32,
    pub speed_increase_per_second: f32,
    pub min_interval_ms: f32,
    pub max_interval_ms: f32,
    pub start_x: i32,
    pub start_y: i32,
    pub start_length: usize,

    // === Bonuses ===
    pub min_bonuses: usize,
    pub max_bonuses: usize,
    pub bonus_spawn_chance_per_second: f32,
    pub bonus_to_obstacle_chance: f32,
    pub bonus_base_lifetime_ms: f32,
    pub bonus_lifetime_jitter_ms: f32,
    /// Remaining lifetime below which a bonus is flagged as expiring
    pub bonus_warning_ms: f32,
    pub bonus_slowdown: f32,
    pub obstacle_kinds: u8,

    // === Critters ===
    pub min_critters: usize,
    pub max_critters: usize,
    pub critter_spawn_chance_per_second: f32,
    pub critter_turn_chance: f32,
    pub critter_min_speed: f32,
    pub critter_max_speed: f32,
    pub critter_score: u32,
    pub critter_slowdown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            solid_borders: false,

            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,
            start_speed_ratio: START_SPEED_RATIO,
            speed_increase_per_second: SPEED_INCREASE_PER_SECOND,
            min_interval_ms: MIN_INTERVAL_MS,
            max_interval_ms: MAX_INTERVAL_MS,
            start_x: START_X,
            start_y: START_Y,
            start_length: START_LENGTH,

            min_bonuses: MIN_BONUSES,
            max_bonuses: MAX_BONUSES,
            bonus_spawn_chance_per_second: BONUS_SPAWN_CHANCE_PER_SECOND,
            bonus_to_obstacle_chance: BONUS_TO_OBSTACLE_CHANCE,
            bonus_base_lifetime_ms: BONUS_BASE_LIFETIME_MS,
            bonus_lifetime_jitter_ms: BONUS_LIFETIME_JITTER_MS,
            bonus_warning_ms: BONUS_WARNING_MS,
            bonus_slowdown: BONUS_SLOWDOWN,
            obstacle_kinds: OBSTACLE_KINDS,

            min_critters: MIN_CRITTERS,
            max_critters: MAX_CRITTERS,
            critter_spawn_chance_per_second: CRITTER_SPAWN_CHANCE_PER_SECOND,
            critter_turn_chance: CRITTER_TURN_CHANCE,
            critter_min_speed: CRITTER_MIN_SPEED,
            critter_max_speed: CRITTER_MAX_SPEED,
            critter_score: CRITTER_SCORE,
            critter_slowdown: CRITTER_SLOWDOWN,
        }
    }
}

impl Tuning {
    /// Width of the speed range; the denominator of the interval formula
    pub fn speed_range(&self) -> f32 {
        self.max_speed - self.min_speed
    }

    /// Speed a fresh snake starts with
    pub fn start_speed(&self) -> f32 {
        self.speed_range() * self.start_speed_ratio + self.min_speed
    }

    /// Clamp a speed into `[min_speed, max_speed]`
    pub fn clamp_speed(&self, speed: f32) -> f32 {
        speed.clamp(self.min_speed, self.max_speed)
    }

    /// Move interval for an entity travelling at `speed`
    pub fn move_interval_ms(&self, speed: f32) -> f32 {
        crate::move_interval_ms(
            speed,
            self.speed_range(),
            self.min_interval_ms,
            self.max_interval_ms,
        )
    }

    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a file, falling back to defaults if it doesn't exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => {
                let tuning = Self::from_json(&json)?;
                log::info!("Loaded tuning from {}", path.as_ref().display());
                Ok(tuning)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No tuning file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: &str| Err(TuningError::Invalid(msg.to_string()));

        if self.map_width < 2 || self.map_height < 2 {
            return invalid("map must be at least 2x2");
        }
        if !(0..self.map_width).contains(&self.start_x) || !(0..self.map_height).contains(&self.start_y) {
            return invalid("start cell must lie inside the map");
        }
        if self.start_length == 0 {
            return invalid("start length must be at least 1");
        }
        if self.min_speed >= self.max_speed {
            return invalid("min speed must be below max speed");
        }
        if self.min_interval_ms <= 0.0 || self.min_interval_ms > self.max_interval_ms {
            return invalid("interval range must be positive and ordered");
        }
        if !(0.0..=1.0).contains(&self.start_speed_ratio) {
            return invalid("start speed ratio must be between 0.0 and 1.0");
        }
        if self.min_bonuses > self.max_bonuses {
            return invalid("min bonuses exceeds max bonuses");
        }
        if self.min_critters > self.max_critters {
            return invalid("min critters exceeds max critters");
        }
        if self.obstacle_kinds == 0 {
            return invalid("obstacle kind count must be positive");
        }
        if self.critter_min_speed >= self.critter_max_speed {
            return invalid("critter speed range is empty");
        }
        for chance in [
            self.bonus_to_obstacle_chance,
            self.critter_turn_chance,
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return invalid("probabilities must be between 0.0 and 1.0");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_start_speed_is_seventy_percent() {
        let tuning = Tuning::default();
        assert!((tuning.start_speed() - (199.0 * 0.7 + 1.0)).abs() < 0.001);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "map_width": 40, "solid_borders": true }"#).unwrap();
        assert_eq!(tuning.map_width, 40);
        assert!(tuning.solid_borders);
        assert_eq!(tuning.map_height, MAP_HEIGHT);
        assert_eq!(tuning.max_bonuses, MAX_BONUSES);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let result = Tuning::from_json(r#"{ "min_bonuses": 5, "max_bonuses": 2 }"#);
        assert!(matches!(result, Err(TuningError::Invalid(_))));

        let result = Tuning::from_json("not json");
        assert!(matches!(result, Err(TuningError::Parse(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tuning = Tuning::load("/definitely/not/here/tuning.json").unwrap();
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_clamp_speed() {
        let tuning = Tuning::default();
        assert_eq!(tuning.clamp_speed(-5.0), tuning.min_speed);
        assert_eq!(tuning.clamp_speed(1000.0), tuning.max_speed);
        assert_eq!(tuning.clamp_speed(50.0), 50.0);
    }
}
