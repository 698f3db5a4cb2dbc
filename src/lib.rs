//! Serpents - A grid-based arcade snake
//!
//! Core modules:
//! - `sim`: Deterministic simulation (snake, critters, bonuses, obstacles)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Top-N leaderboard collaborator

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Map dimensions in cells
    pub const MAP_WIDTH: i32 = 28;
    pub const MAP_HEIGHT: i32 = 12;

    /// Snake speed range (arbitrary units, higher is faster)
    pub const MIN_SPEED: f32 = 1.0;
    pub const MAX_SPEED: f32 = 200.0;
    /// Snake starts at this fraction of the speed range
    pub const START_SPEED_RATIO: f32 = 0.7;
    /// Passive speed ramp while running
    pub const SPEED_INCREASE_PER_SECOND: f32 = 0.8;

    /// Move interval at the bottom of the speed range
    pub const MAX_INTERVAL_MS: f32 = 500.0;
    /// Move interval at the top of the speed range
    pub const MIN_INTERVAL_MS: f32 = 33.0;

    /// Spawn cell and length of a fresh snake
    pub const START_X: i32 = 10;
    pub const START_Y: i32 = 8;
    pub const START_LENGTH: usize = 5;

    /// Bonus population and lifecycle
    pub const MIN_BONUSES: usize = 1;
    pub const MAX_BONUSES: usize = 3;
    pub const BONUS_SPAWN_CHANCE_PER_SECOND: f32 = 0.21;
    pub const BONUS_TO_OBSTACLE_CHANCE: f32 = 0.58;
    pub const BONUS_BASE_LIFETIME_MS: f32 = 8500.0;
    pub const BONUS_LIFETIME_JITTER_MS: f32 = 3000.0;
    pub const BONUS_WARNING_MS: f32 = 3000.0;
    pub const BONUS_SLOWDOWN: f32 = 1.0;
    pub const OBSTACLE_KINDS: u8 = 4;

    /// Critter population and behaviour
    pub const MIN_CRITTERS: usize = 0;
    pub const MAX_CRITTERS: usize = 2;
    pub const CRITTER_SPAWN_CHANCE_PER_SECOND: f32 = 0.14;
    pub const CRITTER_TURN_CHANCE: f32 = 0.2;
    pub const CRITTER_MIN_SPEED: f32 = 1.0;
    pub const CRITTER_MAX_SPEED: f32 = 3.0;
    pub const CRITTER_SCORE: u32 = 10;
    pub const CRITTER_SLOWDOWN: f32 = 2.0;
}

/// Linear speed -> move interval mapping shared by the snake and critters.
///
/// Higher speed gives a shorter interval. `speed` is expected to be already
/// clamped by the caller.
#[inline]
pub fn move_interval_ms(speed: f32, speed_range: f32, min_interval: f32, max_interval: f32) -> f32 {
    let ratio = if speed_range > 0.0 { speed / speed_range } else { 1.0 };
    max_interval - (max_interval - min_interval) * ratio
}
