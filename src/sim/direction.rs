//! Grid directions
//!
//! Screen convention: `y` grows downward, so `Up` is `dy = -1`.

use serde::{Deserialize, Serialize};

/// Heading of a snake segment or critter; `None` before any movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
    #[default]
    None,
}

impl Direction {
    /// The four directions an entity can actually move in
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// Reverse heading; `None` maps to itself
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    /// True only for the two cardinal pairs pointing away from each other
    pub fn is_opposite(self, other: Direction) -> bool {
        self != Direction::None && self.opposite() == other
    }

    /// Column step for one move
    pub fn delta_x(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            _ => 0,
        }
    }

    /// Row step for one move
    pub fn delta_y(self) -> i32 {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
            _ => 0,
        }
    }

    /// Lowercase name, matching the key names accepted by [`super::Intent::from_name`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Left => "left",
            Direction::Down => "down",
            Direction::Right => "right",
            Direction::None => "none",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
