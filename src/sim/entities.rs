//! Bonuses, critters and obstacles sharing the map with the snake

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::grid::Cell;
use super::snake::Snake;

/// Bonus effect classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Apple,
    Grapes,
    Cherry,
    Star,
}

impl BonusKind {
    /// Every kind, in spawn-table order
    pub const ALL: [BonusKind; 4] = [
        BonusKind::Apple,
        BonusKind::Grapes,
        BonusKind::Cherry,
        BonusKind::Star,
    ];

    /// Segments gained when eaten
    pub fn growth(&self) -> usize {
        match self {
            BonusKind::Grapes => 2,
            BonusKind::Apple | BonusKind::Cherry | BonusKind::Star => 1,
        }
    }

    /// Points awarded when eaten
    pub fn score(&self) -> u32 {
        match self {
            BonusKind::Apple => 2,
            BonusKind::Grapes => 1,
            BonusKind::Cherry => 2,
            BonusKind::Star => 3,
        }
    }

    /// Stable per-kind index, for renderers picking a sprite and for event logs
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// A timed pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bonus {
    pub id: u32,
    pub cell: Cell,
    pub kind: BonusKind,
    /// Total lifetime this bonus spawned with (ms)
    pub lifetime_ms: f32,
    /// Counts down to zero (ms)
    pub remaining_ms: f32,
    pub picked: bool,
}

impl Bonus {
    pub fn new(id: u32, cell: Cell, kind: BonusKind, lifetime_ms: f32) -> Self {
        Self {
            id,
            cell,
            kind,
            lifetime_ms,
            remaining_ms: lifetime_ms,
            picked: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms <= 0.0
    }

    /// Done with: about to be removed at the end of this tick
    pub fn is_finished(&self) -> bool {
        self.picked || self.is_expired()
    }

    pub fn is_warning(&self, warning_ms: f32) -> bool {
        self.remaining_ms < warning_ms
    }

    /// Count the lifetime down; true if anything a renderer cares about changed
    pub fn update(&mut self, delta_ms: f32, warning_ms: f32) -> bool {
        let before = self.remaining_ms;
        self.remaining_ms -= delta_ms;

        if self.is_expired() {
            return true;
        }
        if self.remaining_ms < warning_ms && before >= warning_ms {
            log::debug!("{:?} bonus {} is about to expire", self.kind, self.id);
            return true;
        }
        self.picked
    }

    /// Feed this bonus to `snake`
    pub fn apply(&self, snake: &mut Snake, slowdown: f32) {
        for _ in 0..self.kind.growth() {
            snake.grow();
        }
        snake.score += self.kind.score();
        snake.decrease_speed(slowdown);
    }
}

/// A wandering edible creature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Critter {
    pub id: u32,
    pub cell: Cell,
    pub speed: f32,
    pub direction: Direction,
    /// Time banked toward the next step (ms)
    pub accumulator_ms: f32,
}

impl Critter {
    pub fn new(id: u32, cell: Cell, speed: f32, direction: Direction) -> Self {
        Self {
            id,
            cell,
            speed,
            direction,
            accumulator_ms: 0.0,
        }
    }
}

/// Permanent hazard, usually a bonus left to rot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub cell: Cell,
    /// Visual variant
    pub kind: u8,
}
