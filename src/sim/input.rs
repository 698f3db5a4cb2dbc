//! Abstract player intents and direction buffering
//!
//! The simulation never sees keyboards, gamepads or touch zones, only
//! [`Intent`]s pushed in through `Game::on_key_down` and directions polled
//! from registered [`InputSource`]s.

use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// A single player intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Up,
    Down,
    Left,
    Right,
    /// Toggle pause
    Pause,
}

impl Intent {
    /// Parse the collaborator-facing action names
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Intent::Up),
            "down" => Some(Intent::Down),
            "left" => Some(Intent::Left),
            "right" => Some(Intent::Right),
            "space" => Some(Intent::Pause),
            _ => None,
        }
    }

    /// Direction carried by this intent, if any
    pub fn direction(self) -> Option<Direction> {
        match self {
            Intent::Up => Some(Direction::Up),
            Intent::Down => Some(Direction::Down),
            Intent::Left => Some(Direction::Left),
            Intent::Right => Some(Direction::Right),
            Intent::Pause => None,
        }
    }
}

/// A polled input device (gamepad axes, held touch zones, autopilots)
pub trait InputSource {
    /// Is `direction` currently requested?
    fn is_pressed(&mut self, direction: Direction) -> bool;
}

/// Depth-2 queue of heading changes ahead of the one currently executing
///
/// Slot 0 is committed on the next move, slot 1 is promoted after it. Holding
/// only two slots caps buffered input at one turn beyond the pending one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionQueue {
    slots: [Option<Direction>; 2],
}

impl DirectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next direction to commit
    pub fn cached(&self) -> Option<Direction> {
        self.slots[0]
    }

    /// Direction waiting behind the cached one
    pub fn queued(&self) -> Option<Direction> {
        self.slots[1]
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    /// Offer a direction while travelling along `heading`
    ///
    /// An empty queue only takes an actual turn (not the heading, not its
    /// reverse). Once a turn is cached the newest offer replaces slot 1.
    pub fn offer(&mut self, direction: Direction, heading: Direction) {
        if direction == Direction::None {
            return;
        }
        match self.slots[0] {
            None => {
                if direction != heading && !heading.is_opposite(direction) {
                    self.slots[0] = Some(direction);
                }
            }
            Some(_) => self.slots[1] = Some(direction),
        }
    }

    /// Pop the cached direction for a committed move and return the new heading
    ///
    /// A reversal relative to `heading` is dropped silently.
    pub fn commit(&mut self, heading: Direction) -> Direction {
        let next = match self.slots[0] {
            Some(d) if d != Direction::None && !heading.is_opposite(d) => d,
            _ => heading,
        };
        self.slots = [self.slots[1], None];
        next
    }
}
