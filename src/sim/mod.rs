//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Wall-clock deltas in, normalized to per-entity move intervals
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod direction;
pub mod entities;
pub mod grid;
pub mod input;
pub mod snake;
pub mod state;
mod tick;

pub use direction::Direction;
pub use entities::{Bonus, BonusKind, Critter, Obstacle};
pub use grid::{Cell, Occupant, OccupancyGrid};
pub use input::{DirectionQueue, InputSource, Intent};
pub use snake::{Segment, SegmentShape, Snake};
pub use state::{Game, GameEvent, GamePhase};
