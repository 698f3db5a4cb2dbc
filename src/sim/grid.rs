//! Occupancy grid
//!
//! A disposable snapshot of which cell holds what. The entity lists on
//! [`super::Game`] are authoritative; the grid is rebuilt from them every time
//! a placement or movement query needs it and must never be kept across ticks.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::direction::Direction;

/// Integer grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step in `direction` (unbounded)
    pub fn step(self, direction: Direction) -> Self {
        Self::new(self.x + direction.delta_x(), self.y + direction.delta_y())
    }
}

/// Occupant class painted into a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occupant {
    #[default]
    Empty,
    Snake,
    Bonus,
    Obstacle,
    Critter,
}

/// Per-cell occupant snapshot of the whole map
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    /// Row-major cells
    cells: Vec<Occupant>,
}

impl OccupancyGrid {
    /// All-empty grid; negative dimensions are treated as zero
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Occupant::Empty; (width * height) as usize],
        }
    }

    /// Columns
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Rows
    pub fn height(&self) -> i32 {
        self.height
    }

    /// True if `cell` lies inside the map
    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    /// Occupant at `cell`, `None` when outside the map
    pub fn get(&self, cell: Cell) -> Option<Occupant> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// True if `cell` is inside the map and nothing occupies it
    pub fn is_free(&self, cell: Cell) -> bool {
        self.get(cell) == Some(Occupant::Empty)
    }

    /// Reset every cell to [`Occupant::Empty`]
    pub fn clear(&mut self) {
        self.cells.fill(Occupant::Empty);
    }

    /// Paint every cell in `cells` with `tag`
    ///
    /// Positions are canonical during play; anything off the map is skipped.
    pub fn mark(&mut self, cells: impl IntoIterator<Item = Cell>, tag: Occupant) {
        for cell in cells {
            if let Some(i) = self.index(cell) {
                self.cells[i] = tag;
            }
        }
    }

    /// Uniformly random empty cell, `None` when the map is full
    ///
    /// Collects every free cell first and samples once, so the cost does not
    /// blow up when free space is scarce.
    pub fn find_random_empty_cell<R: Rng>(&self, rng: &mut R) -> Option<Cell> {
        let free: Vec<Cell> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, occupant)| **occupant == Occupant::Empty)
            .map(|(i, _)| {
                let i = i as i32;
                Cell::new(i % self.width, i / self.width)
            })
            .collect();

        if free.is_empty() {
            return None;
        }
        Some(free[rng.random_range(0..free.len())])
    }

    /// Neighbour of `cell` in `direction`
    ///
    /// With `wrap` each axis wraps around the map edge. Without it the result
    /// may lie outside the map; callers check [`Self::contains`].
    pub fn cell_in_direction(&self, cell: Cell, direction: Direction, wrap: bool) -> Cell {
        let next = cell.step(direction);
        if wrap { self.wrap(next) } else { next }
    }

    /// Bring a cell back onto the map by wrapping each axis
    pub fn wrap(&self, cell: Cell) -> Cell {
        Cell::new(cell.x.rem_euclid(self.width), cell.y.rem_euclid(self.height))
    }
}
