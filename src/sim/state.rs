//! Game state and observation surface
//!
//! Everything mutable about a run is owned here. Collaborators (renderers,
//! sound, highscore persistence) read through the accessors and react to
//! drained [`GameEvent`]s; they never mutate the state directly.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entities::{Bonus, BonusKind, Critter, Obstacle};
use super::grid::{Cell, Occupant, OccupancyGrid};
use super::input::{InputSource, Intent};
use super::snake::Snake;
use crate::tuning::{Tuning, TuningError};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Constructed, `start()` not yet called
    NotStarted,
    Running,
    Paused,
    /// Snake died
    Ended,
}

/// Notifications for non-core collaborators, each emitted once per occurrence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    SelfCollision { cell: Cell },
    ObstacleCollision { cell: Cell },
    /// Left the map with solid borders enabled
    BorderCollision { cell: Cell },
    BonusPickedUp { id: u32, kind: BonusKind, cell: Cell },
    CritterPickedUp { id: u32, cell: Cell },
    /// Bonus left the map, either eaten or timed out
    BonusRemoved { id: u32, kind: BonusKind, cell: Cell, picked: bool },
    BonusToObstacle { id: u32, cell: Cell, obstacle_kind: u8 },
    BonusSpawned { id: u32, kind: BonusKind, cell: Cell },
    CritterSpawned { id: u32, cell: Cell },
    /// Follows the collision event that killed the snake
    RunEnded { score: u32, length: usize },
}

pub struct Game {
    pub(crate) tuning: Tuning,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) snake: Snake,
    pub(crate) bonuses: Vec<Bonus>,
    pub(crate) critters: Vec<Critter>,
    pub(crate) obstacles: Vec<Obstacle>,
    pub(crate) started: bool,
    pub(crate) paused: bool,
    /// Time banked toward the next snake move (ms)
    pub(crate) snake_accumulator_ms: f32,
    /// Scratch occupancy buffer; cleared and repainted before every query
    pub(crate) grid: OccupancyGrid,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) inputs: Vec<Box<dyn InputSource>>,
    next_id: u32,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("seed", &self.seed)
            .field("phase", &self.phase())
            .field("snake", &self.snake)
            .field("bonuses", &self.bonuses)
            .field("critters", &self.critters)
            .field("obstacles", &self.obstacles)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Create a game with the given tuning and RNG seed. Call [`Game::start`] to play.
    ///
    /// Fails if the tuning does not validate.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let snake = Self::fresh_snake(&tuning);
        let grid = OccupancyGrid::new(tuning.map_width, tuning.map_height);
        Ok(Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            snake,
            bonuses: Vec::new(),
            critters: Vec::new(),
            obstacles: Vec::new(),
            started: false,
            paused: false,
            snake_accumulator_ms: 0.0,
            grid,
            events: Vec::new(),
            inputs: Vec::new(),
            next_id: 1,
        })
    }

    fn fresh_snake(tuning: &Tuning) -> Snake {
        Snake::new(
            Cell::new(tuning.start_x, tuning.start_y),
            tuning.start_length,
            tuning.start_speed(),
            tuning.min_speed,
            tuning.max_speed,
        )
    }

    /// Reset to a fresh run
    pub fn start(&mut self) {
        self.snake = Self::fresh_snake(&self.tuning);
        self.bonuses.clear();
        self.critters.clear();
        self.obstacles.clear();
        self.events.clear();
        self.snake_accumulator_ms = 0.0;
        self.paused = false;
        self.started = true;

        for _ in 0..self.tuning.min_critters {
            self.spawn_critter();
        }

        log::info!(
            "Run started: {}x{} map, speed {:.1}",
            self.tuning.map_width,
            self.tuning.map_height,
            self.snake.speed
        );
    }

    /// Inject one player intent
    pub fn on_key_down(&mut self, intent: Intent) {
        match intent.direction() {
            Some(direction) => self.snake.offer_direction(direction),
            None => {
                self.paused = !self.paused;
                log::info!("Game paused: {}", self.paused);
            }
        }
    }

    /// Register a polled input device
    pub fn add_input_source(&mut self, source: Box<dyn InputSource>) {
        self.inputs.push(source);
    }

    /// Phase derived from the started, alive and paused flags
    pub fn phase(&self) -> GamePhase {
        if !self.started {
            GamePhase::NotStarted
        } else if !self.snake.alive {
            GamePhase::Ended
        } else if self.paused {
            GamePhase::Paused
        } else {
            GamePhase::Running
        }
    }

    /// Balance values this game was built with
    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// RNG seed; the same seed and inputs replay the same run
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Body, heading, speed and score
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Bonuses currently on the map
    pub fn bonuses(&self) -> &[Bonus] {
        &self.bonuses
    }

    /// Critters currently on the map
    pub fn critters(&self) -> &[Critter] {
        &self.critters
    }

    /// Permanent obstacles left by rotted bonuses
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Map width in cells
    pub fn width(&self) -> i32 {
        self.tuning.map_width
    }

    /// Map height in cells
    pub fn height(&self) -> i32 {
        self.tuning.map_height
    }

    /// Events queued since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand queued events to a collaborator, emptying the queue
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    /// Fresh occupancy snapshot of the current state
    pub fn occupancy(&self) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(self.tuning.map_width, self.tuning.map_height);
        self.paint(&mut grid);
        grid
    }

    fn paint(&self, grid: &mut OccupancyGrid) {
        grid.clear();
        grid.mark(self.snake.cells(), Occupant::Snake);
        grid.mark(self.bonuses.iter().map(|b| b.cell), Occupant::Bonus);
        grid.mark(self.obstacles.iter().map(|o| o.cell), Occupant::Obstacle);
        grid.mark(self.critters.iter().map(|c| c.cell), Occupant::Critter);
    }

    /// Repaint the scratch grid from the authoritative entity lists
    pub(crate) fn rebuild_grid(&mut self) {
        let mut grid = std::mem::replace(&mut self.grid, OccupancyGrid::new(0, 0));
        self.paint(&mut grid);
        self.grid = grid;
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
