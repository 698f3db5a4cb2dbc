//! Serpents headless runner
//!
//! Drives the simulation with a fixed frame delta and a greedy autopilot,
//! logging events as a renderer or sound layer would consume them, then
//! records the final score on the leaderboard.
//!
//! Usage: `serpents [tuning.json] [seed]`

use serpents::sim::{Cell, Direction, Game, GameEvent, GamePhase, Intent};
use serpents::{HighScores, Tuning};

/// Simulated frame length (~60 fps)
const FRAME_MS: f32 = 16.0;
/// Stop after five simulated minutes
const MAX_FRAMES: u32 = 5 * 60 * 60;
const HIGHSCORES_PATH: &str = "serpents_highscores.json";

/// Steers toward the nearest edible thing while refusing fatal cells
struct Autopilot;

impl Autopilot {
    fn choose(&self, game: &Game) -> Option<Intent> {
        let snake = game.snake();
        let head = snake.head_cell()?;
        let grid = game.occupancy();
        let wrap = !game.tuning().solid_borders;

        let targets: Vec<Cell> = game
            .bonuses()
            .iter()
            .map(|b| b.cell)
            .chain(game.critters().iter().map(|c| c.cell))
            .collect();

        Direction::CARDINAL
            .into_iter()
            .filter(|d| !snake.heading.is_opposite(*d))
            .filter_map(|d| {
                let next = grid.cell_in_direction(head, d, wrap);
                let safe = grid.contains(next)
                    && !snake.body_cells().any(|c| c == next)
                    && !game.obstacles().iter().any(|o| o.cell == next);
                safe.then(|| (d, Self::distance_to_nearest(game, next, &targets)))
            })
            .min_by_key(|(_, dist)| *dist)
            .map(|(d, _)| Self::intent_for(d))
    }

    fn distance_to_nearest(game: &Game, from: Cell, targets: &[Cell]) -> i32 {
        let (w, h) = (game.width(), game.height());
        let wrap = !game.tuning().solid_borders;
        targets
            .iter()
            .map(|t| {
                let mut dx = (t.x - from.x).abs();
                let mut dy = (t.y - from.y).abs();
                if wrap {
                    dx = dx.min(w - dx);
                    dy = dy.min(h - dy);
                }
                dx + dy
            })
            .min()
            .unwrap_or(0)
    }

    fn intent_for(direction: Direction) -> Intent {
        match direction {
            Direction::Up | Direction::None => Intent::Up,
            Direction::Down => Intent::Down,
            Direction::Left => Intent::Left,
            Direction::Right => Intent::Right,
        }
    }
}

fn report(event: &GameEvent) {
    match event {
        GameEvent::BonusSpawned { id, kind, cell } => {
            log::debug!("Bonus {} spawned: {:?} (sprite {}) at {:?}", id, kind, kind.index(), cell)
        }
        GameEvent::SelfCollision { .. }
        | GameEvent::ObstacleCollision { .. }
        | GameEvent::BorderCollision { .. }
        | GameEvent::RunEnded { .. } => log::info!("{:?}", event),
        _ => log::debug!("{:?}", event),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = match args.next() {
        Some(seed) => seed.parse::<u64>()?,
        None => 0x5EED,
    };

    let mut game = Game::new(tuning, seed)?;
    game.start();
    log::info!("Game initialized with seed: {}", seed);

    let autopilot = Autopilot;
    let mut frames_changed = 0u32;
    let mut frame = 0u32;
    while frame < MAX_FRAMES && game.phase() == GamePhase::Running {
        if let Some(intent) = autopilot.choose(&game) {
            game.on_key_down(intent);
        }
        if game.update(FRAME_MS) {
            frames_changed += 1;
        }
        for event in game.drain_events() {
            report(&event);
        }
        frame += 1;
    }

    let snake = game.snake();
    let bends = snake.body.iter().filter(|s| s.shape.is_corner()).count();
    log::info!(
        "Finished after {:.1}s ({} frames changed): score {}, length {} ({} bends), {} obstacles",
        frame as f32 * FRAME_MS / 1000.0,
        frames_changed,
        snake.score,
        snake.len(),
        bends,
        game.obstacles().len()
    );

    let mut highscores = HighScores::load(HIGHSCORES_PATH)?;
    if let Some(rank) = highscores.add(snake.score, "autopilot") {
        highscores.save(HIGHSCORES_PATH)?;
        log::info!("New high score! Rank #{}", rank);
    }
    println!("score {} (best {})", snake.score, highscores.top_score().unwrap_or(0));
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Serpents (headless) starting...");
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
