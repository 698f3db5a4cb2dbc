//! Frame-rate independent simulation step
//!
//! `update` is called once per rendered frame with the wall-clock delta. The
//! snake and every critter bank time separately and only take a grid step
//! once their own interval has elapsed. Sub-phases always run in this order,
//! later ones seeing what earlier ones changed:
//!
//! input -> snake speed/move -> critter movement -> critter population ->
//! eating -> bonus lifecycle/removal -> bonus population
//!
//! A move that kills the snake ends the frame there; later phases wait for a
//! restart.

use rand::Rng;

use super::direction::Direction;
use super::entities::{Bonus, BonusKind, Critter, Obstacle};
use super::state::{Game, GameEvent};

impl Game {
    /// Advance the simulation by `delta_ms` of wall-clock time
    ///
    /// Returns true if anything visible changed, so the renderer can skip
    /// re-syncing sprites on idle frames.
    pub fn update(&mut self, delta_ms: f32) -> bool {
        if !self.started || self.paused || !self.snake.alive {
            return false;
        }
        let delta_ms = delta_ms.max(0.0);

        self.poll_inputs();

        let mut changed = self.step_snake(delta_ms);
        if !self.snake.alive {
            return changed;
        }

        changed |= self.move_critters(delta_ms);
        changed |= self.maintain_critters(delta_ms);
        changed |= self.eat();
        changed |= self.update_bonuses(delta_ms);
        changed |= self.maintain_bonuses(delta_ms);
        changed
    }

    fn poll_inputs(&mut self) {
        for source in self.inputs.iter_mut() {
            for direction in Direction::CARDINAL {
                if source.is_pressed(direction) {
                    self.snake.offer_direction(direction);
                }
            }
        }
    }

    /// Ramp speed, then take at most one committed move
    fn step_snake(&mut self, delta_ms: f32) -> bool {
        self.snake
            .increase_speed(self.tuning.speed_increase_per_second * delta_ms / 1000.0);
        let interval = self.tuning.move_interval_ms(self.snake.speed);

        self.snake_accumulator_ms += delta_ms;
        if self.snake_accumulator_ms < interval {
            return false;
        }
        // Reset rather than subtract: one move per due frame, leftover time dropped
        self.snake_accumulator_ms = 0.0;

        self.snake.advance();
        log::trace!(
            "Snake moved {} to {:?}",
            self.snake.heading,
            self.snake.head_cell()
        );
        self.resolve_collisions();
        true
    }

    fn resolve_collisions(&mut self) {
        let Some(mut head) = self.snake.head_cell() else {
            return;
        };

        if !self.grid.contains(head) {
            if self.tuning.solid_borders {
                self.end_run(GameEvent::BorderCollision { cell: head });
                return;
            }
            head = self.grid.wrap(head);
            self.snake.body[0].cell = head;
        }

        if self.snake.body_cells().any(|c| c == head) {
            self.end_run(GameEvent::SelfCollision { cell: head });
            return;
        }

        if self.obstacles.iter().any(|o| o.cell == head) {
            self.end_run(GameEvent::ObstacleCollision { cell: head });
        }
    }

    fn end_run(&mut self, cause: GameEvent) {
        self.snake.alive = false;
        log::info!(
            "Run ended by {:?}: score {}, length {}",
            cause,
            self.snake.score,
            self.snake.len()
        );
        self.events.push(cause);
        self.events.push(GameEvent::RunEnded {
            score: self.snake.score,
            length: self.snake.len(),
        });
    }

    /// Step every critter whose own interval has elapsed
    fn move_critters(&mut self, delta_ms: f32) -> bool {
        let mut changed = false;
        for i in 0..self.critters.len() {
            let critter = &mut self.critters[i];
            critter.speed = self.tuning.clamp_speed(critter.speed);
            let interval = self.tuning.move_interval_ms(critter.speed);

            critter.accumulator_ms += delta_ms;
            if critter.accumulator_ms < interval {
                continue;
            }
            critter.accumulator_ms -= interval;

            self.rebuild_grid();
            self.try_move_critter(i);
            changed = true;
        }
        changed
    }

    fn try_move_critter(&mut self, index: usize) {
        if self.rng.random::<f32>() < self.tuning.critter_turn_chance {
            self.critters[index].direction = self.random_direction();
        }

        let critter = &mut self.critters[index];
        let target =
            self.grid
                .cell_in_direction(critter.cell, critter.direction, !self.tuning.solid_borders);
        if self.grid.is_free(target) {
            critter.cell = target;
        }
    }

    fn random_direction(&mut self) -> Direction {
        Direction::CARDINAL[self.rng.random_range(0..Direction::CARDINAL.len())]
    }

    /// Mandatory below the minimum, time-scaled chance below the maximum
    fn wants_spawn(
        &mut self,
        count: usize,
        min: usize,
        max: usize,
        chance_per_second: f32,
        delta_ms: f32,
    ) -> bool {
        if count < min {
            return true;
        }
        count < max && self.rng.random::<f32>() < chance_per_second * (delta_ms / 1000.0)
    }

    fn maintain_critters(&mut self, delta_ms: f32) -> bool {
        let t = &self.tuning;
        let (min, max, chance) = (t.min_critters, t.max_critters, t.critter_spawn_chance_per_second);
        if !self.wants_spawn(self.critters.len(), min, max, chance, delta_ms) {
            return false;
        }
        self.spawn_critter()
    }

    /// Place a critter on a random free cell; false if the map is full
    pub(crate) fn spawn_critter(&mut self) -> bool {
        self.rebuild_grid();
        let Some(cell) = self.grid.find_random_empty_cell(&mut self.rng) else {
            log::trace!("No free cell for a critter, spawn deferred");
            return false;
        };

        let speed = self
            .rng
            .random_range(self.tuning.critter_min_speed..self.tuning.critter_max_speed);
        let direction = self.random_direction();
        let id = self.next_entity_id();
        self.critters.push(Critter::new(id, cell, speed, direction));
        self.events.push(GameEvent::CritterSpawned { id, cell });
        log::debug!("Critter {} spawned at {:?} (speed {:.2})", id, cell, speed);
        true
    }

    /// Head-cell pickups of bonuses and critters
    fn eat(&mut self) -> bool {
        let Some(head) = self.snake.head_cell() else {
            return false;
        };
        let mut changed = false;

        for bonus in self.bonuses.iter_mut() {
            if bonus.cell != head || bonus.picked {
                continue;
            }
            bonus.apply(&mut self.snake, self.tuning.bonus_slowdown);
            bonus.picked = true;
            self.events.push(GameEvent::BonusPickedUp {
                id: bonus.id,
                kind: bonus.kind,
                cell: bonus.cell,
            });
            log::debug!("Picked up {:?} bonus {}, score {}", bonus.kind, bonus.id, self.snake.score);
            changed = true;
        }

        let (eaten, remaining): (Vec<Critter>, Vec<Critter>) =
            std::mem::take(&mut self.critters)
                .into_iter()
                .partition(|c| c.cell == head);
        self.critters = remaining;

        for critter in eaten {
            self.snake.grow();
            self.snake.score += self.tuning.critter_score;
            self.snake.decrease_speed(self.tuning.critter_slowdown);
            self.events.push(GameEvent::CritterPickedUp {
                id: critter.id,
                cell: critter.cell,
            });
            log::debug!("Ate critter {}, score {}", critter.id, self.snake.score);
            changed = true;
        }

        changed
    }

    /// Age bonuses, rot some expired ones into obstacles, drop finished ones
    fn update_bonuses(&mut self, delta_ms: f32) -> bool {
        let warning = self.tuning.bonus_warning_ms;
        let mut changed = false;
        for bonus in self.bonuses.iter_mut() {
            changed |= bonus.update(delta_ms, warning);
        }

        for bonus in self.bonuses.iter().filter(|b| b.is_expired() && !b.picked) {
            changed = true;
            if self.rng.random::<f32>() < self.tuning.bonus_to_obstacle_chance {
                let obstacle_kind = self.rng.random_range(0..self.tuning.obstacle_kinds);
                self.obstacles.push(Obstacle {
                    cell: bonus.cell,
                    kind: obstacle_kind,
                });
                self.events.push(GameEvent::BonusToObstacle {
                    id: bonus.id,
                    cell: bonus.cell,
                    obstacle_kind,
                });
                log::debug!("Bonus {} rotted into an obstacle at {:?}", bonus.id, bonus.cell);
            }
        }

        for bonus in self.bonuses.iter().filter(|b| b.is_finished()) {
            self.events.push(GameEvent::BonusRemoved {
                id: bonus.id,
                kind: bonus.kind,
                cell: bonus.cell,
                picked: bonus.picked,
            });
            changed = true;
        }
        self.bonuses.retain(|b| !b.is_finished());

        changed
    }

    fn maintain_bonuses(&mut self, delta_ms: f32) -> bool {
        let t = &self.tuning;
        let (min, max, chance) = (t.min_bonuses, t.max_bonuses, t.bonus_spawn_chance_per_second);
        if !self.wants_spawn(self.bonuses.len(), min, max, chance, delta_ms) {
            return false;
        }

        self.rebuild_grid();
        let Some(cell) = self.grid.find_random_empty_cell(&mut self.rng) else {
            log::trace!("No free cell for a bonus, spawn deferred");
            return false;
        };

        let kind = BonusKind::ALL[self.rng.random_range(0..BonusKind::ALL.len())];
        let jitter = self.rng.random::<f32>() * self.tuning.bonus_lifetime_jitter_ms;
        let lifetime = self.tuning.bonus_base_lifetime_ms + jitter;
        let id = self.next_entity_id();
        self.bonuses.push(Bonus::new(id, cell, kind, lifetime));
        self.events.push(GameEvent::BonusSpawned { id, kind, cell });
        log::debug!("{:?} bonus {} spawned at {:?} ({:.0} ms)", kind, id, cell, lifetime);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Cell;
    use crate::sim::input::{InputSource, Intent};
    use crate::sim::snake::Snake;
    use crate::sim::state::GamePhase;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Tuning with nothing spawning on its own
    fn quiet() -> Tuning {
        Tuning {
            min_bonuses: 0,
            max_bonuses: 0,
            min_critters: 0,
            max_critters: 0,
            ..Default::default()
        }
    }

    fn started(tuning: Tuning) -> Game {
        let mut game = Game::new(tuning, 12345).unwrap();
        game.start();
        game
    }

    /// Long enough for exactly one snake move, short of any critter step
    const MOVE_MS: f32 = 200.0;

    fn count<F: Fn(&GameEvent) -> bool>(game: &Game, pred: F) -> usize {
        game.events().iter().filter(|e| pred(e)).count()
    }

    #[test]
    fn test_update_before_start_is_noop() {
        let mut game = Game::new(Tuning::default(), 1).unwrap();
        assert!(!game.update(1000.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 8)));
    }

    #[test]
    fn test_move_waits_for_interval() {
        let mut game = started(quiet());
        assert!(!game.update(100.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 8)));

        assert!(game.update(100.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 7)));
    }

    #[test]
    fn test_accumulator_resets_after_move() {
        let mut game = started(quiet());
        // A huge delta still yields exactly one move
        assert!(game.update(5000.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 7)));
        assert_eq!(game.snake_accumulator_ms, 0.0);

        assert!(!game.update(100.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 7)));
    }

    #[test]
    fn test_reverse_input_ignored() {
        let mut game = started(quiet());
        game.on_key_down(Intent::Down);
        assert!(game.update(MOVE_MS));
        assert_eq!(game.snake.heading, Direction::Up);
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 7)));
    }

    #[test]
    fn test_turn_and_queued_turn() {
        let mut game = started(quiet());
        game.on_key_down(Intent::Left);
        game.on_key_down(Intent::Down);

        game.update(MOVE_MS);
        assert_eq!(game.snake.heading, Direction::Left);
        assert_eq!(game.snake.head_cell(), Some(Cell::new(9, 8)));

        game.update(MOVE_MS);
        assert_eq!(game.snake.heading, Direction::Down);
        assert_eq!(game.snake.head_cell(), Some(Cell::new(9, 9)));
    }

    #[test]
    fn test_paused_game_ignores_update() {
        let mut game = started(quiet());
        game.on_key_down(Intent::Pause);
        assert!(!game.update(5000.0));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(10, 8)));

        game.on_key_down(Intent::Pause);
        assert!(game.update(5000.0));
    }

    #[test]
    fn test_wraps_through_left_border() {
        let mut game = started(quiet());
        let speed = game.snake.speed;
        game.snake = Snake::new(Cell::new(0, 5), 5, speed, 1.0, 200.0);
        game.on_key_down(Intent::Left);
        assert!(game.update(MOVE_MS));
        assert_eq!(game.snake.head_cell(), Some(Cell::new(27, 5)));
        assert!(game.snake.alive);
    }

    #[test]
    fn test_solid_border_is_fatal() {
        let mut game = started(Tuning {
            solid_borders: true,
            ..quiet()
        });
        let speed = game.snake.speed;
        game.snake = Snake::new(Cell::new(0, 5), 5, speed, 1.0, 200.0);
        game.on_key_down(Intent::Left);
        assert!(game.update(MOVE_MS));

        assert!(!game.snake.alive);
        assert_eq!(game.phase(), GamePhase::Ended);
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::BorderCollision { .. })),
            1
        );
        assert_eq!(count(&game, |e| matches!(e, GameEvent::RunEnded { .. })), 1);

        // Dead games stay put and stay quiet
        assert!(!game.update(MOVE_MS));
        assert_eq!(game.events().len(), 2);
    }

    #[test]
    fn test_self_collision() {
        let mut game = started(quiet());
        for _ in 0..4 {
            game.snake.advance();
        }
        game.snake.offer_direction(Direction::Left);
        game.snake.advance();
        game.snake.offer_direction(Direction::Down);
        game.snake.advance();
        assert_eq!(game.snake.head_cell(), Some(Cell::new(9, 5)));

        game.on_key_down(Intent::Right);
        assert!(game.update(MOVE_MS));
        assert!(!game.snake.alive);
        assert_eq!(
            game.events(),
            &[
                GameEvent::SelfCollision { cell: Cell::new(10, 5) },
                GameEvent::RunEnded { score: 0, length: 5 },
            ]
        );
    }

    #[test]
    fn test_obstacle_collision() {
        let mut game = started(quiet());
        game.obstacles.push(Obstacle { cell: Cell::new(10, 7), kind: 2 });
        assert!(game.update(MOVE_MS));
        assert!(!game.snake.alive);
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::ObstacleCollision { .. })),
            1
        );
    }

    #[test]
    fn test_mandatory_bonus_spawn() {
        let mut game = started(Tuning {
            min_bonuses: 1,
            max_bonuses: 3,
            bonus_spawn_chance_per_second: 0.0,
            ..quiet()
        });
        assert!(game.bonuses.is_empty());
        assert!(game.update(16.0));
        assert_eq!(game.bonuses.len(), 1);
        assert_eq!(count(&game, |e| matches!(e, GameEvent::BonusSpawned { .. })), 1);

        let bonus = &game.bonuses[0];
        assert!(bonus.lifetime_ms >= 8500.0 && bonus.lifetime_ms <= 11500.0);
        assert_ne!(bonus.cell, Cell::new(10, 8));

        // At the minimum with a zero chance nothing more appears
        for _ in 0..50 {
            game.update(16.0);
        }
        assert_eq!(game.bonuses.len(), 1);
    }

    #[test]
    fn test_bonus_pickup() {
        let mut game = started(quiet());
        game.bonuses.push(Bonus::new(99, Cell::new(10, 7), BonusKind::Apple, 9000.0));

        assert!(game.update(MOVE_MS));
        assert_eq!(game.snake.score, 2);
        assert_eq!(game.snake.len(), 6);
        assert!(game.bonuses.is_empty());
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::BonusPickedUp { id: 99, .. })),
            1
        );
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::BonusRemoved { id: 99, picked: true, .. })),
            1
        );
    }

    #[test]
    fn test_expired_bonus_reported_once() {
        let mut game = started(Tuning {
            bonus_to_obstacle_chance: 0.0,
            ..quiet()
        });
        game.bonuses.push(Bonus::new(7, Cell::new(2, 2), BonusKind::Star, 50.0));

        for _ in 0..20 {
            game.update(16.0);
        }
        assert!(game.bonuses.is_empty());
        assert!(game.obstacles.is_empty());
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::BonusRemoved { id: 7, picked: false, .. })),
            1
        );
    }

    #[test]
    fn test_expired_bonus_rots_into_obstacle() {
        let mut game = started(Tuning {
            bonus_to_obstacle_chance: 1.0,
            ..quiet()
        });
        game.bonuses.push(Bonus::new(7, Cell::new(2, 2), BonusKind::Grapes, 10.0));

        assert!(game.update(16.0));
        assert_eq!(game.obstacles.len(), 1);
        assert_eq!(game.obstacles[0].cell, Cell::new(2, 2));
        assert!(game.obstacles[0].kind < game.tuning.obstacle_kinds);
        assert_eq!(
            count(&game, |e| matches!(e, GameEvent::BonusToObstacle { id: 7, .. })),
            1
        );
    }

    #[test]
    fn test_critter_eaten() {
        let mut game = started(quiet());
        game.critters.push(Critter::new(5, Cell::new(10, 7), 1.0, Direction::Right));
        let speed_before = game.snake.speed;

        assert!(game.update(MOVE_MS));
        assert!(game.critters.is_empty());
        assert_eq!(game.snake.score, 10);
        assert_eq!(game.snake.len(), 6);
        assert!(game.snake.speed < speed_before);
        assert_eq!(
            game.events(),
            &[GameEvent::CritterPickedUp { id: 5, cell: Cell::new(10, 7) }]
        );
    }

    #[test]
    fn test_critter_moves_on_its_own_cadence() {
        let mut game = started(Tuning {
            critter_turn_chance: 0.0,
            ..quiet()
        });
        game.critters.push(Critter::new(1, Cell::new(3, 3), 1.0, Direction::Right));
        let interval = game.tuning.move_interval_ms(1.0);

        game.update(interval - 1.0);
        assert_eq!(game.critters[0].cell, Cell::new(3, 3));
        game.update(2.0);
        assert_eq!(game.critters[0].cell, Cell::new(4, 3));
        // Leftover time stays banked
        assert!((game.critters[0].accumulator_ms - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_critter_blocked_by_border_and_occupants() {
        let mut game = started(Tuning {
            critter_turn_chance: 0.0,
            solid_borders: true,
            ..quiet()
        });
        game.critters.push(Critter::new(1, Cell::new(0, 0), 1.0, Direction::Left));
        game.critters.push(Critter::new(2, Cell::new(5, 5), 1.0, Direction::Up));
        game.obstacles.push(Obstacle { cell: Cell::new(5, 4), kind: 0 });

        game.update(600.0);
        assert_eq!(game.critters[0].cell, Cell::new(0, 0));
        assert_eq!(game.critters[1].cell, Cell::new(5, 5));
    }

    #[test]
    fn test_critter_wraps_without_solid_borders() {
        let mut game = started(Tuning {
            critter_turn_chance: 0.0,
            ..quiet()
        });
        game.critters.push(Critter::new(1, Cell::new(0, 0), 1.0, Direction::Left));
        game.update(600.0);
        assert_eq!(game.critters[0].cell, Cell::new(27, 0));
    }

    #[test]
    fn test_critter_population_kept_within_bounds() {
        let mut game = started(Tuning {
            min_critters: 1,
            max_critters: 2,
            critter_spawn_chance_per_second: 1000.0,
            ..quiet()
        });
        game.update(16.0);
        assert!(!game.critters.is_empty());
        let mut most = 0;
        for _ in 0..20 {
            game.update(16.0);
            assert!(game.critters.len() <= 2);
            most = most.max(game.critters.len());
        }
        assert_eq!(most, 2);
    }

    /// 2x2 map held by a one-cell snake at (1, 1) and three obstacles
    fn packed(tuning: Tuning) -> Game {
        let mut game = started(Tuning {
            map_width: 2,
            map_height: 2,
            start_x: 1,
            start_y: 1,
            start_length: 1,
            ..tuning
        });
        game.critters.clear();
        game.drain_events().for_each(drop);
        for cell in [Cell::new(1, 0), Cell::new(0, 1), Cell::new(0, 0)] {
            game.obstacles.push(Obstacle { cell, kind: 0 });
        }
        game
    }

    #[test]
    fn test_spawn_deferred_when_map_full() {
        let mut game = packed(Tuning {
            min_bonuses: 1,
            max_bonuses: 1,
            ..quiet()
        });

        assert!(!game.update(1.0));
        assert!(game.bonuses.is_empty());
        assert_eq!(count(&game, |e| matches!(e, GameEvent::BonusSpawned { .. })), 0);

        game.obstacles.pop();
        assert!(game.update(1.0));
        assert_eq!(game.bonuses.len(), 1);
        assert_eq!(game.bonuses[0].cell, Cell::new(0, 0));
        assert_eq!(count(&game, |e| matches!(e, GameEvent::BonusSpawned { .. })), 1);
    }

    #[test]
    fn test_critter_spawn_deferred_when_map_full() {
        let mut game = packed(Tuning {
            min_critters: 1,
            max_critters: 1,
            ..quiet()
        });

        assert!(!game.update(1.0));
        assert!(game.critters.is_empty());
        assert_eq!(count(&game, |e| matches!(e, GameEvent::CritterSpawned { .. })), 0);

        game.obstacles.pop();
        assert!(game.update(1.0));
        assert_eq!(game.critters.len(), 1);
        assert_eq!(game.critters[0].cell, Cell::new(0, 0));
        assert_eq!(count(&game, |e| matches!(e, GameEvent::CritterSpawned { .. })), 1);
    }

    struct HoldLeft;

    impl InputSource for HoldLeft {
        fn is_pressed(&mut self, direction: Direction) -> bool {
            direction == Direction::Left
        }
    }

    #[test]
    fn test_polled_input_source() {
        let mut game = started(quiet());
        game.add_input_source(Box::new(HoldLeft));
        game.update(MOVE_MS);
        assert_eq!(game.snake.heading, Direction::Left);
        assert_eq!(game.snake.head_cell(), Some(Cell::new(9, 8)));
    }

    #[test]
    fn test_determinism() {
        let mut game1 = started(Tuning::default());
        let mut game2 = started(Tuning::default());
        let intents = [Intent::Left, Intent::Up, Intent::Right, Intent::Down];

        for frame in 0..2000 {
            if frame % 37 == 0 {
                let intent = intents[(frame / 37) % intents.len()];
                game1.on_key_down(intent);
                game2.on_key_down(intent);
            }
            let changed1 = game1.update(16.0);
            let changed2 = game2.update(16.0);
            assert_eq!(changed1, changed2);
        }

        assert_eq!(game1.snake.body, game2.snake.body);
        assert_eq!(game1.snake.score, game2.snake.score);
        assert_eq!(game1.events(), game2.events());
        assert_eq!(game1.obstacles, game2.obstacles);
    }

    proptest! {
        #[test]
        fn speed_ramps_within_bounds(deltas in proptest::collection::vec(0.0f32..250.0, 1..200)) {
            let mut game = started(quiet());
            let mut last = game.snake.speed;
            for delta in deltas {
                game.update(delta);
                let speed = game.snake.speed;
                prop_assert!(speed >= last);
                prop_assert!(speed >= game.tuning.min_speed && speed <= game.tuning.max_speed);
                last = speed;
            }
        }
    }
}
