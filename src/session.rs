//! Level session: owns the grid and both actors, gates the per-frame tick
//! on the state machine, and publishes discrete gameplay events.

use crate::bug::{Bug, BugOutcome};
use crate::entity::{Direction, GridPos};
use crate::fill;
use crate::grid::{Grid, Layout};
use crate::snake::{Snake, SnakeOutcome};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Claimed share of the playable area that completes a level.
pub const TARGET_PERCENT: f32 = 75.0;

pub const STARTING_LIVES: u32 = 3;

/// A stalled host frame is clamped to this delta so one tick can never
/// tunnel an actor across multiple cells.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Flat award per sealed loop, plus a proportional award per claimed cell
/// so larger captures score more.
const LOOP_CLOSE_AWARD: u32 = 100;
const CELL_AWARD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the player; also re-entered after a non-fatal death.
    Ready,
    Playing,
    Paused,
    GameOver,
    LevelComplete,
}

/// Discrete, collaborator-observable outcomes of a tick. The core never
/// performs the side effects these drive (audio, ads, leaderboards).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ScoreChanged { score: u32, percent_covered: f32 },
    Died { lives_remaining: u32 },
    GameOver { final_score: u32, final_level: u32 },
    LevelComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub layout: Layout,
    pub grid: Grid,
    pub bug: Bug,
    pub snake: Snake,
    pub state: SessionState,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub percent_covered: f32,
    seed: u64,
}

impl Session {
    pub fn new(layout: Layout, seed: u64) -> Self {
        let grid = Grid::new(&layout);
        let bug = Bug::new(bug_start(&layout), &layout);
        let snake = Snake::new(&grid, &layout, 1, snake_rng(seed, 1));
        Self {
            layout,
            grid,
            bug,
            snake,
            state: SessionState::Ready,
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            percent_covered: 0.0,
            seed,
        }
    }

    /// Fresh grid and actors for the current level number.
    fn build_level(&mut self) {
        self.grid = Grid::new(&self.layout);
        self.bug = Bug::new(bug_start(&self.layout), &self.layout);
        self.snake = Snake::new(&self.grid, &self.layout, self.level, snake_rng(self.seed, self.level));
        self.percent_covered = 0.0;
        self.state = SessionState::Ready;
    }

    pub fn start(&mut self) {
        if self.state == SessionState::Ready {
            self.state = SessionState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Playing => self.state = SessionState::Paused,
            SessionState::Paused => self.state = SessionState::Playing,
            _ => {}
        }
    }

    /// Full re-initialization back to level 1.
    pub fn restart(&mut self) {
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.level = 1;
        self.build_level();
    }

    /// Acknowledges a completed level and builds the next one. Every 10th
    /// level grants an extra life.
    pub fn next_level(&mut self) {
        if self.state != SessionState::LevelComplete {
            return;
        }
        if (self.level + 1) % 10 == 0 {
            self.lives += 1;
        }
        self.level += 1;
        self.build_level();
    }

    /// Simulates one frame. Does nothing unless `Playing`; deaths, wins and
    /// score changes come back as events for collaborators to react to.
    pub fn tick(&mut self, dt: f32, input: Option<Direction>) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.state != SessionState::Playing {
            return events;
        }
        let dt = dt.clamp(0.0, MAX_FRAME_DT);

        if let Some(direction) = input {
            self.bug.queue_turn(direction);
        }

        match self.bug.step(dt, &mut self.grid, &self.layout) {
            BugOutcome::HitOwnTrail => {
                self.kill(&mut events);
                return events;
            }
            BugOutcome::ClosedLoop => {
                // The region the hostile occupies stays open; everything
                // the loop sealed off gets claimed.
                let open_seed = self.layout.cell_of(self.snake.pos);
                let outcome = fill::capture(&mut self.grid, open_seed);
                self.percent_covered = outcome.percent_covered;
                self.score += LOOP_CLOSE_AWARD + CELL_AWARD * outcome.claimed_cells;
                events.push(GameEvent::ScoreChanged {
                    score: self.score,
                    percent_covered: self.percent_covered,
                });
            }
            _ => {}
        }

        if self.snake.step(dt, &self.grid, &self.layout) == SnakeOutcome::HitTrail {
            self.kill(&mut events);
            return events;
        }
        if self.snake.threatens(&self.bug, &self.grid, &self.layout) {
            self.kill(&mut events);
            return events;
        }

        if self.percent_covered >= TARGET_PERCENT {
            self.state = SessionState::LevelComplete;
            events.push(GameEvent::LevelComplete);
        }
        events
    }

    fn kill(&mut self, events: &mut Vec<GameEvent>) {
        self.lives = self.lives.saturating_sub(1);
        events.push(GameEvent::Died {
            lives_remaining: self.lives,
        });

        if self.lives == 0 {
            self.state = SessionState::GameOver;
            events.push(GameEvent::GameOver {
                final_score: self.score,
                final_level: self.level,
            });
            return;
        }

        // Non-fatal: the run is lost but the territory is kept.
        self.grid.clear_trail();
        let respawn_at = self.bug.trail_start;
        self.bug.respawn(respawn_at, &self.layout);
        self.snake.respawn(&self.grid, &self.layout, self.level);
        self.state = SessionState::Ready;
    }
}

fn bug_start(layout: &Layout) -> GridPos {
    GridPos::new(layout.cols / 2, 0)
}

fn snake_rng(seed: u64, level: u32) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ ((level as u64) << 32))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::entity::Vec2;
    use crate::grid::Cell;
    use proptest::prelude::*;

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        /// The border ring never changes, whatever the player does.
        #[test]
        fn prop_border_ring_is_immutable(
            moves in prop::collection::vec(direction_strategy(), 1..200)
        ) {
            let layout = Layout::new(15, 15, 25.0).unwrap();
            let mut session = Session::new(layout, 99);
            session.start();

            for dir in moves {
                if session.state == SessionState::Ready {
                    session.start();
                }
                if session.state == SessionState::GameOver {
                    break;
                }
                session.tick(0.05, Some(dir));
            }

            for x in 0..session.grid.cols {
                prop_assert_eq!(session.grid.cell_at(GridPos::new(x, 0)), Cell::Border);
                prop_assert_eq!(
                    session.grid.cell_at(GridPos::new(x, session.grid.rows - 1)),
                    Cell::Border
                );
            }
            for y in 0..session.grid.rows {
                prop_assert_eq!(session.grid.cell_at(GridPos::new(0, y)), Cell::Border);
                prop_assert_eq!(
                    session.grid.cell_at(GridPos::new(session.grid.cols - 1, y)),
                    Cell::Border
                );
            }
        }

        /// Claims are never undone: coverage only moves up within a level,
        /// and stays within 0..=100.
        #[test]
        fn prop_percent_covered_is_monotonic(
            moves in prop::collection::vec(direction_strategy(), 1..200)
        ) {
            let layout = Layout::new(15, 15, 25.0).unwrap();
            let mut session = Session::new(layout, 7);
            // Immobile hostile: deaths still possible via self-collision,
            // which must not lower coverage either.
            session.snake.vel = Vec2::ZERO;
            session.snake.pos = layout.center_of(GridPos::new(7, 12));
            session.start();

            let mut last = session.percent_covered;
            for dir in moves {
                if session.state == SessionState::Ready {
                    session.start();
                }
                if session.state != SessionState::Playing {
                    break;
                }
                session.tick(0.05, Some(dir));

                prop_assert!(session.percent_covered >= last - 1e-4);
                prop_assert!(session.percent_covered <= 100.0);
                last = session.percent_covered;
            }
        }
    }
}
