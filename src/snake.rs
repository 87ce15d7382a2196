//! Autonomous hostile: free continuous roaming, bouncing off claimed and
//! border cells, with a follow-the-leader body read from a position
//! history buffer.

use crate::bug::Bug;
use crate::entity::{Direction, GridPos, Vec2};
use crate::grid::{Cell, Grid, Layout};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Base per-axis speed in cells per second; scaled up 10% per level.
pub const SNAKE_CELLS_PER_SEC: f32 = 6.4;

/// History samples between consecutive body segments.
pub const SEGMENT_SPACING: usize = 6;

/// Heading perturbation: re-aim somewhere in this window, by at most this
/// angle.
const TURN_INTERVAL_SECS: std::ops::Range<f32> = 0.8..2.4;
const MAX_TURN_RADIANS: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeOutcome {
    Roamed,
    /// A probe landed on a trail cell: the agent's unsealed run is struck,
    /// and it is the agent who dies.
    HitTrail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Body length; equals the level number.
    pub segments: usize,
    history: VecDeque<Vec2>,
    retarget_in: f32,
    rng: ChaCha8Rng,
}

impl Snake {
    pub fn new(grid: &Grid, layout: &Layout, level: u32, mut rng: ChaCha8Rng) -> Self {
        let retarget_in = rng.gen_range(TURN_INTERVAL_SECS);
        let mut snake = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            segments: level as usize,
            history: VecDeque::new(),
            retarget_in,
            rng,
        };
        snake.respawn(grid, layout, level);
        snake
    }

    /// Repositions the hostile on the nearest open cell to the arena center
    /// and rebuilds its body history there. RNG state is retained so a
    /// resumed session stays deterministic.
    pub fn respawn(&mut self, grid: &Grid, layout: &Layout, level: u32) {
        self.segments = level as usize;
        self.pos = layout.center_of(spawn_cell(grid));

        let per_axis = SNAKE_CELLS_PER_SEC * layout.cell_size * speed_multiplier(level);
        self.vel = Vec2::new(per_axis, per_axis);

        self.history.clear();
        for _ in 0..self.required_history() {
            self.history.push_back(self.pos);
        }
    }

    fn required_history(&self) -> usize {
        self.segments * SEGMENT_SPACING + 1
    }

    /// Body segment positions, head-nearest first, sampled at fixed stride
    /// offsets into the position history.
    pub fn body_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.segments).filter_map(move |i| self.history.get((i + 1) * SEGMENT_SPACING).copied())
    }

    /// Advances the hostile by `dt` seconds, bouncing off safe cells and
    /// the arena edge. Motion is sub-stepped to at most half a cell so a
    /// fast snake cannot tunnel through a one-cell wall.
    pub fn step(&mut self, dt: f32, grid: &Grid, layout: &Layout) -> SnakeOutcome {
        self.retarget_in -= dt;
        if self.retarget_in <= 0.0 {
            let angle = self.rng.gen_range(-MAX_TURN_RADIANS..MAX_TURN_RADIANS);
            self.vel = self.vel.rotated(angle);
            self.retarget_in = self.rng.gen_range(TURN_INTERVAL_SECS);
        }

        let speed = self.vel.length();
        let max_move = layout.cell_size * 0.45;
        let substeps = if speed > 0.0 {
            ((speed * dt / max_move).ceil() as usize).max(1)
        } else {
            1
        };
        let h = dt / substeps as f32;

        for _ in 0..substeps {
            if self.advance(h, grid, layout) == SnakeOutcome::HitTrail {
                return SnakeOutcome::HitTrail;
            }
        }

        self.history.push_front(self.pos);
        while self.history.len() > self.required_history() {
            self.history.pop_back();
        }
        SnakeOutcome::Roamed
    }

    fn advance(&mut self, h: f32, grid: &Grid, layout: &Layout) -> SnakeOutcome {
        let next = self.pos.plus(self.vel.scaled(h));

        // Sample the four cardinal edge points of the head; anything the
        // points touch decides the reaction for the matching axis.
        let probe = layout.cell_size / 2.0 - 2.0;
        let offsets = [
            Vec2::new(probe, 0.0),
            Vec2::new(-probe, 0.0),
            Vec2::new(0.0, probe),
            Vec2::new(0.0, -probe),
        ];

        let mut bounced_x = false;
        let mut bounced_y = false;
        for offset in offsets {
            let point = next.plus(offset);
            let cell = layout
                .try_cell_of(point)
                .map(|p| grid.cell_at(p))
                .unwrap_or(Cell::Border);

            match cell {
                Cell::Trail => return SnakeOutcome::HitTrail,
                Cell::Claimed | Cell::Border => {
                    if offset.x != 0.0 && !bounced_x {
                        self.vel.x = -self.vel.x;
                        bounced_x = true;
                    } else if offset.y != 0.0 && !bounced_y {
                        self.vel.y = -self.vel.y;
                        bounced_y = true;
                    }
                }
                Cell::Empty => {}
            }
        }

        if bounced_x || bounced_y {
            // Partial-step fallback with the reflected velocity.
            self.pos = self.pos.plus(self.vel.scaled(h));
        } else {
            self.pos = next;
        }
        SnakeOutcome::Roamed
    }

    /// Whether the hostile currently kills the agent: head contact within a
    /// cell (waived while the agent touches safe territory), or body
    /// contact slightly tighter, waived for nothing.
    pub fn threatens(&self, bug: &Bug, grid: &Grid, layout: &Layout) -> bool {
        let head_range = layout.cell_size;
        if self.pos.distance(bug.pos) < head_range && !near_safe_cell(bug.cell, grid) {
            return true;
        }

        let body_range = layout.cell_size * 0.8;
        self.body_positions().any(|p| p.distance(bug.pos) < body_range)
    }
}

fn speed_multiplier(level: u32) -> f32 {
    1.0 + 0.1 * (level.saturating_sub(1)) as f32
}

/// The agent's cell or any 4-neighbor being safe grants head-collision
/// immunity (visual leniency near walls and fresh claims).
fn near_safe_cell(cell: GridPos, grid: &Grid) -> bool {
    grid.cell_at(cell).is_safe()
        || Direction::ALL
            .iter()
            .any(|dir| grid.cell_at(cell.moved(*dir)).is_safe())
}

/// Nearest empty cell to the arena center, searched over expanding square
/// rings. Falls back to the center itself on a (degenerate) full grid.
fn spawn_cell(grid: &Grid) -> GridPos {
    let center = GridPos::new(grid.cols / 2, grid.rows / 2);
    if grid.cell_at(center) == Cell::Empty {
        return center;
    }
    let max_radius = grid.cols.max(grid.rows);
    for radius in 1..=max_radius {
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let candidate = GridPos::new(center.x + dx, center.y + dy);
                let interior = candidate.x >= 1
                    && candidate.x < grid.cols - 1
                    && candidate.y >= 1
                    && candidate.y < grid.rows - 1;
                if interior && grid.cell_at(candidate) == Cell::Empty {
                    return candidate;
                }
            }
        }
    }
    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const DT: f32 = 0.05;

    fn setup(level: u32) -> (Grid, Layout, Snake) {
        let layout = Layout::new(15, 15, 25.0).unwrap();
        let grid = Grid::new(&layout);
        let rng = ChaCha8Rng::seed_from_u64(7);
        let snake = Snake::new(&grid, &layout, level, rng);
        (grid, layout, snake)
    }

    #[test]
    fn spawns_at_center_of_open_arena() {
        let (_, layout, snake) = setup(1);
        assert_eq!(layout.cell_of(snake.pos), GridPos::new(7, 7));
        assert_eq!(snake.segments, 1);
    }

    #[test]
    fn spawn_search_skips_blocked_center() {
        let layout = Layout::new(15, 15, 25.0).unwrap();
        let mut grid = Grid::new(&layout);
        grid.set(GridPos::new(7, 7), Cell::Claimed);

        let snake = Snake::new(&grid, &layout, 1, ChaCha8Rng::seed_from_u64(7));
        let cell = layout.cell_of(snake.pos);
        assert_ne!(cell, GridPos::new(7, 7));
        assert_eq!(grid.cell_at(cell), Cell::Empty);
    }

    #[test]
    fn bounces_off_claimed_cells() {
        let (mut grid, layout, mut snake) = setup(1);
        // Wall of claimed cells one column to the snake's right.
        for y in 1..14 {
            grid.set(GridPos::new(9, y), Cell::Claimed);
        }
        snake.vel = Vec2::new(100.0, 0.0);
        snake.retarget_in = 100.0;

        for _ in 0..20 {
            assert_eq!(snake.step(DT, &grid, &layout), SnakeOutcome::Roamed);
        }

        assert!(snake.vel.x < 0.0, "velocity should have reflected off the wall");
        assert!(layout.cell_of(snake.pos).x < 9);
    }

    #[test]
    fn probe_on_trail_reports_the_strike() {
        let (mut grid, layout, mut snake) = setup(1);
        grid.set(GridPos::new(9, 7), Cell::Trail);
        snake.vel = Vec2::new(100.0, 0.0);
        snake.retarget_in = 100.0;

        let mut outcome = SnakeOutcome::Roamed;
        for _ in 0..30 {
            outcome = snake.step(DT, &grid, &layout);
            if outcome == SnakeOutcome::HitTrail {
                break;
            }
        }
        assert_eq!(outcome, SnakeOutcome::HitTrail);
    }

    #[test]
    fn history_stays_trimmed_to_body_length() {
        let (grid, layout, mut snake) = setup(3);
        snake.retarget_in = 100.0;
        for _ in 0..200 {
            snake.step(DT, &grid, &layout);
        }
        assert_eq!(snake.history.len(), 3 * SEGMENT_SPACING + 1);
        assert_eq!(snake.body_positions().count(), 3);
    }

    #[test]
    fn body_trails_behind_the_head() {
        let (grid, layout, mut snake) = setup(2);
        snake.vel = Vec2::new(60.0, 0.0);
        snake.retarget_in = 100.0;
        for _ in 0..30 {
            snake.step(DT, &grid, &layout);
        }
        let first = snake.body_positions().next().unwrap();
        assert!(first.x < snake.pos.x);
        assert!((first.y - snake.pos.y).abs() < 1e-3);
    }

    #[test]
    fn head_contact_in_open_field_is_lethal() {
        let (grid, layout, snake) = setup(1);
        let mut bug = Bug::new(GridPos::new(7, 0), &layout);
        // Park the bug right next to the head, deep in empty territory.
        bug.cell = GridPos::new(7, 7);
        bug.pos = snake.pos.plus(Vec2::new(10.0, 0.0));

        assert!(snake.threatens(&bug, &grid, &layout));
    }

    #[test]
    fn head_contact_near_safe_territory_is_waived() {
        let (mut grid, layout, snake) = setup(1);
        let mut bug = Bug::new(GridPos::new(7, 0), &layout);
        bug.cell = GridPos::new(7, 7);
        bug.pos = snake.pos.plus(Vec2::new(10.0, 0.0));
        grid.set(GridPos::new(8, 7), Cell::Claimed);

        // Head no longer kills, but the body (sitting on the spawn point)
        // still does; move it away first.
        let mut snake = snake;
        snake.history.clear();
        for _ in 0..snake.required_history() {
            snake.history.push_back(Vec2::new(30.0, 30.0));
        }

        assert!(!snake.threatens(&bug, &grid, &layout));
    }

    #[test]
    fn body_contact_has_no_leniency() {
        let (mut grid, layout, snake) = setup(1);
        let mut bug = Bug::new(GridPos::new(7, 0), &layout);
        bug.cell = GridPos::new(7, 7);
        grid.set(GridPos::new(8, 7), Cell::Claimed);

        // Body segments sit on the spawn point; put the bug on top of them
        // but out of head range.
        let mut snake = snake;
        snake.pos = Vec2::new(330.0, 330.0);
        bug.pos = layout.center_of(GridPos::new(7, 7));

        assert!(snake.threatens(&bug, &grid, &layout));
    }

    #[test]
    fn speed_scales_with_level() {
        assert_eq!(speed_multiplier(1), 1.0);
        assert!((speed_multiplier(5) - 1.4).abs() < 1e-6);
        let (_, _, snake) = setup(4);
        let expected = SNAKE_CELLS_PER_SEC * 25.0 * 1.3;
        assert!((snake.vel.x - expected).abs() < 1e-3);
    }
}
