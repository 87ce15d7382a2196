//! Player-controlled agent: continuous motion mapped onto discrete grid
//! transitions (trail start, trail extend, loop closure, self-collision).

use crate::entity::{Direction, GridPos, Vec2};
use crate::grid::{Cell, Grid, Layout};
use serde::{Deserialize, Serialize};

/// Agent speed in cells per second. Kept below 10 so a dt clamped to 100ms
/// can never cross a whole cell in one step.
pub const BUG_CELLS_PER_SEC: f32 = 8.0;

/// Grid-level result of advancing the agent one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugOutcome {
    /// No heading; waiting for input.
    Idle,
    /// Moved without a meaningful cell transition.
    Moved,
    /// Left safe territory into empty space; a new trail run began.
    StartedTrail,
    /// Marked another empty cell while drawing.
    ExtendedTrail,
    /// Reconnected the trail to safe territory; caller runs the capture.
    ClosedLoop,
    /// Stepped onto the agent's own trail.
    HitOwnTrail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    /// Continuous arena position (center of the agent).
    pub pos: Vec2,
    pub heading: Option<Direction>,
    /// Queued turn, committed at the next step.
    pub pending: Option<Direction>,
    /// Grid cell the agent currently occupies (authoritative for trail
    /// logic; `pos` is authoritative for collision distance checks).
    pub cell: GridPos,
    /// Safe cell the current trail run departed from; respawn point after a
    /// non-fatal death.
    pub trail_start: GridPos,
    /// Render-only polyline of the in-progress trail. The grid's `Trail`
    /// cells are the authoritative state.
    pub trail_points: Vec<Vec2>,
}

impl Bug {
    pub fn new(cell: GridPos, layout: &Layout) -> Self {
        Self {
            pos: layout.center_of(cell),
            heading: None,
            pending: None,
            cell,
            trail_start: cell,
            trail_points: Vec::new(),
        }
    }

    /// Queues a turn for the next step. Reversals are filtered at commit
    /// time so a stale queued turn can never flip the agent onto its own
    /// trail.
    pub fn queue_turn(&mut self, direction: Direction) {
        self.pending = Some(direction);
    }

    /// Resets the agent onto `at` after a non-fatal death.
    pub fn respawn(&mut self, at: GridPos, layout: &Layout) {
        self.pos = layout.center_of(at);
        self.cell = at;
        self.trail_start = at;
        self.heading = None;
        self.pending = None;
        self.trail_points.clear();
    }

    /// Advances the agent by `dt` seconds and applies any grid transition
    /// the resulting cell crossing implies.
    pub fn step(&mut self, dt: f32, grid: &mut Grid, layout: &Layout) -> BugOutcome {
        if let Some(turn) = self.pending.take() {
            let reversal = self.heading.map_or(false, |h| h.opposite() == turn);
            if !reversal {
                if self.heading != Some(turn) {
                    // Keep motion lane-aligned: snap the cross axis to the
                    // current cell's center so a step changes one axis's
                    // cell at most.
                    let center = layout.center_of(self.cell);
                    if turn.is_horizontal() {
                        self.pos.y = center.y;
                    } else {
                        self.pos.x = center.x;
                    }
                }
                self.heading = Some(turn);
            }
        }

        let heading = match self.heading {
            Some(h) => h,
            None => return BugOutcome::Idle,
        };

        let speed = BUG_CELLS_PER_SEC * layout.cell_size;
        let next = self.pos.plus(heading.unit().scaled(speed * dt));

        // Hard clamp to the arena; stopping against the wall is deliberate,
        // in contrast to the hostile's bounce.
        let half = layout.cell_size / 2.0;
        let extent = layout.extent();
        let clamped = Vec2::new(
            next.x.clamp(half, extent.x - half),
            next.y.clamp(half, extent.y - half),
        );
        let wall_stopped = if heading.is_horizontal() {
            clamped.x != next.x
        } else {
            clamped.y != next.y
        };
        self.pos = clamped;
        if wall_stopped {
            self.heading = None;
        }

        let new_cell = layout.cell_of(self.pos);
        if new_cell == self.cell {
            return BugOutcome::Moved;
        }

        match grid.cell_at(new_cell) {
            Cell::Trail => BugOutcome::HitOwnTrail,
            Cell::Empty => {
                let leaving_safe = grid.cell_at(self.cell).is_safe();
                if leaving_safe {
                    self.trail_start = self.cell;
                    self.trail_points.clear();
                    self.trail_points.push(layout.center_of(self.cell));
                }
                grid.set(new_cell, Cell::Trail);
                self.trail_points.push(layout.center_of(new_cell));
                self.cell = new_cell;
                if leaving_safe {
                    BugOutcome::StartedTrail
                } else {
                    BugOutcome::ExtendedTrail
                }
            }
            Cell::Claimed | Cell::Border => {
                let closing = grid.cell_at(self.cell) == Cell::Trail;
                self.cell = new_cell;
                if closing {
                    // Forced stop for player feedback after a capture.
                    self.heading = None;
                    self.pending = None;
                    self.trail_points.clear();
                    BugOutcome::ClosedLoop
                } else {
                    BugOutcome::Moved
                }
            }
        }
    }
}
