use crate::entity::{GridPos, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest arena that leaves any interior to play in.
pub const MIN_DIMENSION: i32 = 5;

/// Column count the screen-sizing path aims for, matching a phone-width
/// arena of chunky cells.
pub const TARGET_COLS: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Unclaimed, dangerous open space.
    Empty,
    /// Permanently owned, safe territory.
    Claimed,
    /// In-progress, unsealed path. Reverts on death, seals on loop closure.
    Trail,
    /// Immutable one-cell perimeter ring.
    Border,
}

impl Cell {
    pub fn is_safe(&self) -> bool {
        matches!(self, Cell::Claimed | Cell::Border)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("arena of {cols}x{rows} cells is below the minimum of {min}x{min}", min = MIN_DIMENSION)]
    TooSmall { cols: i32, rows: i32 },
}

/// Maps between continuous arena space and the discrete cell grid.
///
/// Dimensions are forced odd so the arena has an exact center cell for the
/// hostile to spawn on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f32,
}

impl Layout {
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Result<Self, GridError> {
        let cols = if cols % 2 == 0 { cols - 1 } else { cols };
        let rows = if rows % 2 == 0 { rows - 1 } else { rows };
        if cols < MIN_DIMENSION || rows < MIN_DIMENSION {
            return Err(GridError::TooSmall { cols, rows });
        }
        Ok(Self { cols, rows, cell_size })
    }

    /// Derives a layout from the available screen area, targeting
    /// [`TARGET_COLS`] columns and as many rows as fit.
    pub fn from_screen(width: f32, height: f32) -> Result<Self, GridError> {
        let cell_size = width / TARGET_COLS as f32;
        if cell_size <= 0.0 {
            return Err(GridError::TooSmall { cols: 0, rows: 0 });
        }
        let rows = (height / cell_size) as i32;
        Layout::new(TARGET_COLS, rows, cell_size)
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    pub fn center_of(&self, pos: GridPos) -> Vec2 {
        Vec2::new(
            pos.x as f32 * self.cell_size + self.cell_size / 2.0,
            pos.y as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// Cell containing `point`, or `None` when the point lies outside the
    /// arena.
    pub fn try_cell_of(&self, point: Vec2) -> Option<GridPos> {
        let x = (point.x / self.cell_size).floor() as i32;
        let y = (point.y / self.cell_size).floor() as i32;
        if x < 0 || x >= self.cols || y < 0 || y >= self.rows {
            return None;
        }
        Some(GridPos::new(x, y))
    }

    /// Cell containing `point`, clamped into the arena. Intended for actors
    /// whose positions are already clamped to the play area.
    pub fn cell_of(&self, point: Vec2) -> GridPos {
        let x = (point.x / self.cell_size).floor() as i32;
        let y = (point.y / self.cell_size).floor() as i32;
        GridPos::new(x.clamp(0, self.cols - 1), y.clamp(0, self.rows - 1))
    }
}

/// Cell matrix for one level. Rebuilt, never carried over, on level start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub cols: i32,
    pub rows: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(layout: &Layout) -> Self {
        let cols = layout.cols;
        let rows = layout.rows;
        let mut grid = Self {
            cols,
            rows,
            cells: vec![Cell::Empty; (cols * rows) as usize],
        };

        for x in 0..cols {
            grid.set(GridPos::new(x, 0), Cell::Border);
            grid.set(GridPos::new(x, rows - 1), Cell::Border);
        }
        for y in 0..rows {
            grid.set(GridPos::new(0, y), Cell::Border);
            grid.set(GridPos::new(cols - 1, y), Cell::Border);
        }
        grid
    }

    fn index(&self, pos: GridPos) -> usize {
        debug_assert!(self.contains(pos), "grid access at {:?}", pos);
        (pos.y * self.cols + pos.x) as usize
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.cols && pos.y >= 0 && pos.y < self.rows
    }

    /// Out-of-range coordinates read as `Border` so callers probing around
    /// the arena edge see a solid wall.
    pub fn cell_at(&self, pos: GridPos) -> Cell {
        if !self.contains(pos) {
            return Cell::Border;
        }
        self.cells[self.index(pos)]
    }

    /// Unguarded write; callers uphold the border invariant.
    pub fn set(&mut self, pos: GridPos, cell: Cell) {
        let idx = self.index(pos);
        self.cells[idx] = cell;
    }

    /// Reverts every in-progress trail cell to empty (death recovery).
    pub fn clear_trail(&mut self) {
        for cell in &mut self.cells {
            if *cell == Cell::Trail {
                *cell = Cell::Empty;
            }
        }
    }

    pub fn count(&self, wanted: Cell) -> usize {
        self.cells.iter().filter(|c| **c == wanted).count()
    }

    /// Playable (interior) cell count, excluding the border ring.
    pub fn playable_cells(&self) -> i32 {
        (self.cols - 2) * (self.rows - 2)
    }

    /// Claimed share of the playable area, 0.0 to 100.0. Claimed cells only
    /// ever appear in the interior, so the full-grid count is the interior
    /// count.
    pub fn claimed_percent(&self) -> f32 {
        self.count(Cell::Claimed) as f32 / self.playable_cells() as f32 * 100.0
    }
}
