//! Area capture: seals a closed trail loop by claiming every empty region
//! that is no longer reachable from the open play area.

use crate::entity::{Direction, GridPos};
use crate::grid::{Cell, Grid};
use std::collections::VecDeque;

/// How far out to look for an empty seed cell when the reference point
/// itself sits on claimed ground (float rounding can put it slightly off).
const SEED_SEARCH_RADIUS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOutcome {
    /// Cells that transitioned to `Claimed` (sealed trail plus enclosed
    /// interior).
    pub claimed_cells: u32,
    /// Claimed share of the playable area after the capture.
    pub percent_covered: f32,
}

/// Claims everything the open region cannot reach.
///
/// `open_seed` names the cell that must stay open: the BFS floods outward
/// from it over empty cells, and whatever empty space it never touches is
/// enclosed by the new loop and gets claimed, along with the trail itself.
/// The session passes the hostile's cell here, so the region the hostile
/// roams always survives the capture.
pub fn capture(grid: &mut Grid, open_seed: GridPos) -> FillOutcome {
    let clamped = GridPos::new(
        open_seed.x.clamp(0, grid.cols - 1),
        open_seed.y.clamp(0, grid.rows - 1),
    );
    let seed = find_empty_seed(grid, clamped);

    let mut visited = vec![false; (grid.cols * grid.rows) as usize];
    let mark = |v: &mut Vec<bool>, p: GridPos, cols: i32| v[(p.y * cols + p.x) as usize] = true;
    let seen = |v: &Vec<bool>, p: GridPos, cols: i32| v[(p.y * cols + p.x) as usize];

    match seed {
        Some(start) => {
            let mut queue = VecDeque::new();
            mark(&mut visited, start, grid.cols);
            queue.push_back(start);

            while let Some(at) = queue.pop_front() {
                for next in Direction::ALL.map(|dir| at.moved(dir)) {
                    if grid.contains(next)
                        && !seen(&visited, next, grid.cols)
                        && grid.cell_at(next) == Cell::Empty
                    {
                        mark(&mut visited, next, grid.cols);
                        queue.push_back(next);
                    }
                }
            }
        }
        None => {
            // Degenerate geometry: no open space left near the reference
            // point. Seal the trail but claim nothing else.
            log::warn!(
                "no empty seed within {} cells of {:?}; skipping enclosure fill",
                SEED_SEARCH_RADIUS,
                clamped
            );
        }
    }

    let mut claimed = 0u32;
    for y in 0..grid.rows {
        for x in 0..grid.cols {
            let at = GridPos::new(x, y);
            match grid.cell_at(at) {
                Cell::Trail => {
                    grid.set(at, Cell::Claimed);
                    claimed += 1;
                }
                Cell::Empty if seed.is_some() && !seen(&visited, at, grid.cols) => {
                    grid.set(at, Cell::Claimed);
                    claimed += 1;
                }
                _ => {}
            }
        }
    }

    FillOutcome {
        claimed_cells: claimed,
        percent_covered: grid.claimed_percent(),
    }
}

/// The reference cell if it is empty, otherwise the nearest empty cell on an
/// expanding square ring around it.
fn find_empty_seed(grid: &Grid, from: GridPos) -> Option<GridPos> {
    if grid.cell_at(from) == Cell::Empty {
        return Some(from);
    }
    for radius in 1..=SEED_SEARCH_RADIUS {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let candidate = GridPos::new(from.x + dx, from.y + dy);
                if grid.contains(candidate) && grid.cell_at(candidate) == Cell::Empty {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Layout;

    fn empty_grid(cols: i32, rows: i32) -> Grid {
        Grid::new(&Layout::new(cols, rows, 25.0).unwrap())
    }

    /// Square loop anchored on the top border: trail down column 7
    /// (rows 1-4), right along row 4 (cols 8-10), and up column 10 back to
    /// the border. Encloses cols 8-9 x rows 1-3.
    fn lay_square_loop(grid: &mut Grid) -> u32 {
        let mut cells = 0;
        for y in 1..=4 {
            grid.set(GridPos::new(7, y), Cell::Trail);
            cells += 1;
        }
        for x in 8..=10 {
            grid.set(GridPos::new(x, 4), Cell::Trail);
            cells += 1;
        }
        for y in 1..=3 {
            grid.set(GridPos::new(10, y), Cell::Trail);
            cells += 1;
        }
        cells
    }

    #[test]
    fn loop_interior_becomes_claimed() {
        let mut grid = empty_grid(15, 15);
        let trail_cells = lay_square_loop(&mut grid);

        // Hostile roams the large region below the loop.
        let outcome = capture(&mut grid, GridPos::new(7, 10));

        // Interior pocket (2x3) plus the trail itself.
        assert_eq!(outcome.claimed_cells, trail_cells + 6);
        for y in 1..=3 {
            for x in 8..=9 {
                assert_eq!(grid.cell_at(GridPos::new(x, y)), Cell::Claimed);
            }
        }
        // Trail sealed.
        assert_eq!(grid.cell_at(GridPos::new(7, 2)), Cell::Claimed);
        assert_eq!(grid.count(Cell::Claimed), (trail_cells + 6) as usize);
        // Open region untouched.
        assert_eq!(grid.cell_at(GridPos::new(7, 10)), Cell::Empty);
        assert_eq!(grid.cell_at(GridPos::new(2, 2)), Cell::Empty);

        let expected = (trail_cells + 6) as f32 / (13.0 * 13.0) * 100.0;
        assert!((outcome.percent_covered - expected).abs() < 1e-3);
    }

    #[test]
    fn region_holding_the_seed_stays_open() {
        let mut grid = empty_grid(15, 15);
        lay_square_loop(&mut grid);

        // Reference point inside the pocket: now the *outside* is enclosed.
        let outcome = capture(&mut grid, GridPos::new(8, 2));

        assert_eq!(grid.cell_at(GridPos::new(8, 2)), Cell::Empty);
        assert_eq!(grid.cell_at(GridPos::new(7, 10)), Cell::Claimed);
        assert!(outcome.claimed_cells > 6);
    }

    #[test]
    fn idempotent_on_fully_claimed_grid() {
        let mut grid = empty_grid(9, 9);
        for y in 1..8 {
            for x in 1..8 {
                grid.set(GridPos::new(x, y), Cell::Claimed);
            }
        }
        let before = grid.clone();

        let outcome = capture(&mut grid, GridPos::new(4, 4));

        assert_eq!(outcome.claimed_cells, 0);
        assert_eq!(grid, before);
        assert!((outcome.percent_covered - 100.0).abs() < 1e-4);
    }

    #[test]
    fn seed_on_claimed_cell_searches_outward() {
        let mut grid = empty_grid(15, 15);
        lay_square_loop(&mut grid);
        grid.set(GridPos::new(7, 10), Cell::Claimed);

        // Reference sits on the claimed cell; nearest empty neighbor keeps
        // the surrounding region open.
        capture(&mut grid, GridPos::new(7, 10));

        assert_eq!(grid.cell_at(GridPos::new(7, 11)), Cell::Empty);
        assert_eq!(grid.cell_at(GridPos::new(8, 2)), Cell::Claimed);
    }

    #[test]
    fn no_seed_seals_trail_and_nothing_else() {
        // Everything claimed except one pocket beyond the seed search
        // radius and one leftover trail cell at the reference.
        let mut far = empty_grid(15, 15);
        for y in 1..14 {
            for x in 1..14 {
                far.set(GridPos::new(x, y), Cell::Claimed);
            }
        }
        far.set(GridPos::new(7, 7), Cell::Trail);
        far.set(GridPos::new(1, 1), Cell::Empty);

        let outcome = capture(&mut far, GridPos::new(7, 7));

        assert_eq!(outcome.claimed_cells, 1);
        assert_eq!(far.cell_at(GridPos::new(7, 7)), Cell::Claimed);
        assert_eq!(far.cell_at(GridPos::new(1, 1)), Cell::Empty);
    }
}
