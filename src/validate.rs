//! Validator: re-simulates a placement from scratch, independent of any
//! bookkeeping the search kept.

use crate::error::SolveError;
use crate::escape::shortest_escape;
use crate::grid::*;
use crate::reach::reach;
use crate::scoring::score;
use crate::solver::Solution;

/// Result of re-simulating a placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    /// Blocks are valid and the Horse is enclosed.
    pub ok: bool,
    /// Score of the reachable region. `None` when the blocks are invalid.
    pub score: Option<i64>,
    pub enclosed: bool,
    /// Every block lies on an in-bounds Air tile.
    pub blocks_valid: bool,
}

/// Re-run reachability and scoring for `blocks`. Never panics: blocks on
/// tiles other than Air are reported through `blocks_valid`.
pub fn validate(grid: &Grid, blocks: &BlockSet) -> Validation {
    if grid.block_mask(blocks).is_err() {
        return Validation {
            ok: false,
            score: None,
            enclosed: false,
            blocks_valid: false,
        };
    }

    let reachable = reach(grid, blocks);
    let enclosed = reachable.enclosed();

    Validation {
        ok: enclosed,
        score: Some(score(grid, &reachable)),
        enclosed,
        blocks_valid: true,
    }
}

/// Check a solution against an independent simulation. Any mismatch means
/// the search is wrong and the solution must not be reported.
pub fn check_solution(puzzle: &Puzzle, solution: &Solution) -> Result<(), SolveError> {
    let grid = puzzle.grid();

    for &coord in solution.blocks.iter() {
        if !grid.contains(coord) || !grid.is_air(grid.index(coord)) {
            return Err(SolveError::BlockOnNonAir(coord));
        }
    }

    if solution.blocks.len() > puzzle.max_blocks() {
        return Err(SolveError::OverBudget {
            used: solution.blocks.len(),
            budget: puzzle.max_blocks(),
        });
    }

    let reachable = reach(grid, &solution.blocks);
    if !reachable.enclosed() {
        let path = shortest_escape(grid, &solution.blocks)
            .ok()
            .flatten()
            .unwrap_or_default();
        return Err(SolveError::NotEnclosed { path });
    }

    let recomputed = score(grid, &reachable);
    if recomputed != solution.score {
        return Err(SolveError::ScoreMismatch {
            claimed: solution.score,
            recomputed,
        });
    }

    if reachable.cells != solution.reachable {
        return Err(SolveError::RegionMismatch {
            claimed: solution.reachable.len(),
            recomputed: reachable.len(),
        });
    }

    Ok(())
}
