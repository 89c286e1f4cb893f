//! Solve pipeline: feasibility check, subtree search, incumbent merge and
//! validation of the winning placement.

use crate::cut::min_cut;
use crate::error::SolveError;
use crate::escape::shortest_escape;
use crate::grid::*;
use crate::location::Coord;
use crate::reach::Reachability;
use crate::search::*;
use crate::validate::check_solution;
use log::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

fn default_parallel() -> bool {
    true
}

/// Tunables for a solve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Stop after this many search nodes.
    #[serde(default)]
    pub node_limit: Option<u64>,
    /// Stop after this much wall-clock time, in milliseconds.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    /// Search independent subtrees on the rayon pool. Ignored when the crate
    /// is built without the `parallel` feature.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            node_limit: None,
            time_limit_ms: None,
            parallel: default_parallel(),
        }
    }
}

impl SolverConfig {
    /// Build the search budget. The time limit starts counting now.
    pub fn budget(&self) -> SearchBudget {
        let mut budget = SearchBudget::unlimited();
        if let Some(limit) = self.node_limit {
            budget = budget.with_node_limit(limit);
        }
        if let Some(ms) = self.time_limit_ms {
            budget = budget.with_time_limit(Duration::from_millis(ms));
        }
        budget
    }
}

/// Why no placement within budget encloses the Horse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unsolvable {
    /// The Horse starts on a boundary cell.
    HorseOnBoundary,
    /// Some escape route runs only over tiles that cannot be blocked.
    Unblockable,
    /// Enclosure needs more blocks than the budget allows.
    CutExceedsBudget { required: usize, budget: usize },
}

/// An enclosing placement and what it encloses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub blocks: BlockSet,
    pub score: i64,
    /// Cells reachable from the Horse under `blocks`, in coordinate order.
    pub reachable: Vec<Coord>,
    /// False when the search budget ran out before the search completed.
    pub optimal: bool,
    pub stats: SearchStats,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveOutcome {
    Enclosed(Solution),
    Unsolvable(Unsolvable),
}

impl SolveOutcome {
    pub fn is_enclosed(&self) -> bool {
        matches!(self, SolveOutcome::Enclosed(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Enclosed(solution) => Some(solution),
            SolveOutcome::Unsolvable(_) => None,
        }
    }
}

/// Solve to completion with the default configuration.
pub fn solve(puzzle: &Puzzle) -> Result<SolveOutcome, SolveError> {
    solve_with(puzzle, &SolverConfig::default())
}

pub fn solve_with(puzzle: &Puzzle, config: &SolverConfig) -> Result<SolveOutcome, SolveError> {
    let budget = config.budget();
    solve_with_budget(puzzle, &budget, config.parallel)
}

/// Solve under an explicit budget. A cutoff still returns the best enclosing
/// placement found, flagged as not optimal.
pub fn solve_with_budget(
    puzzle: &Puzzle,
    budget: &SearchBudget,
    parallel: bool,
) -> Result<SolveOutcome, SolveError> {
    let grid = puzzle.grid();
    let max_blocks = puzzle.max_blocks();

    if grid.is_boundary(grid.horse_index()) {
        info!("Unsolvable: horse starts on the boundary at {}", grid.horse());
        return Ok(SolveOutcome::Unsolvable(Unsolvable::HorseOnBoundary));
    }

    let no_blocks = CellMap::for_grid(grid, false);
    let mut reach = Reachability::new(grid);
    reach.flood(grid, &no_blocks);

    let cut = match min_cut(grid, reach.cells(), &no_blocks) {
        Some(cut) => cut,
        None => {
            info!("Unsolvable: an escape route cannot be blocked");
            return Ok(SolveOutcome::Unsolvable(Unsolvable::Unblockable));
        }
    };

    if cut.size > max_blocks {
        info!(
            "Unsolvable: enclosure needs {} blocks, budget is {}",
            cut.size, max_blocks
        );
        return Ok(SolveOutcome::Unsolvable(Unsolvable::CutExceedsBudget {
            required: cut.size,
            budget: max_blocks,
        }));
    }

    let shared = SharedBound::new();
    let mut root_engine = SearchEngine::new(grid, max_blocks, &shared);

    // The minimum cut always encloses, so a cutoff has something to return.
    let seed_score = match root_engine.evaluate_placement(&cut.cells) {
        Some(score) => score,
        None => {
            let blocks = BlockSet::from_indices(grid, cut.cells.iter().copied());
            let path = shortest_escape(grid, &blocks).ok().flatten().unwrap_or_default();
            return Err(SolveError::NotEnclosed { path });
        }
    };
    let mut best = Incumbent {
        score: seed_score,
        blocks: cut.cells.clone(),
    };
    debug!("Seeded search with {}-block cut scoring {}", cut.size, seed_score);

    let root = SearchNode::root(grid);
    let candidates = root_engine.expand(&root).unwrap_or_default();
    let subtrees: Vec<SearchNode> = (0..candidates.len())
        .map(|index| root.child(&candidates, index))
        .collect();

    let (root_best, mut stats) = root_engine.finish();
    if let Some(candidate) = root_best {
        if candidate.beats(&best) {
            best = candidate;
        }
    }

    debug!("Searching {} subtrees (parallel={})", subtrees.len(), parallel);

    for (candidate, subtree_stats) in run_subtrees(grid, max_blocks, &shared, budget, subtrees, parallel) {
        stats.merge(&subtree_stats);
        if let Some(candidate) = candidate {
            if candidate.beats(&best) {
                best = candidate;
            }
        }
    }

    let blocks = BlockSet::from_indices(grid, best.blocks.iter().copied());

    let mut mask = CellMap::for_grid(grid, false);
    for &cell in &best.blocks {
        mask.set(cell, true);
    }
    reach.flood(grid, &mask);
    let mut reachable: Vec<CellIndex> = reach.cells().to_vec();
    reachable.sort_unstable();

    let solution = Solution {
        blocks,
        score: best.score,
        reachable: reachable.into_iter().map(|cell| grid.coord(cell)).collect(),
        optimal: !stats.cut_off,
        stats,
    };

    check_solution(puzzle, &solution)?;

    info!(
        "Solved: score={}, blocks={}, optimal={}, nodes={}",
        solution.score,
        solution.blocks.len(),
        solution.optimal,
        solution.stats.nodes_expanded
    );

    Ok(SolveOutcome::Enclosed(solution))
}

fn run_subtree(
    grid: &Grid,
    max_blocks: usize,
    shared: &SharedBound,
    budget: &SearchBudget,
    node: SearchNode,
) -> (Option<Incumbent>, SearchStats) {
    if shared.is_cut_off() || !budget.has_budget(shared.nodes_expanded()) {
        shared.mark_cut_off();
        let stats = SearchStats {
            cut_off: true,
            ..SearchStats::default()
        };
        return (None, stats);
    }

    let mut engine = SearchEngine::new(grid, max_blocks, shared);
    engine.push_root(node);
    engine.step(budget);
    engine.finish()
}

#[cfg(feature = "parallel")]
fn run_subtrees(
    grid: &Grid,
    max_blocks: usize,
    shared: &SharedBound,
    budget: &SearchBudget,
    subtrees: Vec<SearchNode>,
    parallel: bool,
) -> Vec<(Option<Incumbent>, SearchStats)> {
    if parallel {
        subtrees
            .into_par_iter()
            .map(|node| run_subtree(grid, max_blocks, shared, budget, node))
            .collect()
    } else {
        subtrees
            .into_iter()
            .map(|node| run_subtree(grid, max_blocks, shared, budget, node))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_subtrees(
    grid: &Grid,
    max_blocks: usize,
    shared: &SharedBound,
    budget: &SearchBudget,
    subtrees: Vec<SearchNode>,
    _parallel: bool,
) -> Vec<(Option<Incumbent>, SearchStats)> {
    subtrees
        .into_iter()
        .map(|node| run_subtree(grid, max_blocks, shared, budget, node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid;

    fn puzzle(rows: &[&str], k: usize) -> Puzzle {
        Puzzle::new(grid(rows), k).unwrap()
    }

    #[test]
    fn config_builds_budget() {
        let config = SolverConfig {
            node_limit: Some(1),
            ..SolverConfig::default()
        };
        let budget = config.budget();
        assert!(budget.has_budget(0));
        assert!(!budget.has_budget(1));
    }

    #[test]
    fn horse_on_boundary_is_unsolvable() {
        let p = puzzle(&["W H W", "W . W", "W W W"], 1);
        assert_eq!(
            solve(&p).unwrap(),
            SolveOutcome::Unsolvable(Unsolvable::HorseOnBoundary)
        );
    }

    #[test]
    fn unblockable_escape_is_unsolvable() {
        let p = puzzle(&["W C W", "W H W", "W . W", "W W W"], 1);
        assert_eq!(
            solve(&p).unwrap(),
            SolveOutcome::Unsolvable(Unsolvable::Unblockable)
        );
    }

    #[test]
    fn reports_required_cut() {
        let p = puzzle(&[". . .", ". H .", ". . ."], 3);
        assert_eq!(
            solve(&p).unwrap(),
            SolveOutcome::Unsolvable(Unsolvable::CutExceedsBudget {
                required: 4,
                budget: 3
            })
        );
    }

    #[test]
    fn sequential_and_parallel_agree() {
        // Two exits on the ring; sealing both leaves room to trade air for bees.
        let p = puzzle(
            &[
                "W W W W W W",
                "W H A . . W",
                "W . W E . W",
                "W C . . . .",
                "W W . W W W",
            ],
            4,
        );
        let seq = solve_with(
            &p,
            &SolverConfig {
                parallel: false,
                ..SolverConfig::default()
            },
        )
        .unwrap();
        let par = solve(&p).unwrap();
        let (seq, par) = match (seq, par) {
            (SolveOutcome::Enclosed(seq), SolveOutcome::Enclosed(par)) => (seq, par),
            other => panic!("expected two enclosures, got {:?}", other),
        };
        assert_eq!(seq.blocks, par.blocks);
        assert_eq!(seq.score, par.score);
        assert_eq!(seq.reachable, par.reachable);
        assert!(seq.optimal && par.optimal);
    }

    #[test]
    fn cutoff_returns_feasible_placement() {
        let p = puzzle(
            &[
                ". . . . . . .",
                ". . . . . . .",
                ". . A . C . .",
                ". . . H . . .",
                ". . C . A . .",
                ". . . . . . .",
                ". . . . . . .",
            ],
            12,
        );
        let budget = SearchBudget::unlimited().with_node_limit(2);
        let outcome = solve_with_budget(&p, &budget, false).unwrap();
        let solution = outcome.solution().unwrap();
        assert!(!solution.optimal);
        assert!(solution.stats.cut_off);
        assert!(solution.blocks.len() <= 12);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{"node_limit": 500}"#).unwrap();
        assert_eq!(config.node_limit, Some(500));
        assert_eq!(config.time_limit_ms, None);
        assert!(config.parallel);
    }
}
