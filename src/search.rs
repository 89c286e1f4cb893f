//! Branch-and-bound search over block placements.
//!
//! The `SearchEngine` drives a depth-first search with an explicit stack of
//! frames, so a search budget can stop it between any two nodes and a later
//! `step` can resume where it left off. Each node is a block set plus a set of
//! forbidden cells. Children are generated from an ordered candidate list:
//! child *i* blocks candidate *i* and forbids candidates `0..i`, which visits
//! every block set at most once.
//!
//! Candidates come from the node's flood:
//!   - not enclosed: the free Air cells on the shortest escape route, one of
//!     which any enclosing superset must block;
//!   - enclosed: the free Air cells inside the region, which is only worth
//!     exploring while shedding negative tiles could beat the incumbent.
//!
//! Cells never reached from the Horse are never candidates.
//!
//! Nodes are cut when the positive value left inside the region cannot beat
//! the shared incumbent bound, or when the minimum cut needed to enclose the
//! Horse exceeds the remaining budget.

use crate::cut::min_cut;
use crate::grid::*;
use crate::reach::Reachability;
use crate::scoring::ScoreSummary;
use log::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Node / time budget for a search.
pub struct SearchBudget {
    node_limit: Option<u64>,
    deadline: Option<Instant>,
    /// Function that returns true if the search should continue working.
    should_continue: Box<dyn Fn() -> bool + Send + Sync>,
}

impl SearchBudget {
    pub fn new<F: Fn() -> bool + Send + Sync + 'static>(should_continue: F) -> Self {
        SearchBudget {
            node_limit: None,
            deadline: None,
            should_continue: Box::new(should_continue),
        }
    }

    /// Unlimited budget: the search runs to completion.
    pub fn unlimited() -> Self {
        SearchBudget::new(|| true)
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.deadline = Some(Instant::now() + limit);
        self
    }

    /// Returns true if there is budget remaining after `nodes_expanded` nodes.
    pub fn has_budget(&self, nodes_expanded: u64) -> bool {
        if let Some(limit) = self.node_limit {
            if nodes_expanded >= limit {
                return false;
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        (self.should_continue)()
    }
}

/// State shared by every worker of one solve: the incumbent score bound,
/// the node counter the budget is charged against, and the cutoff flag.
#[derive(Debug)]
pub struct SharedBound {
    best_score: AtomicI64,
    nodes_expanded: AtomicU64,
    cut_off: AtomicBool,
}

impl Default for SharedBound {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedBound {
    pub fn new() -> Self {
        SharedBound {
            best_score: AtomicI64::new(i64::MIN),
            nodes_expanded: AtomicU64::new(0),
            cut_off: AtomicBool::new(false),
        }
    }

    /// Raise the bound to `score` if it is higher. The bound never decreases.
    /// Returns true if this call raised it.
    pub fn raise(&self, score: i64) -> bool {
        loop {
            let current = self.best_score.load(Ordering::Acquire);
            if score <= current {
                return false;
            }
            match self.best_score.compare_exchange(
                current,
                score,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(_) => continue,
            }
        }
    }

    /// Best enclosed score found by any worker, or `i64::MIN`.
    pub fn best_score(&self) -> i64 {
        self.best_score.load(Ordering::Acquire)
    }

    fn count_node(&self) -> u64 {
        self.nodes_expanded.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn nodes_expanded(&self) -> u64 {
        self.nodes_expanded.load(Ordering::Relaxed)
    }

    pub fn mark_cut_off(&self) {
        self.cut_off.store(true, Ordering::Release);
    }

    pub fn is_cut_off(&self) -> bool {
        self.cut_off.load(Ordering::Acquire)
    }
}

/// An enclosing placement and its score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Incumbent {
    pub score: i64,
    /// Blocked cells in index (= coordinate) order.
    pub blocks: Vec<CellIndex>,
}

impl Incumbent {
    /// Total preference order: higher score first, then fewer blocks, then
    /// the lexicographically smallest block list. `Less` means `self` wins.
    pub fn preference(&self, other: &Incumbent) -> CmpOrdering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.blocks.len().cmp(&other.blocks.len()))
            .then_with(|| self.blocks.cmp(&other.blocks))
    }

    pub fn beats(&self, other: &Incumbent) -> bool {
        self.preference(other) == CmpOrdering::Less
    }
}

/// Progress statistics for the search.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    pub nodes_expanded: u64,
    pub pruned_by_bound: u64,
    pub pruned_by_cut: u64,
    pub enclosures_found: u64,
    /// True if the budget ran out before the search completed.
    pub cut_off: bool,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes_expanded += other.nodes_expanded;
        self.pruned_by_bound += other.pruned_by_bound;
        self.pruned_by_cut += other.pruned_by_cut;
        self.enclosures_found += other.enclosures_found;
        self.cut_off |= other.cut_off;
    }
}

/// A point in the search tree.
#[derive(Clone, Debug)]
pub struct SearchNode {
    /// Blocked cells, sorted.
    pub blocks: Vec<CellIndex>,
    /// Air cells this subtree may never block.
    pub forbidden: CellMap<bool>,
}

impl SearchNode {
    pub fn root(grid: &Grid) -> Self {
        SearchNode {
            blocks: Vec::new(),
            forbidden: CellMap::for_grid(grid, false),
        }
    }

    /// The `index`-th child over `candidates`: blocks `candidates[index]` and
    /// forbids every earlier candidate.
    pub fn child(&self, candidates: &[CellIndex], index: usize) -> SearchNode {
        let cell = candidates[index];
        let mut blocks = self.blocks.clone();
        let pos = blocks.binary_search(&cell).unwrap_or_else(|p| p);
        blocks.insert(pos, cell);

        let mut forbidden = self.forbidden.clone();
        for &earlier in &candidates[..index] {
            forbidden.set(earlier, true);
        }

        SearchNode { blocks, forbidden }
    }
}

/// A single frame in the search stack.
struct SearchFrame {
    node: SearchNode,
    /// Ordered cells to branch on.
    candidates: Vec<CellIndex>,
    /// Index of the next candidate to expand.
    next_candidate_index: usize,
}

/// Result of a single step of the search engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// Search is still in progress (budget exhausted).
    Running,
    /// Search is complete. The best placement is stored in the engine.
    Complete,
}

/// Depth-first branch-and-bound over one subtree of block placements.
pub struct SearchEngine<'a> {
    grid: &'a Grid,
    max_blocks: usize,
    shared: &'a SharedBound,
    reach: Reachability,
    /// Scratch mask of the node currently being flooded.
    blocked: CellMap<bool>,
    stack: Vec<SearchFrame>,
    best: Option<Incumbent>,
    stats: SearchStats,
}

impl<'a> SearchEngine<'a> {
    pub fn new(grid: &'a Grid, max_blocks: usize, shared: &'a SharedBound) -> Self {
        SearchEngine {
            grid,
            max_blocks,
            shared,
            reach: Reachability::new(grid),
            blocked: CellMap::for_grid(grid, false),
            stack: Vec::new(),
            best: None,
            stats: SearchStats::default(),
        }
    }

    /// Make `node` the root of this engine's subtree. The node is evaluated
    /// immediately; a frame is pushed only if it has children to explore.
    pub fn push_root(&mut self, node: SearchNode) {
        if let Some(candidates) = self.expand(&node) {
            self.stack.push(SearchFrame {
                node,
                candidates,
                next_candidate_index: 0,
            });
        }
    }

    /// Run the search until the budget is exhausted or the subtree is done.
    pub fn step(&mut self, budget: &SearchBudget) -> SearchResult {
        loop {
            if self.stack.is_empty() {
                debug!(
                    "Search complete: expanded={}, pruned_bound={}, pruned_cut={}, enclosures={}",
                    self.stats.nodes_expanded,
                    self.stats.pruned_by_bound,
                    self.stats.pruned_by_cut,
                    self.stats.enclosures_found
                );
                return SearchResult::Complete;
            }

            if self.shared.is_cut_off() || !budget.has_budget(self.shared.nodes_expanded()) {
                self.shared.mark_cut_off();
                self.stats.cut_off = true;
                debug!(
                    "Search budget exhausted: expanded={}, stack_depth={}",
                    self.shared.nodes_expanded(),
                    self.stack.len()
                );
                return SearchResult::Running;
            }

            let frame = match self.stack.last_mut() {
                Some(frame) => frame,
                None => continue,
            };

            if frame.next_candidate_index >= frame.candidates.len() {
                self.stack.pop();
                continue;
            }

            let child = frame.node.child(&frame.candidates, frame.next_candidate_index);
            frame.next_candidate_index += 1;

            if let Some(candidates) = self.expand(&child) {
                self.stack.push(SearchFrame {
                    node: child,
                    candidates,
                    next_candidate_index: 0,
                });
            }
        }
    }

    /// Evaluate a node: record it if it encloses the Horse, apply the bounds,
    /// and return the cells to branch on (or `None` for a leaf).
    pub fn expand(&mut self, node: &SearchNode) -> Option<Vec<CellIndex>> {
        self.stats.nodes_expanded += 1;
        self.shared.count_node();

        let flood = self.flood(&node.blocks);
        let summary = ScoreSummary::of(self.grid, self.reach.cells());
        let bound = self.bound();

        if summary.interior_positive < bound {
            self.stats.pruned_by_bound += 1;
            trace!(
                "Pruned {:?}: bound {} < incumbent {}",
                node.blocks,
                summary.interior_positive,
                bound
            );
            return None;
        }

        if flood.enclosed() {
            self.offer(Incumbent {
                score: summary.total,
                blocks: node.blocks.clone(),
            });
        }

        let remaining = self.max_blocks.saturating_sub(node.blocks.len());
        if remaining == 0 {
            return None;
        }

        let grid = self.grid;
        let free = |cell: CellIndex| grid.is_air(cell) && !node.forbidden.get(cell);

        let mut candidates: Vec<CellIndex> = if flood.enclosed() {
            if summary.descendant_bound(true) < self.bound() {
                self.stats.pruned_by_bound += 1;
                return None;
            }
            self.reach.cells().iter().copied().filter(|&c| free(c)).collect()
        } else {
            match min_cut(grid, self.reach.cells(), &node.forbidden) {
                Some(cut) if cut.size <= remaining => {}
                _ => {
                    self.stats.pruned_by_cut += 1;
                    return None;
                }
            }
            let exit = flood.first_boundary?;
            self.reach
                .route_to(exit)
                .into_iter()
                .filter(|&c| free(c))
                .collect()
        };

        if candidates.is_empty() {
            return None;
        }
        candidates.sort_unstable();
        Some(candidates)
    }

    /// Flood with `blocks` applied and offer the placement if it encloses the
    /// Horse. Returns its score when it does.
    pub fn evaluate_placement(&mut self, blocks: &[CellIndex]) -> Option<i64> {
        let flood = self.flood(blocks);
        if !flood.enclosed() {
            return None;
        }
        let score = ScoreSummary::of(self.grid, self.reach.cells()).total;
        self.offer(Incumbent {
            score,
            blocks: blocks.to_vec(),
        });
        Some(score)
    }

    /// Record `candidate` if it beats the local best, and raise the shared bound.
    pub fn offer(&mut self, candidate: Incumbent) {
        self.stats.enclosures_found += 1;
        self.shared.raise(candidate.score);
        if self.best.as_ref().map_or(true, |best| candidate.beats(best)) {
            trace!(
                "New incumbent: score={}, blocks={}",
                candidate.score,
                candidate.blocks.len()
            );
            self.best = Some(candidate);
        }
    }

    /// The pruning bound: the better of the local and shared incumbents.
    fn bound(&self) -> i64 {
        let local = self.best.as_ref().map_or(i64::MIN, |b| b.score);
        local.max(self.shared.best_score())
    }

    fn flood(&mut self, blocks: &[CellIndex]) -> crate::reach::Flood {
        for &cell in blocks {
            self.blocked.set(cell, true);
        }
        let flood = self.reach.flood(self.grid, &self.blocked);
        for &cell in blocks {
            self.blocked.set(cell, false);
        }
        flood
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Take the best placement and the statistics out of the engine.
    pub fn finish(self) -> (Option<Incumbent>, SearchStats) {
        (self.best, self.stats)
    }
}
