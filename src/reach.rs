//! Reachability engine: breadth-first flood from the Horse over 4-way
//! adjacency plus portal edges, skipping walls and blocked cells.
//!
//! `Reachability` owns its buffers and is reused across calls. The visited
//! marks are generation-stamped so a new flood never clears the previous one,
//! and the discovery-order vector doubles as the BFS queue.

use crate::grid::*;
use crate::location::Coord;
use log::*;

/// Summary of one flood.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Flood {
    /// Number of reachable cells, the Horse included.
    pub len: usize,
    /// True if any reachable cell is a boundary cell.
    pub touches_boundary: bool,
    /// The boundary cell discovered first (closest in BFS steps), if any.
    pub first_boundary: Option<CellIndex>,
}

impl Flood {
    pub fn enclosed(&self) -> bool {
        !self.touches_boundary
    }
}

/// Reusable flood-fill buffers sized for one grid.
#[derive(Clone)]
pub struct Reachability {
    stamp: Vec<u32>,
    generation: u32,
    parent: Vec<CellIndex>,
    order: Vec<CellIndex>,
}

impl Reachability {
    pub fn new(grid: &Grid) -> Self {
        Reachability {
            stamp: vec![0; grid.len()],
            generation: 0,
            parent: vec![0; grid.len()],
            order: Vec::with_capacity(grid.len()),
        }
    }

    /// Flood from the Horse. `blocked` marks cells treated as walls; callers
    /// guarantee only Air cells are marked.
    pub fn flood(&mut self, grid: &Grid, blocked: &CellMap<bool>) -> Flood {
        debug_assert_eq!(self.stamp.len(), grid.len());

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamp.iter_mut().for_each(|s| *s = 0);
            self.generation = 1;
        }
        let generation = self.generation;

        self.order.clear();

        let start = grid.horse_index();
        self.stamp[start] = generation;
        self.parent[start] = start;
        self.order.push(start);

        let mut first_boundary = None;
        let mut head = 0;

        while head < self.order.len() {
            let cell = self.order[head];
            head += 1;

            if first_boundary.is_none() && grid.is_boundary(cell) {
                first_boundary = Some(cell);
            }

            for next in grid.neighbors(cell) {
                if self.stamp[next] == generation || blocked.get(next) {
                    continue;
                }
                self.stamp[next] = generation;
                self.parent[next] = cell;
                self.order.push(next);
            }
        }

        trace!(
            "Flood: reached={}, escape={:?}",
            self.order.len(),
            first_boundary.map(|c| grid.coord(c))
        );

        Flood {
            len: self.order.len(),
            touches_boundary: first_boundary.is_some(),
            first_boundary,
        }
    }

    /// Cells reached by the last flood, in discovery order (Horse first).
    pub fn cells(&self) -> &[CellIndex] {
        &self.order
    }

    /// Whether the last flood reached `cell`.
    #[inline]
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.generation != 0 && self.stamp[cell] == self.generation
    }

    /// The BFS route from the Horse to `target`, which must have been reached
    /// by the last flood. Portal jumps appear as consecutive cells.
    pub fn route_to(&self, target: CellIndex) -> Vec<CellIndex> {
        debug_assert!(self.contains(target));
        let mut route = vec![target];
        let mut cell = target;
        while self.parent[cell] != cell {
            cell = self.parent[cell];
            route.push(cell);
        }
        route.reverse();
        route
    }
}

/// The cells reachable from the Horse under some block set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachableSet {
    /// Reachable cells in coordinate order.
    pub cells: Vec<Coord>,
    /// True if the Horse can reach an open boundary cell.
    pub touches_boundary: bool,
}

impl ReachableSet {
    pub fn enclosed(&self) -> bool {
        !self.touches_boundary
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells.binary_search(&coord).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Compute the Horse's reachable set under `blocks`.
///
/// # Panics
///
/// Panics if any block lies outside the grid or on a tile that is not Air.
/// Only Air may be blocked; anything else is a caller bug.
pub fn reach(grid: &Grid, blocks: &BlockSet) -> ReachableSet {
    let blocked = match grid.block_mask(blocks) {
        Ok(mask) => mask,
        Err(err) => panic!("invalid block set passed to reach: {}", err),
    };

    let mut engine = Reachability::new(grid);
    let flood = engine.flood(grid, &blocked);

    let mut cells: Vec<CellIndex> = engine.cells().to_vec();
    cells.sort_unstable();

    ReachableSet {
        cells: cells.into_iter().map(|c| grid.coord(c)).collect(),
        touches_boundary: flood.touches_boundary,
    }
}
