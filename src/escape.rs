//! Escape-path finder for diagnostics and interactive play.

use crate::error::GridError;
use crate::grid::*;
use crate::location::Coord;
use pathfinding::directed::bfs::bfs;

/// Shortest route from the Horse to any boundary cell under `blocks`,
/// following the same traversal rules as the reachability engine. Portal
/// jumps appear as consecutive cells.
///
/// Returns `Ok(None)` if the Horse is enclosed, and a one-element path if it
/// already stands on the boundary.
pub fn shortest_escape(grid: &Grid, blocks: &BlockSet) -> Result<Option<Vec<Coord>>, GridError> {
    let blocked = grid.block_mask(blocks)?;

    let path = bfs(
        &grid.horse_index(),
        |&cell| {
            grid.neighbors(cell)
                .filter(|&next| !blocked.get(next))
                .collect::<Vec<_>>()
        },
        |&cell| grid.is_boundary(cell),
    );

    Ok(path.map(|cells| cells.into_iter().map(|cell| grid.coord(cell)).collect()))
}
