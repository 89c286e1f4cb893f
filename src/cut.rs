//! Minimum vertex cut between the Horse and the boundary, via max-flow.
//!
//! The cut is computed on a node-split flow network:
//!   - Each reachable tile becomes two graph nodes (in, out) connected by an
//!     in→out edge. Free Air tiles get capacity 1 (cutting it means placing a
//!     block there); every other tile is uncuttable.
//!   - Traversal neighbours (4-way adjacency and portal partners) are
//!     connected out→in with infinite capacity.
//!   - A virtual source feeds the Horse tile.
//!   - Every boundary tile drains into a virtual sink.
//!
//! The max-flow value is the fewest additional blocks that enclose the Horse;
//! the saturated in→out edges on the source side of the min cut are one such
//! placement.

use crate::grid::*;
use fnv::FnvHashSet;
use log::*;
use rs_graph::builder::Builder;
use rs_graph::maxflow::dinic;
use rs_graph::traits::*;
use rs_graph::Net;

/// A minimum set of free Air cells whose blocking encloses the Horse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinCut {
    /// Number of cells in the cut.
    pub size: usize,
    /// Cut cells in index order.
    pub cells: Vec<CellIndex>,
}

/// Compute a minimum enclosing cut within `region`.
///
/// `region` must be the Horse's current reachable set (walls and existing
/// blocks already excluded); paths to the boundary never leave it.
/// `forbidden` marks Air cells that may not be blocked.
///
/// Returns `None` when no finite cut exists: the Horse sits on the boundary,
/// or some escape route consists only of tiles that cannot be blocked.
pub fn min_cut(grid: &Grid, region: &[CellIndex], forbidden: &CellMap<bool>) -> Option<MinCut> {
    let horse = grid.horse_index();
    if grid.is_boundary(horse) {
        return None;
    }

    // --- 1. Assign sequential indices to the region's tiles ---

    let num_tiles = region.len();
    let mut tile_index: Vec<usize> = vec![usize::MAX; grid.len()];
    for (i, &cell) in region.iter().enumerate() {
        tile_index[cell] = i;
    }
    if tile_index[horse] == usize::MAX {
        return None;
    }

    let inf_cap = num_tiles as u32 + 1;
    let cuttable = |cell: CellIndex| grid.is_air(cell) && !forbidden.get(cell);

    // --- 2. Build the flow network ---
    //
    // Node layout:
    //   0 .. num_tiles-1           : in-nodes
    //   num_tiles .. 2*num_tiles-1 : out-nodes
    //   2*num_tiles                : virtual source
    //   2*num_tiles + 1            : virtual sink

    let num_nodes = 2 * num_tiles + 2;
    let source_idx = 2 * num_tiles;
    let sink_idx = 2 * num_tiles + 1;

    let boundary_count = region.iter().filter(|&&c| grid.is_boundary(c)).count();
    let edge_estimate = num_tiles + 5 * num_tiles + boundary_count + 1;

    let mut builder = <Net as rs_graph::builder::Buildable>::Builder::with_capacities(
        num_nodes,
        edge_estimate,
    );
    let nodes: Vec<_> = (0..num_nodes).map(|_| builder.add_node()).collect();
    let mut capacities: Vec<u32> = Vec::with_capacity(edge_estimate);

    let add_edge = |b: &mut <Net as rs_graph::builder::Buildable>::Builder,
                    caps: &mut Vec<u32>,
                    u: usize,
                    v: usize,
                    cap: u32| {
        b.add_edge(nodes[u], nodes[v]);
        caps.push(cap);
    };

    // In→Out edges
    for (i, &cell) in region.iter().enumerate() {
        let cap = if cuttable(cell) { 1 } else { inf_cap };
        add_edge(&mut builder, &mut capacities, i, num_tiles + i, cap);
    }

    // Traversal edges: out[i] → in[j]
    for (i, &cell) in region.iter().enumerate() {
        for next in grid.neighbors(cell) {
            let j = tile_index[next];
            if j != usize::MAX {
                add_edge(&mut builder, &mut capacities, num_tiles + i, j, inf_cap);
            }
        }
    }

    // Source → in[horse]
    add_edge(
        &mut builder,
        &mut capacities,
        source_idx,
        tile_index[horse],
        inf_cap,
    );

    // Out[i] → sink for boundary tiles
    for (i, &cell) in region.iter().enumerate() {
        if grid.is_boundary(cell) {
            add_edge(&mut builder, &mut capacities, num_tiles + i, sink_idx, inf_cap);
        }
    }

    let graph = builder.into_graph();
    let src = nodes[source_idx];
    let snk = nodes[sink_idx];

    // --- 3. Run Dinic's max-flow algorithm ---
    let (value, _flow, mincut_nodes) = dinic(&graph, src, snk, |e| capacities[graph.edge_id(e)]);

    if value >= inf_cap {
        trace!("Min cut: no finite cut, flow={}", value);
        return None;
    }

    // --- 4. Extract cut tiles ---
    //
    // A tile is cut when its in-node is on the source side and its out-node
    // is not.
    let source_side: FnvHashSet<usize> = mincut_nodes.iter().map(|n| graph.node_id(*n)).collect();

    let mut cells: Vec<CellIndex> = region
        .iter()
        .enumerate()
        .filter(|&(i, _)| {
            let in_node_id = graph.node_id(nodes[i]);
            let out_node_id = graph.node_id(nodes[num_tiles + i]);
            source_side.contains(&in_node_id) && !source_side.contains(&out_node_id)
        })
        .map(|(_, &cell)| cell)
        .collect();
    cells.sort_unstable();

    debug_assert_eq!(cells.len() as u32, value);

    Some(MinCut {
        size: value as usize,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tests::grid;
    use crate::location::Coord;
    use crate::reach::Reachability;

    fn root_cut(g: &Grid) -> Option<MinCut> {
        let mut engine = Reachability::new(g);
        engine.flood(g, &CellMap::for_grid(g, false));
        min_cut(g, engine.cells(), &CellMap::for_grid(g, false))
    }

    #[test]
    fn open_centre_needs_four() {
        let g = grid(&[". . .", ". H .", ". . ."]);
        let cut = root_cut(&g).unwrap();
        assert_eq!(cut.size, 4);
        let coords: Vec<Coord> = cut.cells.iter().map(|&c| g.coord(c)).collect();
        assert_eq!(
            coords,
            vec![
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 2),
                Coord::new(2, 1),
            ]
        );
    }

    #[test]
    fn corridor_needs_one() {
        let g = grid(&[
            "W W W W W",
            "W H . . W",
            "W W W . W",
            "W W W . W",
        ]);
        assert_eq!(root_cut(&g).unwrap().size, 1);
    }

    #[test]
    fn already_enclosed_needs_none() {
        let g = grid(&["W W W", "W H W", "W W W"]);
        let cut = root_cut(&g).unwrap();
        assert_eq!(cut.size, 0);
        assert!(cut.cells.is_empty());
    }

    #[test]
    fn unblockable_route_has_no_cut() {
        // The only way out is through cherries, which cannot be blocked.
        let g = grid(&["W C W", "W H W", "W W W"]);
        assert_eq!(root_cut(&g), None);
    }

    #[test]
    fn horse_on_boundary_has_no_cut() {
        let g = grid(&["W H W", "W . W", "W W W"]);
        assert_eq!(root_cut(&g), None);
    }

    #[test]
    fn forbidden_cells_cannot_be_cut() {
        let g = grid(&[
            "W W W W W",
            "W H . . W",
            "W W W . W",
            "W W W . W",
        ]);
        let mut engine = Reachability::new(&g);
        engine.flood(&g, &CellMap::for_grid(&g, false));
        let mut forbidden = CellMap::for_grid(&g, false);
        forbidden.set(g.index(Coord::new(1, 2)), true);
        forbidden.set(g.index(Coord::new(1, 3)), true);
        forbidden.set(g.index(Coord::new(2, 3)), true);
        let cut = min_cut(&g, engine.cells(), &forbidden).unwrap();
        assert_eq!(cut.cells, vec![g.index(Coord::new(3, 3))]);

        forbidden.set(g.index(Coord::new(3, 3)), true);
        assert_eq!(min_cut(&g, engine.cells(), &forbidden), None);
    }

    #[test]
    fn portal_routes_count_towards_the_cut() {
        // Escape either straight down, or through the portal pair to the
        // right-hand exit.
        let g = grid(&[
            "W W W W W W",
            "W H P0 W . W",
            "W . W W P0 .",
            "W . W W W W",
        ]);
        assert_eq!(root_cut(&g).unwrap().size, 2);
    }
}
