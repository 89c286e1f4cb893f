//! Scorer: sums tile values over a reachable region.

use crate::grid::*;
use crate::reach::ReachableSet;

/// Score of a reachable set: the plain sum of its tiles' values.
pub fn score(grid: &Grid, reachable: &ReachableSet) -> i64 {
    reachable
        .cells
        .iter()
        .map(|&coord| grid.kind_at(coord).value())
        .sum()
}

/// Score of a region given by cell indices.
pub fn score_cells<'a>(grid: &Grid, cells: impl IntoIterator<Item = &'a CellIndex>) -> i64 {
    cells.into_iter().map(|&cell| grid.value(cell)).sum()
}

/// Partial sums over a region, used by the search to bound what any
/// further blocking could achieve.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Sum of all values.
    pub total: i64,
    /// Sum of positive values.
    pub positive: i64,
    /// Sum of negative values (zero or less).
    pub negative: i64,
    /// Sum of positive values over cells that are not on the boundary. An
    /// enclosure must drop every boundary cell, so this caps any enclosed
    /// score inside the region.
    pub interior_positive: i64,
}

impl ScoreSummary {
    pub fn of<'a>(grid: &Grid, cells: impl IntoIterator<Item = &'a CellIndex>) -> Self {
        let mut summary = ScoreSummary::default();
        for &cell in cells {
            let value = grid.value(cell);
            summary.total += value;
            if value > 0 {
                summary.positive += value;
                if !grid.is_boundary(cell) {
                    summary.interior_positive += value;
                }
            } else {
                summary.negative += value;
            }
        }
        summary
    }

    /// Upper bound on the score of any enclosure reachable by blocking more
    /// cells inside this region.
    ///
    /// Every enclosure is a subset of the region without boundary cells. If
    /// the region is already enclosed, a strictly larger block set must block
    /// at least one reachable Air cell, which loses that cell's value and can
    /// at best also shed every negative cell.
    pub fn descendant_bound(&self, enclosed: bool) -> i64 {
        if enclosed {
            self.interior_positive
                .min(self.total - crate::constants::AIR_VALUE - self.negative)
        } else {
            self.interior_positive
        }
    }
}
