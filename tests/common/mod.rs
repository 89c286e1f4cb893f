#![allow(dead_code)]

use horse_pen::*;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Build a grid from whitespace-separated token rows.
pub fn grid(rows: &[&str]) -> Grid {
    let cols = rows[0].split_whitespace().count();
    Grid::from_tokens(
        rows.len(),
        cols,
        rows.iter().flat_map(|row| row.split_whitespace()),
    )
    .unwrap()
}

pub fn puzzle(rows: &[&str], k: usize) -> Puzzle {
    Puzzle::new(grid(rows), k).unwrap()
}

pub fn blocks(coords: &[(u16, u16)]) -> BlockSet {
    coords.iter().map(|&rc| Coord::from(rc)).collect()
}

pub fn air_cells(grid: &Grid) -> Vec<Coord> {
    (0..grid.rows())
        .cartesian_product(0..grid.cols())
        .map(|(r, c)| Coord::from_coords(r, c))
        .filter(|&coord| grid.kind_at(coord).is_air())
        .collect()
}

/// Exhaustive reference: the best enclosing placement of at most `k` blocks,
/// preferring higher score, then fewer blocks, then the lexicographically
/// smallest coordinates.
pub fn brute_force(grid: &Grid, k: usize) -> Option<(BlockSet, i64)> {
    let air = air_cells(grid);
    let mut best: Option<(BlockSet, i64)> = None;
    for size in 0..=k.min(air.len()) {
        for combo in air.iter().copied().combinations(size) {
            let placement: BlockSet = combo.into_iter().collect();
            let v = validate(grid, &placement);
            if !v.ok {
                continue;
            }
            let score = v.score.unwrap();
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((placement, score));
            }
        }
    }
    best
}

/// A random `rows x cols` grid with one Horse, a mix of items and walls, and
/// optionally one portal pairing.
pub fn random_grid(rng: &mut StdRng, rows: usize, cols: usize, with_portal: bool) -> Grid {
    let len = rows * cols;
    let mut tokens: Vec<&str> = (0..len)
        .map(|_| match rng.gen_range(0..20) {
            0..=3 => "W",
            4 => "C",
            5 => "A",
            6 | 7 => "E",
            _ => ".",
        })
        .collect();

    // Keep the Horse off the ring most of the time so enclosure is possible.
    let horse = if rng.gen_range(0..8) == 0 {
        rng.gen_range(0..len)
    } else {
        rng.gen_range(1..rows - 1) * cols + rng.gen_range(1..cols - 1)
    };
    tokens[horse] = "H";

    if with_portal {
        let others: Vec<usize> = (0..len).filter(|&i| i != horse).collect();
        let ends: Vec<usize> = others.choose_multiple(rng, 2).copied().collect();
        for end in ends {
            tokens[end] = "P0";
        }
    }

    Grid::from_tokens(rows, cols, tokens).unwrap()
}
