mod common;

use common::*;
use horse_pen::*;
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn best_score(grid: &Grid, k: usize) -> Option<i64> {
    let p = Puzzle::new(grid.clone(), k).unwrap();
    solve(&p).unwrap().solution().map(|s| s.score)
}

#[test]
fn search_matches_exhaustive_enumeration() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..60 {
        let (rows, cols) = if round % 2 == 0 { (4, 5) } else { (5, 5) };
        let g = random_grid(&mut rng, rows, cols, round % 3 == 0);
        let k = rng.gen_range(0..5usize).min(g.air_count());

        let expected = brute_force(&g, k);
        let p = Puzzle::new(g.clone(), k).unwrap();
        let outcome = solve(&p).unwrap();

        match (expected, outcome) {
            (None, SolveOutcome::Unsolvable(_)) => {}
            (Some((blocks, score)), SolveOutcome::Enclosed(solution)) => {
                assert_eq!(solution.score, score, "round {round}: {:?}", g.tokens());
                assert_eq!(solution.blocks, blocks, "round {round}: {:?}", g.tokens());
                assert!(solution.optimal);
            }
            (expected, outcome) => panic!(
                "round {round}: expected {:?}, solver returned {:?} for {:?}",
                expected,
                outcome,
                g.tokens()
            ),
        }
    }
}

#[test]
fn sequential_search_matches_exhaustive_enumeration() {
    let config = SolverConfig {
        parallel: false,
        ..SolverConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..25 {
        let g = random_grid(&mut rng, 5, 5, true);
        let k = rng.gen_range(0..4usize).min(g.air_count());
        let expected = brute_force(&g, k).map(|(_, score)| score);
        let p = Puzzle::new(g, k).unwrap();
        let actual = solve_with(&p, &config).unwrap().solution().map(|s| s.score);
        assert_eq!(actual, expected);
    }
}

#[test]
fn more_blocks_never_lower_the_score() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..15 {
        let g = random_grid(&mut rng, 5, 5, false);
        let scores: Vec<Option<i64>> = (0..=4usize.min(g.air_count()))
            .map(|k| best_score(&g, k))
            .collect();
        for (lower, higher) in scores.iter().tuple_windows() {
            assert!(higher >= lower, "{:?} for {:?}", scores, g.tokens());
        }
    }
}

#[test]
fn open_grid_score_grows_with_budget() {
    let g = grid(&[
        ". . . . .",
        ". . . . .",
        ". . H . .",
        ". . . . .",
        ". . . . .",
    ]);
    assert_eq!(best_score(&g, 3), None);
    assert_eq!(best_score(&g, 4), Some(1));
    // A diamond of blocks around the plus shape pens five cells.
    assert_eq!(best_score(&g, 8), Some(5));
}

#[test]
fn portal_labels_are_interchangeable() {
    let original = grid(&[
        "W W W W W W",
        "W H . P0 P1 W",
        "W . W W . W",
        "W P1 . . P0 .",
        "W W W W . W",
    ]);
    let swapped = grid(&[
        "W W W W W W",
        "W H . P1 P0 W",
        "W . W W . W",
        "W P0 . . P1 .",
        "W W W W . W",
    ]);

    let air = air_cells(&original);
    for size in 0..=2 {
        for combo in air.iter().copied().combinations(size) {
            let placement: BlockSet = combo.into_iter().collect();
            let a = reach(&original, &placement);
            let b = reach(&swapped, &placement);
            assert_eq!(a, b, "{:?}", placement);
            assert_eq!(score(&original, &a), score(&swapped, &b));
        }
    }
}

#[test]
fn traversal_relation_is_symmetric() {
    let g = grid(&[
        "W W W W W W",
        "W H . P0 P1 W",
        "W . W W . W",
        "W P1 . . P0 .",
        "W W W W . W",
    ]);
    for cell in (0..g.len()).filter(|&c| !g.is_wall(c)) {
        for next in g.neighbors(cell) {
            assert!(
                g.neighbors(next).any(|back| back == cell),
                "{} -> {} has no return edge",
                g.coord(cell),
                g.coord(next)
            );
        }
    }
}

#[test]
fn validation_is_pure() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..10 {
        let g = random_grid(&mut rng, 5, 5, true);
        let air = air_cells(&g);
        for combo in air.iter().copied().combinations(2).take(20) {
            let placement: BlockSet = combo.into_iter().collect();
            assert_eq!(validate(&g, &placement), validate(&g, &placement));
        }
    }
}

#[test]
fn solutions_survive_revalidation() {
    let mut rng = StdRng::seed_from_u64(321);
    for _ in 0..20 {
        let g = random_grid(&mut rng, 5, 6, true);
        let k = rng.gen_range(0..6usize).min(g.air_count());
        let p = Puzzle::new(g.clone(), k).unwrap();
        if let SolveOutcome::Enclosed(solution) = solve(&p).unwrap() {
            let v = validate(&g, &solution.blocks);
            assert!(v.ok);
            assert_eq!(v.score, Some(solution.score));
            assert_eq!(check_solution(&p, &solution), Ok(()));
            assert_eq!(shortest_escape(&g, &solution.blocks).unwrap(), None);
        }
    }
}

#[test]
fn node_limit_still_returns_an_enclosure() {
    let g = grid(&[
        ". . . . . . .",
        ". . . . . . .",
        ". . A . C . .",
        ". . . H . . .",
        ". . C . A . .",
        ". . . . . . .",
        ". . . . . . .",
    ]);
    let p = Puzzle::new(g.clone(), 10).unwrap();
    let config = SolverConfig {
        node_limit: Some(5),
        ..SolverConfig::default()
    };
    let solution = solve_with(&p, &config).unwrap().solution().cloned().unwrap();
    assert!(!solution.optimal);
    assert!(validate(&g, &solution.blocks).ok);
    assert!(!SolveReport::from(&SolveOutcome::Enclosed(solution)).optimal.unwrap());
}
