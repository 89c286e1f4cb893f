use crate::location::Coord;
use crate::tile::PortalLabel;
use thiserror::Error;

/// Malformed grid descriptions, rejected before any search begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("grid of {rows}x{cols} exceeds the supported size")]
    TooLarge { rows: usize, cols: usize },
    #[error("expected {expected} tiles for the grid dimensions, got {actual}")]
    TileCount { expected: usize, actual: usize },
    #[error("invalid token {0:?}")]
    InvalidToken(String),
    #[error("invalid portal label {0:?}: expected two ASCII alphanumeric characters")]
    InvalidPortalLabel(String),
    #[error("no horse found")]
    NoHorse,
    #[error("multiple horses found at {first} and {second}")]
    MultipleHorses { first: Coord, second: Coord },
    #[error("portal {label} must appear exactly twice; found {count}")]
    PortalMultiplicity { label: PortalLabel, count: usize },
    #[error("block budget {budget} exceeds the {air} air cells available")]
    BudgetExceedsAir { budget: usize, air: usize },
    #[error("cell {0} lies outside the grid")]
    OutOfBounds(Coord),
    #[error("cell {0} is not an air tile and cannot hold a block")]
    NotAir(Coord),
}

/// Internal-consistency failures caught by the validator. Any of these means
/// the search produced a placement that does not survive re-simulation, and
/// the placement must not be reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("block placed on non-air tile at {0}")]
    BlockOnNonAir(Coord),
    #[error("placement uses {used} blocks but the budget is {budget}")]
    OverBudget { used: usize, budget: usize },
    #[error("horse can escape; example path: {path:?}")]
    NotEnclosed { path: Vec<Coord> },
    #[error("score mismatch: search claimed {claimed}, simulation computed {recomputed}")]
    ScoreMismatch { claimed: i64, recomputed: i64 },
    #[error("claimed reachable region ({claimed} cells) differs from simulation ({recomputed} cells)")]
    RegionMismatch { claimed: usize, recomputed: usize },
}
