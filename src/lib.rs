pub mod constants;
pub mod cut;
pub mod error;
pub mod escape;
pub mod grid;
pub mod location;
pub mod reach;
pub mod report;
pub mod scoring;
pub mod search;
pub mod solver;
pub mod tile;
pub mod validate;

pub use error::*;
pub use escape::shortest_escape;
pub use grid::{BlockSet, Grid, GridDescription, Puzzle};
pub use location::Coord;
pub use reach::{reach, ReachableSet};
pub use report::SolveReport;
pub use scoring::score;
pub use search::{SearchBudget, SearchStats};
pub use solver::*;
pub use tile::{Item, PortalLabel, TileKind};
pub use validate::{check_solution, validate, Validation};
