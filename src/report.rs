use crate::location::Coord;
use crate::solver::SolveOutcome;
use serde::{Deserialize, Serialize};

/// The result shape handed to presentation layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveReport {
    pub enclosed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_set: Option<Vec<Coord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal: Option<bool>,
}

impl From<&SolveOutcome> for SolveReport {
    fn from(outcome: &SolveOutcome) -> Self {
        match outcome {
            SolveOutcome::Enclosed(solution) => SolveReport {
                enclosed: true,
                block_set: Some(solution.blocks.as_slice().to_vec()),
                score: Some(solution.score),
                optimal: Some(solution.optimal),
            },
            SolveOutcome::Unsolvable(_) => SolveReport {
                enclosed: false,
                block_set: None,
                score: None,
                optimal: None,
            },
        }
    }
}
