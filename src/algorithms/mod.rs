pub mod a_star;
pub mod common;
pub mod frontier;
pub mod heuristic;
pub mod jps;
pub mod path;
pub mod reference;

use std::fmt;

use crate::grid::Grid;
use a_star::AStar;
use common::SearchAlgorithm;
use heuristic::Heuristic;
use jps::JumpPointSearch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    AStar,
    Jps,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::AStar, Algorithm::Jps];

    /// Builds a fresh search for the grid's current start and goal.
    pub fn create(
        self,
        grid: &Grid,
        allow_diagonal: bool,
        heuristic: Heuristic,
    ) -> Box<dyn SearchAlgorithm> {
        match self {
            Algorithm::AStar => Box::new(AStar::new(grid, allow_diagonal, heuristic)),
            Algorithm::Jps => Box::new(JumpPointSearch::new(grid, allow_diagonal, heuristic)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::AStar => write!(f, "a_star"),
            Algorithm::Jps => write!(f, "jps"),
        }
    }
}
