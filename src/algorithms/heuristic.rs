use std::fmt;

use crate::grid::{Coord, DIAGONAL_COST};

/// Distance estimate from a cell to the goal.
///
/// `Manhattan` is used whether or not diagonal movement is enabled, which
/// makes it an overestimate in 8-way mode. `Octile` is admissible in both
/// modes and must be asked for explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    #[default]
    Manhattan,
    Octile,
}

impl Heuristic {
    pub fn estimate(self, from: Coord, goal: Coord) -> f64 {
        let d_row = from.row.abs_diff(goal.row) as f64;
        let d_col = from.col.abs_diff(goal.col) as f64;
        match self {
            Heuristic::Manhattan => d_row + d_col,
            Heuristic::Octile => d_row.max(d_col) + (DIAGONAL_COST - 1.0) * d_row.min(d_col),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Heuristic::Manhattan => write!(f, "manhattan"),
            Heuristic::Octile => write!(f, "octile"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_ignores_diagonals() {
        let h = Heuristic::Manhattan.estimate(Coord::new(0, 0), Coord::new(3, 4));
        assert_eq!(h, 7.0);
    }

    #[test]
    fn octile_prefers_diagonal_runs() {
        let h = Heuristic::Octile.estimate(Coord::new(4, 4), Coord::new(0, 0));
        assert!((h - 4.0 * DIAGONAL_COST).abs() < 1e-12);
        assert_eq!(Heuristic::Octile.estimate(Coord::new(2, 2), Coord::new(2, 2)), 0.0);
    }
}
