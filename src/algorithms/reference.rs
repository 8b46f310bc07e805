use pathfinding::prelude::dijkstra;

use crate::grid::{Coord, Grid};

/// Fixed-point scale for edge costs; `pathfinding` needs an `Ord` cost.
const COST_SCALE: f64 = 1_000_000.0;

/// True optimal start→goal cost, computed with the `pathfinding` crate's
/// Dijkstra over the same neighbor model the searches use.
///
/// Used as the yardstick for route efficiency; `None` when unreachable.
pub fn optimal_cost(grid: &Grid, allow_diagonal: bool) -> Option<f64> {
    let goal = grid.goal();
    dijkstra(
        &grid.start(),
        |&p: &Coord| {
            grid.neighbors(p, allow_diagonal)
                .into_iter()
                .map(|(n, cost)| (n, (cost * COST_SCALE).round() as u64))
                .collect::<Vec<_>>()
        },
        |&p| p == goal,
    )
    .map(|(_, cost)| cost as f64 / COST_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::DIAGONAL_COST;

    #[test]
    fn matches_closed_forms_on_open_grid() {
        let mut grid = Grid::new(5, 7).unwrap();
        grid.set_start(0, 0).unwrap();
        grid.set_goal(4, 6).unwrap();
        assert_eq!(optimal_cost(&grid, false), Some(10.0));
        let diagonal = optimal_cost(&grid, true).unwrap();
        assert!((diagonal - (2.0 + 4.0 * DIAGONAL_COST)).abs() < 1e-5);
    }

    #[test]
    fn none_when_walled_off() {
        let grid: Grid = "S#.\n.#.\n.#G".parse().unwrap();
        assert_eq!(optimal_cost(&grid, true), None);
    }
}
