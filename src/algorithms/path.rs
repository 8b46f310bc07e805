use crate::algorithms::common::SearchState;
use crate::grid::{Coord, Direction, Grid};

/// A route from start to goal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    /// Every cell from start to goal inclusive; consecutive cells are adjacent.
    pub cells: Vec<Coord>,
    /// The parent chain as the search recorded it. For JPS these are the
    /// jump points; for A* they equal `cells`.
    pub waypoints: Vec<Coord>,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Path {
    Found(Route),
    Unreachable,
}

impl Path {
    pub fn route(&self) -> Option<&Route> {
        match self {
            Path::Found(route) => Some(route),
            Path::Unreachable => None,
        }
    }

    /// Cells from start to goal; empty when unreachable.
    pub fn cells(&self) -> &[Coord] {
        self.route().map(|r| r.cells.as_slice()).unwrap_or(&[])
    }

    pub fn waypoints(&self) -> &[Coord] {
        self.route().map(|r| r.waypoints.as_slice()).unwrap_or(&[])
    }

    pub fn cost(&self) -> Option<f64> {
        self.route().map(|r| r.cost)
    }

    pub fn len(&self) -> usize {
        self.cells().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells().is_empty()
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Path::Unreachable)
    }

    /// Direction of each step along the route, one fewer than the cells.
    pub fn directions(&self) -> Vec<Direction> {
        self.cells()
            .windows(2)
            .filter_map(|w| {
                Direction::from_delta(
                    w[1].row as isize - w[0].row as isize,
                    w[1].col as isize - w[0].col as isize,
                )
            })
            .collect()
    }
}

/// Follows parent links from the goal back to the start.
///
/// Returns `Path::Unreachable` instead of failing when the goal has no
/// parent or the chain is broken.
pub fn reconstruct(grid: &Grid, state: &SearchState) -> Path {
    let start = state.start_index();
    let goal = state.goal_index();
    if goal != start && state.record(goal).parent.is_none() {
        return Path::Unreachable;
    }

    let mut chain = vec![goal];
    let mut current = goal;
    while current != start {
        match state.record(current).parent {
            Some(parent) if chain.len() <= grid.cell_count() => {
                chain.push(parent);
                current = parent;
            }
            _ => return Path::Unreachable,
        }
    }
    chain.reverse();

    let waypoints: Vec<Coord> = chain.into_iter().map(|i| grid.coord_at(i)).collect();
    let cost = if goal == start { 0.0 } else { state.record(goal).g_cost };
    Path::Found(Route {
        cells: interpolate(&waypoints),
        waypoints,
        cost,
    })
}

/// Expands a waypoint chain into unit steps.
fn interpolate(waypoints: &[Coord]) -> Vec<Coord> {
    let Some(&first) = waypoints.first() else {
        return Vec::new();
    };
    let mut cells = vec![first];
    for pair in waypoints.windows(2) {
        let target = pair[1];
        let mut current = pair[0];
        while current != target {
            let d_row = (target.row as isize - current.row as isize).signum();
            let d_col = (target.col as isize - current.col as isize).signum();
            match current.offset(d_row, d_col) {
                Some(next) => current = next,
                None => break,
            }
            cells.push(current);
        }
    }
    cells
}
