//! Jump Point Search.
//!
//! JPS expands only *jump points*: cells where an optimal path may have to
//! turn. From each expanded cell it scans in straight or diagonal lines,
//! skipping runs of ordinary cells, and stops where an obstacle exposes a
//! forced neighbor. Edge costs between jump points are the straight-line
//! length of the run that connects them.
//!
//! With diagonal movement disabled a 4-connected variant is used: horizontal
//! runs stop wherever a vertical scan finds something, and vertical runs stop
//! wherever a side cell opens up that was blocked one step earlier.

use crate::algorithms::common::{SearchAlgorithm, SearchState, StepEvent};
use crate::algorithms::heuristic::Heuristic;
use crate::grid::{Coord, Grid, DIAGONAL_COST};

#[derive(Debug)]
pub struct JumpPointSearch {
    state: SearchState,
}

impl JumpPointSearch {
    pub fn new(grid: &Grid, allow_diagonal: bool, heuristic: Heuristic) -> Self {
        JumpPointSearch {
            state: SearchState::new(grid, allow_diagonal, heuristic),
        }
    }

    /// Directions worth scanning from `current`, given how it was reached.
    fn pruned_directions(&self, grid: &Grid, current: usize) -> Vec<(isize, isize)> {
        let coord = grid.coord_at(current);
        let parent = match self.state.nodes[current].parent {
            Some(parent) if current != self.state.start_index() => grid.coord_at(parent),
            _ => {
                return grid
                    .neighbors(coord, self.state.allow_diagonal())
                    .into_iter()
                    .map(|(n, _)| delta(coord, n))
                    .collect();
            }
        };

        let (d_row, d_col) = delta(parent, coord);
        let (d_row, d_col) = (d_row.signum(), d_col.signum());
        let walkable = |dr: isize, dc: isize| grid.is_walkable(coord, dr, dc);
        let mut dirs = Vec::with_capacity(5);

        if !self.state.allow_diagonal() {
            for (dr, dc) in [(-1, 0), (1, 0), (0, 1), (0, -1)] {
                if (dr, dc) != (-d_row, -d_col) && walkable(dr, dc) {
                    dirs.push((dr, dc));
                }
            }
            return dirs;
        }

        if d_row != 0 && d_col != 0 {
            if walkable(0, d_col) {
                dirs.push((0, d_col));
            }
            if walkable(d_row, 0) {
                dirs.push((d_row, 0));
            }
            if walkable(d_row, d_col) {
                dirs.push((d_row, d_col));
            }
            if !walkable(0, -d_col) && walkable(d_row, 0) {
                dirs.push((d_row, -d_col));
            }
            if !walkable(-d_row, 0) && walkable(0, d_col) {
                dirs.push((-d_row, d_col));
            }
        } else if d_col != 0 {
            if walkable(0, d_col) {
                dirs.push((0, d_col));
                for side in [1, -1] {
                    if !walkable(side, 0) && walkable(side, d_col) {
                        dirs.push((side, d_col));
                    }
                }
            }
        } else if walkable(d_row, 0) {
            dirs.push((d_row, 0));
            for side in [1, -1] {
                if !walkable(0, side) && walkable(d_row, side) {
                    dirs.push((d_row, side));
                }
            }
        }
        dirs
    }

    /// Scans from `from` along `(d_row, d_col)` and returns the first jump
    /// point, the goal if the scan hits it, or `None` at a blocked step.
    fn jump(&self, grid: &Grid, from: Coord, d_row: isize, d_col: isize) -> Option<Coord> {
        let goal = self.state.goal();
        let diagonal_moves = self.state.allow_diagonal();
        let mut current = from;

        loop {
            if !grid.is_walkable(current, d_row, d_col) {
                return None;
            }
            let next = current.offset(d_row, d_col)?;
            if next == goal {
                return Some(next);
            }
            let walkable = |dr: isize, dc: isize| grid.is_walkable(next, dr, dc);

            if !diagonal_moves {
                if d_col != 0 {
                    if self.jump(grid, next, 1, 0).is_some()
                        || self.jump(grid, next, -1, 0).is_some()
                    {
                        return Some(next);
                    }
                } else {
                    for side in [1, -1] {
                        if walkable(0, side) && !grid.is_walkable(current, 0, side) {
                            return Some(next);
                        }
                    }
                }
            } else if d_row != 0 && d_col != 0 {
                if (!walkable(0, -d_col) && walkable(d_row, -d_col))
                    || (!walkable(-d_row, 0) && walkable(-d_row, d_col))
                {
                    return Some(next);
                }
                if self.jump(grid, next, 0, d_col).is_some()
                    || self.jump(grid, next, d_row, 0).is_some()
                {
                    return Some(next);
                }
            } else if d_col != 0 {
                if (!walkable(1, 0) && walkable(1, d_col))
                    || (!walkable(-1, 0) && walkable(-1, d_col))
                {
                    return Some(next);
                }
            } else if (!walkable(0, 1) && walkable(d_row, 1))
                || (!walkable(0, -1) && walkable(d_row, -1))
            {
                return Some(next);
            }

            current = next;
        }
    }

    /// Jump points reachable from `current` along its pruned directions.
    fn identify_successors(&self, grid: &Grid, current: usize) -> Vec<Coord> {
        let coord = grid.coord_at(current);
        self.pruned_directions(grid, current)
            .into_iter()
            .filter_map(|(d_row, d_col)| self.jump(grid, coord, d_row, d_col))
            .collect()
    }
}

fn delta(from: Coord, to: Coord) -> (isize, isize) {
    (
        to.row as isize - from.row as isize,
        to.col as isize - from.col as isize,
    )
}

/// Length of the straight or diagonal run between two jump points.
pub fn straight_line_distance(a: Coord, b: Coord) -> f64 {
    let d_row = a.row.abs_diff(b.row);
    let d_col = a.col.abs_diff(b.col);
    if d_row != 0 && d_col != 0 {
        d_row as f64 * DIAGONAL_COST
    } else {
        (d_row + d_col) as f64
    }
}

impl SearchAlgorithm for JumpPointSearch {
    fn name(&self) -> &'static str {
        "JPS"
    }

    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    fn step(&mut self, grid: &Grid) -> Option<StepEvent> {
        if !self.state.ensure_started() {
            return None;
        }
        let current = self.state.pop()?;
        let coord = grid.coord_at(current);
        self.state.nodes[current].closed = true;
        if current == self.state.goal_index() {
            log::trace!("JPS reached goal {} after {} expansions", coord, self.state.expanded());
            return Some(self.state.succeed(coord));
        }

        let successors = self.identify_successors(grid, current);
        let state = &mut self.state;
        let g_cost = state.nodes[current].g_cost;
        let mut discovered = Vec::new();

        for successor in successors {
            let s = grid.index(successor);
            if state.nodes[s].closed {
                continue;
            }
            let new_cost = g_cost + straight_line_distance(coord, successor);
            if new_cost < state.nodes[s].g_cost || !state.frontier.contains(s) {
                let estimated = new_cost + state.estimate(successor);
                let node = &mut state.nodes[s];
                node.parent = Some(current);
                node.g_cost = new_cost;
                node.estimated = estimated;
                node.visited = true;
                state.frontier.push(s, estimated);
                discovered.push(successor);
            }
        }

        log::trace!(
            "JPS expanded {} (g = {:.3}), {} jump points",
            coord,
            g_cost,
            discovered.len()
        );
        Some(state.finish_step(coord, discovered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::SearchStatus;

    fn first_successors(map: &str, allow_diagonal: bool) -> Vec<Coord> {
        let grid: Grid = map.parse().unwrap();
        let mut search = JumpPointSearch::new(&grid, allow_diagonal, Heuristic::Manhattan);
        let mut event = search.step(&grid).unwrap();
        event.discovered.sort();
        event.discovered
    }

    #[test]
    fn open_row_jumps_straight_to_goal() {
        assert_eq!(first_successors("S....G", true), vec![Coord::new(0, 5)]);
        assert_eq!(first_successors("S....G", false), vec![Coord::new(0, 5)]);
    }

    #[test]
    fn straight_scan_stops_at_forced_neighbor() {
        // Scanning east along row 1, the wall at (0,2) exposes (0,3) as a
        // forced neighbor of (1,2).
        let map = "\
            ..#...\n\
            S.....\n\
            ......\n\
            .....G";
        let found = first_successors(map, true);
        assert!(found.contains(&Coord::new(1, 2)), "{:?}", found);
        assert!(!found.contains(&Coord::new(1, 3)));
    }

    #[test]
    fn diagonal_scan_stops_when_axis_scan_finds_goal() {
        // The diagonal from (0,0) passes (1,1) without finding anything; the
        // eastward scan from (2,2) reaches the goal at (2,5).
        let map = "\
            S.....\n\
            ......\n\
            .....G";
        let found = first_successors(map, true);
        assert_eq!(found, vec![Coord::new(2, 2)]);
    }

    #[test]
    fn four_way_horizontal_scan_stops_above_goal_column() {
        let map = "\
            S....\n\
            .....\n\
            ..G..";
        let found = first_successors(map, false);
        assert!(found.contains(&Coord::new(0, 2)), "{:?}", found);
        assert!(found.iter().all(|c| c.row == 0 || c.col == 0));
    }

    #[test]
    fn straight_line_distance_weights_diagonals() {
        assert_eq!(straight_line_distance(Coord::new(0, 0), Coord::new(0, 4)), 4.0);
        let d = straight_line_distance(Coord::new(5, 1), Coord::new(2, 4));
        assert!((d - 3.0 * DIAGONAL_COST).abs() < 1e-12);
    }

    #[test]
    fn goal_cost_counts_run_lengths() {
        let grid: Grid = "S....\n.....\n.....\n....G".parse().unwrap();
        let mut search = JumpPointSearch::new(&grid, true, Heuristic::Manhattan);
        assert_eq!(search.run_to_completion(&grid), SearchStatus::Succeeded);
        let goal = grid.index(grid.goal());
        let cost = search.state().record(goal).g_cost;
        assert!((cost - (1.0 + 3.0 * DIAGONAL_COST)).abs() < 1e-9, "{}", cost);
    }
}
