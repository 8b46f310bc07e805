use crate::algorithms::common::{SearchAlgorithm, SearchState, StepEvent};
use crate::algorithms::heuristic::Heuristic;
use crate::grid::Grid;

/// Classic best-first A* over the grid's neighbor model.
#[derive(Debug)]
pub struct AStar {
    state: SearchState,
}

impl AStar {
    /// Creates a search for the grid's current start and goal.
    pub fn new(grid: &Grid, allow_diagonal: bool, heuristic: Heuristic) -> Self {
        AStar {
            state: SearchState::new(grid, allow_diagonal, heuristic),
        }
    }
}

impl SearchAlgorithm for AStar {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn state(&self) -> &SearchState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SearchState {
        &mut self.state
    }

    /// Pops the cheapest cell and relaxes its neighbors.
    ///
    /// A neighbor that is still queued and can be reached more cheaply is
    /// pulled off the frontier and marked unvisited so that it is pushed
    /// again with the better cost. Expanded cells are never reopened.
    fn step(&mut self, grid: &Grid) -> Option<StepEvent> {
        let state = &mut self.state;
        if !state.ensure_started() {
            return None;
        }
        let current = state.pop()?;
        let coord = grid.coord_at(current);
        state.nodes[current].closed = true;

        if current == state.goal_index() {
            log::trace!("A* reached goal {} after {} expansions", coord, state.expanded());
            return Some(state.succeed(coord));
        }

        let g_cost = state.nodes[current].g_cost;
        let mut discovered = Vec::new();
        for (neighbor, weight) in grid.neighbors(coord, state.allow_diagonal()) {
            let n = grid.index(neighbor);
            let new_cost = g_cost + weight;

            if state.frontier.contains(n) && new_cost < state.nodes[n].g_cost {
                state.frontier.remove(n);
                state.nodes[n].visited = false;
            }
            if !state.nodes[n].visited && new_cost < state.nodes[n].g_cost {
                let estimated = new_cost + state.estimate(neighbor);
                let node = &mut state.nodes[n];
                node.g_cost = new_cost;
                node.estimated = estimated;
                node.parent = Some(current);
                node.visited = true;
                state.frontier.push(n, estimated);
                discovered.push(neighbor);
            }
        }

        log::trace!(
            "A* expanded {} (g = {:.3}), {} discovered",
            coord,
            g_cost,
            discovered.len()
        );
        Some(state.finish_step(coord, discovered))
    }
}
