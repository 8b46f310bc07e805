use crate::algorithms::frontier::Frontier;
use crate::algorithms::heuristic::Heuristic;
use crate::grid::{Coord, Grid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SearchStatus::Succeeded | SearchStatus::Failed | SearchStatus::Cancelled
        )
    }
}

/// How a finished search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Found,
    Unreachable,
}

/// What one frontier pop did, for collaborators that animate the search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepEvent {
    /// The cell taken off the frontier.
    pub visited: Coord,
    /// Cells pushed (or re-pushed with a better cost) during this step.
    pub discovered: Vec<Coord>,
    pub is_terminal: bool,
    pub outcome: Option<Outcome>,
}

/// Per-cell bookkeeping for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeRecord {
    pub g_cost: f64,
    pub estimated: f64,
    /// Flat index of the cell this one was reached from.
    pub parent: Option<usize>,
    /// Discovered, i.e. pushed onto the frontier at some point.
    pub visited: bool,
    /// Taken off the frontier and expanded.
    pub closed: bool,
}

impl Default for NodeRecord {
    fn default() -> Self {
        NodeRecord {
            g_cost: f64::INFINITY,
            estimated: f64::INFINITY,
            parent: None,
            visited: false,
            closed: false,
        }
    }
}

/// Working set of a single run. Built fresh for every run and never reused.
#[derive(Debug)]
pub struct SearchState {
    pub(crate) nodes: Vec<NodeRecord>,
    pub(crate) frontier: Frontier,
    start: usize,
    goal: usize,
    start_coord: Coord,
    goal_coord: Coord,
    allow_diagonal: bool,
    heuristic: Heuristic,
    status: SearchStatus,
    expanded: usize,
    revision: u64,
}

impl SearchState {
    pub fn new(grid: &Grid, allow_diagonal: bool, heuristic: Heuristic) -> Self {
        SearchState {
            nodes: vec![NodeRecord::default(); grid.cell_count()],
            frontier: Frontier::new(),
            start: grid.index(grid.start()),
            goal: grid.index(grid.goal()),
            start_coord: grid.start(),
            goal_coord: grid.goal(),
            allow_diagonal,
            heuristic,
            status: SearchStatus::Ready,
            expanded: 0,
            revision: grid.revision(),
        }
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Number of frontier pops so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn start(&self) -> Coord {
        self.start_coord
    }

    pub fn goal(&self) -> Coord {
        self.goal_coord
    }

    pub(crate) fn start_index(&self) -> usize {
        self.start
    }

    pub(crate) fn goal_index(&self) -> usize {
        self.goal
    }

    pub fn allow_diagonal(&self) -> bool {
        self.allow_diagonal
    }

    pub fn heuristic(&self) -> Heuristic {
        self.heuristic
    }

    /// Grid revision this run was started against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn record(&self, index: usize) -> &NodeRecord {
        &self.nodes[index]
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub(crate) fn estimate(&self, coord: Coord) -> f64 {
        self.heuristic.estimate(coord, self.goal_coord)
    }

    /// Moves `Ready` to `Running` by queueing the start cell. Returns false
    /// if the search is already terminal.
    pub(crate) fn ensure_started(&mut self) -> bool {
        match self.status {
            SearchStatus::Ready => {
                let estimated = self.estimate(self.start_coord);
                let node = &mut self.nodes[self.start];
                node.g_cost = 0.0;
                node.estimated = estimated;
                node.visited = true;
                self.frontier.push(self.start, estimated);
                self.status = SearchStatus::Running;
                true
            }
            SearchStatus::Running => true,
            _ => false,
        }
    }

    /// Pops the next cell to expand and counts it. An empty frontier while
    /// running means the goal cannot be reached.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        let next = self.frontier.pop_min();
        match next {
            Some(_) => self.expanded += 1,
            None => self.status = SearchStatus::Failed,
        }
        next
    }

    pub(crate) fn succeed(&mut self, visited: Coord) -> StepEvent {
        self.status = SearchStatus::Succeeded;
        StepEvent {
            visited,
            discovered: Vec::new(),
            is_terminal: true,
            outcome: Some(Outcome::Found),
        }
    }

    /// Closes out an expansion; fails the run if nothing is left to expand.
    pub(crate) fn finish_step(&mut self, visited: Coord, discovered: Vec<Coord>) -> StepEvent {
        if self.frontier.is_empty() {
            self.status = SearchStatus::Failed;
            return StepEvent {
                visited,
                discovered,
                is_terminal: true,
                outcome: Some(Outcome::Unreachable),
            };
        }
        StepEvent {
            visited,
            discovered,
            is_terminal: false,
            outcome: None,
        }
    }

    pub fn cancel(&mut self) {
        if !self.is_done() {
            self.status = SearchStatus::Cancelled;
        }
        self.frontier.clear();
    }
}

/// A search that can be driven one frontier pop at a time.
pub trait SearchAlgorithm: Send {
    fn name(&self) -> &'static str;

    fn state(&self) -> &SearchState;

    fn state_mut(&mut self) -> &mut SearchState;

    /// Performs one frontier pop and its expansion. Returns `None` once the
    /// search has reached a terminal state.
    fn step(&mut self, grid: &Grid) -> Option<StepEvent>;

    /// Steps until terminal and returns the final status.
    fn run_to_completion(&mut self, grid: &Grid) -> SearchStatus {
        while self.step(grid).is_some() {}
        self.state().status()
    }

    fn cancel(&mut self) {
        self.state_mut().cancel();
    }
}

/// Iterator over the step events of a search, ending at the terminal step.
pub struct SearchSteps<'a> {
    search: &'a mut dyn SearchAlgorithm,
    grid: &'a Grid,
}

impl<'a> SearchSteps<'a> {
    pub fn new(search: &'a mut dyn SearchAlgorithm, grid: &'a Grid) -> Self {
        SearchSteps { search, grid }
    }
}

impl Iterator for SearchSteps<'_> {
    type Item = StepEvent;

    fn next(&mut self) -> Option<StepEvent> {
        self.search.step(self.grid)
    }
}
