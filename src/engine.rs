//! The engine owns the grid and at most one run.
//!
//! A run is started with [`Engine::run`] and addressed through the returned
//! [`RunHandle`]. Batch runs finish inside `run`; stepwise runs advance one
//! frontier pop per [`Engine::step`]. Every grid edit bumps the grid
//! revision, and a run started on an older revision is rejected with
//! [`Error::StaleRun`] until it is cancelled or replaced.

use rand::Rng;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::algorithms::common::{SearchAlgorithm, SearchState, SearchStatus, StepEvent};
use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::path::{self, Path};
use crate::algorithms::Algorithm;
use crate::error::{Error, Result};
use crate::grid::{Coord, Grid};
use crate::statistics::RunStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunHandle(u64);

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionMode {
    /// Run to a terminal state inside [`Engine::run`].
    #[default]
    Batch,
    /// One frontier pop per [`Engine::step`].
    Stepwise,
}

/// Everything that selects how a run searches. Passed explicitly to
/// [`Engine::run`]; the engine keeps no other options.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    pub algorithm: Algorithm,
    pub allow_diagonal: bool,
    pub mode: ExecutionMode,
    pub heuristic: Heuristic,
}

impl RunConfig {
    pub fn new(algorithm: Algorithm, allow_diagonal: bool, mode: ExecutionMode) -> Self {
        RunConfig {
            algorithm,
            allow_diagonal,
            mode,
            heuristic: Heuristic::default(),
        }
    }

    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig::new(Algorithm::AStar, false, ExecutionMode::Batch)
    }
}

/// Snapshot of one cell: grid data plus whatever the current run knows.
///
/// Two snapshots are equal when they describe the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Cell {
    pub coord: Coord,
    pub is_obstacle: bool,
    pub visited: bool,
    pub closed: bool,
    pub g_cost: f64,
    pub estimated: f64,
    pub parent: Option<Coord>,
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coord.hash(state);
    }
}

struct ActiveRun {
    handle: RunHandle,
    config: RunConfig,
    search: Box<dyn SearchAlgorithm>,
}

pub struct Engine {
    grid: Grid,
    run: Option<ActiveRun>,
    /// The last run cancelled before it finished, reported as `Cancelled`
    /// until another run starts.
    cancelled: Option<RunHandle>,
    next_run: u64,
    last_config: Option<RunConfig>,
}

impl Engine {
    /// Creates an engine over an empty `rows × cols` grid.
    pub fn configure(rows: usize, cols: usize) -> Result<Self> {
        Ok(Self::with_grid(Grid::new(rows, cols)?))
    }

    pub fn with_grid(grid: Grid) -> Self {
        Engine {
            grid,
            run: None,
            cancelled: None,
            next_run: 1,
            last_config: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn set_obstacle(&mut self, row: usize, col: usize, obstacle: bool) -> Result<()> {
        self.grid.set_obstacle(row, col, obstacle)?;
        self.note_edit();
        Ok(())
    }

    pub fn toggle_obstacle(&mut self, row: usize, col: usize) -> Result<bool> {
        let now_obstacle = self.grid.toggle_obstacle(row, col)?;
        self.note_edit();
        Ok(now_obstacle)
    }

    pub fn set_start(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.set_start(row, col)?;
        self.note_edit();
        Ok(())
    }

    pub fn set_goal(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.set_goal(row, col)?;
        self.note_edit();
        Ok(())
    }

    pub fn clear_obstacles(&mut self) {
        self.grid.clear_obstacles();
        self.note_edit();
    }

    pub fn scatter_obstacles<R: Rng>(&mut self, count: usize, rng: &mut R) -> usize {
        let placed = self.grid.scatter_obstacles(count, rng);
        self.note_edit();
        placed
    }

    fn note_edit(&self) {
        if let Some(run) = &self.run {
            let state = run.search.state();
            if !state.is_done() && state.revision() != self.grid.revision() {
                log::warn!(
                    "grid edited while {} is still running; cancel it before continuing",
                    run.handle
                );
            }
        }
    }

    /// Starts a new run with fresh search state. Any earlier run is
    /// discarded first, so its handle stops being valid.
    pub fn run(&mut self, config: RunConfig) -> RunHandle {
        if let Some(previous) = self.run.take() {
            if !previous.search.state().is_done() {
                log::warn!("discarding unfinished {} to start a new run", previous.handle);
            }
        }
        self.cancelled = None;

        let handle = RunHandle(self.next_run);
        self.next_run += 1;
        let mut search = config
            .algorithm
            .create(&self.grid, config.allow_diagonal, config.heuristic);
        log::debug!(
            "starting {} ({}, diagonal = {}, {:?}) from {} to {}",
            handle,
            search.name(),
            config.allow_diagonal,
            config.mode,
            self.grid.start(),
            self.grid.goal()
        );

        if config.mode == ExecutionMode::Batch {
            let status = search.run_to_completion(&self.grid);
            log::debug!(
                "{} finished {:?} after {} expansions",
                handle,
                status,
                search.state().expanded()
            );
        }

        self.run = Some(ActiveRun {
            handle,
            config,
            search,
        });
        self.last_config = Some(config);
        handle
    }

    /// Repeats the last run configuration as a batch run against the
    /// current grid.
    pub fn rerun(&mut self) -> Result<RunHandle> {
        let config = self
            .last_config
            .ok_or(Error::InvalidState("no previous run to repeat"))?;
        Ok(self.run(RunConfig {
            mode: ExecutionMode::Batch,
            ..config
        }))
    }

    /// Advances a stepwise run by one frontier pop.
    pub fn step(&mut self, handle: RunHandle) -> Result<StepEvent> {
        let grid = &self.grid;
        if self.cancelled == Some(handle) {
            return Err(Error::InvalidState("run was cancelled"));
        }
        let run = match self.run.as_mut() {
            Some(run) if run.handle == handle => run,
            _ => return Err(Error::InvalidState("unknown run")),
        };
        if run.config.mode != ExecutionMode::Stepwise {
            return Err(Error::InvalidState("batch runs cannot be stepped"));
        }
        ensure_fresh(run, grid)?;

        let event = run
            .search
            .step(grid)
            .ok_or(Error::InvalidState("run has already finished"))?;
        if event.is_terminal {
            log::debug!(
                "{} finished {:?} after {} expansions",
                handle,
                run.search.state().status(),
                run.search.state().expanded()
            );
        }
        Ok(event)
    }

    /// The reconstructed route of a finished run.
    pub fn path(&self, handle: RunHandle) -> Result<Path> {
        let run = self.active(handle)?;
        ensure_fresh(run, &self.grid)?;
        let state = run.search.state();
        match state.status() {
            SearchStatus::Succeeded => Ok(path::reconstruct(&self.grid, state)),
            SearchStatus::Failed => Ok(Path::Unreachable),
            // Cancelled runs never stay in `self.run`; `active` rejects them.
            _ => Err(Error::NotReady),
        }
    }

    /// Discards the run's search state. Unknown handles are ignored.
    ///
    /// A run cancelled before it finished keeps reporting
    /// [`SearchStatus::Cancelled`] from [`Engine::status`]; `step` and `path`
    /// reject it with [`Error::InvalidState`]. Cancelling a finished run just
    /// discards it.
    pub fn cancel(&mut self, handle: RunHandle) {
        if self.run.as_ref().is_some_and(|run| run.handle == handle) {
            if let Some(mut run) = self.run.take() {
                if !run.search.state().is_done() {
                    run.search.cancel();
                    self.cancelled = Some(handle);
                }
                log::debug!("cancelled {} ({:?})", handle, run.search.state().status());
            }
        }
    }

    /// Drops whatever run exists. Obstacles, start and goal are untouched.
    pub fn reset(&mut self) {
        self.cancelled = None;
        if let Some(run) = self.run.take() {
            log::debug!("reset discarded {}", run.handle);
        }
    }

    pub fn active_run(&self) -> Option<RunHandle> {
        self.run.as_ref().map(|run| run.handle)
    }

    pub fn status(&self, handle: RunHandle) -> Result<SearchStatus> {
        if self.cancelled == Some(handle) {
            return Ok(SearchStatus::Cancelled);
        }
        Ok(self.active(handle)?.search.state().status())
    }

    pub fn run_config(&self, handle: RunHandle) -> Result<RunConfig> {
        Ok(self.active(handle)?.config)
    }

    /// Read access to the run's working set, for renderers.
    pub fn search_state(&self, handle: RunHandle) -> Result<&SearchState> {
        let run = self.active(handle)?;
        ensure_fresh(run, &self.grid)?;
        Ok(run.search.state())
    }

    /// Counters and costs of a finished run.
    pub fn statistics(&self, handle: RunHandle) -> Result<RunStatistics> {
        let path = self.path(handle)?;
        let run = self.active(handle)?;
        Ok(RunStatistics::collect(
            &self.grid,
            run.config,
            run.search.state(),
            &path,
        ))
    }

    /// Grid data for one cell, merged with the current run's bookkeeping
    /// when that run still matches the grid.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell> {
        let coord = self.grid.coord(row, col)?;
        let mut cell = Cell {
            coord,
            is_obstacle: self.grid.is_obstacle(coord),
            visited: false,
            closed: false,
            g_cost: f64::INFINITY,
            estimated: f64::INFINITY,
            parent: None,
        };
        let fresh = self
            .run
            .as_ref()
            .filter(|run| run.search.state().revision() == self.grid.revision());
        if let Some(run) = fresh {
            let record = run.search.state().record(self.grid.index(coord));
            cell.visited = record.visited;
            cell.closed = record.closed;
            cell.g_cost = record.g_cost;
            cell.estimated = record.estimated;
            cell.parent = record.parent.map(|p| self.grid.coord_at(p));
        }
        Ok(cell)
    }

    fn active(&self, handle: RunHandle) -> Result<&ActiveRun> {
        match &self.run {
            Some(run) if run.handle == handle => Ok(run),
            _ if self.cancelled == Some(handle) => Err(Error::InvalidState("run was cancelled")),
            _ => Err(Error::InvalidState("unknown run")),
        }
    }
}

fn ensure_fresh(run: &ActiveRun, grid: &Grid) -> Result<()> {
    let expected = run.search.state().revision();
    let found = grid.revision();
    if expected != found {
        log::warn!("rejecting {}: grid changed since it started", run.handle);
        return Err(Error::StaleRun {
            run: run.handle,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::common::Outcome;

    fn stepwise(algorithm: Algorithm) -> RunConfig {
        RunConfig::new(algorithm, false, ExecutionMode::Stepwise)
    }

    #[test]
    fn batch_run_is_ready_immediately() {
        let mut engine = Engine::configure(5, 5).unwrap();
        let handle = engine.run(RunConfig::default());
        assert_eq!(engine.status(handle).unwrap(), SearchStatus::Succeeded);
        assert_eq!(engine.path(handle).unwrap().cost(), Some(4.0));
        assert_eq!(
            engine.step(handle),
            Err(Error::InvalidState("batch runs cannot be stepped"))
        );
    }

    #[test]
    fn stepwise_run_needs_driving() {
        let mut engine = Engine::configure(3, 3).unwrap();
        let handle = engine.run(stepwise(Algorithm::AStar));
        assert_eq!(engine.status(handle).unwrap(), SearchStatus::Ready);
        assert_eq!(engine.path(handle), Err(Error::NotReady));

        let first = engine.step(handle).unwrap();
        assert_eq!(first.visited, engine.grid().start());
        let mut last = first;
        while !last.is_terminal {
            last = engine.step(handle).unwrap();
        }
        assert_eq!(last.outcome, Some(Outcome::Found));
        assert_eq!(last.visited, engine.grid().goal());
        assert!(matches!(engine.step(handle), Err(Error::InvalidState(_))));
        assert_eq!(engine.path(handle).unwrap().len(), 3);
    }

    #[test]
    fn edits_make_runs_stale() {
        let mut engine = Engine::configure(4, 4).unwrap();
        let handle = engine.run(stepwise(Algorithm::Jps));
        engine.step(handle).unwrap();
        engine.set_obstacle(0, 0, true).unwrap();
        assert!(matches!(engine.step(handle), Err(Error::StaleRun { .. })));
        assert!(matches!(engine.path(handle), Err(Error::StaleRun { .. })));

        engine.cancel(handle);
        assert!(matches!(engine.step(handle), Err(Error::InvalidState(_))));
        assert_eq!(engine.active_run(), None);
    }

    #[test]
    fn cancelled_run_reports_cancelled_until_replaced() {
        let mut engine = Engine::configure(5, 5).unwrap();
        let handle = engine.run(stepwise(Algorithm::AStar));
        engine.step(handle).unwrap();
        engine.cancel(handle);
        engine.cancel(handle);
        assert_eq!(engine.status(handle), Ok(SearchStatus::Cancelled));
        assert_eq!(engine.step(handle), Err(Error::InvalidState("run was cancelled")));
        assert_eq!(engine.path(handle), Err(Error::InvalidState("run was cancelled")));
        assert!(!engine.cell(2, 0).unwrap().closed);

        let finished = engine.run(RunConfig::default());
        assert!(matches!(engine.status(handle), Err(Error::InvalidState(_))));
        engine.cancel(finished);
        assert_eq!(engine.status(finished), Err(Error::InvalidState("unknown run")));
    }

    #[test]
    fn new_run_replaces_old_handle() {
        let mut engine = Engine::configure(4, 4).unwrap();
        let first = engine.run(stepwise(Algorithm::AStar));
        let second = engine.run(stepwise(Algorithm::AStar));
        assert_ne!(first, second);
        assert!(matches!(engine.step(first), Err(Error::InvalidState(_))));
        assert!(engine.step(second).is_ok());
    }

    #[test]
    fn cell_snapshot_reflects_run() {
        let mut engine = Engine::configure(3, 3).unwrap();
        let handle = engine.run(RunConfig::default());
        let start = engine.grid().start();
        let cell = engine.cell(start.row, start.col).unwrap();
        assert!(cell.visited && cell.closed);
        assert_eq!(cell.g_cost, 0.0);
        assert_eq!(cell.parent, None);

        let goal = engine.grid().goal();
        let goal_cell = engine.cell(goal.row, goal.col).unwrap();
        assert_eq!(goal_cell.g_cost, 2.0);
        assert!(goal_cell.parent.is_some());

        engine.reset();
        assert!(matches!(engine.path(handle), Err(Error::InvalidState(_))));
        let cleared = engine.cell(goal.row, goal.col).unwrap();
        assert!(!cleared.visited);
        assert_eq!(cleared.g_cost, f64::INFINITY);
        assert_eq!(cleared, goal_cell);
    }

    #[test]
    fn rerun_repeats_last_config_in_batch() {
        let mut engine = Engine::configure(5, 5).unwrap();
        assert!(engine.rerun().is_err());
        let handle = engine.run(RunConfig::new(Algorithm::Jps, true, ExecutionMode::Stepwise));
        engine.set_goal(0, 4).unwrap();
        assert!(matches!(engine.path(handle), Err(Error::StaleRun { .. })));

        let again = engine.rerun().unwrap();
        let config = engine.run_config(again).unwrap();
        assert_eq!(config.algorithm, Algorithm::Jps);
        assert_eq!(config.mode, ExecutionMode::Batch);
        assert!(engine.path(again).unwrap().route().is_some());
    }

    #[test]
    fn placement_errors_pass_through() {
        let mut engine = Engine::configure(3, 3).unwrap();
        assert!(matches!(engine.set_obstacle(3, 0, true), Err(Error::OutOfBounds { .. })));
        engine.set_obstacle(0, 0, true).unwrap();
        assert!(matches!(engine.set_start(0, 0), Err(Error::InvalidPlacement { .. })));
        assert!(matches!(Engine::configure(0, 3), Err(Error::InvalidDimensions { .. })));
        assert!(matches!(Engine::configure(usize::MAX, 2), Err(Error::InvalidDimensions { .. })));
    }
}
