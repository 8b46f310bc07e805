//! Grid pathfinding engine with A* and Jump Point Search.
//!
//! Searches run either to completion or one frontier pop at a time so a
//! front end can animate them. See [`Engine`] for the lifecycle.

pub mod algorithms;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod render;
pub mod simulation;
pub mod statistics;

pub use algorithms::common::{Outcome, SearchStatus, StepEvent};
pub use algorithms::heuristic::Heuristic;
pub use algorithms::path::{Path, Route};
pub use algorithms::Algorithm;
pub use engine::{Cell, Engine, ExecutionMode, RunConfig, RunHandle};
pub use error::{Error, Result};
pub use grid::{Coord, Direction, Grid};
pub use statistics::RunStatistics;
