use thiserror::Error;

use crate::engine::RunHandle;

/// Errors reported by the grid and the search engine.
///
/// An unreachable goal is not an error; it is reported as
/// [`Outcome::Unreachable`](crate::algorithms::common::Outcome::Unreachable).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("cannot place at ({row}, {col}): {reason}")]
    InvalidPlacement {
        row: usize,
        col: usize,
        reason: &'static str,
    },

    #[error("grid dimensions must be non-zero, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("run has not reached a terminal state")]
    NotReady,

    #[error("{run} was started on grid revision {expected}, the grid is now at {found}")]
    StaleRun {
        run: RunHandle,
        expected: u64,
        found: u64,
    },

    #[error("map line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
