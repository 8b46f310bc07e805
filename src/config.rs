use clap::{Parser, ValueEnum};

use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::Algorithm;
use crate::engine::ExecutionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmChoice {
    AStar,
    Jps,
    All,
}

impl AlgorithmChoice {
    pub fn algorithms(self) -> Vec<Algorithm> {
        match self {
            AlgorithmChoice::AStar => vec![Algorithm::AStar],
            AlgorithmChoice::Jps => vec![Algorithm::Jps],
            AlgorithmChoice::All => Algorithm::ALL.to_vec(),
        }
    }
}

/// Animation speed for stepwise runs. JPS expands far fewer cells, so it
/// gets a longer pause per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Speed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl Speed {
    pub fn delay_ms(self, algorithm: Algorithm) -> u64 {
        match (algorithm, self) {
            (Algorithm::AStar, Speed::Slow) => 50,
            (Algorithm::AStar, Speed::Normal) => 25,
            (Algorithm::AStar, Speed::Fast) => 5,
            (Algorithm::Jps, Speed::Slow) => 500,
            (Algorithm::Jps, Speed::Normal) => 250,
            (Algorithm::Jps, Speed::Fast) => 50,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 30)]
    pub rows: usize,

    #[arg(long, default_value_t = 40)]
    pub cols: usize,

    #[arg(long, default_value_t = 250)]
    pub num_walls: usize,

    /// Seed for wall placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = AlgorithmChoice::AStar)]
    pub algorithm: AlgorithmChoice,

    /// Allow diagonal moves
    #[arg(long, default_value_t = false)]
    pub diagonal: bool,

    #[arg(long, value_enum, default_value_t = Heuristic::Manhattan)]
    pub heuristic: Heuristic,

    #[arg(long, value_enum, default_value_t = ExecutionMode::Stepwise)]
    pub mode: ExecutionMode,

    #[arg(long, value_enum, default_value_t = Speed::Normal)]
    pub speed: Speed,

    /// Overrides the per-step delay chosen by --speed
    #[arg(long)]
    pub delay_ms: Option<u64>,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    pub fn step_delay_ms(&self, algorithm: Algorithm) -> u64 {
        self.delay_ms.unwrap_or_else(|| self.speed.delay_ms(algorithm))
    }
}
