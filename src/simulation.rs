use rand::rngs::StdRng;
use rand::SeedableRng;
use std::thread;
use std::time::{Duration, Instant};

use crate::algorithms::Algorithm;
use crate::config::Config;
use crate::engine::{Engine, ExecutionMode, RunConfig, RunHandle};
use crate::error::Result;
use crate::grid::Grid;
use crate::render::Board;
use crate::statistics::RunStatistics;

/// A reproducible board: dimensions plus the walls a seed scatters on it.
#[derive(Debug, Clone)]
pub struct EnvironmentSetup {
    pub seed: u64,
    pub grid: Grid,
    pub walls_placed: usize,
}

impl EnvironmentSetup {
    /// Builds the board for `config`. Without a seed one is drawn at random
    /// and recorded so the board can be reproduced.
    pub fn generate(config: &Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = Grid::new(config.rows, config.cols)?;
        let walls_placed = grid.scatter_obstacles(config.num_walls, &mut rng);
        log::debug!(
            "generated {}x{} board with {} walls (seed {})",
            config.rows,
            config.cols,
            walls_placed,
            seed
        );
        Ok(EnvironmentSetup {
            seed,
            grid,
            walls_placed,
        })
    }
}

/// Outcome of driving one algorithm over the board.
#[derive(Debug, Clone)]
pub struct AlgorithmResult {
    pub statistics: RunStatistics,
    pub steps: usize,
    pub elapsed: Duration,
}

pub struct Simulation {
    engine: Engine,
    config: Config,
    environment: EnvironmentSetup,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self> {
        let environment = EnvironmentSetup::generate(&config)?;
        Ok(Self::new_with_environment(config, environment))
    }

    pub fn new_with_environment(config: Config, environment: EnvironmentSetup) -> Self {
        Simulation {
            engine: Engine::with_grid(environment.grid.clone()),
            config,
            environment,
        }
    }

    pub fn environment(&self) -> &EnvironmentSetup {
        &self.environment
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    fn run_config(&self, algorithm: Algorithm, mode: ExecutionMode) -> RunConfig {
        RunConfig::new(algorithm, self.config.diagonal, mode).with_heuristic(self.config.heuristic)
    }

    /// Runs one algorithm in the configured mode. Stepwise runs are animated
    /// unless visualization is off.
    pub fn run(&mut self, algorithm: Algorithm) -> Result<AlgorithmResult> {
        let mode = self.config.mode;
        let began = Instant::now();
        let handle = self.engine.run(self.run_config(algorithm, mode));

        let steps = match mode {
            ExecutionMode::Batch => 0,
            ExecutionMode::Stepwise => self.drive(algorithm, handle)?,
        };
        let elapsed = began.elapsed();
        let statistics = self.engine.statistics(handle)?;

        if !self.config.quiet {
            if !self.config.no_visualization {
                self.clear_screen();
                println!("=== SEARCH COMPLETE ===");
                let path = self.engine.path(handle)?;
                let state = self.engine.search_state(handle)?;
                print!("{}", Board::new(self.engine.grid(), Some(state), Some(&path)));
                println!();
            }
            println!("{}", statistics);
        }

        Ok(AlgorithmResult {
            statistics,
            steps,
            elapsed,
        })
    }

    fn drive(&mut self, algorithm: Algorithm, handle: RunHandle) -> Result<usize> {
        let delay = Duration::from_millis(self.config.step_delay_ms(algorithm));
        let animate = !self.config.no_visualization && !self.config.quiet;
        let mut steps = 0;

        loop {
            let event = self.engine.step(handle)?;
            steps += 1;
            if animate {
                self.clear_screen();
                println!("=== PATHFINDING VISUALIZER ===");
                println!(
                    "Algorithm: {} | Step: {} | Visiting: {} | Diagonal: {}",
                    algorithm, steps, event.visited, self.config.diagonal
                );
                println!(
                    "Start: {} | Goal: {} | Newly discovered: {}",
                    self.engine.grid().start(),
                    self.engine.grid().goal(),
                    event.discovered.len()
                );
                let state = self.engine.search_state(handle)?;
                print!("{}", Board::new(self.engine.grid(), Some(state), None));
                thread::sleep(delay);
            }
            if event.is_terminal {
                break;
            }
        }
        Ok(steps)
    }

    /// Runs every algorithm over one shared board.
    pub fn run_all_algorithms(config: Config) -> Result<Vec<AlgorithmResult>> {
        let environment = EnvironmentSetup::generate(&config)?;
        let algorithms = config.algorithm.algorithms();

        println!("Running comparison of {} algorithms...", algorithms.len());
        println!("Environment seed: {} (for reproducibility)", environment.seed);
        println!(
            "Environment: Grid {}x{}, Walls: {}",
            environment.grid.rows(),
            environment.grid.cols(),
            environment.walls_placed
        );
        println!(
            "Start: {}, Goal: {}",
            environment.grid.start(),
            environment.grid.goal()
        );
        println!();

        let mut simulation = Simulation::new_with_environment(config, environment);
        let total = algorithms.len();
        let mut results = Vec::with_capacity(total);
        for (i, algorithm) in algorithms.into_iter().enumerate() {
            println!("Running algorithm {} of {}: {}", i + 1, total, algorithm);
            let result = simulation.run(algorithm)?;
            println!(
                "Completed: {} - Success: {}, Expanded: {}, Time: {:.2?}",
                algorithm,
                result.statistics.path_cost.is_some(),
                result.statistics.expanded,
                result.elapsed
            );
            results.push(result);
        }
        Ok(results)
    }

    /// Moves the goal and refreshes the finished route in batch mode.
    pub fn relocate_goal(&mut self, row: usize, col: usize) -> Result<RunStatistics> {
        self.engine.set_goal(row, col)?;
        let handle = self.engine.rerun()?;
        self.engine.statistics(handle)
    }

    pub fn print_comparison_results(results: &[AlgorithmResult]) {
        let statistics: Vec<RunStatistics> = results.iter().map(|r| r.statistics.clone()).collect();
        crate::statistics::print_comparison(&statistics);
        for result in results {
            println!(
                "{}: {} steps in {:.2?}",
                result.statistics.algorithm, result.steps, result.elapsed
            );
        }
    }

    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn quiet_config(extra: &[&str]) -> Config {
        let mut args = vec!["pathviz", "--quiet", "--no-visualization", "--seed", "11"];
        args.extend_from_slice(extra);
        Config::parse_from(args)
    }

    #[test]
    fn seeded_environment_is_reproducible() {
        let config = quiet_config(&["--rows", "12", "--cols", "16", "--num-walls", "40"]);
        let a = EnvironmentSetup::generate(&config).unwrap();
        let b = EnvironmentSetup::generate(&config).unwrap();
        assert_eq!(a.seed, 11);
        assert_eq!(
            a.grid.obstacles().collect::<Vec<_>>(),
            b.grid.obstacles().collect::<Vec<_>>()
        );
        assert!(a.walls_placed <= 40);
        assert!(!a.grid.is_obstacle(a.grid.start()));
        assert!(!a.grid.is_obstacle(a.grid.goal()));
    }

    #[test]
    fn stepwise_and_batch_agree() {
        let board = ["--rows", "10", "--cols", "14", "--num-walls", "20"];
        let stepwise = quiet_config(&[&board[..], &["--mode", "stepwise"][..]].concat());
        let batch = quiet_config(&[&board[..], &["--mode", "batch"][..]].concat());
        let a = Simulation::new(stepwise).unwrap().run(Algorithm::Jps).unwrap();
        let b = Simulation::new(batch).unwrap().run(Algorithm::Jps).unwrap();
        assert_eq!(a.statistics.path_cost, b.statistics.path_cost);
        assert_eq!(a.statistics.expanded, b.statistics.expanded);
        assert!(a.steps > 0);
        assert_eq!(b.steps, 0);
    }

    #[test]
    fn relocating_goal_refreshes_route() {
        let config = quiet_config(&[
            "--rows",
            "6",
            "--cols",
            "6",
            "--num-walls",
            "0",
            "--mode",
            "batch",
        ]);
        let mut simulation = Simulation::new(config).unwrap();
        let first = simulation.run(Algorithm::AStar).unwrap();
        assert_eq!(first.statistics.path_cost, Some(5.0));
        let moved = simulation.relocate_goal(0, 5).unwrap();
        assert_eq!(moved.path_cost, Some(8.0));
    }
}
