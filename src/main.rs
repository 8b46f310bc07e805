use clap::Parser;

use pathviz::config::{AlgorithmChoice, Config};
use pathviz::simulation::Simulation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let config = Config::parse();

    println!("Starting pathfinding visualizer...");
    println!("Grid size: {}x{}", config.rows, config.cols);
    println!("Walls: {}", config.num_walls);
    println!(
        "Algorithm: {:?} | Diagonal moves: {} | Heuristic: {} | Mode: {:?}",
        config.algorithm, config.diagonal, config.heuristic, config.mode
    );

    if config.no_visualization {
        println!("Visualization disabled - running in fast mode");
    } else {
        println!("Visualization enabled, speed {:?}", config.speed);
        println!("Press Ctrl+C to stop the search");
    }
    println!();

    if config.algorithm == AlgorithmChoice::All {
        let results = Simulation::run_all_algorithms(config)?;
        Simulation::print_comparison_results(&results);
        return Ok(());
    }

    let algorithms = config.algorithm.algorithms();
    let mut simulation = Simulation::new(config)?;
    println!(
        "Environment seed: {} (for reproducibility)",
        simulation.environment().seed
    );
    for algorithm in algorithms {
        let result = simulation.run(algorithm)?;
        println!("\n=== TIMING ANALYSIS ===");
        println!("Steps: {}", result.steps);
        println!("Total search time: {:.2?}", result.elapsed);
        if result.statistics.path_cost.is_none() {
            println!("No route exists with the current walls");
            println!("Try reducing --num-walls or enabling --diagonal");
        }
    }
    Ok(())
}
