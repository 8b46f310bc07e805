use std::fmt;

use crate::algorithms::common::{SearchState, SearchStatus};
use crate::algorithms::heuristic::Heuristic;
use crate::algorithms::path::Path;
use crate::algorithms::reference;
use crate::algorithms::Algorithm;
use crate::engine::RunConfig;
use crate::grid::Grid;

/// Counters and costs of one finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub algorithm: Algorithm,
    pub allow_diagonal: bool,
    pub heuristic: Heuristic,
    pub status: SearchStatus,
    pub expanded: usize,
    pub discovered: usize,
    pub path_cells: usize,
    pub path_cost: Option<f64>,
    pub optimal_cost: Option<f64>,
    pub route_efficiency: f64,
    pub num_obstacles: usize,
}

impl RunStatistics {
    pub fn collect(grid: &Grid, config: RunConfig, state: &SearchState, path: &Path) -> Self {
        let discovered = (0..grid.cell_count())
            .filter(|&i| state.record(i).visited)
            .count();
        let mut stats = RunStatistics {
            algorithm: config.algorithm,
            allow_diagonal: config.allow_diagonal,
            heuristic: config.heuristic,
            status: state.status(),
            expanded: state.expanded(),
            discovered,
            path_cells: path.len(),
            path_cost: path.cost(),
            optimal_cost: reference::optimal_cost(grid, config.allow_diagonal),
            route_efficiency: 0.0,
            num_obstacles: grid.obstacle_count(),
        };
        stats.calculate_efficiency();
        stats
    }

    /// Ratio of the route cost to the true optimum; 1.0 is optimal.
    pub fn calculate_efficiency(&mut self) {
        self.route_efficiency = match (self.path_cost, self.optimal_cost) {
            (Some(cost), Some(optimal)) if optimal > 0.0 => cost / optimal,
            (Some(_), Some(_)) => 1.0,
            _ => 0.0,
        };
    }

    pub fn is_optimal(&self) -> bool {
        match (self.path_cost, self.optimal_cost) {
            (Some(cost), Some(optimal)) => (cost - optimal).abs() < 1e-6,
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Algorithm: {} ({}, diagonal moves: {})",
            self.algorithm, self.heuristic, self.allow_diagonal
        )?;
        writeln!(f, "Status: {:?}", self.status)?;
        writeln!(f, "Cells expanded: {}", self.expanded)?;
        writeln!(f, "Cells discovered: {}", self.discovered)?;
        writeln!(f, "Number of Obstacles: {}", self.num_obstacles)?;
        match self.path_cost {
            Some(cost) => {
                writeln!(f, "Path Length: {} cells", self.path_cells)?;
                writeln!(f, "Path Cost: {:.3}", cost)?;
            }
            None => writeln!(f, "Path: unreachable")?,
        }
        if let Some(optimal) = self.optimal_cost {
            writeln!(f, "Optimal Cost (Dijkstra): {:.3}", optimal)?;
        }
        if self.route_efficiency > 0.0 {
            writeln!(f, "Route Efficiency: {:.3}", self.route_efficiency)?;
            if !self.is_optimal() {
                writeln!(f, "Note: route is longer than the optimum for this neighbor model")?;
            }
        }
        Ok(())
    }
}

/// Prints a side by side table of several runs over the same grid.
pub fn print_comparison(results: &[RunStatistics]) {
    println!("\n=== ALGORITHM COMPARISON RESULTS ===");
    println!();
    println!(
        "{:<10} {:<10} {:<10} {:<12} {:<8} {:<10} {:<10} {:<10}",
        "Algorithm", "Diagonal", "Status", "Expanded", "Cells", "Cost", "Optimal", "Efficiency"
    );
    println!("{}", "-".repeat(86));

    for result in results {
        let cost_str = result
            .path_cost
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "-".to_string());
        let optimal_str = result
            .optimal_cost
            .map(|c| format!("{:.3}", c))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<10} {:<10} {:<12} {:<8} {:<10} {:<10} {:<10.3}",
            result.algorithm.to_string(),
            if result.allow_diagonal { "yes" } else { "no" },
            format!("{:?}", result.status),
            result.expanded,
            result.path_cells,
            cost_str,
            optimal_str,
            result.route_efficiency
        );
    }

    let Some(fewest) = results.iter().min_by_key(|r| r.expanded) else {
        return;
    };
    println!();
    println!("=== PERFORMANCE ANALYSIS ===");
    println!("Fewest expansions: {} ({} cells)", fewest.algorithm, fewest.expanded);
    if let Some(most) = results.iter().max_by_key(|r| r.expanded) {
        if most.expanded > fewest.expanded && fewest.expanded > 0 {
            println!(
                "{} expanded {:.1}x as many cells as {}",
                most.algorithm,
                most.expanded as f64 / fewest.expanded as f64,
                fewest.algorithm
            );
        }
    }
    let costs: Vec<f64> = results.iter().filter_map(|r| r.path_cost).collect();
    if costs.len() > 1 {
        let highest = costs.iter().cloned().fold(f64::MIN, f64::max);
        let lowest = costs.iter().cloned().fold(f64::MAX, f64::min);
        let spread = highest - lowest;
        if spread < 1e-6 {
            println!("All algorithms found routes of equal cost");
        } else {
            println!("Route costs differ by {:.3}", spread);
        }
    }
}
