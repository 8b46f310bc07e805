use std::fmt;

use rustc_hash::FxHashMap;

use crate::algorithms::common::SearchState;
use crate::algorithms::path::Path;
use crate::grid::{Coord, Grid};

pub const LEGEND: &str =
    "Legend: S=Start, G=Goal, #=Obstacle, o=Frontier, +=Expanded, arrows=Path, .=Empty";

/// Draws the grid as text, overlaying whatever the search and route know.
///
/// Precedence, highest first: start and goal, obstacles, route arrows,
/// frontier cells, expanded cells, empty.
pub fn render(grid: &Grid, state: Option<&SearchState>, path: Option<&Path>) -> String {
    Board::new(grid, state, path).to_string()
}

/// Text view of a grid that can be written straight to a formatter.
pub struct Board<'a> {
    grid: &'a Grid,
    state: Option<&'a SearchState>,
    arrows: FxHashMap<Coord, char>,
}

impl<'a> Board<'a> {
    pub fn new(grid: &'a Grid, state: Option<&'a SearchState>, path: Option<&Path>) -> Self {
        let mut arrows = FxHashMap::default();
        if let Some(path) = path {
            for (&cell, direction) in path.cells().iter().zip(path.directions()) {
                arrows.insert(cell, direction.arrow());
            }
        }
        Board {
            grid,
            state,
            arrows,
        }
    }
}

impl fmt::Display for Board<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", LEGEND)?;

        write!(f, "   ")?;
        for col in 0..self.grid.cols() {
            write!(f, "{:2}", col % 10)?;
        }
        writeln!(f)?;

        for row in 0..self.grid.rows() {
            write!(f, "{:2} ", row)?;
            for col in 0..self.grid.cols() {
                let glyph = glyph_at(self.grid, self.state, &self.arrows, Coord::new(row, col));
                write!(f, "{} ", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn glyph_at(
    grid: &Grid,
    state: Option<&SearchState>,
    arrows: &FxHashMap<Coord, char>,
    coord: Coord,
) -> char {
    if coord == grid.start() {
        return 'S';
    }
    if coord == grid.goal() {
        return 'G';
    }
    if grid.is_obstacle(coord) {
        return '#';
    }
    if let Some(&arrow) = arrows.get(&coord) {
        return arrow;
    }
    if let Some(state) = state {
        let index = grid.index(coord);
        if state.frontier().contains(index) {
            return 'o';
        }
        if state.record(index).closed {
            return '+';
        }
    }
    '.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::a_star::AStar;
    use crate::algorithms::common::SearchAlgorithm;
    use crate::algorithms::heuristic::Heuristic;
    use crate::algorithms::path::reconstruct;

    fn body(rendered: &str) -> Vec<String> {
        rendered
            .lines()
            .skip(2)
            .map(|line| line[3..].split_whitespace().collect())
            .collect()
    }

    #[test]
    fn plain_grid_shows_endpoints_and_obstacles() {
        let grid: Grid = "S.#\n..G".parse().unwrap();
        let rendered = render(&grid, None, None);
        assert!(rendered.starts_with(LEGEND));
        assert_eq!(body(&rendered), vec!["S.#", "..G"]);
    }

    #[test]
    fn board_writes_through_a_formatter() {
        let grid: Grid = "S.\n.G".parse().unwrap();
        let written = format!("{}", Board::new(&grid, None, None));
        assert_eq!(written, format!("{}\n    0 1\n 0 S . \n 1 . G \n", LEGEND));
        assert_eq!(written, render(&grid, None, None));
    }

    #[test]
    fn route_is_drawn_with_arrows() {
        let grid: Grid = "S...\n.##.\n...G".parse().unwrap();
        let mut search = AStar::new(&grid, false, Heuristic::Manhattan);
        search.run_to_completion(&grid);
        let path = reconstruct(&grid, search.state());
        let rendered = render(&grid, Some(search.state()), Some(&path));
        let rows = body(&rendered);
        let arrow_count: usize = rows
            .iter()
            .map(|r| r.chars().filter(|c| "↑↓←→".contains(*c)).count())
            .sum();
        assert_eq!(arrow_count, path.len() - 2);
    }

    #[test]
    fn search_state_marks_frontier_and_expanded() {
        let grid: Grid = "S....\n.....\n....G".parse().unwrap();
        let mut search = AStar::new(&grid, false, Heuristic::Manhattan);
        search.step(&grid);
        search.step(&grid);
        let rendered = render(&grid, Some(search.state()), None);
        assert!(rendered.lines().skip(2).any(|l| l.contains('o')));
        assert!(rendered.lines().skip(2).any(|l| l.contains('+')));
    }
}
