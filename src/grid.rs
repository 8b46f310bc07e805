use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

/// Identity of a grid cell. Equality is purely structural on `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }

    /// The cell `d_row`/`d_col` steps away, if that does not underflow.
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Coord> {
        Some(Coord {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Empty,
    Obstacle,
}

/// The eight compass directions a single step can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// `(d_row, d_col)` of one step; north is towards row 0.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Direction of a unit step. Larger deltas are normalised by sign.
    pub fn from_delta(d_row: isize, d_col: isize) -> Option<Direction> {
        match (d_row.signum(), d_col.signum()) {
            (-1, 0) => Some(Direction::North),
            (-1, 1) => Some(Direction::NorthEast),
            (0, 1) => Some(Direction::East),
            (1, 1) => Some(Direction::SouthEast),
            (1, 0) => Some(Direction::South),
            (1, -1) => Some(Direction::SouthWest),
            (0, -1) => Some(Direction::West),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (d_row, d_col) = self.delta();
        d_row != 0 && d_col != 0
    }

    /// Glyph used when tracing a route in the terminal.
    pub fn arrow(self) -> char {
        match self {
            Direction::North => '↑',
            Direction::NorthEast => '↗',
            Direction::East => '→',
            Direction::SouthEast => '↘',
            Direction::South => '↓',
            Direction::SouthWest => '↙',
            Direction::West => '←',
            Direction::NorthWest => '↖',
        }
    }
}

/// Rectangular obstacle grid with a single start and a single goal.
///
/// Every successful mutation bumps [`Grid::revision`], which is how the
/// engine notices that a run was started against a grid that no longer
/// exists.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
    start: Coord,
    goal: Coord,
    revision: u64,
}

impl Grid {
    /// Creates an obstacle-free grid with the start on the middle row of the
    /// first column and the goal on the middle row of the last column.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let cell_count = rows
            .checked_mul(cols)
            .filter(|&n| n > 0 && n <= isize::MAX as usize)
            .ok_or(Error::InvalidDimensions { rows, cols })?;
        Ok(Grid {
            rows,
            cols,
            tiles: vec![Tile::Empty; cell_count],
            start: Coord::new(rows / 2, 0),
            goal: Coord::new(rows / 2, cols - 1),
            revision: 0,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    /// Validates a caller-supplied coordinate.
    pub fn coord(&self, row: usize, col: usize) -> Result<Coord> {
        let coord = Coord::new(row, col);
        if self.in_bounds(coord) {
            Ok(coord)
        } else {
            Err(Error::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Flat index of an in-bounds coordinate.
    pub fn index(&self, coord: Coord) -> usize {
        coord.row * self.cols + coord.col
    }

    pub fn coord_at(&self, index: usize) -> Coord {
        Coord::new(index / self.cols, index % self.cols)
    }

    pub fn tile(&self, coord: Coord) -> Tile {
        self.tiles[self.index(coord)]
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_obstacle(&self, coord: Coord) -> bool {
        !self.in_bounds(coord) || self.tile(coord) == Tile::Obstacle
    }

    pub fn obstacle_count(&self) -> usize {
        self.tiles.iter().filter(|&&t| t == Tile::Obstacle).count()
    }

    pub fn obstacles(&self) -> impl Iterator<Item = Coord> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, &t)| t == Tile::Obstacle)
            .map(|(i, _)| self.coord_at(i))
    }

    pub fn set_obstacle(&mut self, row: usize, col: usize, obstacle: bool) -> Result<()> {
        let coord = self.coord(row, col)?;
        if obstacle && (coord == self.start || coord == self.goal) {
            return Err(Error::InvalidPlacement {
                row,
                col,
                reason: "start and goal cannot be obstacles",
            });
        }
        let tile = if obstacle { Tile::Obstacle } else { Tile::Empty };
        let idx = self.index(coord);
        if self.tiles[idx] != tile {
            self.tiles[idx] = tile;
            self.revision += 1;
        }
        Ok(())
    }

    /// Flips a cell and returns whether it is now an obstacle.
    pub fn toggle_obstacle(&mut self, row: usize, col: usize) -> Result<bool> {
        let coord = self.coord(row, col)?;
        let now_obstacle = self.tile(coord) == Tile::Empty;
        self.set_obstacle(row, col, now_obstacle)?;
        Ok(now_obstacle)
    }

    pub fn set_start(&mut self, row: usize, col: usize) -> Result<()> {
        let coord = self.placeable(row, col)?;
        if coord != self.start {
            self.start = coord;
            self.revision += 1;
        }
        Ok(())
    }

    pub fn set_goal(&mut self, row: usize, col: usize) -> Result<()> {
        let coord = self.placeable(row, col)?;
        if coord != self.goal {
            self.goal = coord;
            self.revision += 1;
        }
        Ok(())
    }

    fn placeable(&self, row: usize, col: usize) -> Result<Coord> {
        let coord = self.coord(row, col)?;
        if self.tile(coord) == Tile::Obstacle {
            return Err(Error::InvalidPlacement {
                row,
                col,
                reason: "cell is an obstacle",
            });
        }
        Ok(coord)
    }

    pub fn clear_obstacles(&mut self) {
        if self.obstacle_count() > 0 {
            self.tiles.fill(Tile::Empty);
            self.revision += 1;
        }
    }

    /// Places up to `count` random obstacles, never on the start or goal.
    /// Returns how many were placed.
    pub fn scatter_obstacles<R: Rng>(&mut self, count: usize, rng: &mut R) -> usize {
        let count = count.min(self.cell_count());
        let mut placed = 0;
        let mut attempts = 0;
        while placed < count && attempts < count.saturating_mul(3) {
            let coord = Coord::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.cols));
            if coord != self.start && coord != self.goal && self.tile(coord) == Tile::Empty {
                let idx = self.index(coord);
                self.tiles[idx] = Tile::Obstacle;
                placed += 1;
            }
            attempts += 1;
        }
        if placed > 0 {
            self.revision += 1;
        }
        placed
    }

    /// Whether a single step from `from` by `(d_row, d_col)` is allowed.
    ///
    /// A diagonal step is refused when both flanking orthogonal cells are
    /// obstacles; slipping past a single corner is fine.
    pub fn is_walkable(&self, from: Coord, d_row: isize, d_col: isize) -> bool {
        let Some(next) = from.offset(d_row, d_col) else {
            return false;
        };
        if !self.in_bounds(next) {
            return false;
        }
        if d_row != 0 && d_col != 0 {
            let vertical = Coord::new(next.row, from.col);
            let horizontal = Coord::new(from.row, next.col);
            if self.is_obstacle(vertical) && self.is_obstacle(horizontal) {
                return false;
            }
        }
        !self.is_obstacle(next)
    }

    /// Walkable neighbors with their edge costs, orthogonal first
    /// (N, S, E, W) then diagonal (NE, SE, SW, NW).
    pub fn neighbors(&self, coord: Coord, allow_diagonal: bool) -> Vec<(Coord, f64)> {
        let mut neighbors = Vec::with_capacity(8);
        let diagonals: &[Direction] = if allow_diagonal { &Direction::DIAGONAL } else { &[] };

        for &dir in Direction::ORTHOGONAL.iter().chain(diagonals) {
            let (d_row, d_col) = dir.delta();
            if self.is_walkable(coord, d_row, d_col) {
                if let Some(next) = coord.offset(d_row, d_col) {
                    let cost = if dir.is_diagonal() { DIAGONAL_COST } else { 1.0 };
                    neighbors.push((next, cost));
                }
            }
        }
        neighbors
    }

    /// Cost of a single step between adjacent cells; `None` when the cells
    /// are not adjacent. Obstacles do not affect the result.
    pub fn edge_cost(&self, a: Coord, b: Coord) -> Option<f64> {
        match (a.row.abs_diff(b.row), a.col.abs_diff(b.col)) {
            (0, 1) | (1, 0) => Some(1.0),
            (1, 1) => Some(DIAGONAL_COST),
            _ => None,
        }
    }
}

/// Parses an ASCII map: `.` open, `#` obstacle, `S` start, `G` goal.
impl FromStr for Grid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = s
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .collect();

        let rows = lines.len();
        let cols = lines.first().map_or(0, |(_, l)| l.chars().count());
        let mut grid = Grid::new(rows, cols)?;
        let mut start = None;
        let mut goal = None;

        for (row, (line_no, line)) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(Error::Parse {
                    line: *line_no,
                    message: format!("expected {} columns, found {}", cols, line.chars().count()),
                });
            }
            for (col, ch) in line.chars().enumerate() {
                let coord = Coord::new(row, col);
                let slot = match ch {
                    '.' => continue,
                    '#' => {
                        let idx = grid.index(coord);
                        grid.tiles[idx] = Tile::Obstacle;
                        continue;
                    }
                    'S' => &mut start,
                    'G' => &mut goal,
                    other => {
                        return Err(Error::Parse {
                            line: *line_no,
                            message: format!("unexpected character {:?}", other),
                        })
                    }
                };
                if slot.replace(coord).is_some() {
                    return Err(Error::Parse {
                        line: *line_no,
                        message: format!("duplicate {:?} marker", ch),
                    });
                }
            }
        }

        let last_line = lines.last().map_or(0, |(n, _)| *n);
        grid.start = start.ok_or_else(|| Error::Parse {
            line: last_line,
            message: "map has no start marker 'S'".to_string(),
        })?;
        grid.goal = goal.ok_or_else(|| Error::Parse {
            line: last_line,
            message: "map has no goal marker 'G'".to_string(),
        })?;
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn coords(neighbors: &[(Coord, f64)]) -> Vec<Coord> {
        neighbors.iter().map(|(c, _)| *c).collect()
    }

    #[test]
    fn new_grid_places_endpoints_on_middle_row() {
        let grid = Grid::new(30, 40).unwrap();
        assert_eq!(grid.start(), Coord::new(15, 0));
        assert_eq!(grid.goal(), Coord::new(15, 39));
        assert_eq!(grid.cell_count(), 1200);
        assert!(matches!(Grid::new(0, 4), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(
            Grid::new(usize::MAX, 2).unwrap_err(),
            Error::InvalidDimensions { rows: usize::MAX, cols: 2 }
        );
        assert!(matches!(
            Grid::new(usize::MAX / 2, usize::MAX / 2),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn scattering_more_walls_than_cells_stops_when_full() {
        let mut grid = Grid::new(3, 4).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let placed = grid.scatter_obstacles(usize::MAX, &mut rng);
        assert!(placed <= grid.cell_count() - 2);
        assert_eq!(placed, grid.obstacle_count());
        assert!(!grid.is_obstacle(grid.start()));
        assert!(!grid.is_obstacle(grid.goal()));
    }

    #[test]
    fn orthogonal_neighbors_skip_obstacles_and_edges() {
        let grid: Grid = "S.#\n...\n..G".parse().unwrap();
        let n = grid.neighbors(Coord::new(0, 1), false);
        assert_eq!(coords(&n), vec![Coord::new(1, 1), Coord::new(0, 0)]);
        assert!(n.iter().all(|(_, cost)| *cost == 1.0));
    }

    #[test]
    fn diagonal_blocked_only_when_both_flanks_are_walls() {
        // Both flanks of (1,1)->(0,2) are walls, one flank of (1,1)->(2,2).
        let grid: Grid = "S#.\n..#\n..G".parse().unwrap();
        let center = Coord::new(1, 1);
        let n = coords(&grid.neighbors(center, true));
        assert!(!n.contains(&Coord::new(0, 2)));
        assert!(n.contains(&Coord::new(2, 2)));
        assert!(n.contains(&Coord::new(0, 0)));
        assert!(!grid.is_walkable(center, -1, 1));
        assert!(grid.is_walkable(center, 1, 1));
    }

    #[test]
    fn diagonal_neighbors_cost_sqrt_two() {
        let grid = Grid::new(3, 3).unwrap();
        let n = grid.neighbors(Coord::new(1, 1), true);
        assert_eq!(n.len(), 8);
        assert_eq!(n.iter().filter(|(_, c)| *c == DIAGONAL_COST).count(), 4);
    }

    #[test]
    fn edge_cost_is_geometric() {
        let grid = Grid::new(4, 4).unwrap();
        let a = Coord::new(1, 1);
        assert_eq!(grid.edge_cost(a, Coord::new(1, 2)), Some(1.0));
        assert_eq!(grid.edge_cost(a, Coord::new(2, 2)), Some(DIAGONAL_COST));
        assert_eq!(grid.edge_cost(a, Coord::new(3, 1)), None);
        assert_eq!(grid.edge_cost(a, a), None);
    }

    #[test]
    fn placement_rules() {
        let mut grid = Grid::new(5, 5).unwrap();
        let start = grid.start();
        assert!(matches!(
            grid.set_obstacle(start.row, start.col, true),
            Err(Error::InvalidPlacement { .. })
        ));
        grid.set_obstacle(0, 0, true).unwrap();
        assert!(matches!(grid.set_goal(0, 0), Err(Error::InvalidPlacement { .. })));
        assert!(matches!(grid.set_start(5, 0), Err(Error::OutOfBounds { .. })));
        assert!(!grid.toggle_obstacle(0, 0).unwrap());
        grid.set_goal(0, 0).unwrap();
        assert_eq!(grid.goal(), Coord::new(0, 0));
    }

    #[test]
    fn revision_tracks_real_changes_only() {
        let mut grid = Grid::new(3, 3).unwrap();
        let r0 = grid.revision();
        grid.set_obstacle(0, 0, false).unwrap();
        assert_eq!(grid.revision(), r0);
        grid.set_obstacle(0, 0, true).unwrap();
        assert_eq!(grid.revision(), r0 + 1);
        grid.clear_obstacles();
        assert_eq!(grid.revision(), r0 + 2);
        assert_eq!(grid.obstacle_count(), 0);
    }

    #[test]
    fn scatter_never_covers_endpoints() {
        let mut grid = Grid::new(6, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let placed = grid.scatter_obstacles(30, &mut rng);
        assert_eq!(placed, grid.obstacle_count());
        assert!(!grid.is_obstacle(grid.start()));
        assert!(!grid.is_obstacle(grid.goal()));
    }

    #[test]
    fn parse_rejects_bad_maps() {
        assert!(matches!("S.\n.".parse::<Grid>(), Err(Error::Parse { line: 2, .. })));
        assert!(matches!("SS\nG.".parse::<Grid>(), Err(Error::Parse { .. })));
        assert!(matches!("S.\n..".parse::<Grid>(), Err(Error::Parse { .. })));
        assert!(matches!("S.\n.x".parse::<Grid>(), Err(Error::Parse { .. })));
    }

    #[test]
    fn direction_round_trip() {
        for dir in Direction::ORTHOGONAL.iter().chain(Direction::DIAGONAL.iter()) {
            let (dr, dc) = dir.delta();
            assert_eq!(Direction::from_delta(dr * 3, dc * 3), Some(*dir));
        }
        assert_eq!(Direction::from_delta(0, 0), None);
    }
}
