//! Occupancy grid the planners search over.
//!
//! The grid owns the start and goal cells and keeps them free: direct wall
//! placement on either is rejected, and bulk mutations clear them afterwards.

use itertools::iproduct;
use nalgebra as na;
use rand::Rng;

use crate::common::{Cell, PathfindingError, PathfindingResult};

/// Neighbor offsets in traversal order: up, down, left, right.
/// Search output depends on this order.
pub const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Grid dimensions and maze generation settings
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Wall probability per cell for generated mazes
    pub maze_density: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 22,
            cols: 30,
            maze_density: 0.27,
        }
    }
}

impl GridConfig {
    /// Default start: one cell in from the top-left corner
    pub fn default_start(&self) -> Cell {
        Cell::new(1, 1)
    }

    /// Default goal: one cell in from the bottom-right corner
    pub fn default_goal(&self) -> Cell {
        Cell::new(self.rows as i32 - 2, self.cols as i32 - 2)
    }
}

#[derive(Debug, Clone)]
pub struct GridMap {
    walls: na::DMatrix<bool>,
    start: Cell,
    goal: Cell,
    revision: u64,
}

impl GridMap {
    /// Create a wall-free grid
    pub fn new(rows: usize, cols: usize, start: Cell, goal: Cell) -> PathfindingResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PathfindingError::InvalidParameter(format!(
                "grid must have at least one cell, got {}x{}",
                rows, cols
            )));
        }
        let grid = GridMap {
            walls: na::DMatrix::from_element(rows, cols, false),
            start,
            goal,
            revision: 0,
        };
        grid.check_bounds(start)?;
        grid.check_bounds(goal)?;
        Ok(grid)
    }

    /// Create a wall-free grid with the configured dimensions and default endpoints
    pub fn from_config(config: &GridConfig) -> PathfindingResult<Self> {
        Self::new(config.rows, config.cols, config.default_start(), config.default_goal())
    }

    /// Create a grid with the given cells walled; walls on endpoints are dropped
    pub fn with_walls(
        rows: usize,
        cols: usize,
        start: Cell,
        goal: Cell,
        walls: &[Cell],
    ) -> PathfindingResult<Self> {
        let mut grid = Self::new(rows, cols, start, goal)?;
        for &cell in walls {
            grid.set_wall(cell, true);
        }
        Ok(grid)
    }

    /// Create a random maze: every cell is walled independently with probability `density`
    pub fn with_random_walls<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        start: Cell,
        goal: Cell,
        density: f64,
        rng: &mut R,
    ) -> PathfindingResult<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(PathfindingError::InvalidParameter(format!(
                "maze density must be within [0, 1], got {}",
                density
            )));
        }
        let mut grid = Self::new(rows, cols, start, goal)?;
        for (r, c) in iproduct!(0..rows, 0..cols) {
            if rng.gen::<f64>() < density {
                grid.walls[(r, c)] = true;
            }
        }
        grid.clear_endpoints();
        grid.revision += 1;
        Ok(grid)
    }

    /// Parse a grid from rows of `.` (free), `#` (wall), `S` (start) and `G` (goal)
    pub fn from_ascii(layout: &str) -> PathfindingResult<Self> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.chars().count());

        let mut start = None;
        let mut goal = None;
        let mut walls = Vec::new();
        for (r, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(PathfindingError::InvalidParameter(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    line.chars().count(),
                    cols
                )));
            }
            for (c, ch) in line.chars().enumerate() {
                let cell = Cell::new(r as i32, c as i32);
                match ch {
                    '.' => {}
                    '#' => walls.push(cell),
                    'S' => start = Some(cell),
                    'G' => goal = Some(cell),
                    other => {
                        return Err(PathfindingError::InvalidParameter(format!(
                            "unexpected character '{}' at {}",
                            other, cell
                        )))
                    }
                }
            }
        }

        match (start, goal) {
            (Some(start), Some(goal)) => Self::with_walls(rows, cols, start, goal, &walls),
            _ => Err(PathfindingError::InvalidParameter(
                "layout needs one 'S' and one 'G'".to_string(),
            )),
        }
    }

    pub fn rows(&self) -> usize {
        self.walls.nrows()
    }

    pub fn cols(&self) -> usize {
        self.walls.ncols()
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Incremented on every effective mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows()
            && (cell.col as usize) < self.cols()
    }

    pub fn check_bounds(&self, cell: Cell) -> PathfindingResult<()> {
        if self.in_bounds(cell) {
            Ok(())
        } else {
            Err(PathfindingError::OutOfBounds {
                cell,
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    /// In bounds and not a wall
    pub fn is_free(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && !self.walls[Self::index(cell)]
    }

    /// In bounds and a wall
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.in_bounds(cell) && self.walls[Self::index(cell)]
    }

    pub fn is_endpoint(&self, cell: Cell) -> bool {
        cell == self.start || cell == self.goal
    }

    /// Place or remove a wall. Returns true if the grid changed; placement
    /// on the start or goal and out-of-bounds cells are ignored.
    pub fn set_wall(&mut self, cell: Cell, wall: bool) -> bool {
        if !self.in_bounds(cell) || (wall && self.is_endpoint(cell)) {
            return false;
        }
        let slot = &mut self.walls[Self::index(cell)];
        if *slot == wall {
            return false;
        }
        *slot = wall;
        self.revision += 1;
        true
    }

    /// Move the start; the new start cell is cleared
    pub fn set_start(&mut self, cell: Cell) -> PathfindingResult<()> {
        self.check_bounds(cell)?;
        self.start = cell;
        self.clear_endpoints();
        self.revision += 1;
        Ok(())
    }

    /// Move the goal; the new goal cell is cleared
    pub fn set_goal(&mut self, cell: Cell) -> PathfindingResult<()> {
        self.check_bounds(cell)?;
        self.goal = cell;
        self.clear_endpoints();
        self.revision += 1;
        Ok(())
    }

    pub fn set_endpoints(&mut self, start: Cell, goal: Cell) -> PathfindingResult<()> {
        self.check_bounds(start)?;
        self.check_bounds(goal)?;
        if start != self.start || goal != self.goal {
            self.start = start;
            self.goal = goal;
            self.revision += 1;
        }
        self.clear_endpoints();
        Ok(())
    }

    pub fn clear_walls(&mut self) {
        self.walls.fill(false);
        self.revision += 1;
    }

    /// Free in-bounds neighbors of `cell` in [`DIRECTIONS`] order
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        DIRECTIONS
            .iter()
            .map(move |&(dr, dc)| cell.offset(dr, dc))
            .filter(move |n| self.is_free(*n))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        iproduct!(0..self.rows() as i32, 0..self.cols() as i32).map(|(r, c)| Cell::new(r, c))
    }

    pub fn free_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(move |c| !self.walls[Self::index(*c)])
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells().filter(move |c| self.walls[Self::index(*c)])
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|&&w| w).count()
    }

    fn clear_endpoints(&mut self) {
        self.walls[Self::index(self.start)] = false;
        self.walls[Self::index(self.goal)] = false;
    }

    fn index(cell: Cell) -> (usize, usize) {
        (cell.row as usize, cell.col as usize)
    }
}
