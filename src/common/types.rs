//! Common types used throughout dynamic_pathfinding

use std::fmt;
use std::time::Duration;

use itertools::Itertools;

use crate::utils::GridMap;

/// Grid cell addressed by (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn offset(&self, d_row: i32, d_col: i32) -> Cell {
        Cell::new(self.row + d_row, self.col + d_col)
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }
}

impl From<(i32, i32)> for Cell {
    fn from(tuple: (i32, i32)) -> Self {
        Self { row: tuple.0, col: tuple.1 }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Path represented as a sequence of cells, start and goal inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub cells: Vec<Cell>,
}

impl Path {
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn single(cell: Cell) -> Self {
        Self { cells: vec![cell] }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of unit moves along the path
    pub fn cost(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn contains(&self, cell: &Cell) -> bool {
        self.cells.contains(cell)
    }

    /// Consecutive cells are 4-adjacent and none of them is a wall in `grid`
    pub fn is_valid_on(&self, grid: &GridMap) -> bool {
        !self.cells.is_empty()
            && self.cells.iter().all(|c| grid.is_free(*c))
            && self.cells.iter().tuple_windows().all(|(a, b)| a.is_adjacent(b))
    }
}

/// Outcome tag of a single search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    NoPathFound,
}

/// Output of one search: the path (if any), expansion order and counts.
///
/// `visited_order` and `nodes_expanded` are filled on failure too, so the
/// caller can animate and report a search that did not reach the goal.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub path: Option<Path>,
    pub visited_order: Vec<Cell>,
    pub nodes_expanded: usize,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn found(path: Path, visited_order: Vec<Cell>, elapsed: Duration) -> Self {
        let nodes_expanded = visited_order.len();
        Self { path: Some(path), visited_order, nodes_expanded, elapsed }
    }

    pub fn not_found(visited_order: Vec<Cell>, elapsed: Duration) -> Self {
        let nodes_expanded = visited_order.len();
        Self { path: None, visited_order, nodes_expanded, elapsed }
    }

    pub fn status(&self) -> SearchStatus {
        if self.path.is_some() {
            SearchStatus::Found
        } else {
            SearchStatus::NoPathFound
        }
    }

    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }

    pub fn cost(&self) -> Option<usize> {
        self.path.as_ref().map(Path::cost)
    }
}
