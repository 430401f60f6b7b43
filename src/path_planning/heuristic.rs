//! Distance heuristics for 4-connected unit-cost grids.
//!
//! Both estimates are admissible and consistent on such grids, so A*
//! returns a shortest path under either.

use std::fmt;

use crate::common::{Cell, Heuristic};

/// |Δrow| + |Δcol|
pub fn manhattan(a: Cell, b: Cell) -> f64 {
    ((a.row - b.row).abs() + (a.col - b.col).abs()) as f64
}

/// sqrt(Δrow² + Δcol²)
pub fn euclidean(a: Cell, b: Cell) -> f64 {
    let dr = (a.row - b.row) as f64;
    let dc = (a.col - b.col) as f64;
    dr.hypot(dc)
}

/// Selectable built-in heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeuristicKind {
    Manhattan,
    Euclidean,
}

impl HeuristicKind {
    pub fn name(&self) -> &'static str {
        match self {
            HeuristicKind::Manhattan => "Manhattan",
            HeuristicKind::Euclidean => "Euclidean",
        }
    }
}

impl Default for HeuristicKind {
    fn default() -> Self {
        HeuristicKind::Manhattan
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, from: Cell, to: Cell) -> f64 {
        match self {
            HeuristicKind::Manhattan => manhattan(from, to),
            HeuristicKind::Euclidean => euclidean(from, to),
        }
    }
}
