//! Algorithm selection and the single entry point used by the controller.

use std::fmt;

use crate::common::{Cell, GridPathPlanner, SearchResult};
use crate::path_planning::a_star::AStarPlanner;
use crate::path_planning::greedy_best_first::GreedyBestFirstPlanner;
use crate::path_planning::heuristic::HeuristicKind;
use crate::utils::GridMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    AStar,
    GreedyBestFirst,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::AStar => "A*",
            Algorithm::GreedyBestFirst => "GBFS",
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::AStar
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Run `algorithm` with `heuristic` over `grid`. Reads the grid only.
pub fn search(
    grid: &GridMap,
    start: Cell,
    goal: Cell,
    algorithm: Algorithm,
    heuristic: HeuristicKind,
) -> SearchResult {
    match algorithm {
        Algorithm::AStar => AStarPlanner::new(heuristic).plan(grid, start, goal),
        Algorithm::GreedyBestFirst => GreedyBestFirstPlanner::new(heuristic).plan(grid, start, goal),
    }
}
