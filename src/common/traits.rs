//! Common traits defining the seams of the pathfinding engine

use crate::common::types::*;
use crate::utils::GridMap;

/// Distance estimate between two cells, used to order the open set
pub trait Heuristic {
    fn estimate(&self, from: Cell, to: Cell) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(Cell, Cell) -> f64,
{
    fn estimate(&self, from: Cell, to: Cell) -> f64 {
        self(from, to)
    }
}

/// Trait for grid search algorithms
pub trait GridPathPlanner {
    /// Search `grid` from `start` to `goal`; never mutates the grid
    fn plan(&self, grid: &GridMap, start: Cell, goal: Cell) -> SearchResult;

    /// Short algorithm name for logs
    fn name(&self) -> &'static str;
}

/// Source of obstacles injected while the agent is moving
pub trait ObstacleSource {
    /// Wall zero or more free cells of `grid`, never touching `protected`.
    /// Returns the newly walled cells.
    fn step(&mut self, grid: &mut GridMap, protected: &[Cell]) -> Vec<Cell>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FirstNeighbor;

    impl GridPathPlanner for FirstNeighbor {
        fn plan(&self, grid: &GridMap, start: Cell, _goal: Cell) -> SearchResult {
            SearchResult::not_found(grid.neighbors(start).collect(), Default::default())
        }

        fn name(&self) -> &'static str {
            "first-neighbor"
        }
    }

    #[test]
    fn test_closure_heuristic() {
        let zero = |_: Cell, _: Cell| 0.0;
        assert_eq!(zero.estimate(Cell::new(0, 0), Cell::new(5, 5)), 0.0);
    }

    #[test]
    fn test_grid_path_planner_trait() {
        let grid = GridMap::from_ascii("S.\n.G").unwrap();
        let result = FirstNeighbor.plan(&grid, Cell::new(0, 0), Cell::new(1, 1));
        assert!(!result.is_found());
        assert_eq!(result.visited_order, vec![Cell::new(1, 0), Cell::new(0, 1)]);
    }
}
