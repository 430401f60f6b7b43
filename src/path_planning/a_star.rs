//! A* search on a 4-connected occupancy grid
//!
//! Unit edge cost. Stale queue entries are skipped on pop (lazy deletion)
//! instead of decreasing keys in place.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, trace};

use crate::common::{Cell, GridPathPlanner, Heuristic, SearchResult};
use crate::path_planning::heuristic::HeuristicKind;
use crate::path_planning::open_set::{reconstruct_path, OpenSet};
use crate::utils::GridMap;

pub struct AStarPlanner<H = HeuristicKind> {
    heuristic: H,
}

impl<H: Heuristic> AStarPlanner<H> {
    pub fn new(heuristic: H) -> Self {
        AStarPlanner { heuristic }
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }
}

impl Default for AStarPlanner<HeuristicKind> {
    fn default() -> Self {
        Self::new(HeuristicKind::default())
    }
}

impl<H: Heuristic> GridPathPlanner for AStarPlanner<H> {
    fn plan(&self, grid: &GridMap, start: Cell, goal: Cell) -> SearchResult {
        let started = Instant::now();
        trace!("[AStar] plan: start={} goal={}", start, goal);

        if !grid.in_bounds(start) || !grid.in_bounds(goal) {
            debug!("[AStar] start or goal outside the grid");
            return SearchResult::not_found(Vec::new(), started.elapsed());
        }

        let mut open_set = OpenSet::new();
        let mut g_score: HashMap<Cell, usize> = HashMap::new();
        let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::new();
        let mut closed_set: HashSet<Cell> = HashSet::new();
        let mut visited_order = Vec::new();

        g_score.insert(start, 0);
        came_from.insert(start, None);
        open_set.push(self.heuristic.estimate(start, goal), start);

        while let Some(current) = open_set.pop() {
            if !closed_set.insert(current) {
                continue;
            }
            visited_order.push(current);

            if current == goal {
                let path = reconstruct_path(&came_from, goal);
                debug!(
                    "[AStar] found path: cost={} expanded={}",
                    path.cost(),
                    visited_order.len()
                );
                return SearchResult::found(path, visited_order, started.elapsed());
            }

            let tentative = g_score[&current] + 1;
            for neighbor in grid.neighbors(current) {
                let improved = g_score.get(&neighbor).map_or(true, |&g| tentative < g);
                if improved {
                    g_score.insert(neighbor, tentative);
                    came_from.insert(neighbor, Some(current));
                    let priority = tentative as f64 + self.heuristic.estimate(neighbor, goal);
                    open_set.push(priority, neighbor);
                }
            }
        }

        debug!("[AStar] open set exhausted after {} expansions", visited_order.len());
        SearchResult::not_found(visited_order, started.elapsed())
    }

    fn name(&self) -> &'static str {
        "A*"
    }
}
