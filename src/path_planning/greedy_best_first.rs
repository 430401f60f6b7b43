//! Greedy Best-First Search on a 4-connected occupancy grid
//!
//! Cells are ordered by the heuristic alone. A cell is marked seen when it
//! is enqueued and is never reopened, even if a cheaper route to it shows
//! up later, so the returned path is valid but not necessarily shortest.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use log::{debug, trace};

use crate::common::{Cell, GridPathPlanner, Heuristic, SearchResult};
use crate::path_planning::heuristic::HeuristicKind;
use crate::path_planning::open_set::{reconstruct_path, OpenSet};
use crate::utils::GridMap;

pub struct GreedyBestFirstPlanner<H = HeuristicKind> {
    heuristic: H,
}

impl<H: Heuristic> GreedyBestFirstPlanner<H> {
    pub fn new(heuristic: H) -> Self {
        GreedyBestFirstPlanner { heuristic }
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }
}

impl Default for GreedyBestFirstPlanner<HeuristicKind> {
    fn default() -> Self {
        Self::new(HeuristicKind::default())
    }
}

impl<H: Heuristic> GridPathPlanner for GreedyBestFirstPlanner<H> {
    fn plan(&self, grid: &GridMap, start: Cell, goal: Cell) -> SearchResult {
        let started = Instant::now();
        trace!("[GBFS] plan: start={} goal={}", start, goal);

        if !grid.in_bounds(start) || !grid.in_bounds(goal) {
            debug!("[GBFS] start or goal outside the grid");
            return SearchResult::not_found(Vec::new(), started.elapsed());
        }

        let mut open_set = OpenSet::new();
        let mut came_from: HashMap<Cell, Option<Cell>> = HashMap::new();
        let mut seen: HashSet<Cell> = HashSet::new();
        let mut visited_order = Vec::new();

        came_from.insert(start, None);
        seen.insert(start);
        open_set.push(self.heuristic.estimate(start, goal), start);

        while let Some(current) = open_set.pop() {
            visited_order.push(current);

            if current == goal {
                let path = reconstruct_path(&came_from, goal);
                debug!(
                    "[GBFS] found path: cost={} expanded={}",
                    path.cost(),
                    visited_order.len()
                );
                return SearchResult::found(path, visited_order, started.elapsed());
            }

            for neighbor in grid.neighbors(current) {
                if seen.insert(neighbor) {
                    came_from.insert(neighbor, Some(current));
                    open_set.push(self.heuristic.estimate(neighbor, goal), neighbor);
                }
            }
        }

        debug!("[GBFS] open set exhausted after {} expansions", visited_order.len());
        SearchResult::not_found(visited_order, started.elapsed())
    }

    fn name(&self) -> &'static str {
        "GBFS"
    }
}
