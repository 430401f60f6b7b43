//! Replanning controller: runs a search, animates it, then walks an agent
//! along the path and replans whenever the next cell gets walled.

use std::time::Duration;
use std::vec;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::common::{Cell, ObstacleSource, Path, PathfindingError, PathfindingResult, SearchResult};
use crate::mapping::ObstacleGenerator;
use crate::mission_planning::config::ControllerConfig;
use crate::mission_planning::state_machine::{
    AgentState, ControllerState, Generation, RunMetrics, StepEvent, StepReport, Tick, Transition,
};
use crate::path_planning::{search, Algorithm, HeuristicKind};
use crate::utils::GridMap;

pub struct ReplanningController {
    config: ControllerConfig,
    grid: GridMap,
    obstacles: Box<dyn ObstacleSource>,
    maze_rng: StdRng,
    state: ControllerState,
    generation: Generation,
    last_search: Option<SearchResult>,
    path: Option<Path>,
    reveal: Option<vec::IntoIter<Cell>>,
    agent: Option<AgentState>,
    trail: Vec<Cell>,
    transitions: Vec<Transition>,
}

impl ReplanningController {
    /// Controller with a random [`ObstacleGenerator`] built from `config`
    pub fn new(grid: GridMap, config: ControllerConfig) -> PathfindingResult<Self> {
        let generator = ObstacleGenerator::new(config.obstacle_probability, config.seed)?;
        Self::with_obstacle_source(grid, config, Box::new(generator))
    }

    pub fn with_obstacle_source(
        grid: GridMap,
        config: ControllerConfig,
        obstacles: Box<dyn ObstacleSource>,
    ) -> PathfindingResult<Self> {
        config.validate()?;
        // Separate stream from the obstacle generator
        let maze_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Ok(ReplanningController {
            config,
            grid,
            obstacles,
            maze_rng,
            state: ControllerState::Idle,
            generation: Generation::default(),
            last_search: None,
            path: None,
            reveal: None,
            agent: None,
            trail: Vec::new(),
            transitions: Vec::new(),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn grid(&self) -> &GridMap {
        &self.grid
    }

    /// Current token; ticks must carry it to have any effect
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn agent(&self) -> Option<&AgentState> {
        self.agent.as_ref()
    }

    /// Active path; replaced on every successful replan
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn last_search(&self) -> Option<&SearchResult> {
        self.last_search.as_ref()
    }

    /// Cells the agent has occupied, starting with the start cell
    pub fn trail(&self) -> &[Cell] {
        &self.trail
    }

    /// Transitions since the last run or grid request
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn metrics(&self) -> RunMetrics {
        let (nodes_expanded, replans) = match &self.agent {
            Some(agent) => (agent.nodes_expanded, agent.replans),
            None => (self.last_search.as_ref().map_or(0, |r| r.nodes_expanded), 0),
        };
        RunMetrics {
            nodes_expanded,
            path_cost: self.path.as_ref().map(Path::cost),
            replans,
            last_search_time: self.last_search.as_ref().map_or(Duration::default(), |r| r.elapsed),
        }
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.config.algorithm = algorithm;
    }

    pub fn set_heuristic(&mut self, heuristic: HeuristicKind) {
        self.config.heuristic = heuristic;
    }

    /// Takes effect on the next agent step
    pub fn set_dynamic_obstacles(&mut self, enabled: bool) {
        self.config.dynamic_obstacles = enabled;
    }

    /// Search from `start` to `goal` with the configured algorithm and
    /// heuristic. Any animation in progress is cancelled.
    ///
    /// On success the controller enters `RevealingVisited`; on failure it
    /// returns to `Idle` and the result reports no path.
    pub fn run(&mut self, start: Cell, goal: Cell) -> PathfindingResult<SearchResult> {
        self.grid.check_bounds(start)?;
        self.grid.check_bounds(goal)?;
        self.invalidate();
        self.grid.set_endpoints(start, goal)?;

        self.transition(ControllerState::Searching);
        info!(
            "Running {} ({}) from {} to {}",
            self.config.algorithm, self.config.heuristic, start, goal
        );
        let result = search(&self.grid, start, goal, self.config.algorithm, self.config.heuristic);

        match &result.path {
            Some(path) => {
                info!(
                    "Path found: cost {}, {} nodes expanded in {:?}",
                    path.cost(),
                    result.nodes_expanded,
                    result.elapsed
                );
                self.path = Some(path.clone());
                self.reveal = Some(result.visited_order.clone().into_iter());
                self.transition(ControllerState::RevealingVisited);
            }
            None => {
                info!("No path found after expanding {} nodes", result.nodes_expanded);
                self.transition(ControllerState::Idle);
            }
        }

        self.last_search = Some(result.clone());
        Ok(result)
    }

    /// Next batch of at most `max` visited cells, in expansion order.
    /// Moves to `RevealingPath` once the order is exhausted.
    pub fn reveal_visited(&mut self, max: usize) -> PathfindingResult<Vec<Cell>> {
        self.expect_state(ControllerState::RevealingVisited, "reveal_visited")?;
        Ok(self.take_visited(max))
    }

    /// Place the agent on the path start and enter `Stepping`
    pub fn reveal_path(&mut self) -> PathfindingResult<Path> {
        self.expect_state(ControllerState::RevealingPath, "reveal_path")?;
        self.place_agent()
    }

    /// Advance the agent by one cell. Obstacle injection, the block check
    /// and any replan all happen within this call.
    ///
    /// Once the run has finished, returns the final event again without
    /// changing anything.
    pub fn step(&mut self) -> PathfindingResult<StepReport> {
        match self.state {
            ControllerState::Stepping => self.advance(),
            ControllerState::GoalReached => self.final_report(StepEvent::GoalReached),
            ControllerState::Trapped => self.final_report(StepEvent::Trapped),
            other => Err(PathfindingError::InvalidState(format!(
                "cannot step in state <{}>",
                other
            ))),
        }
    }

    /// Drive the animation by one tick. Returns `None` if `token` belongs
    /// to a cancelled run.
    pub fn tick(&mut self, token: Generation) -> Option<Tick> {
        if token != self.generation {
            debug!("dropping stale tick {} (current {})", token, self.generation);
            return None;
        }

        let tick = match self.state {
            ControllerState::RevealingVisited => {
                let batch = self.config.pacing.reveal_batch();
                Tick::Visited(self.take_visited(batch))
            }
            ControllerState::RevealingPath => match self.place_agent() {
                Ok(path) => Tick::PathRevealed(path),
                Err(e) => {
                    warn!("{}", e);
                    Tick::Idle
                }
            },
            ControllerState::Stepping => match self.advance() {
                Ok(report) => Tick::Step(report),
                Err(e) => {
                    warn!("{}", e);
                    Tick::Idle
                }
            },
            ControllerState::GoalReached => Tick::Finished(StepEvent::GoalReached),
            ControllerState::Trapped => Tick::Finished(StepEvent::Trapped),
            ControllerState::Idle
            | ControllerState::Searching
            | ControllerState::Blocked
            | ControllerState::Replanning => Tick::Idle,
        };
        Some(tick)
    }

    /// Cancel the run and drop all run state. Walls are kept.
    pub fn cancel(&mut self) {
        self.invalidate();
        info!("Run cancelled");
    }

    /// Cancel the run and empty the grid; start and goal stay where they are
    pub fn reset(&mut self) {
        self.invalidate();
        self.grid.clear_walls();
        info!("Grid cleared");
    }

    pub fn clear_walls(&mut self) {
        self.invalidate();
        self.grid.clear_walls();
        info!("All walls removed");
    }

    /// Replace the walls with a random maze of the given density, keeping
    /// the current start and goal
    pub fn new_maze(&mut self, density: f64) -> PathfindingResult<()> {
        let maze = GridMap::with_random_walls(
            self.grid.rows(),
            self.grid.cols(),
            self.grid.start(),
            self.grid.goal(),
            density,
            &mut self.maze_rng,
        )?;
        info!("New maze with {} walls (density {})", maze.wall_count(), density);
        self.load_grid(maze);
        Ok(())
    }

    pub fn load_grid(&mut self, grid: GridMap) {
        self.invalidate();
        self.grid = grid;
    }

    /// Edit a wall. Endpoints and the agent's cell cannot be walled.
    /// Returns true if the grid changed.
    pub fn set_wall(&mut self, cell: Cell, wall: bool) -> bool {
        if wall && self.agent.map_or(false, |agent| agent.cell == cell) {
            return false;
        }
        self.grid.set_wall(cell, wall)
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.next();
        self.state = ControllerState::Idle;
        self.last_search = None;
        self.path = None;
        self.reveal = None;
        self.agent = None;
        self.trail.clear();
        self.transitions.clear();
        debug!("run state cleared, generation {}", self.generation);
    }

    fn transition(&mut self, to: ControllerState) {
        let from = self.state;
        if !from.can_transition_to(to) {
            warn!("unexpected transition from <{}> to <{}>", from, to);
        }
        debug!("transitioning from <{}> to <{}>", from, to);
        self.transitions.push(Transition { from, to });
        self.state = to;
    }

    fn expect_state(&self, expected: ControllerState, operation: &str) -> PathfindingResult<()> {
        if self.state != expected {
            return Err(PathfindingError::InvalidState(format!(
                "{} requires state <{}>, controller is <{}>",
                operation, expected, self.state
            )));
        }
        Ok(())
    }

    fn take_visited(&mut self, max: usize) -> Vec<Cell> {
        let batch: Vec<Cell> = match self.reveal.as_mut() {
            Some(order) => order.by_ref().take(max.max(1)).collect(),
            None => Vec::new(),
        };
        if self.reveal.as_ref().map_or(true, |order| order.len() == 0) {
            self.reveal = None;
            self.transition(ControllerState::RevealingPath);
        }
        batch
    }

    fn place_agent(&mut self) -> PathfindingResult<Path> {
        let path = self.active_path()?.clone();
        let start = path
            .start()
            .ok_or_else(|| PathfindingError::InvalidState("active path is empty".to_string()))?;
        let nodes_expanded = self.last_search.as_ref().map_or(0, |r| r.nodes_expanded);

        self.agent = Some(AgentState {
            cell: start,
            path_index: 0,
            replans: 0,
            nodes_expanded,
        });
        self.trail = vec![start];
        self.transition(ControllerState::Stepping);
        Ok(path)
    }

    fn active_path(&self) -> PathfindingResult<&Path> {
        self.path
            .as_ref()
            .ok_or_else(|| PathfindingError::InvalidState("no active path".to_string()))
    }

    fn current_agent(&self) -> PathfindingResult<AgentState> {
        self.agent
            .ok_or_else(|| PathfindingError::InvalidState("agent has not been placed".to_string()))
    }

    fn final_report(&self, event: StepEvent) -> PathfindingResult<StepReport> {
        let agent = self.current_agent()?;
        Ok(StepReport {
            agent_cell: agent.cell,
            path_index: agent.path_index,
            events: vec![event],
            new_walls: Vec::new(),
        })
    }

    fn report(&self, events: Vec<StepEvent>, new_walls: Vec<Cell>) -> PathfindingResult<StepReport> {
        let agent = self.current_agent()?;
        Ok(StepReport {
            agent_cell: agent.cell,
            path_index: agent.path_index,
            events,
            new_walls,
        })
    }

    fn advance(&mut self) -> PathfindingResult<StepReport> {
        let mut agent = self.current_agent()?;
        let (last, next, upcoming) = {
            let path = self.active_path()?;
            (
                path.len().saturating_sub(1),
                path.get(agent.path_index + 1),
                path.get(agent.path_index + 2),
            )
        };

        let next = match next {
            Some(cell) if agent.path_index < last => cell,
            _ => {
                // Single-cell path: the agent already stands on the goal
                self.transition(ControllerState::GoalReached);
                info!("Goal reached at {}", agent.cell);
                return self.report(vec![StepEvent::GoalReached], Vec::new());
            }
        };

        // The grid may have been edited since the last step
        if self.grid.is_wall(next) {
            let event = self.replan(next)?;
            return self.report(vec![StepEvent::Blocked, event], Vec::new());
        }

        agent.path_index += 1;
        agent.cell = next;
        self.agent = Some(agent);
        self.trail.push(next);

        if agent.path_index == last {
            self.transition(ControllerState::GoalReached);
            info!("Goal reached at {} after {} replans", next, agent.replans);
            return self.report(vec![StepEvent::GoalReached], Vec::new());
        }

        let new_walls = if self.config.dynamic_obstacles {
            let protected = [self.grid.start(), self.grid.goal(), agent.cell];
            self.obstacles.step(&mut self.grid, &protected)
        } else {
            Vec::new()
        };

        match upcoming {
            Some(cell) if self.grid.is_wall(cell) => {
                let event = self.replan(cell)?;
                self.report(vec![StepEvent::Blocked, event], new_walls)
            }
            _ => self.report(vec![StepEvent::Continuing], new_walls),
        }
    }

    /// Search again from the agent's cell. A failed replan keeps the old
    /// path and leaves the agent where it is.
    fn replan(&mut self, blocked: Cell) -> PathfindingResult<StepEvent> {
        let previous = self.current_agent()?;
        self.transition(ControllerState::Blocked);
        info!("Path blocked at {}, replanning from {}", blocked, previous.cell);
        self.transition(ControllerState::Replanning);

        let result = search(
            &self.grid,
            previous.cell,
            self.grid.goal(),
            self.config.algorithm,
            self.config.heuristic,
        );
        let replans = previous.replans + 1;
        let nodes_expanded = previous.nodes_expanded + result.nodes_expanded;

        let event = match &result.path {
            Some(path) => {
                info!("Replanned #{}: new cost {}", replans, path.cost());
                self.path = Some(path.clone());
                self.agent = Some(AgentState {
                    cell: previous.cell,
                    path_index: 0,
                    replans,
                    nodes_expanded,
                });
                self.transition(ControllerState::Stepping);
                StepEvent::Replanned
            }
            None => {
                warn!("Trapped at {} after {} replans", previous.cell, replans);
                self.agent = Some(AgentState {
                    replans,
                    nodes_expanded,
                    ..previous
                });
                self.transition(ControllerState::Trapped);
                StepEvent::Trapped
            }
        };

        self.last_search = Some(result);
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GridMap {
        GridMap::from_ascii("S...G").unwrap()
    }

    fn controller(grid: GridMap) -> ReplanningController {
        ReplanningController::new(grid, ControllerConfig::default().with_seed(3)).unwrap()
    }

    fn reveal_all(controller: &mut ReplanningController) {
        while controller.state() == ControllerState::RevealingVisited {
            controller.reveal_visited(4).unwrap();
        }
        controller.reveal_path().unwrap();
    }

    #[test]
    fn test_run_enters_reveal() {
        let grid = corridor();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        let result = controller.run(start, goal).unwrap();
        assert_eq!(result.cost(), Some(4));
        assert_eq!(controller.state(), ControllerState::RevealingVisited);
        assert_eq!(controller.metrics().path_cost, Some(4));
    }

    #[test]
    fn test_run_rejects_out_of_bounds() {
        let mut controller = controller(corridor());
        let err = controller.run(Cell::new(0, 0), Cell::new(3, 3));
        assert!(matches!(err, Err(PathfindingError::OutOfBounds { .. })));
        assert_eq!(controller.state(), ControllerState::Idle);
    }

    #[test]
    fn test_no_path_returns_to_idle() {
        let grid = GridMap::from_ascii("S.#.G").unwrap();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        let result = controller.run(start, goal).unwrap();
        assert!(!result.is_found());
        assert_eq!(result.nodes_expanded, 2);
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(controller.step().is_err());
    }

    #[test]
    fn test_reveal_visited_in_batches() {
        let grid = corridor();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        let result = controller.run(start, goal).unwrap();

        let mut revealed = Vec::new();
        while controller.state() == ControllerState::RevealingVisited {
            let batch = controller.reveal_visited(2).unwrap();
            assert!(batch.len() <= 2);
            revealed.extend(batch);
        }
        assert_eq!(revealed, result.visited_order);
        assert_eq!(controller.state(), ControllerState::RevealingPath);
        assert!(controller.reveal_visited(2).is_err());
    }

    #[test]
    fn test_walks_to_goal() {
        let grid = corridor();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        reveal_all(&mut controller);

        for _ in 0..3 {
            assert_eq!(controller.step().unwrap().outcome(), StepEvent::Continuing);
        }
        let last = controller.step().unwrap();
        assert_eq!(last.outcome(), StepEvent::GoalReached);
        assert_eq!(last.agent_cell, goal);
        assert_eq!(controller.trail().len(), 5);
        assert!(controller.state().is_terminal());

        // Finished runs keep reporting the outcome
        assert_eq!(controller.step().unwrap().outcome(), StepEvent::GoalReached);
        assert_eq!(controller.trail().len(), 5);
    }

    #[test]
    fn test_edit_ahead_of_agent_triggers_replan() {
        let grid = GridMap::from_ascii("S...\n....\n...G").unwrap();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        reveal_all(&mut controller);

        let next = controller.path().unwrap().get(1).unwrap();
        assert!(controller.set_wall(next, true));
        let report = controller.step().unwrap();
        assert_eq!(report.events, vec![StepEvent::Blocked, StepEvent::Replanned]);
        assert_eq!(report.agent_cell, start);
        assert_eq!(controller.path().unwrap().start(), Some(start));
        assert!(!controller.path().unwrap().contains(&next));
        assert_eq!(controller.metrics().replans, 1);
    }

    #[test]
    fn test_agent_cell_cannot_be_walled() {
        let grid = corridor();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        reveal_all(&mut controller);
        controller.step().unwrap();

        let agent = controller.agent().unwrap().cell;
        assert!(!controller.set_wall(agent, true));
        assert!(controller.grid().is_free(agent));
    }

    #[test]
    fn test_stale_tick_is_dropped() {
        let grid = corridor();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        let stale = controller.generation();

        controller.run(start, goal).unwrap();
        assert!(controller.tick(stale).is_none());
        assert!(controller.tick(controller.generation()).is_some());
    }

    #[test]
    fn test_cancel_keeps_walls_and_reset_clears_them() {
        let grid = GridMap::from_ascii("S.#\n..G").unwrap();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        controller.cancel();
        assert_eq!(controller.state(), ControllerState::Idle);
        assert!(controller.path().is_none());
        assert!(controller.transitions().is_empty());
        assert_eq!(controller.grid().wall_count(), 1);

        controller.run(start, goal).unwrap();
        controller.reset();
        assert!(controller.last_search().is_none());
        assert_eq!(controller.grid().wall_count(), 0);
        assert_eq!(controller.grid().start(), start);
    }

    #[test]
    fn test_new_maze_keeps_endpoints_free() {
        let grid = GridMap::new(12, 12, Cell::new(1, 1), Cell::new(10, 10)).unwrap();
        let mut controller = controller(grid);
        controller.new_maze(0.5).unwrap();
        assert!(controller.grid().wall_count() > 0);
        assert!(controller.grid().is_free(Cell::new(1, 1)));
        assert!(controller.grid().is_free(Cell::new(10, 10)));
        assert!(controller.new_maze(1.5).is_err());
    }

    /// Walls the first free cell it is offered on every call
    struct GreedyWaller;

    impl ObstacleSource for GreedyWaller {
        fn step(&mut self, grid: &mut GridMap, protected: &[Cell]) -> Vec<Cell> {
            let target = grid
                .free_cells()
                .find(|c| !grid.is_endpoint(*c) && !protected.contains(c));
            match target {
                Some(cell) if grid.set_wall(cell, true) => vec![cell],
                _ => Vec::new(),
            }
        }
    }

    #[test]
    fn test_dynamic_obstacles_toggle() {
        let grid = GridMap::from_ascii("S....\n.....\n....G").unwrap();
        let (start, goal) = (grid.start(), grid.goal());
        let config = ControllerConfig::default().with_dynamic_obstacles(0.1);
        let mut controller =
            ReplanningController::with_obstacle_source(grid, config, Box::new(GreedyWaller)).unwrap();

        controller.set_dynamic_obstacles(false);
        controller.run(start, goal).unwrap();
        reveal_all(&mut controller);
        assert!(controller.step().unwrap().new_walls.is_empty());
        assert_eq!(controller.grid().wall_count(), 0);

        controller.set_dynamic_obstacles(true);
        assert!(controller.config().dynamic_obstacles);
        let report = controller.step().unwrap();
        assert_eq!(report.new_walls.len(), 1);
        assert_eq!(controller.grid().wall_count(), 1);
    }

    #[test]
    fn test_invalid_pacing_is_rejected() {
        let config = ControllerConfig {
            pacing: crate::mission_planning::Pacing { speed: 0 },
            ..ControllerConfig::default()
        };
        assert!(ReplanningController::new(corridor(), config).is_err());
    }

    #[test]
    fn test_recorded_transitions_follow_table() {
        let grid = GridMap::from_ascii("S...\n....\n...G").unwrap();
        let (start, goal) = (grid.start(), grid.goal());
        let mut controller = controller(grid);
        controller.run(start, goal).unwrap();
        reveal_all(&mut controller);
        let next = controller.path().unwrap().get(1).unwrap();
        controller.set_wall(next, true);
        while !controller.state().is_terminal() {
            controller.step().unwrap();
        }
        for t in controller.transitions() {
            assert!(t.from.can_transition_to(t.to), "{}", t);
        }
        assert_eq!(controller.transitions()[0].to, ControllerState::Searching);
    }
}
