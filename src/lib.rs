//! dynamic_pathfinding - grid pathfinding with live replanning
//!
//! A* and greedy best-first search over a 4-connected occupancy grid,
//! plus a controller that walks an agent along the found path while
//! obstacles appear, replanning from the agent's cell whenever the path
//! ahead is blocked.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod mapping;
pub mod mission_planning;

// Re-export common types for convenience
pub use common::{Cell, Path, SearchResult, SearchStatus};
pub use common::{GridPathPlanner, Heuristic, ObstacleSource};
pub use common::{PathfindingError, PathfindingResult};
pub use mission_planning::{ControllerConfig, ControllerState, ReplanningController, StepEvent, Tick};
pub use path_planning::{search, Algorithm, HeuristicKind};
pub use utils::{GridConfig, GridMap};
