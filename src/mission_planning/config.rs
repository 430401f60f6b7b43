//! Replanning controller configuration.

use std::time::Duration;

use crate::common::{PathfindingError, PathfindingResult};
use crate::mapping::DEFAULT_OBSTACLE_PROBABILITY;
use crate::mission_planning::state_machine::ControllerState;
use crate::path_planning::{Algorithm, HeuristicKind};

/// External tick cadence derived from a 1..=10 speed setting.
///
/// The controller only reads [`Pacing::reveal_batch`]; the delays are for
/// whatever clock drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// 1..=10; checked by [`ControllerConfig::validate`]
    pub speed: u8,
}

impl Pacing {
    pub const MIN_SPEED: u8 = 1;
    pub const MAX_SPEED: u8 = 10;

    pub fn new(speed: u8) -> PathfindingResult<Self> {
        if !(Self::MIN_SPEED..=Self::MAX_SPEED).contains(&speed) {
            return Err(PathfindingError::InvalidParameter(format!(
                "speed must be within {}..={}, got {}",
                Self::MIN_SPEED,
                Self::MAX_SPEED,
                speed
            )));
        }
        Ok(Self { speed })
    }

    /// Visited cells revealed per tick
    pub fn reveal_batch(&self) -> usize {
        (self.speed as usize * 3).max(1)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(14u64.saturating_sub(self.speed as u64).max(1))
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(130u64.saturating_sub(self.speed as u64 * 10).max(30))
    }

    /// Pause between revealing the path and the first agent step
    pub fn first_step_delay(&self) -> Duration {
        Duration::from_millis(400)
    }

    /// Pause before a replanned path is shown
    pub fn replan_delay(&self) -> Duration {
        Duration::from_millis(60)
    }

    /// Delay before the next tick, given the state the controller is in now
    pub fn delay_for(&self, state: ControllerState) -> Duration {
        match state {
            ControllerState::RevealingVisited => self.reveal_delay(),
            ControllerState::RevealingPath => self.first_step_delay(),
            ControllerState::Stepping => self.step_delay(),
            _ => Duration::from_millis(0),
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self { speed: 5 }
    }
}

/// Configuration for [`ReplanningController`](crate::mission_planning::ReplanningController)
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub algorithm: Algorithm,
    pub heuristic: HeuristicKind,
    /// Inject random obstacles while the agent moves
    pub dynamic_obstacles: bool,
    /// Per free cell, per agent step; must be within [0, 1)
    pub obstacle_probability: f64,
    /// Fixed seed for obstacle injection and maze generation (None = entropy)
    pub seed: Option<u64>,
    pub pacing: Pacing,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            heuristic: HeuristicKind::default(),
            dynamic_obstacles: false,
            obstacle_probability: DEFAULT_OBSTACLE_PROBABILITY,
            seed: None,
            pacing: Pacing::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_dynamic_obstacles(mut self, probability: f64) -> Self {
        self.dynamic_obstacles = true;
        self.obstacle_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> PathfindingResult<()> {
        if !(0.0..1.0).contains(&self.obstacle_probability) {
            return Err(PathfindingError::InvalidParameter(format!(
                "obstacle probability must be within [0, 1), got {}",
                self.obstacle_probability
            )));
        }
        Pacing::new(self.pacing.speed).map(|_| ())
    }
}
