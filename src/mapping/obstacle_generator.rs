// Dynamic obstacle generator
//
// Walls free cells at random while the agent is moving, so the active path
// can be invalidated mid-route.

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::{Cell, ObstacleSource, PathfindingError, PathfindingResult};
use crate::utils::GridMap;

// Parameters
pub const DEFAULT_OBSTACLE_PROBABILITY: f64 = 0.0025; // per free cell, per step

/// Independently walls each eligible free cell with probability `p` per call
pub struct ObstacleGenerator {
    probability: f64,
    rng: StdRng,
}

impl ObstacleGenerator {
    /// `seed` makes the sequence of injected obstacles reproducible
    pub fn new(probability: f64, seed: Option<u64>) -> PathfindingResult<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(probability, rng)
    }

    pub fn with_rng(probability: f64, rng: StdRng) -> PathfindingResult<Self> {
        if !(0.0..1.0).contains(&probability) {
            return Err(PathfindingError::InvalidParameter(format!(
                "obstacle probability must be within [0, 1), got {}",
                probability
            )));
        }
        Ok(ObstacleGenerator { probability, rng })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl ObstacleSource for ObstacleGenerator {
    fn step(&mut self, grid: &mut GridMap, protected: &[Cell]) -> Vec<Cell> {
        let candidates: Vec<Cell> = grid
            .free_cells()
            .filter(|c| !grid.is_endpoint(*c) && !protected.contains(c))
            .collect();

        let mut spawned = Vec::new();
        for cell in candidates {
            if self.rng.gen_bool(self.probability) && grid.set_wall(cell, true) {
                spawned.push(cell);
            }
        }

        if !spawned.is_empty() {
            trace!("spawned {} obstacles: {:?}", spawned.len(), spawned);
        }
        spawned
    }
}
