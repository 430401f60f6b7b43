// Mapping module: runtime changes to the occupancy grid

pub mod obstacle_generator;

pub use obstacle_generator::*;
