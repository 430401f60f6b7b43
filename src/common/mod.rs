//! Common types, traits, and error definitions for dynamic_pathfinding
//!
//! This module provides the foundational building blocks shared by
//! the search algorithms, the obstacle generator and the controller.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
