// Grid search algorithms module

pub mod heuristic;
pub mod open_set;
pub mod a_star;
pub mod greedy_best_first;
pub mod search;

pub use heuristic::*;
pub use open_set::*;
pub use a_star::*;
pub use greedy_best_first::*;
pub use search::*;
