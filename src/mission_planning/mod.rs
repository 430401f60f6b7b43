// Mission planning module: the replanning controller and its state machine

pub mod config;
pub mod replanning;
pub mod state_machine;

pub use config::*;
pub use replanning::*;
pub use state_machine::*;
