//! Error types for dynamic_pathfinding
//!
//! Search failures are not errors: an unreachable goal is reported through
//! [`SearchStatus`](crate::common::SearchStatus) and a failed replan through
//! [`StepEvent::Trapped`](crate::mission_planning::StepEvent). The variants
//! here cover misuse of the API and I/O around it.

use std::fmt;

use crate::common::types::Cell;

/// Main error type for the pathfinding engine
#[derive(Debug)]
pub enum PathfindingError {
    /// Invalid configuration or construction parameter
    InvalidParameter(String),
    /// Cell lies outside the grid
    OutOfBounds { cell: Cell, rows: usize, cols: usize },
    /// Entry point called in a controller state that cannot honour it
    InvalidState(String),
    /// I/O error
    IoError(std::io::Error),
    /// Visualization error
    VisualizationError(String),
}

impl fmt::Display for PathfindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathfindingError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PathfindingError::OutOfBounds { cell, rows, cols } => {
                write!(f, "Cell {} is outside the {}x{} grid", cell, rows, cols)
            }
            PathfindingError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            PathfindingError::IoError(e) => write!(f, "I/O error: {}", e),
            PathfindingError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for PathfindingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PathfindingError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PathfindingError {
    fn from(e: std::io::Error) -> Self {
        PathfindingError::IoError(e)
    }
}

/// Result type alias for pathfinding operations
pub type PathfindingResult<T> = Result<T, PathfindingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PathfindingError::InvalidParameter("obstacle probability must be < 1".to_string());
        assert_eq!(
            format!("{}", err),
            "Invalid parameter: obstacle probability must be < 1"
        );

        let err = PathfindingError::OutOfBounds { cell: Cell::new(5, -1), rows: 4, cols: 4 };
        assert_eq!(format!("{}", err), "Cell (5, -1) is outside the 4x4 grid");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PathfindingError = io_err.into();
        assert!(matches!(err, PathfindingError::IoError(_)));
    }
}
