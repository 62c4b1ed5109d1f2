//! Error types for the swingup library.

use std::fmt;

/// Result type for swingup operations.
pub type Result<T> = std::result::Result<T, SwingupError>;

/// Error types that can occur across the swingup workspace.
#[derive(Debug, Clone)]
pub enum SwingupError {
    /// Invalid configuration (non-positive timestep, empty dataset, etc.)
    InvalidConfig {
        param: String,
        message: String,
    },
    /// Dimension mismatch between a buffer and what the consumer expects
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
    /// Failure while drawing or encoding a frame/figure
    Render(String),
    /// Internal error (should not happen in correct usage)
    Internal(String),
}

impl fmt::Display for SwingupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { param, message } => {
                write!(f, "Invalid configuration for '{}': {}", param, message)
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            Self::Render(msg) => write!(f, "Render error: {}", msg),
            Self::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SwingupError {}
