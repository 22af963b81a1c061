//! Centralized error handling for nanstat
//!
//! This module provides structured error types for the reduction and
//! histogram kernels, enabling better error context and type safety than
//! a generic `Box<dyn Error>`.

use std::fmt;

/// Main error type for nanstat operations
#[derive(Debug)]
pub enum NanstatError {
    /// Axis index out of range for the array rank
    InvalidAxis { axis: isize, rank: usize },

    /// Axis listed more than once after normalization
    DuplicateAxis { axis: usize },

    /// Element type not supported by the requested operation
    UnsupportedType {
        dtype: &'static str,
        operation: &'static str,
    },

    /// Invalid shape parameters (bin counts, ranges, empty inputs)
    Shape { message: String },

    /// A pooled worker task failed; the whole call is aborted
    WorkerFailure(String),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Array shape or layout error
    ArrayError(ndarray::ShapeError),

    /// Generic error for backward compatibility
    Generic(String),
}

impl fmt::Display for NanstatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NanstatError::InvalidAxis { axis, rank } => {
                write!(f, "Axis {} is out of bounds for array with {} dimensions", axis, rank)
            }
            NanstatError::DuplicateAxis { axis } => {
                write!(f, "Axis {} appears more than once in the axis specification", axis)
            }
            NanstatError::UnsupportedType { dtype, operation } => {
                write!(f, "Operation '{}' is not supported for element type '{}'", operation, dtype)
            }
            NanstatError::Shape { message } => write!(f, "Invalid shape: {}", message),
            NanstatError::WorkerFailure(msg) => write!(f, "Worker task failed: {}", msg),
            NanstatError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            NanstatError::ArrayError(e) => write!(f, "Array error: {}", e),
            NanstatError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for NanstatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NanstatError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ndarray::ShapeError> for NanstatError {
    fn from(error: ndarray::ShapeError) -> Self {
        NanstatError::ArrayError(error)
    }
}

impl From<String> for NanstatError {
    fn from(error: String) -> Self {
        NanstatError::Generic(error)
    }
}

impl From<&str> for NanstatError {
    fn from(error: &str) -> Self {
        NanstatError::Generic(error.to_string())
    }
}

/// Result type alias for nanstat operations
pub type Result<T> = std::result::Result<T, NanstatError>;
