//! Error types for simdbrot operations.
//!
//! Every check happens once, at the boundary of a kernel call, before any
//! output row is written. The kernels themselves have no failure paths.

use std::fmt;

/// Errors that can occur during simdbrot operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MandelbrotError {
    /// The output buffer cannot hold every row the request selects.
    BufferError {
        /// Number of `i32` elements the request needs.
        required: usize,
        /// Number of elements the caller provided.
        actual: usize,
    },
    /// The host CPU lacks the instructions a backend needs.
    UnsupportedBackend {
        /// Display name of the backend.
        name: &'static str,
    },
    /// No backend matches the given name.
    UnknownBackend {
        /// The name that was looked up.
        name: String,
    },
    /// Input validation error.
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for MandelbrotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MandelbrotError::BufferError { required, actual } => write!(
                f,
                "Output buffer too small: {} elements required, {} provided",
                required, actual
            ),
            MandelbrotError::UnsupportedBackend { name } => {
                write!(f, "Backend '{}' is not supported by this CPU", name)
            }
            MandelbrotError::UnknownBackend { name } => {
                write!(f, "Unknown backend '{}'", name)
            }
            MandelbrotError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
        }
    }
}

impl std::error::Error for MandelbrotError {}

/// Result type alias for simdbrot operations.
pub type Result<T> = std::result::Result<T, MandelbrotError>;

/// Creates a buffer error.
pub fn buffer_error(required: usize, actual: usize) -> MandelbrotError {
    MandelbrotError::BufferError { required, actual }
}

/// Creates an unsupported backend error.
pub fn unsupported_backend(name: &'static str) -> MandelbrotError {
    MandelbrotError::UnsupportedBackend { name }
}

/// Creates an unknown backend error.
pub fn unknown_backend(name: impl Into<String>) -> MandelbrotError {
    MandelbrotError::UnknownBackend { name: name.into() }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> MandelbrotError {
    MandelbrotError::ValidationError {
        message: message.into(),
    }
}
