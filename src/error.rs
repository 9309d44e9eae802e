//! Error types for streamlearn operations.
//!
//! Configuration errors are raised at construction time, dimension errors
//! on the offending example. Neither is ever retried.

use std::fmt;

/// Main error type for streamlearn operations.
///
/// # Examples
///
/// ```
/// use streamlearn::error::StreamlearnError;
///
/// let err = StreamlearnError::dimension_mismatch("instance dimension", 10, 12);
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug)]
pub enum StreamlearnError {
    /// Out-of-range parameter supplied to a constructor or configuration.
    InvalidConfiguration {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// An instance's dimension disagrees with the model's fixed dimension.
    DimensionMismatch {
        /// Expected dimension description
        expected: String,
        /// Actual dimension found
        actual: String,
    },

    /// Write access to an index outside `[0, dimension)`.
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Logical dimension of the vector
        dimension: usize,
    },

    /// Configuration or state could not be decoded.
    Serialization(String),

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for StreamlearnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamlearnError::InvalidConfiguration {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid configuration: {param} = {value}, expected {constraint}"
                )
            }
            StreamlearnError::DimensionMismatch { expected, actual } => {
                write!(f, "Vector dimension mismatch: expected {expected}, got {actual}")
            }
            StreamlearnError::IndexOutOfBounds { index, dimension } => {
                write!(f, "index {index} out of bounds (dimension={dimension})")
            }
            StreamlearnError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            StreamlearnError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StreamlearnError {}

impl From<serde_json::Error> for StreamlearnError {
    fn from(err: serde_json::Error) -> Self {
        StreamlearnError::Serialization(err.to_string())
    }
}

impl From<&str> for StreamlearnError {
    fn from(msg: &str) -> Self {
        StreamlearnError::Other(msg.to_string())
    }
}

impl From<String> for StreamlearnError {
    fn from(msg: String) -> Self {
        StreamlearnError::Other(msg)
    }
}

impl StreamlearnError {
    /// Create an invalid configuration error
    #[must_use]
    pub fn invalid_configuration(
        param: &str,
        value: impl fmt::Display,
        constraint: &str,
    ) -> Self {
        Self::InvalidConfiguration {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create a dimension mismatch error with descriptive context
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Returns true for construction-time configuration failures.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, StreamlearnError>;
