//! Vector codec error types.

use thiserror::Error;

/// Errors that can occur during vector operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Zero vector cannot be normalized
    #[error("Zero-norm vector is not allowed")]
    DegenerateVector,

    /// NaN or infinite component
    #[error("Non-finite component at index {index}")]
    NonFiniteComponent { index: usize },

    /// Encoder produced the wrong number of bytes (codec bug)
    #[error("Packed vector size mismatch: expected {expected} bytes, got {actual}")]
    PackedLengthMismatch { expected: usize, actual: usize },

    /// Vector not found
    #[error("Vector not found: {0}")]
    NotFound(u64),

    /// Both an existing vector id and inline values were supplied
    #[error("Provide either vector_id or vector, not both")]
    AmbiguousSource,

    /// Neither an existing vector id nor inline values were supplied
    #[error("Provide either vector_id or vector")]
    MissingSource,

    /// Storage collaborator error
    #[error("Store error: {0}")]
    Store(String),
}

impl VectorError {
    /// Errors caused by the caller's input; reject the request, never retry.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            VectorError::DimensionMismatch { .. }
                | VectorError::DegenerateVector
                | VectorError::NonFiniteComponent { .. }
                | VectorError::NotFound(_)
                | VectorError::AmbiguousSource
                | VectorError::MissingSource
        )
    }

    /// Errors that indicate a defect in this crate rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, VectorError::PackedLengthMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(VectorError::DegenerateVector.is_user_input());
        assert!(VectorError::DimensionMismatch {
            expected: 128,
            actual: 3
        }
        .is_user_input());
        assert!(!VectorError::Store("down".into()).is_user_input());

        let defect = VectorError::PackedLengthMismatch {
            expected: 128,
            actual: 127,
        };
        assert!(defect.is_internal());
        assert!(!defect.is_user_input());
    }

    #[test]
    fn test_error_display() {
        let err = VectorError::DimensionMismatch {
            expected: 128,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 128, got 3");
    }
}
