//! Anchor loading error types.
//!
//! Every variant names the offending document so operators can find the
//! file that aborted a load.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which dimension contract a vector file violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionCheck {
    /// Number of values in the file vs the declared `reduced_dim`
    VectorFileLength,
    /// Declared `reduced_dim` vs the configured `vector_dim`
    ConfiguredDimension,
}

impl fmt::Display for DimensionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionCheck::VectorFileLength => write!(f, "reduced_vec length vs reduced_dim"),
            DimensionCheck::ConfiguredDimension => write!(f, "reduced_dim vs vector_dim"),
        }
    }
}

/// Errors that abort an anchor load. A failed load never publishes.
#[derive(Debug, Error)]
pub enum AnchorError {
    /// Document could not be parsed or has wrongly typed / missing base fields
    #[error("Invalid anchor doc {path:?}: {reason}")]
    InvalidAnchorDocument { path: PathBuf, reason: String },

    /// Normal anchor without min_size or max_size
    #[error("{slug}: normal anchors require min_size and max_size ({path:?})")]
    MissingSizeRange { slug: String, path: PathBuf },

    /// min_size < 1 or max_size < min_size
    #[error("{slug}: invalid size range (min={min}, max={max}) ({path:?})")]
    InvalidSizeRange {
        slug: String,
        path: PathBuf,
        min: i64,
        max: i64,
    },

    /// Referenced reduced vector file does not exist
    #[error("{slug}: missing reduced_vec_file: {vector_path:?} ({path:?})")]
    MissingVectorFile {
        slug: String,
        path: PathBuf,
        vector_path: PathBuf,
    },

    /// Reduced vector file is not a flat JSON array of numbers
    #[error("{slug}: invalid reduced_vec_file {vector_path:?}: {reason} ({path:?})")]
    InvalidVectorFile {
        slug: String,
        path: PathBuf,
        vector_path: PathBuf,
        reason: String,
    },

    /// Vector length or declared dimension disagrees with its contract
    #[error("{slug}: dimension mismatch ({check}): expected {expected}, got {actual} ({path:?})")]
    DimensionMismatch {
        slug: String,
        path: PathBuf,
        check: DimensionCheck,
        expected: usize,
        actual: usize,
    },

    /// Two documents of the same kind share a slug (strict mode only)
    #[error("Duplicate slug {slug}: {first:?} and {second:?}")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// IO error while reading the anchor directory or a document
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnchorError {
    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidAnchorDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_document() {
        let err = AnchorError::DimensionMismatch {
            slug: "chess-club".to_string(),
            path: PathBuf::from("data/anchors/chess.yaml"),
            check: DimensionCheck::VectorFileLength,
            expected: 128,
            actual: 127,
        };
        let msg = err.to_string();
        assert!(msg.contains("chess-club"));
        assert!(msg.contains("chess.yaml"));
        assert!(msg.contains("reduced_vec length"));
    }

    #[test]
    fn test_invalid_document_display() {
        let err = AnchorError::invalid("a.yaml", "missing field `slug`");
        assert!(err.to_string().contains("Invalid anchor doc"));
        assert!(err.to_string().contains("missing field `slug`"));
    }
}
