//! Error types shared by the campus backend crates.

use thiserror::Error;

/// Configuration errors shared across crates.
#[derive(Debug, Error)]
pub enum CampusError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for CampusError {
    fn from(err: config::ConfigError) -> Self {
        CampusError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: CampusError = config::ConfigError::NotFound("vector_dim".to_string()).into();
        assert!(matches!(err, CampusError::Config(_)));
        assert!(err.to_string().starts_with("Configuration error:"));
    }
}
