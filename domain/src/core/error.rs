//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Service name cannot be empty")]
    EmptyServiceName,

    #[error("Cached value could not be decoded: {0}")]
    CacheDecode(String),

    #[error("Invalid catalog document: {0}")]
    InvalidCatalog(String),
}

impl DomainError {
    /// Check if this error came from the cache layer
    pub fn is_cache_error(&self) -> bool {
        matches!(self, DomainError::CacheDecode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            DomainError::EmptyServiceName.to_string(),
            "Service name cannot be empty"
        );
        assert!(
            DomainError::InvalidCatalog("missing offers".into())
                .to_string()
                .contains("missing offers")
        );
    }

    #[test]
    fn test_is_cache_error() {
        assert!(DomainError::CacheDecode("bad".into()).is_cache_error());
        assert!(!DomainError::EmptyServiceName.is_cache_error());
    }
}
