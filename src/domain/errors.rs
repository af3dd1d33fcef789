//! Error taxonomy shared by repositories, caches and services.
//!
//! Every backend failure is classified into one of these kinds before it
//! leaves the infrastructure layer. Absence is not an error at the backend
//! level (repositories return `Option`); services turn it into
//! [`CoreError::NotFound`] where the contract requires it.

use std::time::Duration;
use thiserror::Error;

/// Result type for domain and application operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// No matching record or user.
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation reported by the persistence backend.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The operation exceeded its time bound.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Opaque persistence backend failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Opaque cache backend failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// Admission control rejected the request.
    #[error("rate limit exceeded, retry after {retry_after:?}")]
    LimitExceeded { retry_after: Duration },
}

impl CoreError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn storage(reason: impl std::fmt::Display) -> Self {
        Self::Storage(reason.to_string())
    }

    pub fn cache(reason: impl std::fmt::Display) -> Self {
        Self::Cache(reason.to_string())
    }

    /// Returns true for the `Conflict` kind.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns true for the `NotFound` kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pick_kind() {
        assert!(CoreError::not_found("code abc").is_not_found());
        assert!(CoreError::conflict("short_code").is_conflict());
        assert!(matches!(CoreError::storage("boom"), CoreError::Storage(m) if m == "boom"));
        assert!(matches!(CoreError::cache("down"), CoreError::Cache(m) if m == "down"));
    }

    #[test]
    fn test_display_includes_detail() {
        let err = CoreError::LimitExceeded {
            retry_after: Duration::from_secs(3),
        };
        assert!(err.to_string().contains("3s"));

        let err = CoreError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "operation timed out after 5s");
    }
}
