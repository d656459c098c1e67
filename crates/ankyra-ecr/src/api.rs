//! Capability interface for the ECR service.
//!
//! The reconciler only depends on this trait, never on the AWS SDK types
//! directly. The live implementation is [`EcrClient`](crate::EcrClient);
//! tests substitute the in-memory double behind the `fake` feature.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Remote registry record for a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Account id of the registry holding the repository.
    pub registry_id: Option<String>,

    /// Composed repository name.
    pub name: String,

    /// Amazon resource name of the repository.
    pub arn: Option<String>,

    /// URI images are pushed to and pulled from.
    pub uri: Option<String>,

    /// When the repository was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// Error from a single ECR API call.
///
/// Not-found conditions are tagged explicitly because they drive the
/// create/put branches of reconciliation; everything else is terminal for
/// the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The addressed repository or policy does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Service error message.
        message: String,
    },

    /// Any other service failure.
    #[error("{message}")]
    Other {
        /// Service error message.
        message: String,
    },
}

impl ApiError {
    /// Creates a not-found error from a displayable service error.
    pub fn not_found(err: impl std::fmt::Display) -> Self {
        Self::NotFound {
            message: err.to_string(),
        }
    }

    /// Creates a generic service error from a displayable service error.
    pub fn other(err: impl std::fmt::Display) -> Self {
        Self::Other {
            message: err.to_string(),
        }
    }

    /// Returns true for the expected not-found condition.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Operations consumed from the ECR service.
///
/// Mirrors the remote API shape: lookups take an optional account id, and
/// policy documents travel as raw JSON text.
#[async_trait]
pub trait EcrApi: Send + Sync {
    /// Looks up repositories by exact name.
    ///
    /// The service reports [`ApiError::NotFound`] when any requested name
    /// does not exist.
    async fn describe_repositories(
        &self,
        registry_id: Option<&str>,
        names: &[String],
    ) -> Result<Vec<Repository>, ApiError>;

    /// Creates a repository in the caller's account.
    async fn create_repository(&self, name: &str) -> Result<Repository, ApiError>;

    /// Fetches the lifecycle policy text stored for a repository.
    async fn get_lifecycle_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError>;

    /// Writes the lifecycle policy text for a repository, returning the
    /// stored text.
    async fn put_lifecycle_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError>;

    /// Fetches the access policy text stored for a repository.
    async fn get_repository_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError>;

    /// Writes the access policy text for a repository, returning the
    /// stored text.
    async fn set_repository_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(ApiError::not_found("missing").is_not_found());
        assert!(!ApiError::other("boom").is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::not_found("RepositoryNotFoundException: no repo");
        assert_eq!(
            err.to_string(),
            "not found: RepositoryNotFoundException: no repo"
        );
    }
}
