//! Error types for ECR reconciliation.

use thiserror::Error;

use crate::api::ApiError;

/// Errors that can occur while reconciling a repository.
///
/// Expected not-found conditions never surface here; they select the
/// create/put branches inside the reconciler. Everything below is terminal
/// for the run.
#[derive(Debug, Error)]
pub enum EcrError {
    /// A required configuration value is absent.
    #[error("missing option: --{name}")]
    MissingOption {
        /// Flag name of the missing option.
        name: &'static str,
    },

    /// A supplied policy override is not valid JSON.
    #[error("invalid {which} policy override: {source}")]
    InvalidPolicy {
        /// Which policy document was rejected.
        which: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The image name cannot form a repository name.
    #[error(transparent)]
    InvalidName(#[from] ankyra_core::Error),

    /// The repository lookup failed for a reason other than absence.
    #[error("failed to check for repository {name} with registry ID '{registry_id}': {source}")]
    DescribeFailed {
        /// Composed repository name.
        name: String,
        /// Registry account id used for the lookup, empty if none.
        registry_id: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },

    /// The repository could not be created.
    #[error("failed to create the ECR repository for {name}: {source}")]
    CreateFailed {
        /// Composed repository name.
        name: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },

    /// The lifecycle policy could not be fetched.
    #[error("failed to fetch lifecycle policy for the ECR repository {name}: {source}")]
    LifecyclePolicyFetchFailed {
        /// Composed repository name.
        name: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },

    /// The lifecycle policy could not be written.
    #[error("failed to put lifecycle policy for the ECR repository {name}: {source}")]
    LifecyclePolicyPutFailed {
        /// Composed repository name.
        name: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },

    /// The access policy could not be fetched.
    #[error("failed to fetch repository policy for the ECR repository {name}: {source}")]
    RepositoryPolicyFetchFailed {
        /// Composed repository name.
        name: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },

    /// The access policy could not be written.
    #[error("failed to set repository policy for the ECR repository {name}: {source}")]
    RepositoryPolicyPutFailed {
        /// Composed repository name.
        name: String,
        /// Underlying service error.
        #[source]
        source: ApiError,
    },
}
