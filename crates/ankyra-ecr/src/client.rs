//! Live ECR client backed by `aws-sdk-ecr`.
//!
//! This is the only module that sees SDK types. Service errors are mapped
//! to [`ApiError`] here, with the not-found exceptions of each operation
//! tagged explicitly, so the reconciler never inspects provider errors.

use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::types::Repository as SdkRepository;

use async_trait::async_trait;

use crate::api::{ApiError, EcrApi, Repository};

/// ECR client over the AWS SDK.
#[derive(Debug, Clone)]
pub struct EcrClient {
    inner: aws_sdk_ecr::Client,
}

impl EcrClient {
    /// Creates a client from an already-loaded AWS configuration.
    #[must_use]
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            inner: aws_sdk_ecr::Client::new(config),
        }
    }

    /// Loads the shared AWS configuration for `region` and creates a
    /// client.
    ///
    /// Credentials come from the default provider chain (environment,
    /// profiles, instance metadata). Timeouts are inherited from the SDK
    /// defaults.
    pub async fn connect(region: impl Into<String>) -> Self {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.into()))
            .load()
            .await;
        Self::new(&config)
    }
}

#[async_trait]
impl EcrApi for EcrClient {
    async fn describe_repositories(
        &self,
        registry_id: Option<&str>,
        names: &[String],
    ) -> Result<Vec<Repository>, ApiError> {
        let out = self
            .inner
            .describe_repositories()
            .set_repository_names(Some(names.to_vec()))
            .set_registry_id(registry_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_not_found_exception())
                {
                    ApiError::not_found(DisplayErrorContext(&err))
                } else {
                    ApiError::other(DisplayErrorContext(&err))
                }
            })?;
        Ok(out.repositories().iter().map(convert).collect())
    }

    async fn create_repository(&self, name: &str) -> Result<Repository, ApiError> {
        let out = self
            .inner
            .create_repository()
            .repository_name(name)
            .send()
            .await
            .map_err(|err| ApiError::other(DisplayErrorContext(&err)))?;
        out.repository().map(convert).ok_or_else(|| {
            ApiError::other(format!("create repository {name} returned no repository"))
        })
    }

    async fn get_lifecycle_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError> {
        let out = self
            .inner
            .get_lifecycle_policy()
            .repository_name(name)
            .set_registry_id(registry_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_lifecycle_policy_not_found_exception())
                {
                    ApiError::not_found(DisplayErrorContext(&err))
                } else {
                    ApiError::other(DisplayErrorContext(&err))
                }
            })?;
        Ok(out.lifecycle_policy_text().unwrap_or_default().to_string())
    }

    async fn put_lifecycle_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        let out = self
            .inner
            .put_lifecycle_policy()
            .repository_name(name)
            .lifecycle_policy_text(text)
            .set_registry_id(registry_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| ApiError::other(DisplayErrorContext(&err)))?;
        Ok(out.lifecycle_policy_text().unwrap_or_default().to_string())
    }

    async fn get_repository_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError> {
        let out = self
            .inner
            .get_repository_policy()
            .repository_name(name)
            .set_registry_id(registry_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_repository_policy_not_found_exception())
                {
                    ApiError::not_found(DisplayErrorContext(&err))
                } else {
                    ApiError::other(DisplayErrorContext(&err))
                }
            })?;
        Ok(out.policy_text().unwrap_or_default().to_string())
    }

    async fn set_repository_policy(
        &self,
        registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        let out = self
            .inner
            .set_repository_policy()
            .repository_name(name)
            .policy_text(text)
            .set_registry_id(registry_id.map(ToOwned::to_owned))
            .send()
            .await
            .map_err(|err| ApiError::other(DisplayErrorContext(&err)))?;
        Ok(out.policy_text().unwrap_or_default().to_string())
    }
}

/// Converts the SDK repository record into the domain type.
fn convert(repo: &SdkRepository) -> Repository {
    Repository {
        registry_id: repo.registry_id().map(ToOwned::to_owned),
        name: repo.repository_name().unwrap_or_default().to_string(),
        arn: repo.repository_arn().map(ToOwned::to_owned),
        uri: repo.repository_uri().map(ToOwned::to_owned),
        created_at: repo
            .created_at()
            .and_then(|t| chrono::DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_maps_fields() {
        let sdk = SdkRepository::builder()
            .registry_id("123456789012")
            .repository_name("acme/myapp")
            .repository_arn("arn:aws:ecr:eu-west-1:123456789012:repository/acme/myapp")
            .repository_uri("123456789012.dkr.ecr.eu-west-1.amazonaws.com/acme/myapp")
            .build();

        let repo = convert(&sdk);
        assert_eq!(repo.name, "acme/myapp");
        assert_eq!(repo.registry_id.as_deref(), Some("123456789012"));
        assert_eq!(
            repo.uri.as_deref(),
            Some("123456789012.dkr.ecr.eu-west-1.amazonaws.com/acme/myapp")
        );
        assert!(repo.created_at.is_none());
    }
}
