//! Repository and policy reconciliation.
//!
//! One pass per image: look the repository up, create it when absent, then
//! bring the lifecycle and access policies to the desired state. A policy
//! already stored remotely is never overwritten unless the caller supplied
//! a non-empty override that differs textually from the stored document.

use std::sync::Arc;

use tracing::info;

use crate::api::{EcrApi, Repository};
use crate::client::EcrClient;
use crate::error::EcrError;
use crate::settings::EcrSettings;

/// Ensures ECR repositories and their policies exist for images.
pub struct EcrReconciler {
    settings: EcrSettings,
    api: Arc<dyn EcrApi>,
}

impl EcrReconciler {
    /// Creates a reconciler over an injected API handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are incomplete or carry a
    /// malformed policy override.
    pub fn new(settings: EcrSettings, api: Arc<dyn EcrApi>) -> Result<Self, EcrError> {
        settings.validate()?;
        Ok(Self { settings, api })
    }

    /// Creates a reconciler over a live client for the configured region.
    ///
    /// This is the default factory used by the CLI; tests inject a double
    /// through [`EcrReconciler::new`] instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are incomplete or carry a
    /// malformed policy override.
    pub async fn connect(settings: EcrSettings) -> Result<Self, EcrError> {
        settings.validate()?;
        let client = EcrClient::connect(settings.region.clone()).await;
        Ok(Self {
            settings,
            api: Arc::new(client),
        })
    }

    /// Ensures the repository for an image exists and carries its
    /// policies.
    ///
    /// The repository name is composed from the configured organisation
    /// and the image name (tag trimmed, lower-cased). Returns the remote
    /// repository record, found or created.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid image names and for any remote
    /// failure other than the expected not-found conditions.
    pub async fn ensure_repository(&self, image: &str) -> Result<Repository, EcrError> {
        let repo_name = ankyra_core::repository_name(&self.settings.organisation, image)?;
        info!(repository = %repo_name, "ensuring an ECR repository exists for the image");

        let registry_id = self.settings.registry_id.as_deref();
        let names = vec![repo_name.clone()];
        let found = match self.api.describe_repositories(registry_id, &names).await {
            Ok(repos) => repos.into_iter().find(|r| r.name == repo_name),
            Err(err) if err.is_not_found() => None,
            Err(source) => {
                return Err(EcrError::DescribeFailed {
                    name: repo_name,
                    registry_id: self.settings.registry_id.clone().unwrap_or_default(),
                    source,
                });
            }
        };

        let repository = match found {
            Some(repository) => {
                info!(repository = %repository.name, "found repository");
                repository
            }
            None => {
                let repository = self
                    .api
                    .create_repository(&repo_name)
                    .await
                    .map_err(|source| EcrError::CreateFailed {
                        name: repo_name.clone(),
                        source,
                    })?;
                if let Some(uri) = repository.uri.as_deref() {
                    info!(uri, "created ECR repository");
                }
                repository
            }
        };

        self.ensure_lifecycle_policy(&repo_name).await?;
        self.ensure_repository_policy(&repo_name).await?;
        Ok(repository)
    }

    /// Ensures the repository carries a lifecycle policy.
    ///
    /// No-op when lifecycle policy creation is disabled. An existing
    /// stored policy is kept unless a differing override was supplied.
    ///
    /// # Errors
    ///
    /// Returns an error for any remote failure other than the expected
    /// policy-not-found condition.
    pub async fn ensure_lifecycle_policy(&self, repo_name: &str) -> Result<(), EcrError> {
        if !self.settings.create_lifecycle_policy {
            return Ok(());
        }
        let registry_id = self.settings.registry_id.as_deref();

        let stored = match self.api.get_lifecycle_policy(registry_id, repo_name).await {
            Ok(stored) => {
                if self.settings.lifecycle_policy.is_empty() {
                    // Never replace a stored policy with the built-in default.
                    return Ok(());
                }
                Some(stored)
            }
            Err(err) if err.is_not_found() => None,
            Err(source) => {
                return Err(EcrError::LifecyclePolicyFetchFailed {
                    name: repo_name.to_string(),
                    source,
                });
            }
        };

        let effective = self.settings.effective_lifecycle_policy();
        if stored.as_deref() == Some(effective) {
            return Ok(());
        }

        let written = self
            .api
            .put_lifecycle_policy(registry_id, repo_name, effective)
            .await
            .map_err(|source| EcrError::LifecyclePolicyPutFailed {
                name: repo_name.to_string(),
                source,
            })?;
        info!(repository = repo_name, policy = %written, "put ECR repository lifecycle policy");
        Ok(())
    }

    /// Ensures the repository carries an access policy.
    ///
    /// Same shape as lifecycle reconciliation, independently flagged and
    /// independently defaulted. Disabled by default.
    ///
    /// # Errors
    ///
    /// Returns an error for any remote failure other than the expected
    /// policy-not-found condition.
    pub async fn ensure_repository_policy(&self, repo_name: &str) -> Result<(), EcrError> {
        if !self.settings.create_repository_policy {
            return Ok(());
        }
        let registry_id = self.settings.registry_id.as_deref();

        let stored = match self.api.get_repository_policy(registry_id, repo_name).await {
            Ok(stored) => {
                if self.settings.repository_policy.is_empty() {
                    return Ok(());
                }
                Some(stored)
            }
            Err(err) if err.is_not_found() => None,
            Err(source) => {
                return Err(EcrError::RepositoryPolicyFetchFailed {
                    name: repo_name.to_string(),
                    source,
                });
            }
        };

        let effective = self.settings.effective_repository_policy();
        if stored.as_deref() == Some(effective) {
            return Ok(());
        }

        let written = self
            .api
            .set_repository_policy(registry_id, repo_name, effective)
            .await
            .map_err(|source| EcrError::RepositoryPolicyPutFailed {
                name: repo_name.to_string(),
                source,
            })?;
        info!(repository = repo_name, policy = %written, "set ECR repository access policy");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeEcr;
    use crate::settings::DEFAULT_LIFECYCLE_POLICY;

    fn reconciler(settings: EcrSettings, fake: &Arc<FakeEcr>) -> EcrReconciler {
        EcrReconciler::new(settings, Arc::clone(fake) as Arc<dyn EcrApi>)
            .expect("valid settings")
    }

    #[tokio::test]
    async fn test_creates_missing_repository_with_default_lifecycle_policy() {
        let fake = Arc::new(FakeEcr::new());
        let reconciler = reconciler(EcrSettings::new("us-east-1"), &fake);

        let repository = reconciler.ensure_repository("myapp").await.expect("reconcile");

        assert_eq!(repository.name, "myapp");
        assert!(repository.uri.is_some_and(|uri| !uri.is_empty()));
        let calls = fake.calls();
        assert_eq!(calls.create_repository, 1);
        assert_eq!(calls.put_lifecycle_policy, 1);
        assert_eq!(
            fake.lifecycle_policy("myapp").as_deref(),
            Some(DEFAULT_LIFECYCLE_POLICY)
        );
        // Access policy reconciliation is off by default.
        assert_eq!(calls.get_repository_policy, 0);
    }

    #[tokio::test]
    async fn test_existing_repository_skips_create() {
        let fake = Arc::new(FakeEcr::new().with_repository("myapp"));
        let reconciler = reconciler(EcrSettings::new("us-east-1"), &fake);

        reconciler.ensure_repository("myapp").await.expect("reconcile");

        assert_eq!(fake.calls().create_repository, 0);
        assert_eq!(fake.repositories().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_lifecycle_policy_not_overwritten_by_default() {
        let fake = Arc::new(
            FakeEcr::new()
                .with_repository("myapp")
                .with_lifecycle_policy("myapp", "{\"rules\":[]}"),
        );
        let reconciler = reconciler(EcrSettings::new("us-east-1"), &fake);

        reconciler.ensure_repository("myapp").await.expect("reconcile");

        assert_eq!(fake.calls().put_lifecycle_policy, 0);
        assert_eq!(
            fake.lifecycle_policy("myapp").as_deref(),
            Some("{\"rules\":[]}")
        );
    }

    #[tokio::test]
    async fn test_differing_lifecycle_override_written_once() {
        let fake = Arc::new(
            FakeEcr::new()
                .with_repository("myapp")
                .with_lifecycle_policy("myapp", "{\"rules\":[]}"),
        );
        let override_text = "{\"rules\":[{\"rulePriority\":1}]}";
        let settings = EcrSettings::new("us-east-1").with_lifecycle_policy(override_text);
        let reconciler = reconciler(settings, &fake);

        reconciler.ensure_lifecycle_policy("myapp").await.expect("reconcile");

        assert_eq!(fake.calls().put_lifecycle_policy, 1);
        assert_eq!(fake.lifecycle_policy("myapp").as_deref(), Some(override_text));
    }

    #[tokio::test]
    async fn test_matching_lifecycle_override_is_idempotent() {
        let stored = "{\"rules\":[]}";
        let fake = Arc::new(
            FakeEcr::new()
                .with_repository("myapp")
                .with_lifecycle_policy("myapp", stored),
        );
        let settings = EcrSettings::new("us-east-1").with_lifecycle_policy(stored);
        let reconciler = reconciler(settings, &fake);

        reconciler.ensure_lifecycle_policy("myapp").await.expect("reconcile");

        assert_eq!(fake.calls().put_lifecycle_policy, 0);
    }

    #[tokio::test]
    async fn test_lifecycle_reconciliation_disabled() {
        let fake = Arc::new(FakeEcr::new().with_repository("myapp"));
        let settings = EcrSettings::new("us-east-1").with_create_lifecycle_policy(false);
        let reconciler = reconciler(settings, &fake);

        reconciler.ensure_repository("myapp").await.expect("reconcile");

        let calls = fake.calls();
        assert_eq!(calls.get_lifecycle_policy, 0);
        assert_eq!(calls.put_lifecycle_policy, 0);
    }

    #[tokio::test]
    async fn test_repository_policy_written_when_enabled() {
        let fake = Arc::new(FakeEcr::new().with_repository("myapp"));
        let settings = EcrSettings::new("us-east-1")
            .with_create_repository_policy(true)
            .with_repository_policy("{\"Version\":\"2008-10-17\",\"Statement\":[]}");
        let reconciler = reconciler(settings, &fake);

        reconciler.ensure_repository("myapp").await.expect("reconcile");

        assert_eq!(fake.calls().set_repository_policy, 1);
        assert_eq!(
            fake.repository_policy("myapp").as_deref(),
            Some("{\"Version\":\"2008-10-17\",\"Statement\":[]}")
        );
    }

    #[tokio::test]
    async fn test_organisation_prefixes_repository_name() {
        let fake = Arc::new(FakeEcr::new());
        let settings = EcrSettings::new("us-east-1").with_organisation("acme");
        let reconciler = reconciler(settings, &fake);

        let repository = reconciler
            .ensure_repository("MyApp:0.0.0-pr5")
            .await
            .expect("reconcile");

        assert_eq!(repository.name, "acme/myapp");
    }

    #[tokio::test]
    async fn test_short_image_name_rejected_before_any_call() {
        let fake = Arc::new(FakeEcr::new());
        let reconciler = reconciler(EcrSettings::new("us-east-1"), &fake);

        let result = reconciler.ensure_repository("ab").await;

        assert!(matches!(result, Err(EcrError::InvalidName(_))));
        assert_eq!(fake.calls().describe_repositories, 0);
    }

    #[test]
    fn test_missing_region_rejected_at_construction() {
        let fake: Arc<dyn EcrApi> = Arc::new(FakeEcr::new());
        let result = EcrReconciler::new(EcrSettings::default(), fake);
        assert!(matches!(result, Err(EcrError::MissingOption { name: "region" })));
    }
}
