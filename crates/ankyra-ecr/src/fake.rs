//! In-memory ECR double for tests.
//!
//! Implements [`EcrApi`] over a map of repositories and stored policy
//! documents, and counts calls per operation so reconciliation tests can
//! assert which remote calls happened. Enabled for dependent crates via
//! the `fake` cargo feature.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{ApiError, EcrApi, Repository};

const FAKE_REGISTRY_ID: &str = "123456789012";
const FAKE_REGION: &str = "us-east-1";

/// Per-operation call counts observed by the fake.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    /// Calls to describe-repositories.
    pub describe_repositories: usize,
    /// Calls to create-repository.
    pub create_repository: usize,
    /// Calls to get-lifecycle-policy.
    pub get_lifecycle_policy: usize,
    /// Calls to put-lifecycle-policy.
    pub put_lifecycle_policy: usize,
    /// Calls to get-repository-policy.
    pub get_repository_policy: usize,
    /// Calls to set-repository-policy.
    pub set_repository_policy: usize,
}

#[derive(Debug, Default)]
struct State {
    repositories: BTreeMap<String, Repository>,
    lifecycle_policies: BTreeMap<String, String>,
    repository_policies: BTreeMap<String, String>,
    calls: CallCounts,
}

/// In-memory ECR implementation for tests.
#[derive(Debug, Default)]
pub struct FakeEcr {
    state: Mutex<State>,
}

impl FakeEcr {
    /// Creates an empty fake registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a repository, as if it had been created earlier.
    #[must_use]
    pub fn with_repository(self, name: &str) -> Self {
        {
            let mut state = self.lock();
            let repository = make_repository(name);
            state.repositories.insert(name.to_string(), repository);
        }
        self
    }

    /// Seeds a stored lifecycle policy for a repository.
    #[must_use]
    pub fn with_lifecycle_policy(self, name: &str, text: &str) -> Self {
        self.lock()
            .lifecycle_policies
            .insert(name.to_string(), text.to_string());
        self
    }

    /// Seeds a stored access policy for a repository.
    #[must_use]
    pub fn with_repository_policy(self, name: &str, text: &str) -> Self {
        self.lock()
            .repository_policies
            .insert(name.to_string(), text.to_string());
        self
    }

    /// Returns all repositories currently held by the fake.
    #[must_use]
    pub fn repositories(&self) -> Vec<Repository> {
        self.lock().repositories.values().cloned().collect()
    }

    /// Returns the stored lifecycle policy for a repository, if any.
    #[must_use]
    pub fn lifecycle_policy(&self, name: &str) -> Option<String> {
        self.lock().lifecycle_policies.get(name).cloned()
    }

    /// Returns the stored access policy for a repository, if any.
    #[must_use]
    pub fn repository_policy(&self, name: &str) -> Option<String> {
        self.lock().repository_policies.get(name).cloned()
    }

    /// Returns a snapshot of the per-operation call counts.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake registry state poisoned")
    }
}

fn make_repository(name: &str) -> Repository {
    Repository {
        registry_id: Some(FAKE_REGISTRY_ID.to_string()),
        name: name.to_string(),
        arn: Some(format!(
            "arn:aws:ecr:{FAKE_REGION}:{FAKE_REGISTRY_ID}:repository/{name}"
        )),
        uri: Some(format!(
            "{FAKE_REGISTRY_ID}.dkr.ecr.{FAKE_REGION}.amazonaws.com/{name}"
        )),
        created_at: Some(Utc::now()),
    }
}

#[async_trait]
impl EcrApi for FakeEcr {
    async fn describe_repositories(
        &self,
        _registry_id: Option<&str>,
        names: &[String],
    ) -> Result<Vec<Repository>, ApiError> {
        let mut state = self.lock();
        state.calls.describe_repositories += 1;
        // Like the real service, any unknown name fails the whole lookup.
        let mut found = Vec::with_capacity(names.len());
        for name in names {
            match state.repositories.get(name) {
                Some(repository) => found.push(repository.clone()),
                None => {
                    return Err(ApiError::not_found(format!(
                        "repository {name} does not exist"
                    )));
                }
            }
        }
        Ok(found)
    }

    async fn create_repository(&self, name: &str) -> Result<Repository, ApiError> {
        let mut state = self.lock();
        state.calls.create_repository += 1;
        if state.repositories.contains_key(name) {
            return Err(ApiError::other(format!("repository {name} already exists")));
        }
        let repository = make_repository(name);
        state
            .repositories
            .insert(name.to_string(), repository.clone());
        Ok(repository)
    }

    async fn get_lifecycle_policy(
        &self,
        _registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError> {
        let mut state = self.lock();
        state.calls.get_lifecycle_policy += 1;
        state
            .lifecycle_policies
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("no lifecycle policy for {name}")))
    }

    async fn put_lifecycle_policy(
        &self,
        _registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        let mut state = self.lock();
        state.calls.put_lifecycle_policy += 1;
        state
            .lifecycle_policies
            .insert(name.to_string(), text.to_string());
        Ok(text.to_string())
    }

    async fn get_repository_policy(
        &self,
        _registry_id: Option<&str>,
        name: &str,
    ) -> Result<String, ApiError> {
        let mut state = self.lock();
        state.calls.get_repository_policy += 1;
        state
            .repository_policies
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("no repository policy for {name}")))
    }

    async fn set_repository_policy(
        &self,
        _registry_id: Option<&str>,
        name: &str,
        text: &str,
    ) -> Result<String, ApiError> {
        let mut state = self.lock();
        state.calls.set_repository_policy += 1;
        state
            .repository_policies
            .insert(name.to_string(), text.to_string());
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_describe_unknown_name_is_not_found() {
        let fake = FakeEcr::new();
        let result = fake
            .describe_repositories(None, &["missing".to_string()])
            .await;
        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_then_describe() {
        let fake = FakeEcr::new();
        let created = fake.create_repository("myapp").await.expect("create");
        assert!(created.uri.as_deref().is_some_and(|uri| uri.contains("myapp")));

        let found = fake
            .describe_repositories(None, &["myapp".to_string()])
            .await
            .expect("describe");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "myapp");
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let fake = FakeEcr::new();
        fake.create_repository("myapp").await.expect("create");
        let result = fake.create_repository("myapp").await;
        assert!(matches!(result, Err(ApiError::Other { .. })));
    }

    #[tokio::test]
    async fn test_policy_round_trip() {
        let fake = FakeEcr::new();
        assert!(fake
            .get_lifecycle_policy(None, "myapp")
            .await
            .is_err_and(|err| err.is_not_found()));

        fake.put_lifecycle_policy(None, "myapp", "{}")
            .await
            .expect("put");
        let stored = fake.get_lifecycle_policy(None, "myapp").await.expect("get");
        assert_eq!(stored, "{}");
    }
}
