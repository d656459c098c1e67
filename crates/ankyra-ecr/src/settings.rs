//! Settings for ECR reconciliation.

use crate::error::EcrError;

/// Default lifecycle policy applied to new repositories.
///
/// Expires tagged images with a version prefix of `0.0.0-` (the prefix
/// used for pull-request builds) once they are older than 14 days.
pub const DEFAULT_LIFECYCLE_POLICY: &str = r#"{
    "rules": [
        {
            "rulePriority": 1,
            "description": "Expire images older than 14 days",
            "selection": {
                "tagStatus": "tagged",
                "countType": "sinceImagePushed",
                "tagPrefixList": ["0.0.0-"],
                "countUnit": "days",
                "countNumber": 14
            },
            "action": {
                "type": "expire"
            }
        }
    ]
}"#;

/// Default repository access policy: an empty statement list.
pub const DEFAULT_REPOSITORY_POLICY: &str = r#"{
    "Version": "2008-10-17",
    "Statement": []
}"#;

/// Settings for the ECR reconciler.
///
/// Policy override fields use the empty string as "not supplied"; the
/// default policy documents are injected here rather than read from
/// globals, so tests can substitute them.
#[derive(Debug, Clone)]
pub struct EcrSettings {
    /// Account id of the registry to address; `None` uses the account of
    /// the resolved credentials.
    pub registry_id: Option<String>,

    /// Registry organisation prefixed to repository names. Empty means no
    /// prefix.
    pub organisation: String,

    /// AWS region the registry lives in. Required.
    pub region: String,

    /// Lifecycle policy override text; empty means not supplied.
    pub lifecycle_policy: String,

    /// Access policy override text; empty means not supplied.
    pub repository_policy: String,

    /// Whether lifecycle policy reconciliation runs at all.
    pub create_lifecycle_policy: bool,

    /// Whether access policy reconciliation runs at all.
    pub create_repository_policy: bool,

    /// Lifecycle policy used when no override is supplied and the
    /// repository has none stored.
    pub default_lifecycle_policy: String,

    /// Access policy used when no override is supplied and the repository
    /// has none stored.
    pub default_repository_policy: String,
}

impl Default for EcrSettings {
    fn default() -> Self {
        Self {
            registry_id: None,
            organisation: String::new(),
            region: String::new(),
            lifecycle_policy: String::new(),
            repository_policy: String::new(),
            create_lifecycle_policy: true,
            create_repository_policy: false,
            default_lifecycle_policy: DEFAULT_LIFECYCLE_POLICY.to_string(),
            default_repository_policy: DEFAULT_REPOSITORY_POLICY.to_string(),
        }
    }
}

impl EcrSettings {
    /// Creates settings for the given region with all defaults.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Sets the registry account id.
    #[must_use]
    pub fn with_registry_id(mut self, registry_id: impl Into<String>) -> Self {
        self.registry_id = Some(registry_id.into());
        self
    }

    /// Sets the registry organisation prefix.
    #[must_use]
    pub fn with_organisation(mut self, organisation: impl Into<String>) -> Self {
        self.organisation = organisation.into();
        self
    }

    /// Sets the lifecycle policy override text.
    #[must_use]
    pub fn with_lifecycle_policy(mut self, text: impl Into<String>) -> Self {
        self.lifecycle_policy = text.into();
        self
    }

    /// Sets the access policy override text.
    #[must_use]
    pub fn with_repository_policy(mut self, text: impl Into<String>) -> Self {
        self.repository_policy = text.into();
        self
    }

    /// Enables or disables lifecycle policy reconciliation.
    #[must_use]
    pub const fn with_create_lifecycle_policy(mut self, create: bool) -> Self {
        self.create_lifecycle_policy = create;
        self
    }

    /// Enables or disables access policy reconciliation.
    #[must_use]
    pub const fn with_create_repository_policy(mut self, create: bool) -> Self {
        self.create_repository_policy = create;
        self
    }

    /// Checks that the settings are usable before any remote call.
    ///
    /// The region must be present and any supplied policy override must be
    /// valid JSON. The override is compared textually against the stored
    /// document later; parsing here only rejects documents the service
    /// would refuse anyway.
    pub(crate) fn validate(&self) -> Result<(), EcrError> {
        if self.region.is_empty() {
            return Err(EcrError::MissingOption { name: "region" });
        }
        for (which, text) in [
            ("lifecycle", &self.lifecycle_policy),
            ("repository", &self.repository_policy),
        ] {
            if !text.is_empty() {
                serde_json::from_str::<serde_json::Value>(text)
                    .map_err(|source| EcrError::InvalidPolicy { which, source })?;
            }
        }
        Ok(())
    }

    /// The lifecycle policy text to write: override or injected default.
    pub(crate) fn effective_lifecycle_policy(&self) -> &str {
        if self.lifecycle_policy.is_empty() {
            &self.default_lifecycle_policy
        } else {
            &self.lifecycle_policy
        }
    }

    /// The access policy text to write: override or injected default.
    pub(crate) fn effective_repository_policy(&self) -> &str {
        if self.repository_policy.is_empty() {
            &self.default_repository_policy
        } else {
            &self.repository_policy
        }
    }
}
