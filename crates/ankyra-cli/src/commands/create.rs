//! Create command implementation.
//!
//! Lazily creates a container registry for ECR as well as putting a
//! lifecycle policy in place. The default policy makes images with a tag
//! prefix of `0.0.0-` expire after 14 days; that prefix is the default for
//! pull request builds. If a policy exists and the default policy isn't
//! overridden (see `--ecr-lifecycle-policy`) no policy will be put.
//!
//! The command is a no-op on clusters that don't use ECR: a cluster
//! provider other than EKS, or a registry host outside the expected
//! suffix, logs and exits successfully.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args};
use tracing::info;

use ankyra_core::{RequirementsConfig, PROVIDER_EKS};
use ankyra_ecr::{EcrApi, EcrReconciler, EcrSettings};

/// Registry host value that always counts as ECR.
const ECR_REGISTRY_ALIAS: &str = "ecr.io";

/// Arguments for the create command.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// The registry ID to use. If not specified the account of the resolved credentials is used
    #[arg(long, env = "REGISTRY_ID", default_value = "")]
    pub registry_id: String,

    /// The registry to use
    #[arg(short, long, env = "DOCKER_REGISTRY", default_value = "")]
    pub registry: String,

    /// The registry organisation to use
    #[arg(short, long, env = "DOCKER_REGISTRY_ORG", default_value = "")]
    pub organisation: String,

    /// The app name to use
    #[arg(short, long, env = "APP_NAME", default_value = "")]
    pub app: String,

    /// The AWS region to use. Defaults to the cluster region from the requirements
    #[arg(long, env = "AWS_REGION", default_value = "")]
    pub region: String,

    /// ECR lifecycle policy JSON to apply to the repository
    #[arg(long, env = "ECR_LIFECYCLE_POLICY", default_value = "")]
    pub ecr_lifecycle_policy: String,

    /// ECR repository policy JSON to apply to the repository
    #[arg(long, env = "ECR_REPOSITORY_POLICY", default_value = "")]
    pub ecr_repository_policy: String,

    /// Should the ECR lifecycle policy be created
    #[arg(
        long,
        env = "CREATE_ECR_LIFECYCLE_POLICY",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub create_ecr_lifecycle_policy: bool,

    /// Should the ECR repository policy be created
    #[arg(
        long,
        env = "CREATE_ECR_REPOSITORY_POLICY",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub create_ecr_repository_policy: bool,

    /// If specified an ECR repository is ensured for the cache image too
    #[arg(long, env = "CACHE_SUFFIX", default_value = "")]
    pub cache_suffix: String,

    /// The registry suffix to check if we are using ECR
    #[arg(long, default_value = ".amazonaws.com")]
    pub ecr_registry_suffix: String,

    /// Path to the pipeline requirements file. Defaults to searching
    /// upwards from the working directory
    #[arg(long)]
    pub requirements_file: Option<PathBuf>,
}

/// Create command with its resolved collaborators.
///
/// The requirements and the registry API handle can both be injected
/// before [`CreateOptions::run`]; tests use this instead of touching the
/// filesystem or the network.
pub struct CreateOptions {
    /// Parsed command arguments.
    pub args: CreateArgs,

    /// Pipeline requirements; loaded from disk when not injected.
    pub requirements: Option<RequirementsConfig>,

    /// Registry API handle; a live client is connected when not injected.
    pub api: Option<Arc<dyn EcrApi>>,
}

/// Runs the create command.
///
/// # Errors
///
/// Returns an error if the requirements cannot be resolved or the
/// reconciliation of any image fails.
pub async fn run(args: CreateArgs) -> Result<()> {
    CreateOptions::new(args).run().await
}

impl CreateOptions {
    /// Creates options from parsed arguments with no injected
    /// collaborators.
    #[must_use]
    pub fn new(args: CreateArgs) -> Self {
        Self {
            args,
            requirements: None,
            api: None,
        }
    }

    /// Resolves requirements and backfills region and registry from the
    /// cluster section.
    fn validate(&mut self) -> Result<()> {
        if self.requirements.is_none() {
            let requirements = match &self.args.requirements_file {
                Some(path) => RequirementsConfig::load(path),
                None => {
                    let cwd = std::env::current_dir()
                        .context("failed to determine the working directory")?;
                    RequirementsConfig::find(cwd)
                }
            }
            .context("failed to load requirements for the pipeline")?;
            self.requirements = Some(requirements);
        }
        let Some(requirements) = self.requirements.as_ref() else {
            bail!("no requirements found for the pipeline");
        };

        if self.args.region.is_empty() {
            self.args.region = requirements.cluster.region.clone();
        }
        if self.args.registry.is_empty() {
            self.args.registry = requirements.cluster.registry.clone();
        }
        Ok(())
    }

    /// Runs the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the requirements cannot be resolved or the
    /// reconciliation of any image fails.
    pub async fn run(mut self) -> Result<()> {
        self.validate().context("failed to validate options")?;
        let Some(requirements) = self.requirements.as_ref() else {
            bail!("no requirements found for the pipeline");
        };

        if requirements.cluster.provider != PROVIDER_EKS {
            info!(
                provider = %requirements.cluster.provider,
                "no ECR provisioning necessary for this provider"
            );
            return Ok(());
        }
        let registry = &requirements.cluster.registry;
        if !registry.is_empty()
            && registry != ECR_REGISTRY_ALIAS
            && !registry.ends_with(&self.args.ecr_registry_suffix)
        {
            info!(registry = %registry, "ignoring registry");
            return Ok(());
        }

        info!(
            registry = %self.args.registry,
            organisation = %self.args.organisation,
            app = %self.args.app,
            "verifying the container registry has an ECR repository for the app"
        );

        let settings = self.settings();
        let reconciler = match self.api.clone() {
            Some(api) => EcrReconciler::new(settings, api)?,
            None => EcrReconciler::connect(settings).await?,
        };

        let mut images = vec![self.args.app.clone()];
        if !self.args.cache_suffix.is_empty() {
            images.push(format!("{}{}", self.args.app, self.args.cache_suffix));
        }
        for image in &images {
            reconciler
                .ensure_repository(image)
                .await
                .with_context(|| format!("failed to ensure the ECR repository for {image}"))?;
        }
        Ok(())
    }

    /// Maps the parsed arguments onto reconciler settings.
    fn settings(&self) -> EcrSettings {
        let mut settings = EcrSettings::new(&self.args.region)
            .with_organisation(&self.args.organisation)
            .with_lifecycle_policy(&self.args.ecr_lifecycle_policy)
            .with_repository_policy(&self.args.ecr_repository_policy)
            .with_create_lifecycle_policy(self.args.create_ecr_lifecycle_policy)
            .with_create_repository_policy(self.args.create_ecr_repository_policy);
        if !self.args.registry_id.is_empty() {
            settings = settings.with_registry_id(&self.args.registry_id);
        }
        settings
    }
}
