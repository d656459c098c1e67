//! Pipeline requirements describing the target cluster.
//!
//! Build pipelines carry a `platform-requirements.yml` file describing the
//! cluster they deploy to. Ankyra only needs the cluster section: the
//! provider decides whether ECR provisioning applies at all, and the region
//! and registry fill in configuration the caller did not supply.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name of the pipeline requirements document.
pub const REQUIREMENTS_FILE_NAME: &str = "platform-requirements.yml";

/// Cluster provider value for which ECR provisioning applies.
pub const PROVIDER_EKS: &str = "eks";

/// Pipeline requirements for the current build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementsConfig {
    /// Target cluster configuration.
    pub cluster: ClusterConfig,
}

/// Target cluster configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cloud provider of the cluster (e.g. `eks`, `gke`).
    pub provider: String,

    /// Cloud region the cluster runs in.
    pub region: String,

    /// Container registry host used by the cluster.
    pub registry: String,
}

impl RequirementsConfig {
    /// Loads requirements from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::RequirementsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| Error::RequirementsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Finds and loads requirements by searching upwards from `start`.
    ///
    /// Each ancestor directory is checked for [`REQUIREMENTS_FILE_NAME`];
    /// the closest match wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequirementsNotFound`] when no ancestor contains a
    /// requirements file, or a load error for the file that was found.
    pub fn find(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        let mut dir = Some(start);
        while let Some(d) = dir {
            let candidate = d.join(REQUIREMENTS_FILE_NAME);
            if candidate.is_file() {
                return Self::load(candidate);
            }
            dir = d.parent();
        }
        Err(Error::RequirementsNotFound {
            start: PathBuf::from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_requirements(dir: &Path, yaml: &str) {
        std::fs::write(dir.join(REQUIREMENTS_FILE_NAME), yaml).expect("write requirements");
    }

    #[test]
    fn test_load_full_cluster_section() {
        let dir = TempDir::new().expect("temp dir");
        write_requirements(
            dir.path(),
            "cluster:\n  provider: eks\n  region: eu-west-1\n  registry: 123456789012.dkr.ecr.eu-west-1.amazonaws.com\n",
        );

        let requirements = RequirementsConfig::load(dir.path().join(REQUIREMENTS_FILE_NAME))
            .expect("load requirements");
        assert_eq!(requirements.cluster.provider, "eks");
        assert_eq!(requirements.cluster.region, "eu-west-1");
        assert_eq!(
            requirements.cluster.registry,
            "123456789012.dkr.ecr.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn test_load_defaults_missing_fields() {
        let dir = TempDir::new().expect("temp dir");
        write_requirements(dir.path(), "cluster:\n  provider: gke\n");

        let requirements = RequirementsConfig::load(dir.path().join(REQUIREMENTS_FILE_NAME))
            .expect("load requirements");
        assert_eq!(requirements.cluster.provider, "gke");
        assert!(requirements.cluster.region.is_empty());
        assert!(requirements.cluster.registry.is_empty());
    }

    #[test]
    fn test_find_walks_ancestors() {
        let dir = TempDir::new().expect("temp dir");
        write_requirements(dir.path(), "cluster:\n  provider: eks\n");
        let nested = dir.path().join("app").join("src");
        std::fs::create_dir_all(&nested).expect("create nested dirs");

        let requirements = RequirementsConfig::find(&nested).expect("find requirements");
        assert_eq!(requirements.cluster.provider, "eks");
    }

    #[test]
    fn test_find_closest_file_wins() {
        let dir = TempDir::new().expect("temp dir");
        write_requirements(dir.path(), "cluster:\n  provider: gke\n");
        let nested = dir.path().join("app");
        std::fs::create_dir_all(&nested).expect("create nested dir");
        write_requirements(&nested, "cluster:\n  provider: eks\n");

        let requirements = RequirementsConfig::find(&nested).expect("find requirements");
        assert_eq!(requirements.cluster.provider, "eks");
    }

    #[test]
    fn test_find_missing_reports_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let result = RequirementsConfig::find(dir.path());
        assert!(matches!(result, Err(Error::RequirementsNotFound { .. })));
    }

    #[test]
    fn test_load_invalid_yaml_is_parse_error() {
        let dir = TempDir::new().expect("temp dir");
        write_requirements(dir.path(), "cluster: [not a mapping");

        let result = RequirementsConfig::load(dir.path().join(REQUIREMENTS_FILE_NAME));
        assert!(matches!(result, Err(Error::RequirementsParse { .. })));
    }
}
