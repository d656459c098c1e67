//! # Ankyra Core
//!
//! Core types for the Ankyra container registry provisioning tool.
//!
//! This crate provides the foundational pieces shared by the Ankyra
//! ecosystem:
//!
//! - [`repository_name`] - Composition of ECR repository names from an
//!   organisation prefix and an application image name
//! - [`RequirementsConfig`] - Pipeline requirements describing the target
//!   cluster (provider, region, registry)
//! - [`Error`] - Error type for name validation and requirements loading

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod image;
pub mod requirements;

pub use error::{Error, Result};
pub use image::repository_name;
pub use requirements::{ClusterConfig, RequirementsConfig, PROVIDER_EKS, REQUIREMENTS_FILE_NAME};
