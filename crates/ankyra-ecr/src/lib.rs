//! # Ankyra ECR
//!
//! AWS ECR repository reconciliation for Ankyra.
//!
//! This crate lazily creates an ECR repository for an application image and
//! idempotently applies a lifecycle-expiration policy and an optional
//! repository access policy. It is driven once per image from a build
//! pipeline, before the image is pushed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ankyra_ecr::{EcrReconciler, EcrSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = EcrSettings::new("eu-west-1").with_organisation("acme");
//!     let reconciler = EcrReconciler::connect(settings).await?;
//!
//!     // Ensure the repository and its policies exist
//!     let repository = reconciler.ensure_repository("myapp").await?;
//!     println!("repository URI: {:?}", repository.uri);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                     EcrReconciler                      │
//! │   describe → create-if-absent → get/put policies       │
//! └────────────────────────┬───────────────────────────────┘
//!                          │ EcrApi (capability trait)
//!            ┌─────────────┴─────────────┐
//!            ▼                           ▼
//!      EcrClient (aws-sdk-ecr)     FakeEcr (in-memory)
//! ```
//!
//! Remote-call failures carry an explicit not-found marker ([`ApiError`]),
//! so the reconciler branches on tagged variants instead of inspecting
//! provider error types.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod api;
mod client;
mod error;
mod reconciler;
mod settings;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use api::{ApiError, EcrApi, Repository};
pub use client::EcrClient;
pub use error::EcrError;
pub use reconciler::EcrReconciler;
pub use settings::{EcrSettings, DEFAULT_LIFECYCLE_POLICY, DEFAULT_REPOSITORY_POLICY};
