//! regxplore-core: a unified client library for enumerating container-image
//! repositories and resolving the newest tag per repository across a
//! heterogeneous set of registries — generic OCI/Docker Registry v2, Docker
//! Hub, Harbor, Quay.io, GitLab Container Registry, Google Artifact
//! Registry/GCR, AWS ECR, and Azure ACR.
//!
//! # Quick start
//!
//! ```no_run
//! use regxplore_core::{Credential, RegistryClient, RegistryOptions, StaticCredentialSource};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = StaticCredentialSource::new(Credential::default());
//!     let client = RegistryClient::connect(
//!         &source,
//!         "registry-1.docker.io",
//!         RegistryOptions::default(),
//!         &CancellationToken::new(),
//!     )
//!     .await?;
//!
//!     let repos = client.get_all_repositories().await?;
//!     let images = client.get_images_to_scan(&repos).await?;
//!     for (repo, tag) in images {
//!         println!("{repo}:{tag}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized around the stages in the spec's control/data flow:
//! a caller picks a [`RegistryClient`] (via [`client::build_driver`] or the
//! facade's [`RegistryClient::connect`]), which wraps one of the provider
//! [`drivers`] behind the shared [`drivers::Driver`] trait. Whole-registry
//! operations either drain [`drivers::Driver::catalog`] directly
//! ([`RegistryClient::get_all_repositories`]) or feed each repository's tags
//! through the concurrent [`resolver::get_latest_tags`], which dedups by
//! [`digest::Digest`] and sorts by manifest creation time.

#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod digest;
pub mod drivers;
pub mod error;
pub mod manifest;
pub mod pagination;
pub mod reference;
pub mod resolver;

pub use auth::Credential;
pub use client::{
    AwsCredentialSource, AzureCredentialSource, CredentialSource, GoogleCredentialSource,
    RegistryClient, StaticCredentialSource,
};
pub use config::Config;
pub use digest::Digest;
pub use drivers::{Descriptor, Driver};
pub use error::{Result, RexError};
pub use reference::{EmptyTagPolicy, ProviderKind, RegistryOptions, RegistryRef, RepositoryRef, TagRef};
pub use resolver::{get_latest_tags, TagInfo};

/// Returns the regxplore-core crate version.
///
/// # Examples
///
/// ```
/// let version = regxplore_core::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
