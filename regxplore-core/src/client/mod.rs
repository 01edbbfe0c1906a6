//! Provider factory and client facade (C10).
//!
//! [`build_driver`] dispatches on [`ProviderKind`]/host to produce the right
//! [`Driver`] implementation; [`RegistryClient`] wraps that driver with the
//! two whole-registry operations every provider supports regardless of
//! dialect: draining the catalog ([`RegistryClient::get_all_repositories`])
//! and resolving the newest tag per repository
//! ([`RegistryClient::get_images_to_scan`]).
//!
//! Cloud credential acquisition (AWS STS/ECR, Google OAuth2, Azure AD) is
//! out of scope per this crate's purpose: [`CredentialSource`] is the seam a
//! caller plugs a real SDK into. Only [`StaticCredentialSource`] is
//! implemented here; the cloud variants are unimplemented markers pointing
//! at the SDK crate a consumer would wire in.

use crate::auth::Credential;
use crate::drivers::generic::{DriverContext, GenericDriver};
use crate::drivers::{gitlab, harbor, quay};
use crate::drivers::Driver;
use crate::error::{Result, RexError};
use crate::pagination::{Cursor, PageRequest};
use crate::reference::{EmptyTagPolicy, ProviderKind, RegistryOptions};
use crate::resolver;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests;

/// Dispatches on `options.kind` (preferred) or the normalized host
/// (fallback) to construct the right [`Driver`].
///
/// Host-based fallback rules: `quay.io` → Quay, `*.dkr.ecr*` → generic with
/// an ECR hint, `*gcr.io` → generic with a GCR hint; everything else is the
/// generic v2 driver. Explicit `harbor`/`gitlab`/`quay` kinds always win
/// over host sniffing.
pub fn build_driver(
    credential: Credential,
    host: &str,
    options: RegistryOptions,
) -> Result<Arc<dyn Driver>> {
    let kind = resolve_kind(host, options.kind);

    match kind {
        ProviderKind::Harbor => {
            let project = options.project.clone();
            Ok(Arc::new(harbor::new_driver(host, project, credential, options)?))
        }
        ProviderKind::Quay => Ok(Arc::new(quay::new_driver(host, credential, options)?)),
        ProviderKind::GitLab => {
            let token = credential.registry_token.clone();
            Ok(Arc::new(gitlab::new_driver(host, token, options)?))
        }
        ProviderKind::Gcr | ProviderKind::Ecr | ProviderKind::Azure | ProviderKind::Nexus
        | ProviderKind::Generic => {
            let mut options = options;
            options.kind = kind;
            let ctx = DriverContext::new(host, credential, options)?;
            Ok(Arc::new(GenericDriver::new(ctx)))
        }
    }
}

/// Resolves the effective provider kind: an explicit non-default `kind`
/// always wins; otherwise the host string is sniffed per the factory table.
fn resolve_kind(host: &str, requested: ProviderKind) -> ProviderKind {
    if requested != ProviderKind::Generic {
        return requested;
    }
    let host = host.to_lowercase();
    if host.contains("quay.io") {
        ProviderKind::Quay
    } else if host.contains(".dkr.ecr") {
        ProviderKind::Ecr
    } else if host.contains("gcr.io") {
        ProviderKind::Gcr
    } else {
        ProviderKind::Generic
    }
}

/// A `CredentialSource` acquires a [`Credential`] on demand, the seam
/// between this crate (which only ever consumes `(username, password |
/// bearer)` pairs) and whatever cloud-specific credential plumbing a
/// caller's environment needs.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn acquire(&self, cancel: &CancellationToken) -> Result<Credential>;
}

/// Wraps a fixed credential — static Basic/Bearer/username+password
/// configured up front, no exchange required.
pub struct StaticCredentialSource {
    credential: Credential,
}

impl StaticCredentialSource {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl CredentialSource for StaticCredentialSource {
    async fn acquire(&self, _cancel: &CancellationToken) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}

/// AWS ECR credential bootstrap: static access-key credentials or
/// AssumeRole, followed by `GetAuthorizationToken`, decoded to the
/// `"AWS:<password>"` Basic credential this crate expects. Not implemented
/// here — plug in `aws-sdk-ecr` and `aws-sdk-sts` behind this trait.
pub struct AwsCredentialSource;

#[async_trait]
impl CredentialSource for AwsCredentialSource {
    async fn acquire(&self, _cancel: &CancellationToken) -> Result<Credential> {
        Err(RexError::auth_required(
            "AwsCredentialSource is a marker type; wire in aws-sdk-ecr/aws-sdk-sts to acquire a real token",
        ))
    }
}

/// Google Artifact Registry / GCR credential bootstrap: an OAuth2 token
/// source scoped to `cloud-platform`, with username fixed to the literal
/// `"oauth2accesstoken"`. Not implemented here — plug in `google-cloud-auth`
/// behind this trait.
pub struct GoogleCredentialSource;

#[async_trait]
impl CredentialSource for GoogleCredentialSource {
    async fn acquire(&self, _cancel: &CancellationToken) -> Result<Credential> {
        Err(RexError::auth_required(
            "GoogleCredentialSource is a marker type; wire in google-cloud-auth to acquire a real token",
        ))
    }
}

/// Azure ACR credential bootstrap: the caller supplies a `(username,
/// access_token)` pair already obtained via `azure_identity`; this variant
/// only exists so the facade's dispatch table is complete.
pub struct AzureCredentialSource;

#[async_trait]
impl CredentialSource for AzureCredentialSource {
    async fn acquire(&self, _cancel: &CancellationToken) -> Result<Credential> {
        Err(RexError::auth_required(
            "AzureCredentialSource is a marker type; wire in azure_identity to acquire a real token",
        ))
    }
}

/// The facade callers build once per credential set. Wraps a [`Driver`]
/// chosen by [`build_driver`] with the two whole-registry operations every
/// provider shares.
pub struct RegistryClient {
    driver: Arc<dyn Driver>,
    options: RegistryOptions,
}

impl RegistryClient {
    /// Acquires a credential from `source`, builds the right driver for
    /// `host`, and returns the facade ready for `get_all_repositories`/
    /// `get_images_to_scan`.
    pub async fn connect(
        source: &dyn CredentialSource,
        host: &str,
        options: RegistryOptions,
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let credential = source.acquire(cancel).await?;
        let driver = build_driver(credential, host, options.clone())?;
        Ok(Self { driver, options })
    }

    /// Wraps an already-constructed driver directly, bypassing credential
    /// acquisition — the path every test and any caller holding a driver it
    /// built another way (e.g. the CLI's explicit `--kind` flag) uses.
    pub fn from_driver(driver: Arc<dyn Driver>, options: RegistryOptions) -> Self {
        Self { driver, options }
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Drives `Catalog` to exhaustion, returning every repository the
    /// registry reports across all pages. Stops on an empty page or a
    /// `nextPage` of `None` — the `Initial → InProgress → Done` state
    /// machine from the design notes, collapsed into one call.
    pub async fn get_all_repositories(&self) -> Result<Vec<String>> {
        let mut repos = Vec::new();
        let mut page = PageRequest {
            cursor: Cursor::Opaque(String::new()),
            size: self.driver.max_page_size(),
        };

        loop {
            let (batch, next) = self.driver.catalog(page).await?;
            if batch.is_empty() {
                break;
            }
            repos.extend(batch);
            match next {
                Some(p) => page = p,
                None => break,
            }
        }

        Ok(repos)
    }

    /// Maps each of `repos` through the latest-tag resolver, returning
    /// `{repository → newest tag group}`. A repository whose resolved tag
    /// set is empty is dropped or promoted to an error per
    /// `options.empty_tag_policy` — the configurable resolution of the
    /// spec's open question about that divergence across providers.
    pub async fn get_images_to_scan(&self, repos: &[String]) -> Result<HashMap<String, String>> {
        let mut images = HashMap::with_capacity(repos.len());
        let cancel = CancellationToken::new();

        for repo in repos {
            let tags = resolver::get_latest_tags(Arc::clone(&self.driver), repo, 1, cancel.clone()).await?;
            match tags.into_iter().next() {
                Some(tag) if !tag.is_empty() => {
                    images.insert(repo.clone(), tag);
                }
                _ => match self.options.empty_tag_policy {
                    EmptyTagPolicy::Skip => continue,
                    EmptyTagPolicy::Error => {
                        return Err(RexError::decode(format!(
                            "repository {repo} resolved to no tags"
                        )));
                    }
                },
            }
        }

        Ok(images)
    }
}
