//! Provider drivers.
//!
//! Drivers share a contract via the [`Driver`] trait rather than an
//! inheritance chain: [`HarborDriver`](harbor::HarborDriver),
//! [`QuayDriver`](quay::QuayDriver), and [`GitLabDriver`](gitlab::GitLabDriver)
//! each hold a [`generic::GenericDriver`] by composition and delegate to it
//! for whatever behavior they don't override. [`crate::resolver::get_latest_tags`]
//! is a free function over `&dyn Driver`, so no driver needs a pointer back
//! to itself to get polymorphic dispatch — the pattern the source expresses
//! with a self-referential "This" field has no Rust analog here.

pub mod generic;
pub mod gitlab;
pub mod harbor;
pub mod quay;

use crate::auth::Credential;
use crate::error::Result;
use crate::pagination::PageRequest;
use async_trait::async_trait;

/// A resolved manifest descriptor: enough to feed the latest-tag resolver
/// without the driver needing to know how the resolver will use it.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub digest: String,
    pub created: chrono::DateTime<chrono::Utc>,
}

/// Behavior every provider driver implements. Generalizes the source's
/// `IRegistry` interface (`Catalog`, `List`, `Get`, `MaxPageSize`) plus the
/// credential accessor the source reaches via an embedded `DefaultRegistry`.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Lists one page of repositories.
    async fn catalog(&self, page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)>;

    /// Lists one page of tags for `repo`.
    async fn list(&self, repo: &str, page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)>;

    /// Resolves `repo:tag` to a manifest descriptor (digest + creation time).
    async fn get(&self, repo: &str, reference: &str) -> Result<Descriptor>;

    /// Maximum page size this provider honors.
    fn max_page_size(&self) -> usize {
        1000
    }

    /// Current credentials, including any server-issued bearer token
    /// injected by a prior token exchange. Returned by value since the
    /// credential may live behind a lock shared with in-flight requests.
    fn credentials(&self) -> Credential;
}
