//! GitLab Container Registry driver.
//!
//! GitLab's `_catalog` endpoint isn't reachable with a personal access
//! token, so repository discovery goes through the REST v4 Projects API
//! instead: enumerate projects the token can access, then ask each project
//! for its container registry repositories. Tag listing and manifest access
//! still go through the generic v2 surface GitLab also exposes, delegated to
//! [`GenericDriver`].

use crate::auth::Credential;
use crate::drivers::generic::{DriverContext, GenericDriver};
use crate::drivers::{Descriptor, Driver};
use crate::error::{Result, RexError};
use crate::pagination::PageRequest;
use crate::reference::RegistryOptions;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;

#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GitLabRepository {
    path: String,
}

/// Derives GitLab's REST API v4 base URL from a registry hostname (E8, E9).
///
/// Strips a scheme and any path/query, strips one leading `registry.`
/// prefix, and prepends `gitlab.` unless the remaining host already
/// contains that substring. Ports survive every transformation.
pub fn api_base(host: &str) -> String {
    let stripped = host
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let authority = stripped.split(['/', '?']).next().unwrap_or(stripped);
    let authority = authority.strip_prefix("registry.").unwrap_or(authority);

    let host = if authority.to_lowercase().contains("gitlab") {
        authority.to_string()
    } else {
        format!("gitlab.{authority}")
    };

    format!("https://{host}/api/v4")
}

/// GitLab Container Registry driver. Holds a [`GenericDriver`] for
/// `list`/`get`, which GitLab serves through the same distribution-spec
/// endpoints as any other v2-compatible registry.
pub struct GitLabDriver {
    inner: GenericDriver,
    api_base: String,
    private_token: String,
}

impl GitLabDriver {
    pub fn new(ctx: DriverContext, api_base: String, private_token: String) -> Self {
        Self {
            inner: GenericDriver::new(ctx),
            api_base,
            private_token,
        }
    }

    fn ctx(&self) -> &DriverContext {
        &self.inner.ctx
    }

    /// Enumerates accessible projects, paging until a short or empty page.
    async fn list_projects(&self) -> Result<Vec<GitLabProject>> {
        let mut projects = Vec::new();
        let mut page = 1u32;
        const PER_PAGE: u32 = 100;

        loop {
            let url = format!(
                "{}/projects?page={page}&per_page={PER_PAGE}&min_access_level=30&membership=true",
                self.api_base
            );
            let resp = self
                .ctx()
                .http
                .get(&url)
                .header("PRIVATE-TOKEN", &self.private_token)
                .send()
                .await
                .map_err(|e| RexError::from_reqwest(e, &url))?;

            if resp.status() != StatusCode::OK {
                return Err(classify_status(resp.status(), &url));
            }

            let batch: Vec<GitLabProject> = resp
                .json()
                .await
                .map_err(|e| RexError::decode_with_source("failed to decode GitLab projects page", e))?;

            let got = batch.len();
            projects.extend(batch);

            if got == 0 || (got as u32) < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(projects)
    }

    /// Fetches one project's registry repositories. A 404 means the project
    /// has no container registry enabled and is treated as empty, not an
    /// error; any other non-200 is logged and propagated so the caller can
    /// skip it without aborting the whole listing.
    async fn project_repositories(&self, project_id: u64) -> Result<Vec<String>> {
        let url = format!("{}/projects/{project_id}/registry/repositories", self.api_base);
        let resp = self
            .ctx()
            .http
            .get(&url)
            .header("PRIVATE-TOKEN", &self.private_token)
            .send()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if resp.status() != StatusCode::OK {
            return Err(classify_status(resp.status(), &url));
        }

        let repos: Vec<GitLabRepository> = resp
            .json()
            .await
            .map_err(|e| RexError::decode_with_source("failed to decode GitLab repositories page", e))?;

        Ok(repos.into_iter().map(|r| r.path).collect())
    }
}

#[async_trait]
impl Driver for GitLabDriver {
    /// `page` is ignored: GitLab repository discovery walks every accessible
    /// project in one call and returns the full list with no continuation,
    /// since the per-project REST endpoint has no page parameter of its own
    /// to thread a single `PageRequest` through.
    async fn catalog(&self, _page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        let projects = self.list_projects().await?;

        let mut repos = Vec::new();
        for project in projects {
            match self.project_repositories(project.id).await {
                Ok(found) => repos.extend(found),
                Err(err) => {
                    tracing::warn!(project_id = project.id, error = %err, "skipping project registry listing");
                }
            }
        }

        Ok((repos, None))
    }

    async fn list(&self, repo: &str, page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        self.inner.list(repo, page).await
    }

    async fn get(&self, repo: &str, reference: &str) -> Result<Descriptor> {
        self.inner.get(repo, reference).await
    }

    fn max_page_size(&self) -> usize {
        self.inner.max_page_size()
    }

    fn credentials(&self) -> Credential {
        self.inner.credentials()
    }
}

fn classify_status(status: StatusCode, url: &str) -> RexError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            RexError::auth_invalid(format!("{url} rejected credentials"), Some(status.as_u16()))
        }
        StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => RexError::transient(format!("{url} returned {status}")),
        _ => RexError::decode(format!("{url} returned unexpected status {status}")),
    }
}

pub fn new_driver(
    host: impl Into<String>,
    private_token: impl Into<String>,
    mut options: RegistryOptions,
) -> Result<GitLabDriver> {
    options.kind = crate::reference::ProviderKind::GitLab;
    let host = host.into();
    let base = api_base(&host);
    let private_token = private_token.into();
    let ctx = DriverContext::new(
        host,
        Credential {
            registry_token: private_token.clone(),
            ..Default::default()
        },
        options,
    )?;
    Ok(GitLabDriver::new(ctx, base, private_token))
}
