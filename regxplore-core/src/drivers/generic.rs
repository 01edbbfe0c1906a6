//! Generic OCI Distribution v2 driver (`_catalog`, `tags/list`, manifests),
//! plus the GCR bearer-token variant.

use crate::auth::Credential;
use crate::drivers::{Descriptor, Driver};
use crate::error::{Result, RexError};
use crate::manifest;
use crate::pagination::{self, Cursor, LinkDialect, PageRequest};
use crate::reference::RegistryOptions;
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use std::time::Duration;

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;

const DEFAULT_TIMEOUT_SECS: u64 = 150;

/// Host + options + HTTP client shared by every driver. Holds the one
/// mutable field the concurrency model allows: an injected
/// `credential.registry_token` written at most once, after a token
/// exchange.
pub struct DriverContext {
    pub host: String,
    pub scheme: String,
    pub http: HttpClient,
    pub credential: std::sync::RwLock<Credential>,
    pub options: RegistryOptions,
}

impl DriverContext {
    pub fn new(host: impl Into<String>, credential: Credential, options: RegistryOptions) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .danger_accept_invalid_certs(options.skip_tls_verify)
            .build()
            .map_err(|e| RexError::validation_with_source("failed to build HTTP client", e))?;
        Ok(Self {
            host: host.into(),
            scheme: options.scheme().to_string(),
            http,
            credential: std::sync::RwLock::new(credential),
            options,
        })
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Not `async` despite the name's echo of the v2 token dance: the lock is
    /// a plain `std::sync::RwLock` held only long enough to read two fields,
    /// never across an `.await`.
    pub fn authorization_header(&self) -> Option<String> {
        let cred = self.credential.read().unwrap();
        if !cred.registry_token.is_empty() {
            Some(cred.bearer_header())
        } else if cred.is_valid() {
            Some(cred.basic_header())
        } else {
            None
        }
    }

    /// Performs the v2 token exchange (`getV2Token`): GETs `url` with Basic
    /// auth, decodes `{ "token": "..." }`, and errors on an empty token.
    pub async fn get_v2_token(&self, url: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
        }

        let basic = {
            let cred = self.credential.read().unwrap();
            cred.is_valid().then(|| cred.basic_header())
        };
        let mut req = self.http.get(url);
        if let Some(basic) = basic {
            req = req.header("Authorization", basic);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RexError::from_reqwest(e, url))?;

        if resp.status() != StatusCode::OK {
            return Err(RexError::token_exchange_failed(format!(
                "token endpoint {url} returned {}",
                resp.status()
            )));
        }

        let parsed: TokenResponse = resp
            .json()
            .await
            .map_err(|e| RexError::decode_with_source("failed to decode token response", e))?;

        if parsed.token.is_empty() {
            return Err(RexError::token_exchange_failed(format!(
                "token endpoint {url} returned an empty token"
            )));
        }

        Ok(parsed.token)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    repositories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[allow(dead_code)]
    name: String,
    tags: Vec<String>,
}

/// Generic v2 driver. GCR is this same driver with `options.kind ==
/// ProviderKind::Gcr`, switching Basic for Bearer auth and adding the
/// self-referential `Link` header GCR expects on paginated requests.
pub struct GenericDriver {
    pub ctx: DriverContext,
}

impl GenericDriver {
    pub fn new(ctx: DriverContext) -> Self {
        Self { ctx }
    }

    fn is_gcr(&self) -> bool {
        self.ctx.host.contains("gcr.io")
    }
}

#[async_trait]
impl Driver for GenericDriver {
    async fn catalog(&self, page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        let mut url = format!("{}/v2/_catalog", self.ctx.base_url());
        if page.size > 0 {
            url = format!(
                "{url}?n={}&last={}",
                page.size,
                page.cursor.as_query_value()
            );
        }

        let mut req = self.ctx.http.get(&url);
        if self.is_gcr() {
            let cred = self.ctx.credential.read().unwrap();
            req = req.header("Authorization", crate::auth::bearer_header(&cred.password));
            drop(cred);
            if let Some(link) = gcr_self_link_header(&url, &page) {
                req = req.header(reqwest::header::LINK, link);
            }
        } else if let Some(auth) = self.ctx.authorization_header() {
            req = req.header("Authorization", auth);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;
        let link_header = resp
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;

        if status != StatusCode::OK {
            return Err(classify_status(status, &url));
        }

        let decoded: CatalogResponse = serde_json::from_slice(&body)
            .map_err(|e| RexError::decode_with_source("failed to decode catalog response", e))?;

        let next = pagination::parse_link(link_header.as_deref(), LinkDialect::DockerV2)?.or_else(|| {
            if self.ctx.options.link_fallback {
                pagination::size_heuristic(&decoded.repositories, page.size)
            } else {
                None
            }
        });

        Ok((decoded.repositories, next))
    }

    async fn list(&self, repo: &str, page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        let mut url = format!("{}/v2/{repo}/tags/list", self.ctx.base_url());
        if page.size > 0 {
            url = format!(
                "{url}?n={}&last={}",
                page.size,
                page.cursor.as_query_value()
            );
        }

        let mut req = self.ctx.http.get(&url);
        if let Some(auth) = self.ctx.authorization_header() {
            req = req.header("Authorization", auth);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;
        let link_header = resp
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;

        if status != StatusCode::OK {
            return Err(classify_status(status, &url));
        }

        let decoded: TagsResponse = serde_json::from_slice(&body)
            .map_err(|e| RexError::decode_with_source("failed to decode tags response", e))?;

        let next = pagination::parse_link(link_header.as_deref(), LinkDialect::DockerV2)?;
        Ok((decoded.tags, next))
    }

    async fn get(&self, repo: &str, reference: &str) -> Result<Descriptor> {
        let url = format!("{}/v2/{repo}/manifests/{reference}", self.ctx.base_url());
        let mut req = self.ctx.http.get(&url).header(
            "Accept",
            "application/vnd.docker.distribution.manifest.v2+json, \
             application/vnd.oci.image.manifest.v1+json, \
             application/vnd.docker.distribution.manifest.v1+prettyjws, \
             application/vnd.docker.distribution.manifest.v1+json",
        );
        if let Some(auth) = self.ctx.authorization_header() {
            req = req.header("Authorization", auth);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;
        let status = resp.status();
        let digest_header = resp
            .headers()
            .get("Docker-Content-Digest")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Real schema-1 bodies carry no in-body `mediaType`; the only place
        // the type is conveyed is this header, so it has to travel into
        // `manifest::decode` alongside the body.
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| RexError::from_reqwest(e, &url))?;

        if status != StatusCode::OK {
            return Err(classify_status(status, &url));
        }

        let descriptor_digest = digest_header.unwrap_or_default();
        let repo_owned = repo.to_string();
        let base = self.ctx.base_url();
        let http = self.ctx.http.clone();
        let auth = self.ctx.authorization_header();

        let info = manifest::decode(&body, &descriptor_digest, content_type.as_deref(), move |config_digest| {
            let url = format!("{base}/v2/{repo_owned}/blobs/{config_digest}");
            async move {
                let mut req = http.get(&url);
                if let Some(auth) = auth {
                    req = req.header("Authorization", auth);
                }
                let resp = req
                    .send()
                    .await
                    .map_err(|e| RexError::from_reqwest(e, &url))?;
                resp.bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|e| RexError::from_reqwest(e, &url))
            }
        })
        .await?;

        Ok(Descriptor {
            digest: info.digest.to_string(),
            created: info.created,
        })
    }

    fn max_page_size(&self) -> usize {
        1000
    }

    fn credentials(&self) -> Credential {
        self.ctx.credential.read().unwrap().clone()
    }
}

/// GCR piggybacks a self-referential `Link: <url>; rel="next"` *request*
/// header on paginated catalog calls — a quirk of Google's v2 frontend,
/// distinct from the response-side Link dialect `pagination::parse_link`
/// handles. Only sent once a cursor exists (GCR treats its absence on the
/// first page as the call not being paginated at all).
fn gcr_self_link_header(url: &str, page: &PageRequest) -> Option<String> {
    if page.size == 0 {
        return None;
    }
    match &page.cursor {
        Cursor::Opaque(cursor) if !cursor.is_empty() => {
            Some(format!(r#"<{url}>; rel="next""#))
        }
        _ => None,
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
        | StatusCode::GATEWAY_TIMEOUT => {
            RexError::transient(format!("{url} returned {status}"))
        }
        _ => RexError::decode(format!("{url} returned unexpected status {status}")),
    }
}

/// Unused cursor accessor kept for symmetry with `Cursor::Page` callers.
#[allow(dead_code)]
fn as_opaque(cursor: &Cursor) -> Option<&str> {
    match cursor {
        Cursor::Opaque(s) => Some(s.as_str()),
        Cursor::Page(_) => None,
    }
}
