//! Registry options and reference parsing (host/repo/tag normalization).
//!
//! `parse` turns a bare reference string (`"alpine"`, `"ghcr.io/user/repo:v1"`,
//! `"localhost:5000/myrepo"`) into a fully-qualified [`RepositoryRef`],
//! applying strict-vs-weak validation and the configured default registry/tag.

use crate::error::{Result, RexError};
use std::fmt;

#[cfg(test)]
mod tests;

/// Discriminates which provider-specific dialect a driver should speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Generic,
    Harbor,
    Quay,
    Gcr,
    Ecr,
    GitLab,
    Azure,
    Nexus,
}

/// Policy for repositories whose latest tag resolves to empty.
///
/// Resolves the open question in the design notes: the source registries
/// disagree (Harbor/Google/Quay error, GitLab/Nexus skip silently), so the
/// behavior is a configurable flag rather than a hardcoded per-provider rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTagPolicy {
    #[default]
    Skip,
    Error,
}

/// Per-call registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Reject anything not fully qualified (no implied default host/tag).
    pub strict: bool,
    /// Use `http://` instead of `https://` for all requests.
    pub insecure: bool,
    /// Skip server certificate validation.
    pub skip_tls_verify: bool,
    pub default_registry: String,
    pub default_tag: String,
    /// Scopes Harbor listing to this project; empty means global.
    pub project: String,
    pub kind: ProviderKind,
    pub empty_tag_policy: EmptyTagPolicy,
    /// Opt the generic v2 driver into the size-heuristic pagination fallback
    /// for servers that omit `Link` entirely.
    pub link_fallback: bool,
    /// Quay: scope the proprietary catalog to public repositories, letting
    /// anonymous credentials pass validation.
    pub public: bool,
    /// Quay: scope the proprietary catalog to this namespace/organization.
    pub namespace: String,
    /// Quay: request `last_modified` on the proprietary catalog response.
    pub include_last_modified: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            strict: false,
            insecure: false,
            skip_tls_verify: false,
            default_registry: "index.docker.io".to_string(),
            default_tag: "latest".to_string(),
            project: String::new(),
            kind: ProviderKind::default(),
            empty_tag_policy: EmptyTagPolicy::default(),
            link_fallback: false,
            public: false,
            namespace: String::new(),
            include_last_modified: false,
        }
    }
}

impl RegistryOptions {
    pub fn scheme(&self) -> &'static str {
        if self.insecure { "http" } else { "https" }
    }
}

/// A registry endpoint: scheme, host, and optional port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRef {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
}

impl fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}

impl RegistryRef {
    /// `host` or `host:port` suitable for use as an HTTP authority.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.host.clone(),
        }
    }
}

/// A repository hosted on a registry (e.g. `library/alpine`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub registry: RegistryRef,
    pub path: String,
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry.authority(), self.path)
    }
}

/// A repository plus tag (`alpine:3.19`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub repository: RepositoryRef,
    pub tag: String,
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// Splits `host[:port]` into its parts. Bare IPv6 literals are rejected —
/// out of scope for this crate's provider set.
fn split_host_port(authority: &str) -> Result<(String, Option<u16>)> {
    match authority.rsplit_once(':') {
        Some((host, port_str)) => match port_str.parse::<u16>() {
            Ok(port) => Ok((host.to_string(), Some(port))),
            Err(_) => Ok((authority.to_string(), None)),
        },
        None => Ok((authority.to_string(), None)),
    }
}

fn looks_like_host(segment: &str) -> bool {
    segment == "localhost" || segment.contains('.') || segment.contains(':')
}

/// Parses a reference string into a fully-qualified [`RepositoryRef`].
///
/// Weak validation (`opts.strict == false`) permits bare names
/// (`"alpine"` ⇒ `index.docker.io/library/alpine`) and an implied default
/// tag. Strict validation rejects anything not already fully qualified with
/// an explicit registry host and tag.
pub fn parse(input: &str, opts: &RegistryOptions) -> Result<RepositoryRef> {
    let input = input.trim();
    if input.is_empty() {
        return Err(RexError::validation("reference must not be empty"));
    }

    let (first_segment, rest) = match input.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (input, None),
    };

    let (authority, path_with_tag) = if looks_like_host(first_segment) {
        (first_segment.to_string(), rest.unwrap_or_default().to_string())
    } else if opts.strict {
        return Err(RexError::validation(format!(
            "strict mode requires a fully-qualified registry host in {input:?}"
        )));
    } else {
        (opts.default_registry.clone(), input.to_string())
    };

    if path_with_tag.is_empty() {
        return Err(RexError::validation(format!(
            "reference {input:?} has no repository path"
        )));
    }

    let (mut path, tag) = match path_with_tag.rsplit_once(':') {
        Some((path, tag)) if !path.is_empty() && !tag.contains('/') => {
            (path.to_string(), Some(tag.to_string()))
        }
        _ => (path_with_tag, None),
    };

    if tag.is_none() && opts.strict {
        return Err(RexError::validation(format!(
            "strict mode requires an explicit tag in {input:?}"
        )));
    }

    // Docker Hub convention: a single-segment path implies the "library/" namespace.
    if authority == opts.default_registry && !path.contains('/') {
        path = format!("library/{path}");
    }

    let (host, port) = split_host_port(&authority)?;

    Ok(RepositoryRef {
        registry: RegistryRef {
            scheme: opts.scheme().to_string(),
            host,
            port,
        },
        path,
    })
}

/// Parses a reference string into a [`TagRef`], defaulting the tag per
/// `opts.default_tag` in weak mode.
pub fn parse_tag_ref(input: &str, opts: &RegistryOptions) -> Result<TagRef> {
    let input_trimmed = input.trim();
    let (first_segment, rest) = match input_trimmed.split_once('/') {
        Some((first, rest)) => (first, Some(rest)),
        None => (input_trimmed, None),
    };
    let path_with_tag = if looks_like_host(first_segment) {
        rest.unwrap_or_default()
    } else {
        input_trimmed
    };

    let explicit_tag = match path_with_tag.rsplit_once(':') {
        Some((path, tag)) if !path.is_empty() && !tag.contains('/') => Some(tag.to_string()),
        _ => None,
    };

    let repository = parse(input, opts)?;
    let tag = match explicit_tag {
        Some(tag) => tag,
        None if !opts.strict => opts.default_tag.clone(),
        None => {
            return Err(RexError::validation(format!(
                "strict mode requires an explicit tag in {input:?}"
            )));
        }
    };

    Ok(TagRef { repository, tag })
}
