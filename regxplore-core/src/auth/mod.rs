//! Credential model and header construction for registry authentication.
//!
//! `Credential` is the five-field record every provider understands a
//! subset of: Basic (username/password), Bearer (registryToken), and OAuth2
//! identity-token exchange (identityToken/auth) all share one shape so
//! drivers don't need a separate type per auth flow.

use crate::error::{Result, RexError};
use base64::{Engine as _, engine::general_purpose};


/// Registry credentials. Valid iff at least one field is non-empty.
///
/// `registry_token` is the only field a driver may mutate after construction
/// — providers that perform a v2 token exchange (Quay, GCR) write the
/// exchanged bearer token back here so subsequent calls reuse it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub auth: String,
    pub identity_token: String,
    pub registry_token: String,
}

impl Credential {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    pub fn bearer(registry_token: impl Into<String>) -> Self {
        Self {
            registry_token: registry_token.into(),
            ..Default::default()
        }
    }

    /// True iff any field is non-empty.
    pub fn is_valid(&self) -> bool {
        !(self.username.is_empty()
            && self.password.is_empty()
            && self.auth.is_empty()
            && self.identity_token.is_empty()
            && self.registry_token.is_empty())
    }

    /// Validates the credential, surfacing `AuthRequired` on failure.
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(RexError::auth_required(
                "credential has no username, password, auth, identityToken, or registryToken set",
            ))
        }
    }

    /// `Authorization: Basic ...` header value built from username/password.
    pub fn basic_header(&self) -> String {
        basic_header(&self.username, &self.password)
    }

    /// `Authorization: Bearer ...` header value built from `registry_token`.
    pub fn bearer_header(&self) -> String {
        bearer_header(&self.registry_token)
    }
}

/// `"Basic " + base64(username:password)"`.
pub fn basic_header(username: &str, password: &str) -> String {
    let encoded = general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// `"Bearer " + token`.
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {token}")
}

/// Information parsed from a `WWW-Authenticate` header, used to locate the
/// token-exchange endpoint for Bearer-challenged registries (Docker Hub,
/// Quay's v2-auth path, GCR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub scheme: String,
    pub realm: String,
    pub service: Option<String>,
    pub scope: Option<String>,
}

impl AuthChallenge {
    /// Parses a `WWW-Authenticate` header value, e.g.
    /// `Bearer realm="https://auth.example.com/token",service="registry.example.com",scope="repository:alpine:pull"`.
    pub fn parse(header: &str) -> Result<Self> {
        let header = header.trim();

        let (scheme, params) = header
            .split_once(' ')
            .ok_or_else(|| RexError::validation("invalid WWW-Authenticate header format"))?;

        let mut realm = None;
        let mut service = None;
        let mut scope = None;

        for param in params.split(',') {
            let param = param.trim();
            if let Some((key, value)) = param.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"');
                match key {
                    "realm" => realm = Some(value.to_string()),
                    "service" => service = Some(value.to_string()),
                    "scope" => scope = Some(value.to_string()),
                    _ => {}
                }
            }
        }

        let realm = realm.ok_or_else(|| {
            RexError::validation("WWW-Authenticate header missing required 'realm' parameter")
        })?;

        Ok(Self {
            scheme: scheme.to_string(),
            realm,
            service,
            scope,
        })
    }
}
