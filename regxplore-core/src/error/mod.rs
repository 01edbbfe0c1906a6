//! Error taxonomy for registry operations.
//!
//! Every fallible operation in this crate returns [`RexError`]. Each variant
//! names a distinct failure class so callers can branch on the error kind
//! without parsing message text.

use std::time::Duration;
use thiserror::Error;


/// Result type alias used throughout this crate.
pub type Result<T> = std::result::Result<T, RexError>;

/// Taxonomy of errors surfaced by drivers, the resolver, and the facade.
#[derive(Error, Debug)]
pub enum RexError {
    /// Credentials were empty where the provider requires them.
    #[error("authentication required: {message}")]
    AuthRequired { message: String },

    /// The server rejected credentials (401/403).
    #[error("authentication rejected (status: {status_code:?}): {message}")]
    AuthInvalid {
        message: String,
        status_code: Option<u16>,
    },

    /// A token-exchange endpoint returned non-200 or an empty token.
    #[error("token exchange failed: {message}")]
    TokenExchangeFailed { message: String },

    /// `Link` header parsing failed; `reason` names the specific defect.
    #[error("malformed pagination link header: {reason}")]
    PageHeaderMalformed { reason: String },

    /// A JSON or manifest body could not be decoded.
    #[error("decode error: {message}")]
    DecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Manifest media type is neither schema-2 nor a recognized schema-1 variant.
    #[error("unsupported manifest media type: {media_type}")]
    ManifestUnsupported { media_type: String },

    /// A schema-1 manifest lacked a `history` entry.
    #[error("incomplete manifest: {message}")]
    ManifestIncomplete { message: String },

    /// The provider factory received an unrecognized `kind`.
    #[error("unsupported provider kind: {kind}")]
    ProviderUnsupported { kind: String },

    /// Quay's proprietary catalog accumulated some repositories before failing.
    #[error("partial success: {message} ({} repositories collected)", .repositories.len())]
    PartialSuccess {
        message: String,
        repositories: Vec<String>,
        #[source]
        cause: Box<RexError>,
    },

    /// A network or 5xx error; eligible for retry at the caller's discretion.
    #[error("transient error: {message}")]
    Transient {
        message: String,
        retry_after: Option<Duration>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reference, credential, or option validation failed.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file could not be loaded or deserialized.
    #[error("configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RexError {
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self::AuthRequired {
            message: message.into(),
        }
    }

    pub fn auth_invalid(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Self::AuthInvalid {
            message: message.into(),
            status_code,
        }
    }

    pub fn token_exchange_failed(message: impl Into<String>) -> Self {
        Self::TokenExchangeFailed {
            message: message.into(),
        }
    }

    pub fn page_header_malformed(reason: impl Into<String>) -> Self {
        Self::PageHeaderMalformed {
            reason: reason.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError {
            message: message.into(),
            source: None,
        }
    }

    pub fn decode_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::DecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn manifest_unsupported(media_type: impl Into<String>) -> Self {
        Self::ManifestUnsupported {
            media_type: media_type.into(),
        }
    }

    pub fn manifest_incomplete(message: impl Into<String>) -> Self {
        Self::ManifestIncomplete {
            message: message.into(),
        }
    }

    pub fn provider_unsupported(kind: impl Into<String>) -> Self {
        Self::ProviderUnsupported { kind: kind.into() }
    }

    pub fn partial_success(
        message: impl Into<String>,
        repositories: Vec<String>,
        cause: RexError,
    ) -> Self {
        Self::PartialSuccess {
            message: message.into(),
            repositories,
            cause: Box::new(cause),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    pub fn transient_with_retry_after(message: impl Into<String>, retry_after: Duration) -> Self {
        Self::Transient {
            message: message.into(),
            retry_after: Some(retry_after),
            source: None,
        }
    }

    pub fn transient_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: message.into(),
            retry_after: None,
            source: Some(Box::new(source)),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    pub fn validation_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    pub fn config_with_source(
        message: impl Into<String>,
        path: Option<impl Into<String>>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(Into::into),
            source: Some(Box::new(source)),
        }
    }

    /// Classifies a `reqwest::Error`, the translation every driver funnels
    /// transport failures through before returning.
    pub fn from_reqwest(err: reqwest::Error, registry_url: &str) -> Self {
        if err.is_timeout() {
            Self::transient_with_source(format!("request to {registry_url} timed out"), err)
        } else if err.is_connect() {
            Self::transient_with_source(format!("failed to connect to {registry_url}"), err)
        } else {
            Self::transient_with_source(format!("request to {registry_url} failed"), err)
        }
    }
}
