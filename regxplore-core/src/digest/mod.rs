//! Content digest validation, wrapping `oci_spec::image::Digest`.
//!
//! Kept as a newtype rather than a bare `String` so a tag name can never be
//! compared against a digest by accident at a call site.

use crate::error::{Result, RexError};
use oci_spec::image::Digest as OciDigest;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[cfg(test)]
mod tests;

/// A content-addressable identifier of an image (`sha256:…`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(OciDigest);

impl FromStr for Digest {
    type Err = RexError;

    fn from_str(s: &str) -> Result<Self> {
        let oci_digest = OciDigest::from_str(s)
            .map_err(|e| RexError::validation_with_source(format!("invalid digest: {s}"), e))?;
        Ok(Digest(oci_digest))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// `oci_spec::image::Digest` doesn't derive `Hash`; the resolver groups tags
// by digest in a `HashMap`, so hash via the canonical string form instead.
impl Hash for Digest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_string().hash(state);
    }
}
