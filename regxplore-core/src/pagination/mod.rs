//! RFC5988 `Link` header parsing and the cursor types drivers pass between
//! page requests.
//!
//! Two dialects coexist because Harbor's REST API paginates by integer page
//! number while the Docker v2 `_catalog`/`tags/list` endpoints paginate by
//! an opaque "last repository name" cursor. [`parse_link`] dispatches on
//! [`LinkDialect`] so each driver only ever sees the shape its own backend
//! actually emits.

use crate::error::{Result, RexError};


/// Which `Link` header grammar to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDialect {
    /// `<…?n=<size>&last=<cursor>>; rel="next"`, used by the Docker/OCI
    /// distribution spec (generic v2, Harbor tag listing).
    DockerV2,
    /// A comma-separated list of link-values; only the last is consulted.
    /// `rel="prev"` on that value means the current page was the last one;
    /// otherwise its `page`/`page_size` query params become the next cursor.
    Harbor,
}

/// Opaque continuation token. The shape is driver-specific but exposed as a
/// sum type rather than an untyped blob so callers can match on it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Docker v2's `last` query parameter: the last repository name of the
    /// prior page.
    Opaque(String),
    /// Harbor's `page` query parameter.
    Page(u32),
}

impl Cursor {
    /// Renders the cursor back into the query-string value a driver sends
    /// on the next request.
    pub fn as_query_value(&self) -> String {
        match self {
            Cursor::Opaque(s) => s.clone(),
            Cursor::Page(p) => p.to_string(),
        }
    }
}

/// `{ cursor, size }` pair describing the next page to request.
/// `size == 0` means "no limit requested"; drivers then omit `n`/`page_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Cursor,
    pub size: usize,
}

/// Parses a raw `Link` header value per `dialect`. Returns `Ok(None)` when
/// the header is absent or indicates there is no further page.
pub fn parse_link(header: Option<&str>, dialect: LinkDialect) -> Result<Option<PageRequest>> {
    let Some(header) = header else {
        return Ok(None);
    };

    match dialect {
        LinkDialect::DockerV2 => parse_docker_v2(header),
        LinkDialect::Harbor => parse_harbor(header),
    }
}

fn extract_bracketed_url(value: &str) -> Result<&str> {
    let value = value.trim();
    if !value.starts_with('<') {
        return Err(RexError::page_header_malformed("missing '<'"));
    }
    let end = value
        .find('>')
        .ok_or_else(|| RexError::page_header_malformed("missing '>'"))?;
    Ok(&value[1..end])
}

fn parse_docker_v2(header: &str) -> Result<Option<PageRequest>> {
    let url_part = extract_bracketed_url(header)?;
    let parsed = url::Url::parse(url_part)
        .or_else(|_| url::Url::parse(&format!("http://placeholder{url_part}")))
        .map_err(|e| RexError::page_header_malformed(format!("invalid link URL: {e}")))?;

    let query: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

    let n = query
        .get("n")
        .ok_or_else(|| RexError::page_header_malformed("missing 'n'"))?;
    let size: usize = n
        .parse()
        .map_err(|_| RexError::page_header_malformed("'n' not an integer"))?;
    let last = query
        .get("last")
        .ok_or_else(|| RexError::page_header_malformed("missing 'last'"))?;

    Ok(Some(PageRequest {
        cursor: Cursor::Opaque(last.clone()),
        size,
    }))
}

fn parse_harbor(header: &str) -> Result<Option<PageRequest>> {
    let links: Vec<&str> = header.split(',').collect();
    let last_link = links
        .last()
        .ok_or_else(|| RexError::page_header_malformed("empty Link header"))?
        .trim();

    if last_link.contains(r#"rel="prev""#) {
        return Ok(None);
    }

    let url_part = extract_bracketed_url(last_link)?;
    let parsed = url::Url::parse(url_part)
        .or_else(|_| url::Url::parse(&format!("http://placeholder{url_part}")))
        .map_err(|e| RexError::page_header_malformed(format!("invalid link URL: {e}")))?;

    let query: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

    let page_size = query
        .get("page_size")
        .ok_or_else(|| RexError::page_header_malformed("page size is missing in next page header"))?;
    let size: usize = page_size
        .parse()
        .map_err(|_| RexError::page_header_malformed("page size is not an integer in next page header"))?;

    let page = query
        .get("page")
        .ok_or_else(|| RexError::page_header_malformed("page number is missing in next page header"))?;
    let page_num: u32 = page
        .parse()
        .map_err(|_| RexError::page_header_malformed("page number is not an integer in next page header"))?;

    Ok(Some(PageRequest {
        cursor: Cursor::Page(page_num),
        size,
    }))
}

/// Fallback for servers that omit `Link` entirely: if the page filled
/// exactly to `requested_size`, presume another page and synthesize a
/// cursor from the last repository name; otherwise assume this was the
/// final page. Only used by the generic v2 driver when it explicitly opts
/// in (`RegistryOptions::link_fallback`); Harbor and Quay never rely on it.
pub fn size_heuristic(repos: &[String], requested_size: usize) -> Option<PageRequest> {
    if requested_size == 0 || repos.len() != requested_size {
        return None;
    }
    repos.last().map(|last| PageRequest {
        cursor: Cursor::Opaque(last.clone()),
        size: requested_size,
    })
}

/// Serializes a `PageRequest` back into a Harbor-dialect `Link` header
/// value with `rel="next"`, the inverse of [`parse_link`] with
/// [`LinkDialect::Harbor`]. Used by tests exercising the round-trip
/// invariant and by any in-process mock server fixtures.
pub fn format_harbor_link(base_path: &str, page: &PageRequest) -> String {
    let Cursor::Page(p) = page.cursor else {
        panic!("format_harbor_link requires a Page cursor");
    };
    format!(
        r#"<{base_path}?page={p}&page_size={size}>; rel="next""#,
        size = page.size
    )
}
