//! Latest-tag resolution: the paged Catalog/List engine's counterpart for
//! tags, with concurrent manifest fetching, digest-based deduplication, and
//! a two-stage sort (newest-group-first, then a secondary in-group order).
//!
//! There is no driver self-reference here: this is a free function over
//! `Arc<dyn Driver>`, which is also what makes [`tokio::task::JoinSet`]
//! workable — spawned tasks need owned, `'static` access to the driver, not
//! a borrow tied to the caller's stack frame.

use crate::drivers::Driver;
use crate::digest::Digest;
use crate::error::{Result, RexError};
use crate::pagination::{Cursor, PageRequest};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[cfg(test)]
mod tests;

/// One or more tags that resolved to the same manifest digest.
#[derive(Debug, Clone)]
pub struct TagInfo {
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub digest: Digest,
}

/// Resolves the `depth` newest tag groups for `repo`, ordered newest first.
///
/// Each returned `String` is a single tag, or multiple tags sharing a
/// digest joined with `,` (e.g. `"v1.4.0,v1.4"`). Cosign `.sig` tags are
/// excluded before any manifest fetch. Cancelling `cancel` — or any worker
/// returning an error — aborts all in-flight manifest fetches for the
/// current page and the call returns that error; partially merged results
/// are discarded, matching the "first error wins" cancellation contract.
pub async fn get_latest_tags(
    driver: Arc<dyn Driver>,
    repo: &str,
    depth: usize,
    cancel: CancellationToken,
) -> Result<Vec<String>> {
    if depth == 0 {
        return Ok(Vec::new());
    }

    let page_size = driver.max_page_size();
    let mut page = PageRequest {
        cursor: Cursor::Opaque(String::new()),
        size: page_size,
    };

    let (first_tags, mut next) = driver.list(repo, page.clone()).await?;
    let first_tags = filter_signatures(first_tags);

    if depth == 1 && first_tags.iter().any(|t| t == "latest") {
        return Ok(vec!["latest".to_string()]);
    }

    let mut by_digest = DigestOrder::new();
    merge_page(&driver, repo, first_tags, &mut by_digest, &cancel).await?;
    let mut merged = sorted_truncated(&by_digest, depth);

    while let Some(p) = next {
        if cancel.is_cancelled() {
            return Err(RexError::transient("operation cancelled"));
        }
        page = p;
        let (tags, next_page) = driver.list(repo, page.clone()).await?;
        let tags = filter_signatures(tags);
        merge_page(&driver, repo, tags, &mut by_digest, &cancel).await?;
        merged = sorted_truncated(&by_digest, depth);
        next = next_page;
    }

    Ok(merged
        .into_iter()
        .map(|info| join_group(info.tags))
        .collect())
}

/// Digest→`TagInfo` map that also remembers insertion order, since a bare
/// `HashMap`'s iteration order would make the sort's tie-break
/// (`created` ties broken by insertion order, per the ordering guarantee in
/// §5) non-deterministic across runs.
struct DigestOrder {
    order: Vec<String>,
    by_digest: HashMap<String, TagInfo>,
}

impl DigestOrder {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            by_digest: HashMap::new(),
        }
    }

    fn record(&mut self, digest: String, tag: String, created: DateTime<Utc>) {
        if let Some(info) = self.by_digest.get_mut(&digest) {
            info.tags.push(tag);
        } else {
            self.order.push(digest.clone());
            self.by_digest.insert(
                digest.clone(),
                TagInfo {
                    tags: vec![tag],
                    created,
                    digest: digest.parse().expect("digest already validated"),
                },
            );
        }
    }

    /// Iterates values in insertion order (first-seen digest first).
    fn in_order(&self) -> impl Iterator<Item = &TagInfo> {
        self.order.iter().map(|d| &self.by_digest[d])
    }
}

fn filter_signatures(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().filter(|t| !t.ends_with(".sig")).collect()
}

async fn merge_page(
    driver: &Arc<dyn Driver>,
    repo: &str,
    tags: Vec<String>,
    by_digest: &mut DigestOrder,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut set: JoinSet<(String, Result<(Digest, DateTime<Utc>)>)> = JoinSet::new();

    for tag in tags {
        let driver = Arc::clone(driver);
        let repo = repo.to_string();
        set.spawn(async move {
            let result = driver.get(&repo, &tag).await.and_then(|d| {
                let digest = d.digest.parse::<Digest>()?;
                Ok((digest, d.created))
            });
            (tag, result)
        });
    }

    while let Some(joined) = set.join_next().await {
        let (tag, result) = joined.map_err(|e| RexError::transient(format!("manifest worker panicked: {e}")))?;
        match result {
            Ok((digest, created)) => {
                by_digest.record(digest.to_string(), tag, created);
            }
            Err(err) => {
                cancel.cancel();
                set.abort_all();
                return Err(err);
            }
        }
    }

    Ok(())
}

fn sorted_truncated(by_digest: &DigestOrder, depth: usize) -> Vec<TagInfo> {
    let mut infos: Vec<TagInfo> = by_digest.in_order().cloned().collect();
    infos.sort_by(|a, b| b.created.cmp(&a.created));
    infos.truncate(depth);
    infos
}

/// Sorts tags within one digest-group per the within-group ordering rules,
/// then joins them with `,`.
fn join_group(mut tags: Vec<String>) -> String {
    tags.sort_by(|a, b| compare_within_group(a, b));
    tags.join(",")
}

fn compare_within_group(a: &str, b: &str) -> Ordering {
    if a == "latest" && b == "latest" {
        return Ordering::Equal;
    }
    if a == "latest" {
        return Ordering::Less;
    }
    if b == "latest" {
        return Ordering::Greater;
    }

    match (parse_semver(a), parse_semver(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.to_lowercase().cmp(&a.to_lowercase()),
    }
}

/// Tags commonly carry a leading `v` (`v1.2.3`) that `semver` doesn't
/// accept directly; strip it before parsing.
fn parse_semver(tag: &str) -> Option<semver::Version> {
    semver::Version::parse(tag.strip_prefix('v').unwrap_or(tag)).ok()
}
