use super::*;
use crate::auth::Credential;
use crate::drivers::{Descriptor, Driver};
use async_trait::async_trait;
use chrono::TimeZone;
use std::collections::HashMap;
use std::sync::Mutex;

/// A `Driver` double that serves a fixed sequence of tag pages and resolves
/// each tag to a canned `(digest, created)` pair, so the resolver's paging,
/// fan-out, and merge logic can be exercised without any HTTP stack.
struct MockDriver {
    pages: Mutex<Vec<Vec<String>>>,
    manifests: HashMap<String, (String, DateTime<Utc>)>,
    fail_tag: Option<String>,
}

impl MockDriver {
    fn new(pages: Vec<Vec<String>>, manifests: Vec<(&str, &str, i64)>) -> Self {
        let manifests = manifests
            .into_iter()
            .map(|(tag, digest, ts)| {
                (
                    tag.to_string(),
                    (digest.to_string(), Utc.timestamp_opt(ts, 0).unwrap()),
                )
            })
            .collect();
        Self {
            pages: Mutex::new(pages),
            manifests,
            fail_tag: None,
        }
    }

    fn failing(mut self, tag: &str) -> Self {
        self.fail_tag = Some(tag.to_string());
        self
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn catalog(&self, _page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        unimplemented!("resolver tests only exercise list/get")
    }

    async fn list(&self, _repo: &str, _page: PageRequest) -> Result<(Vec<String>, Option<PageRequest>)> {
        let mut pages = self.pages.lock().unwrap();
        if pages.is_empty() {
            return Ok((Vec::new(), None));
        }
        let tags = pages.remove(0);
        let next = if pages.is_empty() {
            None
        } else {
            Some(PageRequest {
                cursor: Cursor::Opaque(tags.last().cloned().unwrap_or_default()),
                size: 100,
            })
        };
        Ok((tags, next))
    }

    async fn get(&self, _repo: &str, reference: &str) -> Result<Descriptor> {
        if self.fail_tag.as_deref() == Some(reference) {
            return Err(RexError::manifest_unsupported("injected failure"));
        }
        let (digest, created) = self
            .manifests
            .get(reference)
            .unwrap_or_else(|| panic!("no fixture manifest for tag {reference}"));
        Ok(Descriptor {
            digest: digest.clone(),
            created: *created,
        })
    }

    fn max_page_size(&self) -> usize {
        100
    }

    fn credentials(&self) -> Credential {
        Credential::default()
    }
}

fn digest(n: u8) -> String {
    format!("sha256:{}", "0".repeat(64).replacen('0', &n.to_string(), 1))
}

#[tokio::test]
async fn depth_one_fast_path_returns_latest_without_manifest_fetches() {
    // E3/spec §8 property 3: depth=1 and "latest" present in the first page
    // short-circuits before any manifest GET — the mock has no fixture for
    // "latest", so a fetch attempt would panic.
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(
        vec![vec!["latest".to_string(), "v1".to_string()]],
        vec![],
    ));

    let tags = get_latest_tags(driver, "alpine", 1, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tags, vec!["latest".to_string()]);
}

#[tokio::test]
async fn orders_by_creation_time_descending_across_distinct_digests() {
    // E6: distinct digests, semver ordering only applies within a group.
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(
        vec![vec!["1.0.0".to_string(), "2.0.0".to_string(), "1.1.0".to_string()]],
        vec![
            ("1.0.0", &digest(1), 1000),
            ("2.0.0", &digest(2), 3000),
            ("1.1.0", &digest(3), 4000),
        ],
    ));

    let tags = get_latest_tags(driver, "repo", 2, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tags, vec!["1.1.0".to_string(), "2.0.0".to_string()]);
}

#[tokio::test]
async fn shared_digest_groups_merge_and_order_latest_first() {
    // E7: latest,v3 share d1; v2 is d2 (older); v1 is d3 (oldest).
    let d1 = digest(1);
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(
        vec![vec![
            "latest".to_string(),
            "v3".to_string(),
            "v2".to_string(),
            "v1".to_string(),
        ]],
        vec![
            ("latest", &d1, 5000),
            ("v3", &d1, 5000),
            ("v2", &digest(2), 3000),
            ("v1", &digest(3), 1000),
        ],
    ));

    let tags = get_latest_tags(driver, "repo", 3, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        tags,
        vec!["latest,v3".to_string(), "v2".to_string(), "v1".to_string()]
    );
}

#[tokio::test]
async fn cosign_signature_tags_are_excluded_before_any_manifest_fetch() {
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(
        vec![vec!["v1".to_string(), "v1.sig".to_string()]],
        vec![("v1", &digest(1), 1000)],
    ));

    let tags = get_latest_tags(driver, "repo", 5, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tags, vec!["v1".to_string()]);
}

#[tokio::test]
async fn streams_across_multiple_pages_and_truncates_to_depth() {
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(
        vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string()],
        ],
        vec![
            ("a", &digest(1), 1000),
            ("b", &digest(2), 2000),
            ("c", &digest(3), 5000),
        ],
    ));

    let tags = get_latest_tags(driver, "repo", 2, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(tags, vec!["c".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn a_single_worker_error_cancels_the_page_and_is_returned() {
    let driver: Arc<dyn Driver> = Arc::new(
        MockDriver::new(
            vec![vec!["good".to_string(), "bad".to_string()]],
            vec![("good", &digest(1), 1000), ("bad", &digest(2), 2000)],
        )
        .failing("bad"),
    );

    let err = get_latest_tags(driver, "repo", 5, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RexError::ManifestUnsupported { .. }));
}

#[tokio::test]
async fn depth_zero_returns_empty_without_listing_tags() {
    let driver: Arc<dyn Driver> = Arc::new(MockDriver::new(vec![vec!["v1".to_string()]], vec![]));

    let tags = get_latest_tags(driver, "repo", 0, CancellationToken::new())
        .await
        .unwrap();

    assert!(tags.is_empty());
}
