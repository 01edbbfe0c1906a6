use super::*;
use crate::auth::Credential;
use crate::pagination::{Cursor, PageRequest};
use crate::reference::RegistryOptions;

fn ctx_for(url: &str) -> DriverContext {
    let host = url.trim_start_matches("http://").trim_start_matches("https://");
    let mut ctx = DriverContext::new(host, Credential::default(), RegistryOptions::default()).unwrap();
    ctx.scheme = "http".to_string();
    ctx
}

#[tokio::test]
async fn test_catalog_decodes_repositories_and_follows_docker_link() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header(
            "Link",
            "</v2/_catalog?n=2&last=busybox>; rel=\"next\"",
        )
        .with_body(r#"{"repositories":["alpine","busybox"]}"#)
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let page = PageRequest { cursor: Cursor::Opaque(String::new()), size: 2 };
    let (repos, next) = driver.catalog(page).await.unwrap();

    assert_eq!(repos, vec!["alpine".to_string(), "busybox".to_string()]);
    let next = next.unwrap();
    assert_eq!(next.size, 2);
    assert_eq!(next.cursor, Cursor::Opaque("busybox".to_string()));
}

#[tokio::test]
async fn test_catalog_stops_when_no_link_header() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/_catalog")
        .with_status(200)
        .with_body(r#"{"repositories":["alpine"]}"#)
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let page = PageRequest { cursor: Cursor::Opaque(String::new()), size: 50 };
    let (repos, next) = driver.catalog(page).await.unwrap();

    assert_eq!(repos, vec!["alpine".to_string()]);
    assert!(next.is_none());
}

#[tokio::test]
async fn test_catalog_unauthorized_maps_to_auth_invalid() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/_catalog")
        .with_status(401)
        .with_body(r#"{"errors":[{"code":"UNAUTHORIZED"}]}"#)
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let page = PageRequest { cursor: Cursor::Opaque(String::new()), size: 0 };
    let err = driver.catalog(page).await.unwrap_err();
    assert!(matches!(err, RexError::AuthInvalid { .. }));
}

#[tokio::test]
async fn test_catalog_rate_limited_maps_to_transient() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/_catalog")
        .with_status(429)
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let page = PageRequest { cursor: Cursor::Opaque(String::new()), size: 0 };
    let err = driver.catalog(page).await.unwrap_err();
    assert!(matches!(err, RexError::Transient { .. }));
}

#[tokio::test]
async fn test_list_sends_basic_auth_header_when_credential_valid() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/library/alpine/tags/list")
        .match_header("Authorization", "Basic YWRtaW46c2VjcmV0")
        .with_status(200)
        .with_body(r#"{"name":"library/alpine","tags":["3.19","latest"]}"#)
        .create_async()
        .await;

    let mut ctx = ctx_for(&server.url());
    ctx.credential = std::sync::RwLock::new(Credential {
        username: "admin".to_string(),
        password: "secret".to_string(),
        ..Default::default()
    });
    let driver = GenericDriver::new(ctx);
    let (tags, next) = driver
        .list("library/alpine", PageRequest { cursor: Cursor::Opaque(String::new()), size: 0 })
        .await
        .unwrap();

    assert_eq!(tags, vec!["3.19".to_string(), "latest".to_string()]);
    assert!(next.is_none());
}

#[tokio::test]
async fn test_get_reads_docker_content_digest_header() {
    let mut server = mockito::Server::new_async().await;
    let config_digest = "sha256:b5b2b2c507a0944348e0303114d8d93aaaa081732b86451d9bce1f432a537bc7";
    let manifest_digest = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";

    let _manifest_mock = server
        .mock("GET", "/v2/library/alpine/manifests/3.19")
        .with_status(200)
        .with_header("Docker-Content-Digest", manifest_digest)
        .with_body(format!(
            r#"{{"schemaVersion":2,"mediaType":"application/vnd.docker.distribution.manifest.v2+json","config":{{"mediaType":"application/vnd.docker.container.image.v1+json","size":10,"digest":"{config_digest}"}},"layers":[]}}"#
        ))
        .create_async()
        .await;
    let _config_mock = server
        .mock("GET", format!("/v2/library/alpine/blobs/{config_digest}").as_str())
        .with_status(200)
        .with_body(r#"{"created":"2023-05-01T00:00:00Z","architecture":"amd64","os":"linux","rootfs":{"type":"layers","diff_ids":[]}}"#)
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let descriptor = driver.get("library/alpine", "3.19").await.unwrap();

    assert_eq!(descriptor.digest, manifest_digest);
    assert_eq!(descriptor.created.to_rfc3339(), "2023-05-01T00:00:00+00:00");
}

#[tokio::test]
async fn test_get_reads_real_schema1_manifest_via_content_type_header() {
    // Real schema-1 responses carry no in-body `mediaType`, only
    // `schemaVersion: 1` and a `Content-Type` response header.
    let mut server = mockito::Server::new_async().await;
    let manifest_digest = "sha256:7173b809ca12ec5dee4506cd86be934c4596dd234ee82c0662eac04a8c2c71dc";

    let _manifest_mock = server
        .mock("GET", "/v2/library/alpine/manifests/3.19")
        .with_status(200)
        .with_header("Docker-Content-Digest", manifest_digest)
        .with_header(
            "Content-Type",
            "application/vnd.docker.distribution.manifest.v1+prettyjws",
        )
        .with_body(
            r#"{
                "schemaVersion": 1,
                "name": "library/alpine",
                "tag": "3.19",
                "history": [
                    { "v1Compatibility": "{\"created\":\"2021-06-01T10:00:00Z\",\"id\":\"abc\"}" }
                ]
            }"#,
        )
        .create_async()
        .await;

    let driver = GenericDriver::new(ctx_for(&server.url()));
    let descriptor = driver.get("library/alpine", "3.19").await.unwrap();

    assert_eq!(descriptor.digest, manifest_digest);
    assert_eq!(descriptor.created.to_rfc3339(), "2021-06-01T10:00:00+00:00");
}

#[test]
fn test_gcr_self_link_header_built_once_cursor_present() {
    let page = PageRequest {
        cursor: Cursor::Opaque("busybox".to_string()),
        size: 2,
    };
    let link = gcr_self_link_header("http://gcr.io/v2/_catalog?n=2&last=busybox", &page).unwrap();
    assert_eq!(link, r#"<http://gcr.io/v2/_catalog?n=2&last=busybox>; rel="next""#);
}

#[test]
fn test_gcr_self_link_header_absent_without_cursor() {
    let page = PageRequest {
        cursor: Cursor::Opaque(String::new()),
        size: 2,
    };
    assert!(gcr_self_link_header("http://gcr.io/v2/_catalog", &page).is_none());
}

#[test]
fn test_credentials_returns_owned_clone_including_injected_token() {
    let ctx = ctx_for("http://localhost:5000");
    ctx.credential.write().unwrap().registry_token = "exchanged-token".to_string();
    let driver = GenericDriver::new(ctx);

    let cred = driver.credentials();
    assert_eq!(cred.registry_token, "exchanged-token");
}
