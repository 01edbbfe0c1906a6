use super::*;
use crate::reference::ProviderKind;

#[test]
fn resolve_kind_prefers_explicit_kind_over_host_sniffing() {
    assert_eq!(resolve_kind("quay.io", ProviderKind::Harbor), ProviderKind::Harbor);
}

#[test]
fn resolve_kind_sniffs_quay_host() {
    assert_eq!(resolve_kind("quay.io", ProviderKind::Generic), ProviderKind::Quay);
}

#[test]
fn resolve_kind_sniffs_ecr_host() {
    assert_eq!(
        resolve_kind("123456789012.dkr.ecr.us-east-1.amazonaws.com", ProviderKind::Generic),
        ProviderKind::Ecr
    );
}

#[test]
fn resolve_kind_sniffs_gcr_host() {
    assert_eq!(resolve_kind("us.gcr.io", ProviderKind::Generic), ProviderKind::Gcr);
}

#[test]
fn resolve_kind_defaults_to_generic() {
    assert_eq!(resolve_kind("registry.example.com", ProviderKind::Generic), ProviderKind::Generic);
}

#[tokio::test]
async fn static_credential_source_returns_the_fixed_credential() {
    let source = StaticCredentialSource::new(Credential::basic("user", "pw"));
    let cred = source.acquire(&CancellationToken::new()).await.unwrap();
    assert_eq!(cred.username, "user");
}

#[tokio::test]
async fn cloud_marker_sources_fail_closed() {
    let cancel = CancellationToken::new();
    assert!(AwsCredentialSource.acquire(&cancel).await.is_err());
    assert!(GoogleCredentialSource.acquire(&cancel).await.is_err());
    assert!(AzureCredentialSource.acquire(&cancel).await.is_err());
}

#[tokio::test]
async fn get_all_repositories_drains_every_page() {
    let mut server = mockito::Server::new_async().await;
    let _first = server
        .mock("GET", "/v2/_catalog")
        .match_query(mockito::Matcher::UrlEncoded("last".into(), String::new()))
        .with_status(200)
        .with_header("Link", "</v2/_catalog?n=2&last=busybox>; rel=\"next\"")
        .with_body(r#"{"repositories":["alpine","busybox"]}"#)
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/v2/_catalog")
        .match_query(mockito::Matcher::UrlEncoded("last".into(), "busybox".into()))
        .with_status(200)
        .with_body(r#"{"repositories":["zlib"]}"#)
        .create_async()
        .await;

    let host = server.url().trim_start_matches("http://").to_string();
    let options = RegistryOptions {
        insecure: true,
        ..RegistryOptions::default()
    };
    let driver = build_driver(Credential::default(), &host, options.clone()).unwrap();
    let client = RegistryClient::from_driver(driver, options);

    let repos = client.get_all_repositories().await.unwrap();
    assert_eq!(repos, vec!["alpine".to_string(), "busybox".to_string(), "zlib".to_string()]);
}

#[tokio::test]
async fn get_images_to_scan_skips_empty_tags_by_default() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/emptyrepo/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"emptyrepo","tags":[]}"#)
        .create_async()
        .await;

    let host = server.url().trim_start_matches("http://").to_string();
    let options = RegistryOptions {
        insecure: true,
        ..RegistryOptions::default()
    };
    let driver = build_driver(Credential::default(), &host, options.clone()).unwrap();
    let client = RegistryClient::from_driver(driver, options);

    let images = client
        .get_images_to_scan(&["emptyrepo".to_string()])
        .await
        .unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn get_images_to_scan_errors_on_empty_tags_when_policy_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v2/emptyrepo/tags/list")
        .with_status(200)
        .with_body(r#"{"name":"emptyrepo","tags":[]}"#)
        .create_async()
        .await;

    let host = server.url().trim_start_matches("http://").to_string();
    let options = RegistryOptions {
        insecure: true,
        empty_tag_policy: EmptyTagPolicy::Error,
        ..RegistryOptions::default()
    };
    let driver = build_driver(Credential::default(), &host, options.clone()).unwrap();
    let client = RegistryClient::from_driver(driver, options);

    let err = client
        .get_images_to_scan(&["emptyrepo".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, RexError::DecodeError { .. }));
}
