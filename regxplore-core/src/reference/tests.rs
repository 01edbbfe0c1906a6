use super::*;

fn weak_opts() -> RegistryOptions {
    RegistryOptions::default()
}

fn strict_opts() -> RegistryOptions {
    RegistryOptions {
        strict: true,
        ..RegistryOptions::default()
    }
}

#[test]
fn test_weak_parse_bare_name_implies_docker_hub_and_library() {
    let repo = parse("alpine", &weak_opts()).unwrap();
    assert_eq!(repo.registry.host, "index.docker.io");
    assert_eq!(repo.path, "library/alpine");
}

#[test]
fn test_weak_parse_org_repo_no_library_prefix() {
    let repo = parse("myorg/repo", &weak_opts()).unwrap();
    assert_eq!(repo.registry.host, "index.docker.io");
    assert_eq!(repo.path, "myorg/repo");
}

#[test]
fn test_strict_parse_rejects_bare_name() {
    assert!(parse("alpine", &strict_opts()).is_err());
}

#[test]
fn test_fully_qualified_host_with_port() {
    let repo = parse("localhost:5000/myrepo", &weak_opts()).unwrap();
    assert_eq!(repo.registry.host, "localhost");
    assert_eq!(repo.registry.port, Some(5000));
    assert_eq!(repo.path, "myrepo");
}

#[test]
fn test_explicit_registry_host() {
    let repo = parse("ghcr.io/user/repo", &weak_opts()).unwrap();
    assert_eq!(repo.registry.host, "ghcr.io");
    assert_eq!(repo.path, "user/repo");
}

#[test]
fn test_insecure_option_selects_http_scheme() {
    let opts = RegistryOptions {
        insecure: true,
        ..RegistryOptions::default()
    };
    let repo = parse("ghcr.io/user/repo", &opts).unwrap();
    assert_eq!(repo.registry.scheme, "http");
}

#[test]
fn test_secure_by_default() {
    let repo = parse("ghcr.io/user/repo", &weak_opts()).unwrap();
    assert_eq!(repo.registry.scheme, "https");
}

#[test]
fn test_tag_split_with_host_port_not_consumed_as_tag() {
    let tag_ref = parse_tag_ref("localhost:5000/myrepo:v1", &weak_opts()).unwrap();
    assert_eq!(tag_ref.repository.registry.port, Some(5000));
    assert_eq!(tag_ref.repository.path, "myrepo");
    assert_eq!(tag_ref.tag, "v1");
}

#[test]
fn test_tag_defaults_to_latest_in_weak_mode() {
    let tag_ref = parse_tag_ref("alpine", &weak_opts()).unwrap();
    assert_eq!(tag_ref.tag, "latest");
}

#[test]
fn test_strict_mode_requires_explicit_tag() {
    let opts = strict_opts();
    assert!(parse_tag_ref("ghcr.io/user/repo", &opts).is_err());
    assert!(parse_tag_ref("ghcr.io/user/repo:v1", &opts).is_ok());
}

#[test]
fn test_empty_reference_is_invalid() {
    assert!(parse("", &weak_opts()).is_err());
    assert!(parse("   ", &weak_opts()).is_err());
}

#[test]
fn test_repository_ref_display() {
    let repo = parse("localhost:5000/myrepo", &weak_opts()).unwrap();
    assert_eq!(repo.to_string(), "localhost:5000/myrepo");
}

#[test]
fn test_tag_ref_display() {
    let tag_ref = parse_tag_ref("localhost:5000/myrepo:v1", &weak_opts()).unwrap();
    assert_eq!(tag_ref.to_string(), "localhost:5000/myrepo:v1");
}

#[test]
fn test_default_empty_tag_policy_is_skip() {
    assert_eq!(
        RegistryOptions::default().empty_tag_policy,
        EmptyTagPolicy::Skip
    );
}
