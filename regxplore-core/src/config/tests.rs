use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.output.format, OutputFormat::Pretty);
    assert_eq!(config.output.color, ColorChoice::Auto);
    assert_eq!(config.network.timeout, 30);
    assert!(config.registries.current.is_none());
    assert!(config.registries.list.is_empty());
}

#[test]
fn test_from_str_empty_yaml() {
    let yaml = "";
    let config = Config::from_yaml_str(yaml).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_from_str_partial_yaml() {
    let yaml = r#"
output:
  format: json
network:
  timeout: 60
registries:
  current: prod
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.network.timeout, 60);
    assert_eq!(config.registries.current, Some("prod".to_string()));
    assert_eq!(config.output.color, ColorChoice::Auto);
}

#[test]
fn test_from_str_full_yaml() {
    let yaml = r#"
output:
  format: yaml
  color: never
network:
  timeout: 10
registries:
  current: local
  list:
    - name: local
      url: "http://localhost:5000"
      insecure: true
    - name: prod
      url: "https://registry.example.com"
"#;
    let config = Config::from_yaml_str(yaml).unwrap();

    assert_eq!(config.output.format, OutputFormat::Yaml);
    assert_eq!(config.output.color, ColorChoice::Never);
    assert_eq!(config.network.timeout, 10);
    assert_eq!(config.registries.current, Some("local".to_string()));
    assert_eq!(config.registries.list.len(), 2);
    assert_eq!(config.registries.list[0].name, "local");
    assert!(config.registries.list[0].insecure);
    assert_eq!(config.registries.list[1].name, "prod");
    assert!(!config.registries.list[1].insecure);
}

#[test]
fn test_from_str_invalid_yaml() {
    let yaml = "output: { format: invalid }";
    let result = Config::from_yaml_str(yaml);
    assert!(result.is_err());
}

#[test]
fn test_from_str_unknown_field() {
    // config-rs should ignore unknown fields
    let yaml = "unknown_field: true";
    let result = Config::from_yaml_str(yaml);
    assert!(result.is_ok());
}
