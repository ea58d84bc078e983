use std::time::Duration;
use switchyard::config::{Config, Environments, ENVIRONMENT_VAR};

#[test]
fn test_config_builtin_environments() {
    let envs = Environments::builtin();

    let dev = envs.get("dev").unwrap();
    assert_eq!((dev.port, dev.https.port), (3000, 3001));

    let staging = envs.get("staging").unwrap();
    assert_eq!((staging.port, staging.https.port), (5000, 5001));

    let production = envs.get("production").unwrap();
    assert_eq!((production.port, production.https.port), (80, 443));
    assert_eq!(production.env, "prod");
    assert_eq!(production.https.key.to_str(), Some("./https/key.pem"));
}

#[test]
fn test_config_select_is_case_insensitive() {
    let (name, env) = Environments::builtin().select(Some("STAGING"));

    assert_eq!(name, "staging");
    assert_eq!(env.port, 5000);
}

#[test]
fn test_config_unknown_environment_falls_back_to_dev() {
    let (name, env) = Environments::builtin().select(Some("qa"));

    assert_eq!(name, "dev");
    assert_eq!(env.port, 3000);
}

#[test]
fn test_config_missing_environment_falls_back_to_dev() {
    let cfg = Config::select(&Environments::builtin(), None);

    assert_eq!(cfg.name, "dev");
    assert_eq!(cfg.environment.env, "dev");
    assert_eq!(cfg.environment.request_timeout(), None);
}

#[test]
fn test_config_from_yaml() {
    let yaml = r#"
dev:
  port: 8080
  env: local
  https:
    port: 8443
    key: /etc/tls/key.pem
    cert: /etc/tls/cert.pem
Edge:
  port: 9000
  env: edge
  request_timeout_secs: 15
  https:
    port: 9443
    key: key.pem
    cert: cert.pem
"#;
    let envs = Environments::from_yaml(yaml).unwrap();

    let (name, edge) = envs.select(Some("edge"));
    assert_eq!(name, "edge");
    assert_eq!(edge.port, 9000);
    assert_eq!(edge.request_timeout(), Some(Duration::from_secs(15)));

    let (_, dev) = envs.select(Some("production"));
    assert_eq!(dev.env, "local");
}

#[test]
fn test_config_yaml_requires_default_environment() {
    let yaml = r#"
staging:
  port: 5000
  env: staging
  https: { port: 5001, key: k.pem, cert: c.pem }
"#;

    assert!(Environments::from_yaml(yaml).is_err());
}

#[test]
fn test_config_load_reads_environment_variable() {
    unsafe {
        std::env::set_var(ENVIRONMENT_VAR, "Production");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.name, "production");
    assert_eq!(cfg.environment.port, 80);
    unsafe {
        std::env::remove_var(ENVIRONMENT_VAR);
    }
}
