use scrapeway_config::{EngineKind, LogFormatKind, ScrapewayConfigLoader};
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
server:
  bind: "127.0.0.1:9000"
api:
  secret_key: "${SCRAPER_TEST_KEY}"
browser:
  webdriver_url: "http://chromedriver:4444"
  headless: false
  window_size: [1280, 800]
search:
  engine: google
  results_timeout_ms: 4000
content:
  include_tables: true
logging:
  format: json
  stderr: false
  "#;
    let p = write_yaml(&tmp, "scrapeway.yaml", file_yaml);

    let config = temp_env::with_vars(
        [
            ("SCRAPER_TEST_KEY", Some("from-env-expansion")),
            ("SECRET_API_KEY", None),
        ],
        || ScrapewayConfigLoader::new().with_file(&p).load(),
    )
    .expect("load system config");

    assert_eq!(config.server.bind, "127.0.0.1:9000");
    assert_eq!(config.api.secret_key, "from-env-expansion");
    assert_eq!(config.browser.webdriver_url, "http://chromedriver:4444");
    assert!(!config.browser.headless);
    assert_eq!(config.browser.window_size, (1280, 800));
    assert_eq!(config.search.engine, EngineKind::Google);
    assert_eq!(config.search.results_timeout_ms, 4000);
    assert_eq!(config.search.consent_timeout_ms, 5000);
    assert!(config.content.include_tables);
    assert!(!config.content.include_comments);
    assert_eq!(config.logging.format, LogFormatKind::Json);
    assert!(!config.logging.stderr);
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = temp_env::with_var_unset("SECRET_API_KEY", || {
        ScrapewayConfigLoader::new()
            .with_optional_file(tmp.path().join("absent.yaml"))
            .load()
    })
    .expect("defaults");
    assert_eq!(config.api.secret_key, "dev-key");
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = ScrapewayConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}
