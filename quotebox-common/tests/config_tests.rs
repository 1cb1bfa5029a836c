//! Unit tests for configuration resolution
//!
//! Priority order: CLI > environment > TOML > compiled default. A missing
//! or malformed config file must never stop startup.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that touch QUOTEBOX_* variables are marked with #[serial].

use quotebox_common::config::{
    config_file_path, default_database_path, CliOverrides, ConfigFile, ServiceConfig, TomlConfig,
    DEFAULT_BIND_ADDR, ENV_BIND, ENV_CONFIG, ENV_DATABASE, ENV_PUBLIC_BASE_URL,
    ENV_STAFF_PASSWORD,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    for name in [
        ENV_CONFIG,
        ENV_DATABASE,
        ENV_BIND,
        ENV_STAFF_PASSWORD,
        ENV_PUBLIC_BASE_URL,
    ] {
        env::remove_var(name);
    }
}

#[test]
fn test_default_database_path_is_under_quotebox() {
    let path = default_database_path();
    assert!(path.ends_with("quotebox/quotebox.db"), "got {}", path.display());
}

#[test]
fn test_toml_parse_full_and_partial() {
    let full = TomlConfig::parse(
        r#"
        database_path = "/srv/quotes.db"
        bind_addr = "0.0.0.0:9000"
        staff_password = "s3cret"
        public_base_url = "https://quotes.example.org/"
        log_level = "debug"
        "#,
    )
    .unwrap();
    assert_eq!(full.database_path, Some(PathBuf::from("/srv/quotes.db")));
    assert_eq!(full.bind_addr.as_deref(), Some("0.0.0.0:9000"));
    assert_eq!(full.log_level.as_deref(), Some("debug"));

    let partial = TomlConfig::parse("bind_addr = \"127.0.0.1:1\"").unwrap();
    assert!(partial.database_path.is_none());
    assert!(partial.staff_password.is_none());

    assert!(TomlConfig::parse("bind_addr = [").is_err());
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();
    let config = ServiceConfig::merge(&CliOverrides::default(), &TomlConfig::default());

    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(config.database_path, default_database_path());
    assert_eq!(config.staff_password, None);
    assert_eq!(config.public_base_url, None);
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_toml_overrides_defaults() {
    clear_env();
    let toml = TomlConfig {
        database_path: Some(PathBuf::from("/data/q.db")),
        bind_addr: Some("0.0.0.0:8080".to_string()),
        staff_password: Some("from-toml".to_string()),
        public_base_url: Some("https://q.example/".to_string()),
        log_level: Some("debug".to_string()),
    };

    let config = ServiceConfig::merge(&CliOverrides::default(), &toml);
    assert_eq!(config.database_path, PathBuf::from("/data/q.db"));
    assert_eq!(config.bind_addr, "0.0.0.0:8080");
    assert_eq!(config.staff_password.as_deref(), Some("from-toml"));
    // Trailing slash dropped so permalinks join cleanly
    assert_eq!(config.public_base_url.as_deref(), Some("https://q.example"));
    assert_eq!(config.log_level, "debug");
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_DATABASE, "/env/q.db");
    env::set_var(ENV_BIND, "127.0.0.1:7000");
    env::set_var(ENV_STAFF_PASSWORD, "from-env");

    let toml = TomlConfig {
        database_path: Some(PathBuf::from("/toml/q.db")),
        bind_addr: Some("127.0.0.1:6000".to_string()),
        staff_password: Some("from-toml".to_string()),
        ..Default::default()
    };
    let config = ServiceConfig::merge(&CliOverrides::default(), &toml);

    assert_eq!(config.database_path, PathBuf::from("/env/q.db"));
    assert_eq!(config.bind_addr, "127.0.0.1:7000");
    assert_eq!(config.staff_password.as_deref(), Some("from-env"));

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    env::set_var(ENV_DATABASE, "/env/q.db");
    env::set_var(ENV_BIND, "127.0.0.1:7000");

    let cli = CliOverrides {
        database: Some(PathBuf::from("/cli/q.db")),
        bind: Some("127.0.0.1:5000".to_string()),
        ..Default::default()
    };
    let config = ServiceConfig::merge(&cli, &TomlConfig::default());

    assert_eq!(config.database_path, PathBuf::from("/cli/q.db"));
    assert_eq!(config.bind_addr, "127.0.0.1:5000");

    clear_env();
}

#[test]
#[serial]
fn test_empty_values_fall_through() {
    clear_env();
    env::set_var(ENV_STAFF_PASSWORD, "   ");

    let toml = TomlConfig {
        staff_password: Some(String::new()),
        ..Default::default()
    };
    let config = ServiceConfig::merge(&CliOverrides::default(), &toml);
    assert_eq!(config.staff_password, None);

    clear_env();
}

#[test]
#[serial]
fn test_resolve_reads_config_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "bind_addr = \"127.0.0.1:4321\"\n").unwrap();

    env::set_var(ENV_CONFIG, &path);
    assert_eq!(config_file_path(&CliOverrides::default()), Some(path.clone()));

    let (config, file) = ServiceConfig::resolve(&CliOverrides::default());
    assert_eq!(config.bind_addr, "127.0.0.1:4321");
    assert_eq!(file, ConfigFile::Loaded(path));

    clear_env();
}

#[test]
#[serial]
fn test_resolve_survives_missing_and_malformed_files() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let absent = dir.path().join("absent.toml");
    let missing = CliOverrides {
        config: Some(absent.clone()),
        ..Default::default()
    };
    let (config, file) = ServiceConfig::resolve(&missing);
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert_eq!(file, ConfigFile::Missing(absent));

    let broken_path = dir.path().join("broken.toml");
    std::fs::write(&broken_path, "this is = = not toml").unwrap();
    let broken = CliOverrides {
        config: Some(broken_path),
        ..Default::default()
    };
    let (config, file) = ServiceConfig::resolve(&broken);
    assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    assert!(matches!(file, ConfigFile::Invalid { .. }));
}
