// Config loading and validation tests

use haushalt_bridge::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/entries.db"

[polling]
scan_interval_secs = 300
auth_timeout_secs = 10
fetch_timeout_secs = 30

[publishing]
broadcast_capacity = 16

[[households]]
url = "http://haushalt.local:3000/"
token = "abc"
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.database.path, "data/entries.db");
    assert_eq!(config.polling.scan_interval_secs, 300);
    assert_eq!(config.publishing.broadcast_capacity, 16);
    assert_eq!(config.households.len(), 1);
    assert_eq!(config.households[0].token, "abc");
}

#[test]
fn test_config_polling_defaults_when_omitted() {
    let minimal = r#"
[server]
port = 8081
host = "127.0.0.1"

[database]
path = "entries.db"

[publishing]
broadcast_capacity = 4
"#;
    let config = AppConfig::load_from_str(minimal).expect("valid");
    assert_eq!(config.polling.scan_interval_secs, 300);
    assert_eq!(config.polling.auth_timeout_secs, 10);
    assert_eq!(config.polling.fetch_timeout_secs, 30);
    assert!(config.households.is_empty());
}

#[test]
fn test_config_partial_polling_section_keeps_other_defaults() {
    let partial = VALID_CONFIG
        .replace("auth_timeout_secs = 10\n", "")
        .replace("scan_interval_secs = 300", "scan_interval_secs = 60");
    let config = AppConfig::load_from_str(&partial).expect("valid");
    assert_eq!(config.polling.scan_interval_secs, 60);
    assert_eq!(config.polling.auth_timeout_secs, 10);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 8081", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/entries.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_scan_interval_zero() {
    let bad = VALID_CONFIG.replace("scan_interval_secs = 300", "scan_interval_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("scan_interval_secs"));
}

#[test]
fn test_config_validation_rejects_auth_timeout_zero() {
    let bad = VALID_CONFIG.replace("auth_timeout_secs = 10", "auth_timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("auth_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_fetch_timeout_zero() {
    let bad = VALID_CONFIG.replace("fetch_timeout_secs = 30", "fetch_timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("fetch_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_broadcast_capacity_zero() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 16", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_empty_household_token() {
    let bad = VALID_CONFIG.replace("token = \"abc\"", "token = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("households[0].token"));
}

#[test]
fn test_config_validation_rejects_empty_household_url() {
    let bad = VALID_CONFIG.replace("url = \"http://haushalt.local:3000/\"", "url = \" \"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("households[0].url"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };
    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.server.port, 8081);
    assert_eq!(config.database.path, "data/entries.db");
}
