use careplan_cli::config::{self, CareplanConfig};
use careplan_generate::client::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};

#[test]
fn save_then_load_stamps_current_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("careplan").join("config.json");

    let mut cfg = CareplanConfig::new(dir.path().join("data"));
    cfg.config_version = 0;
    cfg.model = "gemini-2.5-pro".into();
    config::save_config(&path, &cfg).unwrap();

    let loaded = config::load_config(&path).unwrap();
    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.model, "gemini-2.5-pro");
    assert_eq!(loaded.data_dir, dir.path().join("data"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[cfg(unix)]
#[test]
fn saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    config::save_config(&path, &CareplanConfig::new(dir.path().into())).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn minimal_config_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"data_dir": "/tmp/careplan", "created_at": "2026-01-05T09:00:00Z"}"#,
    )
    .unwrap();

    let loaded = config::load_config(&path).unwrap();
    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.model, DEFAULT_MODEL);
    assert_eq!(loaded.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn current_version_config_loads_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"config_version": 1, "data_dir": "/tmp", "model": "m", "api_base_url": "u", "created_at": "2026-01-05T09:00:00Z"}"#,
    )
    .unwrap();

    let loaded = config::load_config(&path).unwrap();
    assert_eq!(loaded.model, "m");
    assert_eq!(loaded.api_base_url, "u");
}

#[test]
fn newer_config_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"config_version": 9, "data_dir": "/tmp", "model": "m", "api_base_url": "u", "created_at": "2026-01-05T09:00:00Z"}"#,
    )
    .unwrap();

    let err = config::load_config(&path).unwrap_err();
    assert!(err.to_string().contains("newer than this build supports"));
}

#[test]
fn api_key_is_redacted() {
    assert_eq!(config::redact_api_key("AIzaSyExample1234"), "AIza...1234");
    assert_eq!(config::redact_api_key("short"), "****");
}

#[test]
fn info_reports_hint_not_key() {
    let cfg = CareplanConfig::new("/data".into());
    let info = config::config_info(
        &cfg,
        std::path::Path::new("/cfg/config.json"),
        std::path::Path::new("/override"),
        Some("AIzaSyExample1234"),
    );
    assert_eq!(info.data_dir, "/override");
    assert_eq!(info.api_key_hint.as_deref(), Some("AIza...1234"));
    let json = serde_json::to_string(&info).unwrap();
    assert!(!json.contains("Example"));
}
