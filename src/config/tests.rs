use super::*;
use tempfile::{tempdir, TempDir};
use std::fs::File;
use std::io::Write;

/// Helper function to create a test configuration file
fn create_test_config_file(dir: &TempDir, content: &str) -> PathBuf {
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    let mut file = File::create(&config_path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    config_path
}

fn sample_config() -> Config {
    Config {
        database_url: "original.db".to_string(),
        host: "127.0.0.1".to_string(),
        port: 3000,
        session_ttl_hours: 24,
        session_purge_interval_minutes: 60,
        seed_sample_data: false,
    }
}

fn empty_args() -> CliArgs {
    CliArgs {
        database_url: None,
        host: None,
        port: None,
        session_ttl_hours: None,
        session_purge_interval_minutes: None,
        seed_sample_data: false,
        debug: false,
    }
}

/// Tests for Config::apply_update
#[test]
fn test_apply_update_with_all_values() {
    let update = ConfigUpdate {
        database_url: Some("updated.db".to_string()),
        host: Some("0.0.0.0".to_string()),
        port: Some(8080),
        session_ttl_hours: Some(48),
        session_purge_interval_minutes: Some(5),
        seed_sample_data: Some(true),
        server_url: Some("http://ignored".to_string()),
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.database_url, "updated.db");
    assert_eq!(updated.host, "0.0.0.0");
    assert_eq!(updated.port, 8080);
    assert_eq!(updated.session_ttl_hours, 48);
    assert_eq!(updated.session_purge_interval_minutes, 5);
    assert!(updated.seed_sample_data);
}

#[test]
fn test_apply_update_with_partial_values() {
    let update = ConfigUpdate {
        port: Some(4000),
        ..Default::default()
    };

    let updated = sample_config().apply_update(update);

    assert_eq!(updated.port, 4000);
    assert_eq!(updated.database_url, "original.db"); // Unchanged
    assert_eq!(updated.session_ttl_hours, 24); // Unchanged
}

#[test]
fn test_apply_update_with_no_values() {
    let updated = sample_config().apply_update(ConfigUpdate::default());
    assert_eq!(updated, sample_config());
}

#[test]
fn test_duration_conversions() {
    let config = Config {
        session_ttl_hours: 12,
        session_purge_interval_minutes: 30,
        ..sample_config()
    };

    assert_eq!(config.session_ttl(), chrono::Duration::hours(12));
    assert_eq!(config.session_purge_interval(), Duration::from_secs(30 * 60));
    assert_eq!(config.bind_address(), "127.0.0.1:3000");
}

#[test]
fn test_duration_conversions_are_clamped() {
    let config = Config {
        session_ttl_hours: -5,
        session_purge_interval_minutes: 0,
        ..sample_config()
    };

    assert_eq!(config.session_ttl(), chrono::Duration::hours(1));
    assert_eq!(config.session_purge_interval(), Duration::from_secs(60));

    let config = Config { session_ttl_hours: i64::MAX, ..sample_config() };
    assert_eq!(config.session_ttl(), chrono::Duration::hours(MAX_SESSION_TTL_HOURS));
}

/// Tests for base_config
#[test]
fn test_base_config_defaults() {
    let config = base_config(None);

    assert_eq!(config.database_url, "bookmarket.db");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
    assert_eq!(config.session_purge_interval_minutes, 60);
    assert!(!config.seed_sample_data);
}

#[test]
fn test_base_config_with_path() {
    let temp_dir = tempdir().unwrap();
    let config = base_config(Some(temp_dir.path().to_path_buf()));

    let expected_db_path = temp_dir.path().join("bookmarket.db").to_string_lossy().to_string();
    assert_eq!(config.database_url, expected_db_path);
}

/// Tests for config_from_args
#[test]
fn test_config_from_args_with_all_values() {
    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        host: Some("0.0.0.0".to_string()),
        port: Some(9000),
        session_ttl_hours: Some(6),
        session_purge_interval_minutes: Some(15),
        seed_sample_data: true,
        debug: true,
    };

    let update = config_from_args(args);

    assert_eq!(update.database_url, Some("args.db".to_string()));
    assert_eq!(update.host, Some("0.0.0.0".to_string()));
    assert_eq!(update.port, Some(9000));
    assert_eq!(update.session_ttl_hours, Some(6));
    assert_eq!(update.session_purge_interval_minutes, Some(15));
    assert_eq!(update.seed_sample_data, Some(true));
    assert_eq!(update.server_url, None);
}

#[test]
fn test_config_from_args_with_no_values() {
    let update = config_from_args(empty_args());
    assert_eq!(update, ConfigUpdate::default());
}

/// Tests for config_from_file - successful cases
#[test]
fn test_config_from_file_with_no_path() {
    let update = config_from_file(None).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

#[test]
fn test_config_from_file_with_valid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = 4321
        session_ttl_hours = 72
        seed_sample_data = true
        server_url = "http://books.local:4321"
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    let result = config_from_file(Some(config_path));

    assert!(result.is_ok(), "Failed to parse config file: {}", result.err().unwrap());
    let update = result.unwrap();
    assert_eq!(update.database_url, Some("file.db".to_string()));
    assert_eq!(update.port, Some(4321));
    assert_eq!(update.session_ttl_hours, Some(72));
    assert_eq!(update.seed_sample_data, Some(true));
    assert_eq!(update.server_url, Some("http://books.local:4321".to_string()));
    assert_eq!(update.host, None);
}

/// Tests for config_from_file - failure cases
#[test]
fn test_config_from_file_with_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_content = r#"
        database_url = "file.db"
        port = "not a number" # Type error
    "#;

    let config_path = create_test_config_file(&temp_dir, config_content);

    assert!(config_from_file(Some(config_path)).is_err());
}

#[test]
fn test_config_from_file_with_nonexistent_file() {
    let temp_dir = tempdir().unwrap();
    let nonexistent_path = temp_dir.path().join("nonexistent_config.toml");

    let update = config_from_file(Some(nonexistent_path)).unwrap();
    assert_eq!(update, ConfigUpdate::default());
}

/// Tests for the layering done by get_config
#[test]
fn test_config_precedence() {
    let temp_dir = tempdir().unwrap();
    let config_path = create_test_config_file(&temp_dir, r#"
        database_url = "file.db"
        port = 5000
        seed_sample_data = true
    "#);

    let args = CliArgs {
        database_url: Some("args.db".to_string()),
        ..empty_args()
    };

    let config = base_config(None)
        .apply_update(config_from_file(Some(config_path)).unwrap())
        .apply_update(config_from_args(args));

    assert_eq!(config.database_url, "args.db"); // From args
    assert_eq!(config.port, 5000); // From file
    assert!(config.seed_sample_data); // From file, not cleared by the absent flag
    assert_eq!(config.host, "127.0.0.1"); // From base
}
