use rigmon::core::config::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.store.host, "127.0.0.1");
    assert_eq!(config.store.port, 6379);
    assert_eq!(config.poll_interval_ms, 33);
    assert_eq!(config.store.url(), "redis://127.0.0.1:6379/0");
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rigmon").join("config.json");

    let mut config = Config::default();
    config.set_value("store.host", "rig-pi.local").unwrap();
    config.set_value("alerts.max_pressure", "110").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.alerts.max_pressure, 110);
}

#[test]
fn test_config_partial_file_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{ "alerts": { "max_temperature": 80 } }"#).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.alerts.max_temperature, 80);
    assert_eq!(loaded.alerts.max_pressure, 105);
    assert_eq!(loaded.store.port, 6379);
}

#[test]
fn test_config_every_key_is_settable() {
    let mut config = Config::default();
    for key in Config::KEYS {
        let value = if *key == "store.host" { "localhost" } else { "7" };
        assert!(config.set_value(key, value).is_ok(), "key {} rejected", key);
    }
}

#[test]
fn test_config_rejects_bad_values() {
    let mut config = Config::default();
    assert!(config.set_value("poll_interval_ms", "0").is_err());
    assert!(config.set_value("store.port", "not-a-port").is_err());
    assert!(config.set_value("no.such.key", "1").is_err());
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_zero_intervals_in_file_fall_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "alarm": { "repeat_interval_ms": 0 }, "poll_interval_ms": 0,
             "store": { "connect_timeout_ms": 0, "port": 6380 } }"#,
    )
    .unwrap();

    let loaded = Config::load_from(&path).unwrap();
    let defaults = Config::default();
    assert_eq!(loaded.alarm.repeat_interval_ms, defaults.alarm.repeat_interval_ms);
    assert_eq!(loaded.poll_interval_ms, defaults.poll_interval_ms);
    assert_eq!(loaded.store.connect_timeout_ms, defaults.store.connect_timeout_ms);
    assert_eq!(loaded.store.port, 6380);
}
