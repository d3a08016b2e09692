use presence::{ConfigError, MonitorConfig};
use std::time::Duration;

#[test]
fn defaults_match_detector_settings() {
    let config = MonitorConfig::default();
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.miss_threshold, 3);
    assert_eq!(config.detect_options().min_input_size, 416);
    assert_eq!(config.detect_options().score_threshold, 0.5);
    assert!(config.constraints().audio);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_json_keeps_defaults() {
    let config: MonitorConfig =
        serde_json::from_str(r#"{ "poll_interval_ms": 250, "audio": false }"#).unwrap();
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.miss_threshold, 3);
    assert!(!config.constraints().audio);
    assert!(config.constraints().video);
}

#[test]
fn rejects_zero_threshold() {
    let config = MonitorConfig {
        miss_threshold: 0,
        ..MonitorConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn rejects_out_of_range_score() {
    for score in [0.0, 1.5, f32::NAN] {
        let config = MonitorConfig {
            score_threshold: score,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err(), "score {score} accepted");
    }
}

#[test]
fn loads_from_file() {
    let path = std::env::temp_dir().join(format!("presence-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "miss_threshold": 5, "warning_message": "Look here" }"#).unwrap();
    let config = MonitorConfig::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.miss_threshold, 5);
    assert_eq!(config.warning_message, "Look here");
}

#[test]
fn invalid_file_is_reported() {
    let path = std::env::temp_dir().join(format!("presence-bad-{}.json", std::process::id()));
    std::fs::write(&path, r#"{ "poll_interval_ms": 0 }"#).unwrap();
    let err = MonitorConfig::from_json_file(&path).unwrap_err();
    std::fs::remove_file(&path).ok();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let missing = MonitorConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));
}
