// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use hand_server::Config;
use hand_server::constants::{self, MissPolicy};
use hand_server::errors::ConfigError;
use std::io::Write;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.camera_id, constants::DEFAULT_CAMERA_ID);
    assert_eq!(config.producer.miss_policy, MissPolicy::Clear);
    assert_eq!(config.detector.landmark_count, constants::HAND_LANDMARK_COUNT);
    assert!(config.validate().is_ok(), "Defaults should validate");
}

#[test]
fn test_config_partial_json_keeps_defaults() {
    let config = Config::from_json(
        r#"{
            "camera_id": 2,
            "detector": { "command": ["python3", "detect.py"] },
            "producer": { "miss_policy": "keep_last" }
        }"#,
    )
    .unwrap();

    assert_eq!(config.camera_id, 2);
    assert_eq!(config.detector.command, vec!["python3", "detect.py"]);
    assert_eq!(
        config.detector.min_detection_confidence,
        constants::DEFAULT_DETECTION_CONFIDENCE
    );
    assert_eq!(config.producer.miss_policy, MissPolicy::KeepLast);
    assert_eq!(config.bind_addr, constants::DEFAULT_BIND_ADDR);
}

#[test]
fn test_config_rejects_out_of_range_confidence() {
    let result = Config::from_json(r#"{ "detector": { "min_tracking_confidence": 1.5 } }"#);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_rejects_bad_bind_addr() {
    let result = Config::from_json(r#"{ "bind_addr": "localhost" }"#);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_config_rejects_malformed_json() {
    let result = Config::from_json("{ camera_id: ");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_config_load_from_file() {
    let path = std::env::temp_dir().join(format!("hand-server-config-{}.json", std::process::id()));
    {
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "bind_addr": "0.0.0.0:8080" }}"#).unwrap();
    }

    let config = Config::load_or_default(Some(&path)).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.socket_addr().unwrap().port(), 8080);
}

#[test]
fn test_config_explicit_missing_file_is_error() {
    let path = std::env::temp_dir().join("hand-server-does-not-exist.json");
    assert!(matches!(
        Config::load_or_default(Some(&path)),
        Err(ConfigError::Read(_))
    ));
}
