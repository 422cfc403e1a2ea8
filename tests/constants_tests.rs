// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use hand_server::constants::{self, MissPolicy};

#[test]
fn test_miss_policy_values() {
    assert_eq!(MissPolicy::default(), MissPolicy::Clear);
}

#[test]
fn test_miss_policy_clearing() {
    assert!(MissPolicy::Clear.clears_missed_sides());
    assert!(!MissPolicy::KeepLast.clears_missed_sides());
}

#[test]
fn test_miss_policy_display_names() {
    for policy in [MissPolicy::Clear, MissPolicy::KeepLast] {
        assert!(
            !policy.display_name().is_empty(),
            "Policy {:?} has empty display name",
            policy
        );
    }
}

#[test]
fn test_miss_policy_serialized_names() {
    assert_eq!(
        serde_json::to_string(&MissPolicy::KeepLast).unwrap(),
        "\"keep_last\""
    );
    let parsed: MissPolicy = serde_json::from_str("\"clear\"").unwrap();
    assert_eq!(parsed, MissPolicy::Clear);
}

#[test]
fn test_detection_thresholds_in_range() {
    for value in [
        constants::DEFAULT_DETECTION_CONFIDENCE,
        constants::DEFAULT_TRACKING_CONFIDENCE,
    ] {
        assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn test_default_bind_addr_parses() {
    let addr: std::net::SocketAddr = constants::DEFAULT_BIND_ADDR.parse().unwrap();
    assert_eq!(addr.port(), 5000);
}
