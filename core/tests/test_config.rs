
// # 🧪 Driver configuration

use mb_offload_core::config::{ConfigError, DriverConfig};
use mb_offload_core::queue::QueuePair;
use proptest::prelude::*;

// ## 1️⃣ Defaults and JSON

#[test]
fn defaults_are_valid() {
    let cfg = DriverConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.max_burst_size, 128);
    assert_eq!(cfg.max_sgl_segs, 16);
    assert_eq!(cfg.digest_ring_size, cfg.accel_slots);
}

#[test]
fn partial_json_overrides_defaults() {
    let cfg = DriverConfig::from_json(r#"{ "max_burst_size": 32, "flush_retry_limit": 2 }"#).unwrap();
    assert_eq!(cfg.max_burst_size, 32);
    assert_eq!(cfg.flush_retry_limit, 2);
    assert_eq!(cfg.accel_lanes, DriverConfig::default().accel_lanes);
}

#[test]
fn json_round_trip() {
    let cfg = DriverConfig { accel_lanes: 8, template_cache_size: 7, ..DriverConfig::default() };
    let back = DriverConfig::from_json(&cfg.to_json().unwrap()).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(DriverConfig::from_json("{ max_burst_size: }"), Err(ConfigError::Parse(_))));
    assert!(matches!(DriverConfig::from_json(r#"{ "max_burst_size": -1 }"#), Err(ConfigError::Parse(_))));
}

// ## 2️⃣ Range checks

#[test]
fn out_of_range_fields_named() {
    let err = DriverConfig::from_json(r#"{ "max_sgl_segs": 17 }"#).unwrap_err();
    match err {
        ConfigError::OutOfRange { field, value, max, .. } => {
            assert_eq!(field, "max_sgl_segs");
            assert_eq!(value, 17);
            assert_eq!(max, 16);
        }
        other => panic!("unexpected error: {other}"),
    }

    let cfg = DriverConfig { accel_lanes: 0, ..DriverConfig::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::OutOfRange { field: "accel_lanes", .. })));

    let cfg = DriverConfig { flush_retry_limit: 0, ..DriverConfig::default() };
    assert!(cfg.validate().is_err());
}

#[test]
fn scratch_ring_must_cover_slots() {
    let cfg = DriverConfig { digest_ring_size: 16, accel_slots: 32, ..DriverConfig::default() };
    assert!(matches!(cfg.validate(), Err(ConfigError::Inconsistent(_))));
    assert!(QueuePair::software(0, cfg).is_err());
}

#[test]
fn error_messages_are_readable() {
    let msg = DriverConfig { max_burst_size: 500, ..DriverConfig::default() }.validate().unwrap_err().to_string();
    assert!(msg.contains("max_burst_size"));
    assert!(msg.contains("500"));
}

proptest! {
    #[test]
    fn prop_burst_size_range(n in 0usize..300) {
        let cfg = DriverConfig { max_burst_size: n, ..DriverConfig::default() };
        prop_assert_eq!(cfg.validate().is_ok(), (1..=128).contains(&n));
    }

    #[test]
    fn prop_lanes_never_exceed_slots(lanes in 0usize..64, slots in 1usize..64) {
        let cfg = DriverConfig { accel_lanes: lanes, accel_slots: slots, digest_ring_size: 64, ..DriverConfig::default() };
        prop_assert_eq!(cfg.validate().is_ok(), lanes >= 1 && lanes <= slots);
    }
}
