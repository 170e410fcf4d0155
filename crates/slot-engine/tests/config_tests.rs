//! Tests for engine configuration parsing and validation.

use slot_engine::{DstPolicy, FetchFailurePolicy, SlotEngineConfig, SlotError, SlotQuery};

#[test]
fn empty_object_gives_defaults() {
    let config = SlotEngineConfig::from_json("{}").unwrap();
    assert_eq!(config, SlotEngineConfig::default());
    assert_eq!(config.slot_minutes, 30);
    assert_eq!(config.lead_time_minutes, 10);
    assert_eq!(config.horizon_days, 7);
    assert_eq!(config.booking_minutes, 30);
    assert_eq!(config.dst_policy, DstPolicy::WallClock);
    assert_eq!(config.on_fetch_failure, FetchFailurePolicy::FailOpen);
}

#[test]
fn fields_override_individually() {
    let config = SlotEngineConfig::from_json(
        r#"{ "lead_time_minutes": 60, "dst_policy": "skip", "on_fetch_failure": "fail_closed" }"#,
    )
    .unwrap();
    assert_eq!(config.lead_time_minutes, 60);
    assert_eq!(config.dst_policy, DstPolicy::Skip);
    assert_eq!(config.on_fetch_failure, FetchFailurePolicy::FailClosed);
    assert_eq!(config.slot_minutes, 30);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(matches!(
        SlotEngineConfig::from_json(r#"{ "slot_length": 15 }"#),
        Err(SlotError::InvalidConfig(_))
    ));
}

#[test]
fn non_positive_lengths_are_rejected() {
    for json in [
        r#"{ "slot_minutes": 0 }"#,
        r#"{ "booking_minutes": -5 }"#,
        r#"{ "lead_time_minutes": -1 }"#,
        r#"{ "horizon_days": 0 }"#,
    ] {
        assert!(
            matches!(SlotEngineConfig::from_json(json), Err(SlotError::InvalidConfig(_))),
            "{}",
            json
        );
    }
}

#[test]
fn zero_lead_time_is_allowed() {
    assert!(SlotEngineConfig::from_json(r#"{ "lead_time_minutes": 0 }"#).is_ok());
}

#[test]
fn oversized_values_are_rejected() {
    for json in [
        r#"{ "horizon_days": 4000000000 }"#,
        r#"{ "horizon_days": 367 }"#,
        r#"{ "slot_minutes": 9223372036854775807 }"#,
        r#"{ "slot_minutes": 1441 }"#,
        r#"{ "booking_minutes": 1441 }"#,
        r#"{ "lead_time_minutes": 9223372036854775807 }"#,
        r#"{ "horizon_days": 1, "lead_time_minutes": 1441 }"#,
    ] {
        assert!(
            matches!(SlotEngineConfig::from_json(json), Err(SlotError::InvalidConfig(_))),
            "{}",
            json
        );
    }
}

#[test]
fn upper_bounds_are_inclusive() {
    let config = SlotEngineConfig::from_json(
        r#"{ "slot_minutes": 1440, "booking_minutes": 1440, "horizon_days": 366, "lead_time_minutes": 527040 }"#,
    )
    .unwrap();
    assert_eq!(config.horizon_days, 366);
}

#[test]
fn query_rejects_an_unvalidated_config() {
    let config = SlotEngineConfig {
        horizon_days: 4_000_000_000,
        ..SlotEngineConfig::default()
    };
    let now = "2024-01-01T08:00:00Z".parse().unwrap();
    assert!(matches!(
        SlotQuery::default().compute(now, &config),
        Err(SlotError::InvalidConfig(_))
    ));
}
