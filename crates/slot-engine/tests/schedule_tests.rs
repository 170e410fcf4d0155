//! Tests for weekly schedule storage shape and save-time validation.

use chrono::Weekday;
use slot_engine::schedule::weekday_key;
use slot_engine::{CivilTime, Shift, SlotError, WeeklySchedule};

#[test]
fn missing_null_and_empty_days_are_days_off() {
    let json = r#"{ "mon": [{ "start": "09:00", "end": "17:00" }], "tue": null, "wed": [] }"#;
    let schedule: WeeklySchedule = serde_json::from_str(json).unwrap();

    assert_eq!(schedule.shifts_for(Weekday::Mon), &[Shift::new("09:00", "17:00")]);
    assert!(schedule.shifts_for(Weekday::Tue).is_empty());
    assert!(schedule.shifts_for(Weekday::Wed).is_empty());
    assert!(schedule.shifts_for(Weekday::Sun).is_empty());
}

#[test]
fn serializes_only_working_days() {
    let schedule = WeeklySchedule::default().with_shift(Weekday::Fri, "08:00", "12:00");
    let json = serde_json::to_value(&schedule).unwrap();
    assert_eq!(json, serde_json::json!({ "fri": [{ "start": "08:00", "end": "12:00" }] }));
}

#[test]
fn default_working_week_is_weekdays_nine_to_five() {
    let week = WeeklySchedule::default_working_week();
    for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
        assert_eq!(week.shifts_for(day), &[Shift::new("09:00", "17:00")], "{}", weekday_key(day));
    }
    assert!(week.shifts_for(Weekday::Sat).is_empty());
    assert!(week.shifts_for(Weekday::Sun).is_empty());
    assert!(week.validate().is_ok());
}

#[test]
fn empty_schedule_reports_empty() {
    assert!(WeeklySchedule::default().is_empty());
    assert!(!WeeklySchedule::default_working_week().is_empty());
}

#[test]
fn shift_bounds_parse_civil_times() {
    let (start, end) = Shift::new("08:30", "12:00").bounds().unwrap();
    assert_eq!(start, CivilTime::from_hm(8, 30).unwrap());
    assert_eq!(end, CivilTime::from_hm(12, 0).unwrap());
}

#[test]
fn zero_length_shift_is_rejected() {
    assert!(matches!(
        Shift::new("09:00", "09:00").bounds(),
        Err(SlotError::InvalidRange(_))
    ));
}

#[test]
fn validate_reports_every_bad_shift() {
    let schedule = WeeklySchedule::default()
        .with_shift(Weekday::Mon, "09:00", "17:00")
        .with_shift(Weekday::Mon, "18:00", "17:00")
        .with_shift(Weekday::Wed, "9am", "5pm");

    let errors = schedule.validate().unwrap_err();
    assert_eq!(errors.len(), 2);

    match &errors[0] {
        SlotError::InvalidShift { day, index, .. } => {
            assert_eq!(day, "mon");
            assert_eq!(*index, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    match &errors[1] {
        SlotError::InvalidShift { day, index, reason } => {
            assert_eq!(day, "wed");
            assert_eq!(*index, 0);
            assert!(reason.contains("9am"), "{}", reason);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn weekday_keys_match_storage() {
    let keys: Vec<&str> = slot_engine::schedule::WEEK.iter().map(|d| weekday_key(*d)).collect();
    assert_eq!(keys, vec!["mon", "tue", "wed", "thu", "fri", "sat", "sun"]);
}
