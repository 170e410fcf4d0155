//! Property-based tests for slot computation using proptest.
//!
//! These check invariants that must hold for *any* schedule, zone, and set of
//! blocks, not just the fixtures in `slot_tests.rs`.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use slot_engine::engine::{query_window, shift_slots};
use slot_engine::schedule::WEEK;
use slot_engine::{
    compute_available_slots, Booking, BookingStatus, Override, Shift, SlotEngineConfig, SlotQuery,
    WeeklySchedule,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_timezone() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::America::Los_Angeles),
        Just(chrono_tz::Europe::London),
        Just(chrono_tz::Asia::Tokyo),
        Just(chrono_tz::Asia::Kolkata),
        Just(chrono_tz::Australia::Lord_Howe),
    ]
}

/// Any instant from 2024 through 2026, to the second.
fn arb_now() -> impl Strategy<Value = DateTime<Utc>> {
    (1_704_067_200i64..1_798_761_600i64).prop_map(|s| DateTime::from_timestamp(s, 0).unwrap())
}

/// A well-formed shift: start on a quarter hour, between 15 minutes and 10 hours long,
/// ending no later than 23:59.
fn arb_shift() -> impl Strategy<Value = Shift> {
    (0u32..=22, prop::sample::select(vec![0u32, 15, 30, 45]), 15u32..=600).prop_map(
        |(h, m, len)| {
            let start = h * 60 + m;
            let end = (start + len).min(23 * 60 + 59);
            Shift::new(
                format!("{:02}:{:02}", start / 60, start % 60),
                format!("{:02}:{:02}", end / 60, end % 60),
            )
        },
    )
}

fn arb_schedule() -> impl Strategy<Value = WeeklySchedule> {
    prop::collection::vec(prop::collection::vec(arb_shift(), 0..3), 7).prop_map(|days| {
        let mut schedule = WeeklySchedule::default();
        for (day, shifts) in WEEK.iter().zip(days) {
            for shift in shifts {
                schedule = schedule.with_shift(*day, &shift.start, &shift.end);
            }
        }
        schedule
    })
}

/// Overrides as (offset from now, length) in minutes.
fn arb_overrides() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((-600i64..10_080, 0i64..720), 0..5)
}

/// Bookings as (offset from now in quarter hours, confirmed?).
fn arb_bookings() -> impl Strategy<Value = Vec<(i64, bool)>> {
    prop::collection::vec((0i64..672, any::<bool>()), 0..12)
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    }
}

struct Case {
    slots: Vec<DateTime<Utc>>,
    overrides: Vec<Override>,
    bookings: Vec<Booking>,
}

fn run(
    schedule: &WeeklySchedule,
    tz: &Tz,
    now: DateTime<Utc>,
    overrides: &[(i64, i64)],
    bookings: &[(i64, bool)],
) -> Case {
    let overrides: Vec<Override> = overrides
        .iter()
        .map(|(off, len)| {
            let start = now + Duration::minutes(*off);
            Override::new(start, start + Duration::minutes(*len))
        })
        .collect();
    let bookings: Vec<Booking> = bookings
        .iter()
        .map(|(q, confirmed)| Booking {
            scheduled_at: now + Duration::minutes(q * 15),
            status: if *confirmed {
                BookingStatus::Confirmed
            } else {
                BookingStatus::Pending
            },
        })
        .collect();

    let slots = compute_available_slots(
        schedule,
        tz,
        &overrides,
        &bookings,
        now,
        &SlotEngineConfig::default(),
    );
    Case {
        slots,
        overrides,
        bookings,
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn shift_yields_floor_of_duration_over_slot_length(shift in arb_shift()) {
        let (start, end) = shift.bounds().unwrap();
        let minutes = (end.as_naive() - start.as_naive()).num_minutes();
        let starts = shift_slots(&shift, 30).unwrap();
        prop_assert_eq!(starts.len() as i64, minutes / 30);
    }

    #[test]
    fn no_slot_inside_lead_time(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
    ) {
        let case = run(&schedule, &tz, now, &[], &[]);
        for slot in &case.slots {
            prop_assert!(*slot >= now + Duration::minutes(10), "{} too soon after {}", slot, now);
        }
    }

    #[test]
    fn no_slot_inside_an_override(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
        overrides in arb_overrides(),
    ) {
        let case = run(&schedule, &tz, now, &overrides, &[]);
        for slot in &case.slots {
            for o in &case.overrides {
                prop_assert!(!(o.start_time <= *slot && *slot < o.end_time), "{} inside {:?}", slot, o);
            }
        }
    }

    #[test]
    fn no_slot_overlaps_a_confirmed_booking(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
        bookings in arb_bookings(),
    ) {
        let case = run(&schedule, &tz, now, &[], &bookings);
        for slot in &case.slots {
            for b in case.bookings.iter().filter(|b| b.is_confirmed()) {
                let b_end = b.scheduled_at + Duration::minutes(30);
                let s_end = *slot + Duration::minutes(30);
                prop_assert!(!(*slot < b_end && s_end > b.scheduled_at), "{} overlaps {:?}", slot, b);
            }
        }
    }

    #[test]
    fn slots_are_strictly_increasing(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
        overrides in arb_overrides(),
        bookings in arb_bookings(),
    ) {
        let case = run(&schedule, &tz, now, &overrides, &bookings);
        for pair in case.slots.windows(2) {
            prop_assert!(pair[0] < pair[1], "{} then {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn missing_zone_matches_utc(schedule in arb_schedule(), now in arb_now()) {
        let config = SlotEngineConfig::default();
        let none = SlotQuery { weekly_schedule: Some(schedule.clone()), ..SlotQuery::default() };
        let utc = SlotQuery { time_zone: Some("UTC".into()), ..none.clone() };
        prop_assert_eq!(none.compute(now, &config).unwrap(), utc.compute(now, &config).unwrap());
    }

    #[test]
    fn blocks_only_ever_remove_slots(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
        overrides in arb_overrides(),
        bookings in arb_bookings(),
    ) {
        let free = run(&schedule, &tz, now, &[], &[]).slots;
        let blocked = run(&schedule, &tz, now, &overrides, &bookings).slots;
        for slot in &blocked {
            prop_assert!(free.contains(slot));
        }
    }

    #[test]
    fn slots_end_inside_the_fetched_window(
        schedule in arb_schedule(),
        tz in arb_timezone(),
        now in arb_now(),
    ) {
        let config = SlotEngineConfig::default();
        let window = query_window(now, &config);
        let case = run(&schedule, &tz, now, &[], &[]);
        for slot in &case.slots {
            prop_assert!(*slot + Duration::minutes(30) <= window.end, "{} runs past {}", slot, window.end);
        }
    }
}
