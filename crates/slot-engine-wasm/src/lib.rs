//! WASM bindings for slot-engine.
//!
//! Exposes slot computation, the doctor schedule view, schedule validation, and
//! time-off construction to JavaScript via `wasm-bindgen`. All complex types
//! cross the boundary as JSON strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slot_engine::conflict::Interval;
use slot_engine::engine::query_window;
use slot_engine::view::merge_schedule_view;
use slot_engine::{
    format_instant, parse_instant, resolve_timezone, Override, SlotEngineConfig, SlotQuery,
    TimeOffRequest, WeeklySchedule,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Same shape as the server-side `SlotsResponse`: `{slots, error}`.
#[derive(Serialize)]
struct SlotsDto {
    slots: Vec<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ValidationDto {
    valid: bool,
    errors: Vec<String>,
}

#[derive(Deserialize)]
struct TimeOffInput {
    time_zone: Option<String>,
    #[serde(flatten)]
    request: TimeOffRequest,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn parse_config(config_json: Option<String>) -> Result<SlotEngineConfig, JsValue> {
    match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => SlotEngineConfig::from_json(json).map_err(js_err),
        _ => Ok(SlotEngineConfig::default()),
    }
}

fn parse_query(query_json: &str) -> Result<SlotQuery, JsValue> {
    serde_json::from_str(query_json).map_err(|e| JsValue::from_str(&format!("Invalid query JSON: {}", e)))
}

fn parse_now(now: &str) -> Result<DateTime<Utc>, JsValue> {
    parse_instant(now).map_err(js_err)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute bookable slots.
///
/// `query_json` is `{weekly_schedule, time_zone, overrides, bookings}`; `now`
/// is an ISO 8601 instant; `config_json` optionally overrides engine defaults.
/// Returns `{"slots": [...], "error": null}`; an unknown zone is reported in
/// `error` rather than thrown.
#[wasm_bindgen(js_name = "computeAvailableSlots")]
pub fn compute_available_slots(
    query_json: &str,
    now: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let query = parse_query(query_json)?;
    let now = parse_now(now)?;
    let config = parse_config(config_json)?;

    let dto = match query.compute(now, &config) {
        Ok(slots) => SlotsDto {
            slots: slots.iter().map(format_instant).collect(),
            error: None,
        },
        Err(e) => SlotsDto {
            slots: Vec::new(),
            error: Some(e.to_string()),
        },
    };
    to_json(&dto)
}

/// The doctor's merged calendar for the same inputs as
/// [`compute_available_slots`]. Returns a JSON array of `{start, end, kind}`.
#[wasm_bindgen(js_name = "scheduleView")]
pub fn schedule_view(query_json: &str, now: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let query = parse_query(query_json)?;
    let now = parse_now(now)?;
    let config = parse_config(config_json)?;

    let slots = query.compute(now, &config).map_err(js_err)?;
    let window: Interval = query_window(now, &config);
    let entries = merge_schedule_view(&slots, &query.bookings, &window, &config);
    to_json(&entries)
}

/// Validate a weekly schedule before it is saved. Returns `{valid, errors}`.
#[wasm_bindgen(js_name = "validateSchedule")]
pub fn validate_schedule(schedule_json: &str) -> Result<String, JsValue> {
    let schedule: WeeklySchedule = serde_json::from_str(schedule_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid schedule JSON: {}", e)))?;

    let dto = match schedule.validate() {
        Ok(()) => ValidationDto {
            valid: true,
            errors: Vec::new(),
        },
        Err(errors) => ValidationDto {
            valid: false,
            errors: errors.iter().map(|e| e.to_string()).collect(),
        },
    };
    to_json(&dto)
}

/// Build a time-off override from `{time_zone, start_date, end_date, start_time?, end_time?, reason?}`.
#[wasm_bindgen(js_name = "buildTimeOff")]
pub fn build_time_off(input_json: &str) -> Result<String, JsValue> {
    let input: TimeOffInput = serde_json::from_str(input_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid time-off JSON: {}", e)))?;
    let tz = resolve_timezone(input.time_zone.as_deref()).map_err(js_err)?;
    let entry = Override::time_off(&input.request, &tz, SlotEngineConfig::default().dst_policy)
        .map_err(js_err)?;
    to_json(&entry)
}

/// The default Mon–Fri 09:00–17:00 schedule as JSON.
#[wasm_bindgen(js_name = "defaultSchedule")]
pub fn default_schedule() -> Result<String, JsValue> {
    to_json(&WeeklySchedule::default_working_week())
}
