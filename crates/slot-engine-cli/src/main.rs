//! `slots` CLI — compute and inspect doctor availability from a JSON data file.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable slots for one doctor over the next 7 days
//! slots slots --data clinic.json --doctor doc-123
//!
//! # Pin the clock and tune the engine
//! slots --config engine.json slots --data clinic.json --doctor doc-123 --now 2024-01-01T08:00:00Z
//!
//! # The doctor's merged calendar (free + booked)
//! slots view --data clinic.json --doctor doc-123
//!
//! # Check a weekly schedule before saving it
//! slots validate -i schedule.json
//!
//! # Turn local time-off dates into a UTC override row
//! slots time-off --zone America/New_York --from 2024-07-01 --to 2024-07-03
//!
//! # Print the default Mon-Fri 09:00-17:00 schedule
//! slots default-schedule
//! ```
//!
//! Logs go to stderr and honor `RUST_LOG`; stdout carries JSON only.

use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use slot_engine::{
    get_doctor_slots, get_schedule_view, parse_instant, resolve_timezone, CivilTime,
    InMemoryDirectory, Override, SlotEngineConfig, TimeOffRequest, WeeklySchedule,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "slots", version, about = "Doctor availability slot engine CLI")]
struct Cli {
    /// Engine configuration JSON (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print bookable slots as `{"slots": [...], "error": null}`
    Slots {
        /// Directory JSON with doctors, overrides, and appointments
        #[arg(short, long)]
        data: String,
        /// Doctor id to compute slots for
        #[arg(long)]
        doctor: String,
        /// Current instant (ISO 8601); defaults to the system clock
        #[arg(long)]
        now: Option<String>,
    },
    /// Print the doctor's merged schedule (free slots and bookings)
    View {
        #[arg(short, long)]
        data: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        now: Option<String>,
    },
    /// Validate a weekly schedule JSON
    Validate {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Build a time-off override from local dates in the doctor's zone
    TimeOff {
        /// IANA zone of the doctor (UTC when omitted)
        #[arg(long)]
        zone: Option<String>,
        /// First day off (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,
        /// Last day off (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
        /// Start time on the first day (HH:MM); start of day when omitted
        #[arg(long)]
        start_time: Option<String>,
        /// End time on the last day (HH:MM); end of day when omitted
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Print the default working week
    DefaultSchedule,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("slot_engine=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Slots { data, doctor, now } => {
            let directory = load_directory(&data)?;
            let now = resolve_now(now.as_deref())?;
            let response = get_doctor_slots(&directory, &doctor, now, &config);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::View { data, doctor, now } => {
            let directory = load_directory(&data)?;
            let now = resolve_now(now.as_deref())?;
            let view = get_schedule_view(&directory, &doctor, now, &config)
                .with_context(|| format!("Failed to build schedule for doctor '{}'", doctor))?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Validate { input } => {
            let json = read_input(input.as_deref())?;
            let schedule: WeeklySchedule =
                serde_json::from_str(&json).context("Failed to parse weekly schedule JSON")?;
            match schedule.validate() {
                Ok(()) => println!("OK"),
                Err(errors) => {
                    for e in &errors {
                        eprintln!("{}", e);
                    }
                    process::exit(1);
                }
            }
        }
        Commands::TimeOff {
            zone,
            from,
            to,
            start_time,
            end_time,
            reason,
        } => {
            let tz = resolve_timezone(zone.as_deref())?;
            let request = TimeOffRequest {
                start_date: from,
                end_date: to,
                start_time: parse_civil(start_time.as_deref())?,
                end_time: parse_civil(end_time.as_deref())?,
                reason,
            };
            let entry = Override::time_off(&request, &tz, config.dst_policy)?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        Commands::DefaultSchedule => {
            println!(
                "{}",
                serde_json::to_string_pretty(&WeeklySchedule::default_working_week())?
            );
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<SlotEngineConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            SlotEngineConfig::from_json(&json).with_context(|| format!("Invalid config: {}", path))
        }
        None => Ok(SlotEngineConfig::default()),
    }
}

fn load_directory(path: &str) -> Result<InMemoryDirectory> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path))?;
    InMemoryDirectory::from_json(&json).with_context(|| format!("Invalid data file: {}", path))
}

fn resolve_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(raw) => parse_instant(raw).with_context(|| format!("Invalid --now: {}", raw)),
        None => Ok(Utc::now()),
    }
}

fn parse_civil(raw: Option<&str>) -> Result<Option<CivilTime>> {
    raw.map(|s| s.parse::<CivilTime>())
        .transpose()
        .context("Invalid time of day")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
