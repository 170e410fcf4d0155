//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SlotError {
    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid shift on {day} #{index}: {reason}")]
    InvalidShift {
        day: String,
        index: usize,
        reason: String,
    },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Availability could not be verified")]
    Unverified,
}

pub type Result<T> = std::result::Result<T, SlotError>;
