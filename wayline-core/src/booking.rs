use crate::travel::TravelOption;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = BookingStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            _ => Err(BookingStatusParseError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown booking status: {0}")]
pub struct BookingStatusParseError(pub String);

/// A user's reservation against a travel option.
/// `unit_price_cents` is a snapshot of the option price at creation; the
/// total is derived from it once and never recomputed if the catalog price
/// changes later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub travel_option_id: Uuid,
    pub number_of_seats: i32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
    pub booking_date: DateTime<Utc>,
    pub status: BookingStatus,
}

impl Booking {
    /// Create a Confirmed booking, snapshotting the option's current price
    pub fn new(
        user_id: Uuid,
        option: &TravelOption,
        number_of_seats: i32,
    ) -> Result<Self, BookingError> {
        if number_of_seats < 1 {
            return Err(BookingError::InvalidSeatCount {
                got: number_of_seats,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            travel_option_id: option.id,
            number_of_seats,
            unit_price_cents: option.price_cents,
            total_price_cents: option.price_cents * number_of_seats as i64,
            booking_date: Utc::now(),
            status: BookingStatus::Confirmed,
        })
    }
}

/// Outcome of a cancellation request; re-cancelling is a no-op that callers
/// surface differently from a fresh cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
}

/// Per-user booking counters for the profile view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingStats {
    pub total: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Number of seats must be at least 1, got {got}")]
    InvalidSeatCount { got: i32 },
}
