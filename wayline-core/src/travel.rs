use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Transport modes in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelType {
    Flight,
    Train,
    Bus,
}

impl TravelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelType::Flight => "FLIGHT",
            TravelType::Train => "TRAIN",
            TravelType::Bus => "BUS",
        }
    }
}

impl fmt::Display for TravelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelType {
    type Err = TravelTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FLIGHT" => Ok(TravelType::Flight),
            "TRAIN" => Ok(TravelType::Train),
            "BUS" => Ok(TravelType::Bus),
            _ => Err(TravelTypeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown travel type: {0}")]
pub struct TravelTypeParseError(pub String);

/// A bookable unit of transport with fixed capacity and price.
/// Prices are integer minor units (cents); `available_seats` never goes
/// negative (enforced at the store layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelOption {
    pub id: Uuid,
    pub travel_type: TravelType,
    pub source: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub price_cents: i64,
    pub available_seats: i32,
}

impl TravelOption {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        travel_type: TravelType,
        source: impl Into<String>,
        destination: impl Into<String>,
        departure_time: DateTime<Utc>,
        arrival_time: DateTime<Utc>,
        price_cents: i64,
        available_seats: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            travel_type,
            source: source.into(),
            destination: destination.into(),
            departure_time,
            arrival_time,
            price_cents,
            available_seats,
        }
    }

    /// Travel duration from departure to arrival
    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_travel_type_round_trip() {
        for t in [TravelType::Flight, TravelType::Train, TravelType::Bus] {
            let parsed: TravelType = t.as_str().parse().expect("Failed to parse");
            assert_eq!(parsed, t);
        }

        // The search form submits mixed-case values
        assert_eq!("Flight".parse::<TravelType>().unwrap(), TravelType::Flight);
        assert!("boat".parse::<TravelType>().is_err());
    }

    #[test]
    fn test_travel_type_serde_tags() {
        let json = serde_json::to_string(&TravelType::Train).unwrap();
        assert_eq!(json, r#""TRAIN""#);
    }

    #[test]
    fn test_duration() {
        let departure = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let arrival = Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap();
        let option = TravelOption::new(
            TravelType::Flight,
            "Lisbon",
            "Paris",
            departure,
            arrival,
            12_900,
            180,
        );

        let duration = option.duration();
        assert_eq!(duration.num_hours(), 2);
        assert_eq!(duration.num_minutes() % 60, 30);
    }
}
