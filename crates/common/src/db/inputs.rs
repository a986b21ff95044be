//! Write payloads
//!
//! `*Input` types are accepted on create and full update, `*Changes` on
//! partial update. Relations are referenced by id under the relation's
//! name (`country`, `source`, `airplane_type`, ...). Unknown fields,
//! including an airplane's `image`, are ignored.

use crate::timestamp;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CountryInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CountryChanges {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AirportInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub closest_big_city: String,

    #[serde(alias = "country_id")]
    pub country: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AirportChanges {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub closest_big_city: Option<String>,

    #[serde(alias = "country_id")]
    pub country: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RouteInput {
    #[serde(alias = "source_id")]
    pub source: i32,

    #[serde(alias = "destination_id")]
    pub destination: i32,

    #[validate(range(min = 1))]
    pub distance: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RouteChanges {
    #[serde(alias = "source_id")]
    pub source: Option<i32>,

    #[serde(alias = "destination_id")]
    pub destination: Option<i32>,

    #[validate(range(min = 1))]
    pub distance: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AirplaneTypeInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AirplaneTypeChanges {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AirplaneInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(range(min = 1))]
    pub rows: i32,

    #[validate(range(min = 1))]
    pub seats_in_row: i32,

    #[serde(alias = "airplane_type_id")]
    pub airplane_type: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AirplaneChanges {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[validate(range(min = 1))]
    pub rows: Option<i32>,

    #[validate(range(min = 1))]
    pub seats_in_row: Option<i32>,

    #[serde(alias = "airplane_type_id")]
    pub airplane_type: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CrewInput {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,

    #[validate(length(min = 1, max = 255))]
    pub last_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CrewChanges {
    #[validate(length(min = 1, max = 255))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
}

// ============================================================================
// Schedule
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FlightInput {
    #[serde(alias = "route_id")]
    pub route: i32,

    #[serde(alias = "airplane_id")]
    pub airplane: i32,

    /// Crew member ids; the link set is replaced as a whole
    #[serde(default)]
    pub crew: Vec<i32>,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub departure_time: DateTimeWithTimeZone,

    #[serde(deserialize_with = "timestamp::deserialize")]
    pub arrival_time: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct FlightChanges {
    #[serde(alias = "route_id")]
    pub route: Option<i32>,

    #[serde(alias = "airplane_id")]
    pub airplane: Option<i32>,

    pub crew: Option<Vec<i32>>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub departure_time: Option<DateTimeWithTimeZone>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub arrival_time: Option<DateTimeWithTimeZone>,
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderInput {
    #[validate(length(min = 1, message = "This list may not be empty."), nested)]
    pub tickets: Vec<TicketInput>,
}

/// Seat bounds depend on the flight's airplane and are checked by
/// `booking::validate_ticket`, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TicketInput {
    pub row: i32,

    pub seat: i32,

    #[serde(alias = "flight_id")]
    pub flight: i32,
}

// ============================================================================
// Full updates are partial updates that set every field
// ============================================================================

impl From<CountryInput> for CountryChanges {
    fn from(input: CountryInput) -> Self {
        Self { name: Some(input.name) }
    }
}

impl From<AirportInput> for AirportChanges {
    fn from(input: AirportInput) -> Self {
        Self {
            name: Some(input.name),
            closest_big_city: Some(input.closest_big_city),
            country: Some(input.country),
        }
    }
}

impl From<RouteInput> for RouteChanges {
    fn from(input: RouteInput) -> Self {
        Self {
            source: Some(input.source),
            destination: Some(input.destination),
            distance: Some(input.distance),
        }
    }
}

impl From<AirplaneTypeInput> for AirplaneTypeChanges {
    fn from(input: AirplaneTypeInput) -> Self {
        Self { name: Some(input.name) }
    }
}

impl From<AirplaneInput> for AirplaneChanges {
    fn from(input: AirplaneInput) -> Self {
        Self {
            name: Some(input.name),
            rows: Some(input.rows),
            seats_in_row: Some(input.seats_in_row),
            airplane_type: Some(input.airplane_type),
        }
    }
}

impl From<CrewInput> for CrewChanges {
    fn from(input: CrewInput) -> Self {
        Self {
            first_name: Some(input.first_name),
            last_name: Some(input.last_name),
        }
    }
}

impl From<FlightInput> for FlightChanges {
    fn from(input: FlightInput) -> Self {
        Self {
            route: Some(input.route),
            airplane: Some(input.airplane),
            crew: Some(input.crew),
            departure_time: Some(input.departure_time),
            arrival_time: Some(input.arrival_time),
        }
    }
}
