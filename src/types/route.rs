//! Route event types

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::error::ValidationError;

/// Kind of a point along the planned route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointType {
    Start,
    Pickup,
    Rest,
    Fuel,
    Dropoff,
}

impl PointType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PointType::Start => "START",
            PointType::Pickup => "PICKUP",
            PointType::Rest => "REST",
            PointType::Fuel => "FUEL",
            PointType::Dropoff => "DROPOFF",
        }
    }

    /// Duty status the driver is in while stopped at this point.
    /// `None` for the trip start, which has no activity of its own.
    pub const fn duty_status(self) -> Option<DutyStatus> {
        match self {
            PointType::Pickup | PointType::Dropoff | PointType::Fuel => Some(DutyStatus::OnDuty),
            PointType::Rest => Some(DutyStatus::OffDuty),
            PointType::Start => None,
        }
    }
}

impl std::fmt::Display for PointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duty status recorded in an ELD log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OffDuty,
    SleeperBerth,
    Driving,
    OnDuty,
}

/// A timestamped stop on the planned route.
///
/// Only constructible through [`RouteEvent::new`] (or deserialization, which
/// goes through the same check), so `departure_time >= arrival_time` always
/// holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRouteEvent")]
pub struct RouteEvent {
    point_type: PointType,
    location: String,
    latitude: f64,
    longitude: f64,
    arrival_time: DateTime<Utc>,
    departure_time: DateTime<Utc>,
    /// Minutes spent at the point
    duration: i64,
}

impl RouteEvent {
    pub fn new(
        point_type: PointType,
        location: impl Into<String>,
        coordinates: Coordinates,
        arrival_time: DateTime<Utc>,
        departure_time: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if departure_time < arrival_time {
            return Err(ValidationError::DepartureBeforeArrival {
                arrival: arrival_time,
                departure: departure_time,
            });
        }

        Ok(Self {
            point_type,
            location: location.into(),
            latitude: coordinates.lat,
            longitude: coordinates.lng,
            arrival_time,
            departure_time,
            duration: (departure_time - arrival_time).num_minutes(),
        })
    }

    /// Event that starts at `arrival_time` and lasts `minutes`.
    pub fn with_stay(
        point_type: PointType,
        location: impl Into<String>,
        coordinates: Coordinates,
        arrival_time: DateTime<Utc>,
        minutes: i64,
    ) -> Result<Self, ValidationError> {
        let departure = arrival_time + chrono::Duration::minutes(minutes);
        Self::new(point_type, location, coordinates, arrival_time, departure)
    }

    pub fn point_type(&self) -> PointType {
        self.point_type
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn arrival_time(&self) -> DateTime<Utc> {
        self.arrival_time
    }

    pub fn departure_time(&self) -> DateTime<Utc> {
        self.departure_time
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration
    }
}

/// Wire shape accepted for route events before validation.
///
/// Timestamps may be naive; a missing departure means the point had no stay.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRouteEvent {
    #[serde(alias = "point_type")]
    point_type: PointType,
    location: String,
    latitude: f64,
    longitude: f64,
    #[serde(alias = "arrival_time")]
    arrival_time: String,
    #[serde(default, alias = "departure_time")]
    departure_time: Option<String>,
}

impl TryFrom<RawRouteEvent> for RouteEvent {
    type Error = ValidationError;

    fn try_from(raw: RawRouteEvent) -> Result<Self, Self::Error> {
        let arrival = parse_timestamp(&raw.arrival_time)?;
        let departure = match raw.departure_time.as_deref() {
            Some(value) => parse_timestamp(value)?,
            None => arrival,
        };

        RouteEvent::new(
            raw.point_type,
            raw.location,
            Coordinates::new(raw.latitude, raw.longitude),
            arrival,
            departure,
        )
    }
}

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an RFC 3339 timestamp, coercing naive values to UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Ok(aware.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ValidationError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn new_derives_duration_in_minutes() {
        let event = RouteEvent::new(PointType::Fuel, "Fuel stop", Coordinates::new(1.0, 2.0), at(10, 0), at(10, 45)).unwrap();
        assert_eq!(event.duration_minutes(), 45);
        assert_eq!(event.coordinates(), Coordinates::new(1.0, 2.0));
    }

    #[test]
    fn new_rejects_departure_before_arrival() {
        let err = RouteEvent::new(PointType::Rest, "Rest", Coordinates::UNRESOLVED, at(10, 0), at(9, 59)).unwrap_err();
        assert!(matches!(err, ValidationError::DepartureBeforeArrival { .. }));
    }

    #[test]
    fn new_accepts_zero_length_stay() {
        let event = RouteEvent::new(PointType::Start, "LA", Coordinates::UNRESOLVED, at(8, 0), at(8, 0)).unwrap();
        assert_eq!(event.duration_minutes(), 0);
    }

    #[test]
    fn point_type_maps_to_duty_status() {
        assert_eq!(PointType::Pickup.duty_status(), Some(DutyStatus::OnDuty));
        assert_eq!(PointType::Dropoff.duty_status(), Some(DutyStatus::OnDuty));
        assert_eq!(PointType::Fuel.duty_status(), Some(DutyStatus::OnDuty));
        assert_eq!(PointType::Rest.duty_status(), Some(DutyStatus::OffDuty));
        assert_eq!(PointType::Start.duty_status(), None);
    }

    #[test]
    fn point_type_serializes_screaming_case() {
        assert_eq!(serde_json::to_value(PointType::Dropoff).unwrap(), "DROPOFF");
        assert_eq!(PointType::Pickup.to_string(), "PICKUP");
    }

    #[test]
    fn deserialize_coerces_naive_timestamps_to_utc() {
        let json = r#"{
            "point_type": "REST",
            "location": "Rest stop near Tucson, Arizona",
            "latitude": 32.2,
            "longitude": -110.9,
            "arrival_time": "2025-03-14T23:55:00",
            "departure_time": "2025-03-15T00:10:00"
        }"#;
        let event: RouteEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.arrival_time(), at(23, 55));
        assert_eq!(event.duration_minutes(), 15);
    }

    #[test]
    fn deserialize_defaults_missing_departure_to_arrival() {
        let json = r#"{"pointType":"START","location":"LA","latitude":0,"longitude":0,"arrivalTime":"2025-03-14T08:00:00Z"}"#;
        let event: RouteEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.departure_time(), event.arrival_time());
    }

    #[test]
    fn deserialize_rejects_inverted_times() {
        let json = r#"{"pointType":"FUEL","location":"x","latitude":0,"longitude":0,
            "arrivalTime":"2025-03-14T08:00:00Z","departureTime":"2025-03-14T07:00:00Z"}"#;
        let err = serde_json::from_str::<RouteEvent>(json).unwrap_err();
        assert!(err.to_string().contains("precedes arrival"));
    }

    #[test]
    fn serialized_event_reads_back() {
        let event = RouteEvent::with_stay(PointType::Pickup, "Phoenix, AZ", Coordinates::new(33.45, -112.07), at(14, 30), 60).unwrap();
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"duration\":60"));
        let back: RouteEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn parse_timestamp_honours_offsets() {
        let parsed = parse_timestamp("2025-03-14T10:00:00-07:00").unwrap();
        assert_eq!(parsed, at(17, 0));
        assert!(parse_timestamp("yesterday").is_err());
    }
}
