//! Trip request and plan types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DutyDayLog, RouteEvent};

/// Trip to plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    /// Hours already driven toward the 11-hour limit
    pub current_cycle_hours: f64,
}

/// Complete result of planning one trip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub trip_id: Uuid,
    pub request: TripRequest,
    pub route_events: Vec<RouteEvent>,
    pub duty_logs: Vec<DutyDayLog>,
    pub summary: TripSummary,
}

/// Headline figures for a planned trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub total_distance_miles: f64,
    /// From leaving the start point to leaving the dropoff
    pub total_duration_minutes: i64,
    pub driving_minutes: i64,
    pub rest_stops: usize,
    pub fuel_stops: usize,
    pub log_days: usize,
}
