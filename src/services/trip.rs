//! Trip planning pipeline: route, then duty logs.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::services::duty_log::DutyLogPartitioner;
use crate::services::route_planner::{PlannedRoute, RoutePlanner};
use crate::types::{DutyDayLog, PointType, RouteEvent, TripPlan, TripRequest, TripSummary};

pub struct TripPlanner {
    route_planner: RoutePlanner,
    partitioner: DutyLogPartitioner,
}

impl TripPlanner {
    pub fn new(route_planner: RoutePlanner, partitioner: DutyLogPartitioner) -> Self {
        Self {
            route_planner,
            partitioner,
        }
    }

    /// Plan the route and generate the duty logs for one trip
    pub async fn plan_trip(
        &self,
        request: TripRequest,
        start_time: DateTime<Utc>,
    ) -> Result<TripPlan, ValidationError> {
        let trip_id = Uuid::new_v4();

        let route = self
            .route_planner
            .plan_route(
                &request.current_location,
                &request.pickup_location,
                &request.dropoff_location,
                request.current_cycle_hours,
                start_time,
            )
            .await?;

        let duty_logs = self.partitioner.partition(&route.events);
        let summary = summarize(&route, &duty_logs);

        info!(
            "Trip {} planned: {} events, {} log days, {:.0} mi, {} rest / {} fuel stops",
            trip_id,
            route.events.len(),
            duty_logs.len(),
            summary.total_distance_miles,
            summary.rest_stops,
            summary.fuel_stops
        );

        Ok(TripPlan {
            trip_id,
            request,
            route_events: route.events,
            duty_logs,
            summary,
        })
    }
}

fn count(events: &[RouteEvent], kind: PointType) -> usize {
    events.iter().filter(|e| e.point_type() == kind).count()
}

/// Headline figures for a planned route and its logs
pub fn summarize(route: &PlannedRoute, logs: &[DutyDayLog]) -> TripSummary {
    let events = &route.events;

    let total_duration_minutes = match (events.first(), events.last()) {
        (Some(first), Some(last)) => (last.departure_time() - first.departure_time()).num_minutes(),
        _ => 0,
    };

    let driving_minutes = events
        .windows(2)
        .map(|pair| (pair[1].arrival_time() - pair[0].departure_time()).num_minutes().max(0))
        .sum();

    TripSummary {
        total_distance_miles: route.total_miles(),
        total_duration_minutes,
        driving_minutes,
        rest_stops: count(events, PointType::Rest),
        fuel_stops: count(events, PointType::Fuel),
        log_days: logs.len(),
    }
}
