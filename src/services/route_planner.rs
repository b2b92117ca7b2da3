//! Hours-of-Service aware route planning.
//!
//! Walks the two legs of a trip (start -> pickup, pickup -> dropoff) along a
//! straight line at a constant average speed and inserts the stops the rules
//! force on the way:
//! - a 30 minute REST once 8 hours have been driven since the last break
//! - a 45 minute FUEL stop every 800 miles (second leg only)
//!
//! Each step of the walk is decided by [`next_stop`], a pure function of the
//! accumulated driving time, the distance since the last fuel stop and the
//! distance left on the leg.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::defaults::{HosRules, UNKNOWN_LOCATION};
use crate::error::ValidationError;
use crate::services::geo::{driving_hours, haversine_miles, interpolate};
use crate::services::geocoding::{GeocodingServices, Geocoder, ReverseGeocoder};
use crate::types::{Coordinates, PointType, ReverseAddress, RouteEvent};

/// Default upper bound for a single geocoder call
pub const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Distances below this are treated as zero
const DISTANCE_EPSILON_MILES: f64 = 1e-6;

/// What the driver does next on the current leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextStop {
    /// Drive to the end of the leg
    Arrive,
    Break { at_miles: f64 },
    Fuel { at_miles: f64 },
    /// Both triggers fall on the same spot; fuel is taken first
    FuelThenBreak { at_miles: f64 },
}

/// Decide the next forced stop on a leg.
///
/// `at_miles` is measured from the current position. A trigger only counts
/// when it falls before the end of the leg and more than the minimum
/// remaining distance is left. Of two triggers the nearer wins; the other
/// is reconsidered on the next step.
pub fn next_stop(
    rules: &HosRules,
    driving_since_break_hours: f64,
    distance_since_fuel_miles: f64,
    remaining_miles: f64,
    fuel_checked: bool,
) -> NextStop {
    if remaining_miles <= rules.min_remaining_for_stop_miles {
        return NextStop::Arrive;
    }

    let break_at = ((rules.break_after_hours - driving_since_break_hours) * rules.average_speed_mph).max(0.0);
    let fuel_at = (rules.fuel_interval_miles - distance_since_fuel_miles).max(0.0);

    let break_due = break_at < remaining_miles;
    let fuel_due = fuel_checked && fuel_at < remaining_miles;

    match (fuel_due, break_due) {
        (false, false) => NextStop::Arrive,
        (false, true) => NextStop::Break { at_miles: break_at },
        (true, false) => NextStop::Fuel { at_miles: fuel_at },
        (true, true) if (fuel_at - break_at).abs() <= DISTANCE_EPSILON_MILES => {
            NextStop::FuelThenBreak { at_miles: fuel_at.min(break_at) }
        }
        (true, true) if fuel_at < break_at => NextStop::Fuel { at_miles: fuel_at },
        (true, true) => NextStop::Break { at_miles: break_at },
    }
}

/// Label for a stop from reverse geocoded address parts:
/// "City, State", "City", or "Unknown location".
pub fn nearest_city_label(address: Option<&ReverseAddress>) -> String {
    let Some(address) = address else {
        return UNKNOWN_LOCATION.to_string();
    };

    match (address.settlement(), address.state.as_deref().map(str::trim)) {
        (Some(city), Some(state)) if !state.is_empty() => format!("{}, {}", city, state),
        (Some(city), _) => city.to_string(),
        (None, _) => UNKNOWN_LOCATION.to_string(),
    }
}

/// Route with the leg lengths it was built from
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub events: Vec<RouteEvent>,
    pub leg_miles: [f64; 2],
}

impl PlannedRoute {
    pub fn total_miles(&self) -> f64 {
        self.leg_miles.iter().sum()
    }
}

/// Position, time and rule accumulators, carried across both legs
#[derive(Debug, Clone, Copy)]
struct DriveState {
    position: Coordinates,
    clock: DateTime<Utc>,
    driving_since_break_hours: f64,
    distance_since_fuel_miles: f64,
}

fn hours_to_duration(hours: f64) -> chrono::Duration {
    chrono::Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

pub struct RoutePlanner {
    geocoder: std::sync::Arc<dyn Geocoder>,
    reverse: std::sync::Arc<dyn ReverseGeocoder>,
    rules: HosRules,
    timeout: Duration,
}

impl RoutePlanner {
    pub fn new(services: GeocodingServices) -> Self {
        Self {
            geocoder: services.geocoder,
            reverse: services.reverse,
            rules: HosRules::default(),
            timeout: DEFAULT_COLLABORATOR_TIMEOUT,
        }
    }

    pub fn with_rules(mut self, rules: HosRules) -> Result<Self, ValidationError> {
        rules.validate()?;
        self.rules = rules;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rules(&self) -> &HosRules {
        &self.rules
    }

    /// Ordered route events for the trip
    pub async fn plan(
        &self,
        current_location: &str,
        pickup_location: &str,
        dropoff_location: &str,
        current_cycle_hours: f64,
        start_time: DateTime<Utc>,
    ) -> Result<Vec<RouteEvent>, ValidationError> {
        self.plan_route(current_location, pickup_location, dropoff_location, current_cycle_hours, start_time)
            .await
            .map(|route| route.events)
    }

    /// Like [`RoutePlanner::plan`], also returning the leg lengths
    pub async fn plan_route(
        &self,
        current_location: &str,
        pickup_location: &str,
        dropoff_location: &str,
        current_cycle_hours: f64,
        start_time: DateTime<Utc>,
    ) -> Result<PlannedRoute, ValidationError> {
        let start = self.resolve(current_location).await;
        let pickup = self.resolve(pickup_location).await;
        let dropoff = self.resolve(dropoff_location).await;

        let leg_miles = [haversine_miles(&start, &pickup), haversine_miles(&pickup, &dropoff)];

        let remaining_drive_time = self.rules.driving_limit_hours - current_cycle_hours;
        info!(
            "Planning {} -> {} -> {}: legs {:.1} + {:.1} mi, {:.1}h driving left",
            current_location, pickup_location, dropoff_location, leg_miles[0], leg_miles[1], remaining_drive_time
        );

        let mut state = DriveState {
            position: start,
            clock: start_time,
            driving_since_break_hours: 0.0,
            distance_since_fuel_miles: 0.0,
        };
        // only cycle hours above the driving limit force a break at the start
        if remaining_drive_time < 0.0 {
            warn!(
                "Cycle hours {:.1} exceed the {}h driving limit, break due immediately",
                current_cycle_hours, self.rules.driving_limit_hours
            );
            state.driving_since_break_hours = self.rules.break_after_hours;
        }

        let mut events = vec![RouteEvent::new(PointType::Start, current_location, start, start_time, start_time)?];

        self.drive_leg(&mut state, pickup, leg_miles[0], false, &mut events).await?;

        let pickup_event = RouteEvent::with_stay(
            PointType::Pickup,
            pickup_location,
            pickup,
            state.clock,
            self.rules.pickup_dropoff_minutes,
        )?;
        state.clock = pickup_event.departure_time();
        events.push(pickup_event);

        self.drive_leg(&mut state, dropoff, leg_miles[1], true, &mut events).await?;

        events.push(RouteEvent::with_stay(
            PointType::Dropoff,
            dropoff_location,
            dropoff,
            state.clock,
            self.rules.pickup_dropoff_minutes,
        )?);

        debug!("Planned {} route events", events.len());
        Ok(PlannedRoute { events, leg_miles })
    }

    async fn drive_leg(
        &self,
        state: &mut DriveState,
        end: Coordinates,
        leg_miles: f64,
        fuel_checked: bool,
        events: &mut Vec<RouteEvent>,
    ) -> Result<(), ValidationError> {
        let mut covered = 0.0;
        let mut stops_in_place = 0;

        while leg_miles - covered > DISTANCE_EPSILON_MILES {
            let remaining = leg_miles - covered;
            let stop = next_stop(
                &self.rules,
                state.driving_since_break_hours,
                state.distance_since_fuel_miles,
                remaining,
                fuel_checked,
            );

            let (miles, fuel, rest) = match stop {
                NextStop::Arrive => (remaining, false, false),
                NextStop::Break { at_miles } => (at_miles, false, true),
                NextStop::Fuel { at_miles } => (at_miles, true, false),
                NextStop::FuelThenBreak { at_miles } => (at_miles, true, true),
            };

            self.advance(state, &end, miles, remaining);
            covered += miles;

            if stop == NextStop::Arrive {
                break;
            }

            if miles <= DISTANCE_EPSILON_MILES {
                stops_in_place += 1;
                if stops_in_place >= 2 {
                    warn!("Forced stops are not advancing, {:.1} mi left", remaining);
                    return Err(ValidationError::StalledLeg { remaining_miles: remaining });
                }
            } else {
                stops_in_place = 0;
            }

            let label = self.nearest_city(state.position).await;

            if fuel {
                let event = RouteEvent::with_stay(
                    PointType::Fuel,
                    format!("Fuel stop near {}", label),
                    state.position,
                    state.clock,
                    self.rules.fuel_stop_minutes,
                )?;
                debug!("Fuel stop at {} after {:.1} mi", event.arrival_time(), state.distance_since_fuel_miles);
                state.clock = event.departure_time();
                state.distance_since_fuel_miles = 0.0;
                events.push(event);
            }

            if rest {
                let event = RouteEvent::with_stay(
                    PointType::Rest,
                    format!("Rest stop near {}", label),
                    state.position,
                    state.clock,
                    self.rules.rest_break_minutes,
                )?;
                debug!("Rest break at {} after {:.2}h driving", event.arrival_time(), state.driving_since_break_hours);
                state.clock = event.departure_time();
                state.driving_since_break_hours = 0.0;
                events.push(event);
            }
        }

        state.position = end;
        Ok(())
    }

    /// Drive `miles` toward `end`, `remaining` being the distance left before moving.
    fn advance(&self, state: &mut DriveState, end: &Coordinates, miles: f64, remaining: f64) {
        let fraction = if remaining > 0.0 { miles / remaining } else { 1.0 };
        let hours = driving_hours(miles, self.rules.average_speed_mph);

        state.position = interpolate(&state.position, end, fraction);
        state.clock = state.clock + hours_to_duration(hours);
        state.driving_since_break_hours += hours;
        state.distance_since_fuel_miles += miles;
    }

    async fn with_deadline<T, F>(&self, what: &str, call: F) -> Option<T>
    where
        F: Future<Output = anyhow::Result<Option<T>>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!("{} failed: {:#}", what, e);
                None
            }
            Err(_) => {
                warn!("{} timed out after {:?}", what, self.timeout);
                None
            }
        }
    }

    /// Geocode, falling back to (0, 0)
    async fn resolve(&self, address: &str) -> Coordinates {
        let what = format!("Geocoding '{}'", address);
        match self.with_deadline(&what, self.geocoder.geocode(address)).await {
            Some(coords) => coords,
            None => {
                warn!("No coordinates for '{}', using (0, 0)", address);
                Coordinates::UNRESOLVED
            }
        }
    }

    async fn nearest_city(&self, coords: Coordinates) -> String {
        let what = format!("Reverse geocoding {:.4},{:.4}", coords.lat, coords.lng);
        let address = self.with_deadline(&what, self.reverse.reverse_geocode(coords)).await;
        nearest_city_label(address.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geocoding::MockGeocoder;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn start_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap()
    }

    fn planner() -> RoutePlanner {
        RoutePlanner::new(GeocodingServices::from_backend(MockGeocoder::new()))
    }

    /// Geocoder with a fixed table and no reverse results
    struct TableGeocoder(HashMap<&'static str, Coordinates>);

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinates>> {
            Ok(self.0.get(address).copied())
        }

        fn name(&self) -> &'static str {
            "table"
        }
    }

    #[async_trait]
    impl ReverseGeocoder for TableGeocoder {
        async fn reverse_geocode(&self, _coords: Coordinates) -> anyhow::Result<Option<ReverseAddress>> {
            Ok(None)
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl Geocoder for BrokenGeocoder {
        async fn geocode(&self, _address: &str) -> anyhow::Result<Option<Coordinates>> {
            anyhow::bail!("connection refused")
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    #[async_trait]
    impl ReverseGeocoder for BrokenGeocoder {
        async fn reverse_geocode(&self, _coords: Coordinates) -> anyhow::Result<Option<ReverseAddress>> {
            anyhow::bail!("connection refused")
        }
    }

    struct StalledGeocoder;

    #[async_trait]
    impl Geocoder for StalledGeocoder {
        async fn geocode(&self, _address: &str) -> anyhow::Result<Option<Coordinates>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Some(Coordinates::new(33.0, -112.0)))
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[async_trait]
    impl ReverseGeocoder for StalledGeocoder {
        async fn reverse_geocode(&self, _coords: Coordinates) -> anyhow::Result<Option<ReverseAddress>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }
    }

    fn count(events: &[RouteEvent], kind: PointType) -> usize {
        events.iter().filter(|e| e.point_type() == kind).count()
    }

    fn assert_well_ordered(events: &[RouteEvent]) {
        assert_eq!(events.first().map(RouteEvent::point_type), Some(PointType::Start));
        assert_eq!(events.last().map(RouteEvent::point_type), Some(PointType::Dropoff));
        assert_eq!(count(events, PointType::Pickup), 1);
        assert_eq!(count(events, PointType::Dropoff), 1);
        for pair in events.windows(2) {
            assert!(pair[0].arrival_time() <= pair[1].arrival_time(), "{:?} after {:?}", pair[0], pair[1]);
            assert!(pair[0].departure_time() <= pair[1].arrival_time());
        }
        for event in events {
            assert!(event.departure_time() >= event.arrival_time());
        }
    }

    // -----------------------------------------------------------------------
    // next_stop decision
    // -----------------------------------------------------------------------

    #[test]
    fn next_stop_arrives_when_leg_fits_in_budget() {
        let rules = HosRules::default();
        assert_eq!(next_stop(&rules, 0.0, 0.0, 370.0, true), NextStop::Arrive);
    }

    #[test]
    fn next_stop_breaks_at_eight_driving_hours() {
        let rules = HosRules::default();
        let stop = next_stop(&rules, 2.0, 0.0, 600.0, false);
        assert_eq!(stop, NextStop::Break { at_miles: 330.0 });
    }

    #[test]
    fn next_stop_never_fuels_on_first_leg() {
        let rules = HosRules::default();
        assert_eq!(next_stop(&rules, 0.0, 790.0, 300.0, false), NextStop::Arrive);
        assert_eq!(next_stop(&rules, 0.0, 790.0, 300.0, true), NextStop::Fuel { at_miles: 10.0 });
    }

    #[test]
    fn next_stop_picks_nearer_trigger_and_defers_the_other() {
        let rules = HosRules::default();
        // break at 110 mi, fuel at 300 mi
        assert_eq!(next_stop(&rules, 6.0, 500.0, 900.0, true), NextStop::Break { at_miles: 110.0 });
        // break at 440 mi, fuel at 100 mi
        assert_eq!(next_stop(&rules, 0.0, 700.0, 900.0, true), NextStop::Fuel { at_miles: 100.0 });
    }

    #[test]
    fn next_stop_fuels_before_break_at_the_same_spot() {
        let rules = HosRules::default();
        // break at 440 mi, fuel at 440 mi
        let stop = next_stop(&rules, 0.0, 360.0, 900.0, true);
        assert_eq!(stop, NextStop::FuelThenBreak { at_miles: 440.0 });
    }

    #[test]
    fn next_stop_skips_stops_near_leg_end() {
        let rules = HosRules::default();
        assert_eq!(next_stop(&rules, 7.9, 799.0, 50.0, true), NextStop::Arrive);
    }

    #[test]
    fn next_stop_breaks_immediately_when_over_limit() {
        let rules = HosRules::default();
        assert_eq!(next_stop(&rules, 9.0, 0.0, 200.0, false), NextStop::Break { at_miles: 0.0 });
    }

    // -----------------------------------------------------------------------
    // Labels
    // -----------------------------------------------------------------------

    #[test]
    fn label_joins_city_and_state() {
        let address = ReverseAddress {
            town: Some("Gila Bend".into()),
            state: Some("Arizona".into()),
            ..Default::default()
        };
        assert_eq!(nearest_city_label(Some(&address)), "Gila Bend, Arizona");
    }

    #[test]
    fn label_without_state_is_city_only() {
        let address = ReverseAddress { city: Some("Van Horn".into()), ..Default::default() };
        assert_eq!(nearest_city_label(Some(&address)), "Van Horn");
    }

    #[test]
    fn label_without_settlement_is_unknown() {
        let address = ReverseAddress { state: Some("Texas".into()), ..Default::default() };
        assert_eq!(nearest_city_label(Some(&address)), "Unknown location");
        assert_eq!(nearest_city_label(None), "Unknown location");
    }

    // -----------------------------------------------------------------------
    // Full plans
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn los_angeles_phoenix_dallas() {
        let route = planner()
            .plan_route("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 2.5, start_time())
            .await
            .unwrap();
        let events = &route.events;

        assert_well_ordered(events);
        assert_eq!(events[0].arrival_time(), start_time());
        assert_eq!(events[0].duration_minutes(), 0);

        let pickup_idx = events.iter().position(|e| e.point_type() == PointType::Pickup).unwrap();
        assert!(events[..pickup_idx].iter().all(|e| e.point_type() != PointType::Rest));
        assert_eq!(events[pickup_idx].duration_minutes(), 60);
        assert_eq!(events[pickup_idx].location(), "Phoenix, AZ");

        assert!(count(&events[pickup_idx..], PointType::Fuel) >= 1);
        assert_eq!(events.last().unwrap().duration_minutes(), 60);

        let kinds: Vec<PointType> = events.iter().map(RouteEvent::point_type).collect();
        assert_eq!(
            kinds,
            vec![
                PointType::Start,
                PointType::Pickup,
                PointType::Rest,
                PointType::Fuel,
                PointType::Rest,
                PointType::Dropoff,
            ]
        );
        assert!(events[3].location().starts_with("Fuel stop near "));
        assert!(route.total_miles() > 1200.0 && route.total_miles() < 1280.0);
    }

    #[tokio::test]
    async fn forced_stops_respect_break_and_fuel_cadence() {
        let rules = HosRules::default();
        let route = planner()
            .plan_route("Seattle, WA", "Los Angeles, CA", "Miami, FL", 0.0, start_time())
            .await
            .unwrap();
        assert_well_ordered(&route.events);

        // Driving time between consecutive events is arrival minus the
        // previous departure.
        let mut since_break = chrono::Duration::zero();
        let mut since_fuel_hours = 0.0;
        let mut after_pickup = false;
        for pair in route.events.windows(2) {
            let drive = pair[1].arrival_time() - pair[0].departure_time();
            since_break = since_break + drive;
            since_fuel_hours += drive.num_milliseconds() as f64 / 3_600_000.0;

            let limit = chrono::Duration::minutes((rules.break_after_hours * 60.0) as i64 + 1);
            assert!(since_break <= limit, "drove {since_break:?} without a break");

            if after_pickup {
                assert!(since_fuel_hours * rules.average_speed_mph <= rules.fuel_interval_miles + 1.0);
            }

            match pair[1].point_type() {
                PointType::Rest => since_break = chrono::Duration::zero(),
                PointType::Fuel => since_fuel_hours = 0.0,
                PointType::Pickup => {
                    // fuel is only enforced on the second leg
                    after_pickup = true;
                    since_fuel_hours = 0.0;
                }
                _ => {}
            }
        }
        assert!(count(&route.events, PointType::Fuel) >= 2);
    }

    #[tokio::test]
    async fn unresolvable_location_degrades_to_origin() {
        let route = planner()
            .plan_route("Atlantis", "Phoenix, AZ", "Dallas, TX", 0.0, start_time())
            .await
            .unwrap();

        assert_well_ordered(&route.events);
        assert_eq!(route.events[0].coordinates(), Coordinates::UNRESOLVED);
        assert!(route.leg_miles[0] > 5000.0);
    }

    #[tokio::test]
    async fn failing_collaborators_still_produce_a_plan() {
        let planner = RoutePlanner::new(GeocodingServices::from_backend(BrokenGeocoder));
        let events = planner
            .plan("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 2.5, start_time())
            .await
            .unwrap();

        let kinds: Vec<PointType> = events.iter().map(RouteEvent::point_type).collect();
        assert_eq!(kinds, vec![PointType::Start, PointType::Pickup, PointType::Dropoff]);
        assert!(events.iter().all(|e| e.coordinates() == Coordinates::UNRESOLVED));
        assert_eq!(events[2].arrival_time(), start_time() + chrono::Duration::minutes(60));
    }

    #[tokio::test]
    async fn stalled_collaborators_time_out() {
        let planner = RoutePlanner::new(GeocodingServices::from_backend(StalledGeocoder))
            .with_timeout(Duration::from_millis(20));
        let events = planner
            .plan("A", "B", "C", 0.0, start_time())
            .await
            .unwrap();
        assert_eq!(events.len(), 3);
    }

    #[tokio::test]
    async fn unknown_stop_location_is_labelled_unknown() {
        let table = TableGeocoder(HashMap::from([
            ("origin", Coordinates::new(35.0, -100.0)),
            ("far", Coordinates::new(35.0, -88.0)),
        ]));
        let events = RoutePlanner::new(GeocodingServices::from_backend(table))
            .plan("origin", "origin", "far", 0.0, start_time())
            .await
            .unwrap();

        let rest = events.iter().find(|e| e.point_type() == PointType::Rest).unwrap();
        assert_eq!(rest.location(), "Rest stop near Unknown location");
        assert_eq!(rest.duration_minutes(), 30);
    }

    #[tokio::test]
    async fn exhausted_cycle_hours_force_an_immediate_break() {
        let events = planner()
            .plan("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 12.0, start_time())
            .await
            .unwrap();

        assert_eq!(events[1].point_type(), PointType::Rest);
        assert_eq!(events[1].arrival_time(), start_time());
        assert_eq!(events[1].coordinates(), events[0].coordinates());
    }

    #[test]
    fn planning_is_deterministic_with_the_mock() {
        let plan = || {
            tokio_test::block_on(planner().plan("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 2.5, start_time()))
                .unwrap()
        };
        assert_eq!(plan(), plan());
    }

    #[test]
    fn hours_to_duration_rounds_to_milliseconds() {
        assert_eq!(hours_to_duration(1.5), chrono::Duration::minutes(90));
        assert_eq!(hours_to_duration(0.0), chrono::Duration::zero());
    }

    #[test]
    fn rules_are_configurable() {
        let rules = HosRules { fuel_interval_miles: 500.0, ..HosRules::default() };
        let planner = planner().with_rules(rules).unwrap();
        assert_eq!(planner.rules().fuel_interval_miles, 500.0);
    }

    #[test]
    fn rules_that_cannot_advance_are_refused() {
        let rules = HosRules { fuel_interval_miles: 0.0, ..HosRules::default() };
        let err = planner().with_rules(rules).err().unwrap();
        assert!(matches!(err, ValidationError::InvalidRules { field: "fuel_interval_miles", .. }));
    }

    #[tokio::test]
    async fn stalled_stops_end_the_plan_with_an_error() {
        // bypass validation to exercise the loop guard
        let mut planner = planner();
        planner.rules.fuel_interval_miles = 0.0;

        let result = tokio::time::timeout(
            Duration::from_secs(3),
            planner.plan("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 2.5, start_time()),
        )
        .await
        .expect("planning must terminate");

        assert!(matches!(result, Err(ValidationError::StalledLeg { .. })));
    }

    #[tokio::test]
    async fn cycle_hours_at_the_limit_do_not_force_a_start_break() {
        let events = planner()
            .plan("Los Angeles, CA", "Phoenix, AZ", "Dallas, TX", 11.0, start_time())
            .await
            .unwrap();

        assert_eq!(events[1].point_type(), PointType::Pickup);
    }
}
