//! Hours-of-Service and trip planning constants

use crate::error::ValidationError;

pub const AVERAGE_SPEED_MPH: f64 = 55.0;
pub const DRIVING_LIMIT_HOURS: f64 = 11.0;
pub const DUTY_LIMIT_HOURS: f64 = 14.0;
/// Driving hours after which a 30-minute break is required
pub const BREAK_AFTER_HOURS: f64 = 8.0;
pub const REST_PERIOD_HOURS: f64 = 10.0;
pub const FUEL_INTERVAL_MILES: f64 = 800.0;

pub const PICKUP_DROPOFF_MINUTES: i64 = 60;
pub const FUEL_STOP_MINUTES: i64 = 45;
pub const REST_BREAK_MINUTES: i64 = 30;

/// Forced stops are not inserted when less than this remains of a leg
pub const MIN_REMAINING_FOR_STOP_MILES: f64 = 50.0;

pub const UNKNOWN_LOCATION: &str = "Unknown location";

/// Regulatory and operational limits applied by the route planner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HosRules {
    pub average_speed_mph: f64,
    pub driving_limit_hours: f64,
    /// Modeled but not enforced by the planner.
    pub duty_limit_hours: f64,
    pub break_after_hours: f64,
    /// Modeled but not enforced by the planner.
    pub rest_period_hours: f64,
    pub fuel_interval_miles: f64,
    pub pickup_dropoff_minutes: i64,
    pub fuel_stop_minutes: i64,
    pub rest_break_minutes: i64,
    pub min_remaining_for_stop_miles: f64,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            average_speed_mph: AVERAGE_SPEED_MPH,
            driving_limit_hours: DRIVING_LIMIT_HOURS,
            duty_limit_hours: DUTY_LIMIT_HOURS,
            break_after_hours: BREAK_AFTER_HOURS,
            rest_period_hours: REST_PERIOD_HOURS,
            fuel_interval_miles: FUEL_INTERVAL_MILES,
            pickup_dropoff_minutes: PICKUP_DROPOFF_MINUTES,
            fuel_stop_minutes: FUEL_STOP_MINUTES,
            rest_break_minutes: REST_BREAK_MINUTES,
            min_remaining_for_stop_miles: MIN_REMAINING_FOR_STOP_MILES,
        }
    }
}

impl HosRules {
    /// Reject rules under which a forced stop could never move the driver.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("average_speed_mph", self.average_speed_mph),
            ("break_after_hours", self.break_after_hours),
            ("fuel_interval_miles", self.fuel_interval_miles),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidRules {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        if !(self.min_remaining_for_stop_miles.is_finite() && self.min_remaining_for_stop_miles >= 0.0) {
            return Err(ValidationError::InvalidRules {
                field: "min_remaining_for_stop_miles",
                reason: format!("must not be negative, got {}", self.min_remaining_for_stop_miles),
            });
        }

        let stays = [
            ("pickup_dropoff_minutes", self.pickup_dropoff_minutes),
            ("fuel_stop_minutes", self.fuel_stop_minutes),
            ("rest_break_minutes", self.rest_break_minutes),
        ];
        for (field, minutes) in stays {
            if minutes < 0 {
                return Err(ValidationError::InvalidRules {
                    field,
                    reason: format!("must not be negative, got {minutes}"),
                });
            }
        }

        Ok(())
    }
}
