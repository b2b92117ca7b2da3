//! Business logic services

pub mod duty_log;
pub mod geo;
pub mod geocoding;
pub mod nominatim;
pub mod route_planner;
pub mod trip;
