//! Geographic calculations

use crate::types::Coordinates;

/// Earth radius in statute miles
const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle (haversine) distance between two points in miles
pub fn haversine_miles(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lng - from.lng).to_radians();

    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_MILES * c
}

/// Point at `fraction` of the way from `start` to `end`, interpolating
/// latitude and longitude linearly.
pub fn interpolate(start: &Coordinates, end: &Coordinates, fraction: f64) -> Coordinates {
    let fraction = fraction.clamp(0.0, 1.0);
    Coordinates {
        lat: start.lat + (end.lat - start.lat) * fraction,
        lng: start.lng + (end.lng - start.lng) * fraction,
    }
}

/// Hours needed to cover `miles` at `speed_mph`
pub fn driving_hours(miles: f64, speed_mph: f64) -> f64 {
    if speed_mph <= 0.0 {
        return 0.0;
    }
    miles / speed_mph
}
