//! Geocoding abstraction layer
//!
//! The route planner only sees the [`Geocoder`] and [`ReverseGeocoder`]
//! traits. Two backends implement both:
//! - [`MockGeocoder`]: offline gazetteer of US freight cities, deterministic
//! - [`RateLimitedNominatimGeocoder`]: Nominatim behind a request throttle and
//!   a circuit breaker
//!
//! The backend is picked by `GEOCODER_BACKEND` ("mock" or "nominatim").

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Config;
use crate::services::geo::haversine_miles;
use crate::services::nominatim::NominatimClient;
use crate::types::{Coordinates, ReverseAddress};

/// Address to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns `None` if the address cannot be found
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;

    /// Get the name of this geocoder implementation
    fn name(&self) -> &'static str;
}

/// Coordinates to address components
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    /// Returns `None` if nothing is known near the point
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<ReverseAddress>>;
}

/// Both collaborators, usually backed by the same service
#[derive(Clone)]
pub struct GeocodingServices {
    pub geocoder: Arc<dyn Geocoder>,
    pub reverse: Arc<dyn ReverseGeocoder>,
}

impl GeocodingServices {
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: Geocoder + ReverseGeocoder + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            geocoder: backend.clone(),
            reverse: backend,
        }
    }
}

// ==========================================================================
// MockGeocoder
// ==========================================================================

struct Place {
    city: &'static str,
    state: &'static str,
    abbr: &'static str,
    lat: f64,
    lng: f64,
}

const fn place(city: &'static str, state: &'static str, abbr: &'static str, lat: f64, lng: f64) -> Place {
    Place { city, state, abbr, lat, lng }
}

const GAZETTEER: &[Place] = &[
    place("Los Angeles", "California", "CA", 34.0522, -118.2437),
    place("San Diego", "California", "CA", 32.7157, -117.1611),
    place("San Francisco", "California", "CA", 37.7749, -122.4194),
    place("Sacramento", "California", "CA", 38.5816, -121.4944),
    place("Blythe", "California", "CA", 33.6103, -114.5964),
    place("Phoenix", "Arizona", "AZ", 33.4484, -112.0740),
    place("Tucson", "Arizona", "AZ", 32.2226, -110.9747),
    place("Flagstaff", "Arizona", "AZ", 35.1983, -111.6513),
    place("Las Vegas", "Nevada", "NV", 36.1699, -115.1398),
    place("Albuquerque", "New Mexico", "NM", 35.0844, -106.6504),
    place("Las Cruces", "New Mexico", "NM", 32.3199, -106.7637),
    place("Lordsburg", "New Mexico", "NM", 32.3504, -108.7087),
    place("El Paso", "Texas", "TX", 31.7619, -106.4850),
    place("Midland", "Texas", "TX", 31.9974, -102.0779),
    place("Abilene", "Texas", "TX", 32.4487, -99.7331),
    place("Amarillo", "Texas", "TX", 35.2220, -101.8313),
    place("Dallas", "Texas", "TX", 32.7767, -96.7970),
    place("Fort Worth", "Texas", "TX", 32.7555, -97.3308),
    place("Houston", "Texas", "TX", 29.7604, -95.3698),
    place("San Antonio", "Texas", "TX", 29.4241, -98.4936),
    place("Austin", "Texas", "TX", 30.2672, -97.7431),
    place("Oklahoma City", "Oklahoma", "OK", 35.4676, -97.5164),
    place("Denver", "Colorado", "CO", 39.7392, -104.9903),
    place("Salt Lake City", "Utah", "UT", 40.7608, -111.8910),
    place("Kansas City", "Missouri", "MO", 39.0997, -94.5786),
    place("St. Louis", "Missouri", "MO", 38.6270, -90.1994),
    place("Memphis", "Tennessee", "TN", 35.1495, -90.0490),
    place("Nashville", "Tennessee", "TN", 36.1627, -86.7816),
    place("Atlanta", "Georgia", "GA", 33.7490, -84.3880),
    place("Chicago", "Illinois", "IL", 41.8781, -87.6298),
    place("Seattle", "Washington", "WA", 47.6062, -122.3321),
    place("Portland", "Oregon", "OR", 45.5152, -122.6784),
    place("New York", "New York", "NY", 40.7128, -74.0060),
    place("Miami", "Florida", "FL", 25.7617, -80.1918),
];

/// Reverse lookups farther than this from every known city find nothing
const MOCK_REVERSE_RADIUS_MILES: f64 = 120.0;

/// Deterministic offline geocoder for tests and development.
///
/// Knows a fixed list of US cities, matched by "City", "City, ST" or
/// "City, State" (case-insensitive). Anything else is not found.
pub struct MockGeocoder;

impl MockGeocoder {
    pub fn new() -> Self {
        Self
    }

    fn lookup(address: &str) -> Option<&'static Place> {
        let normalized = address.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        GAZETTEER.iter().find(|p| {
            let city = p.city.to_lowercase();
            normalized == city
                || normalized == format!("{}, {}", city, p.abbr.to_lowercase())
                || normalized == format!("{}, {}", city, p.state.to_lowercase())
        })
    }

    fn nearest(coords: &Coordinates) -> Option<&'static Place> {
        GAZETTEER
            .iter()
            .map(|p| (p, haversine_miles(coords, &Coordinates::new(p.lat, p.lng))))
            .filter(|(_, miles)| *miles <= MOCK_REVERSE_RADIUS_MILES)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p)
    }
}

impl Default for MockGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        Ok(Self::lookup(address).map(|p| Coordinates::new(p.lat, p.lng)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[async_trait]
impl ReverseGeocoder for MockGeocoder {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<ReverseAddress>> {
        Ok(Self::nearest(&coords).map(|p| ReverseAddress {
            city: Some(p.city.to_string()),
            state: Some(p.state.to_string()),
            ..Default::default()
        }))
    }
}

// ==========================================================================
// Request throttle
// ==========================================================================

/// Spaces calls at least `min_interval` apart. Callers queue on the lock.
pub struct RequestThrottle {
    last_call: tokio::sync::Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_call: tokio::sync::Mutex::new(None),
            min_interval,
        }
    }

    /// Wait until another call is allowed, then claim the slot
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

// ==========================================================================
// Circuit breaker
// ==========================================================================

#[derive(Default)]
struct BreakerState {
    consecutive_failures: u32,
    last_failure: Option<Instant>,
}

/// Stops calling a failing service until `recovery_time` has passed
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    recovery_time: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, recovery_time: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold,
            recovery_time,
        }
    }

    /// Open means calls are currently refused. After the recovery time one
    /// trial call is let through (half-open).
    pub fn is_open(&self) -> bool {
        let state = self.state.lock();
        if state.consecutive_failures < self.threshold {
            return false;
        }
        match state.last_failure {
            Some(at) => at.elapsed() < self.recovery_time,
            None => false,
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures += 1;
        state.last_failure = Some(Instant::now());
    }

    pub fn record_success(&self) {
        let mut state = self.state.lock();
        state.consecutive_failures = 0;
        state.last_failure = None;
    }
}

// ==========================================================================
// RateLimitedNominatimGeocoder
// ==========================================================================

/// Nominatim client behind a throttle and a circuit breaker
pub struct RateLimitedNominatimGeocoder {
    client: NominatimClient,
    throttle: RequestThrottle,
    pub(crate) circuit_breaker: CircuitBreaker,
}

impl RateLimitedNominatimGeocoder {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            client: NominatimClient::new(&config.nominatim_url, config.geocoder_timeout)?,
            throttle: RequestThrottle::new(config.nominatim_rate_limit),
            circuit_breaker: CircuitBreaker::new(
                config.nominatim_cb_threshold,
                config.nominatim_cb_recovery,
            ),
        })
    }

    async fn guarded<T, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        if self.circuit_breaker.is_open() {
            tracing::warn!("Circuit breaker is open, rejecting geocoding request");
            anyhow::bail!("Geocoding service temporarily unavailable (circuit breaker open)");
        }

        self.throttle.acquire().await;

        match call.await {
            Ok(value) => {
                self.circuit_breaker.record_success();
                Ok(value)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                tracing::error!("Geocoding failed: {:#}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl Geocoder for RateLimitedNominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        self.guarded(self.client.geocode(address)).await
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

#[async_trait]
impl ReverseGeocoder for RateLimitedNominatimGeocoder {
    async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<ReverseAddress>> {
        self.guarded(self.client.reverse_geocode(coords)).await
    }
}

// ==========================================================================
// Factory
// ==========================================================================

/// Build the configured geocoding backend
pub fn create_geocoding(config: &Config) -> Result<GeocodingServices> {
    match config.geocoder_backend.as_str() {
        "mock" => {
            tracing::info!("Using MockGeocoder");
            Ok(GeocodingServices::from_backend(MockGeocoder::new()))
        }
        "nominatim" => {
            tracing::info!("Using RateLimitedNominatimGeocoder at {}", config.nominatim_url);
            Ok(GeocodingServices::from_backend(RateLimitedNominatimGeocoder::from_config(config)?))
        }
        other => {
            tracing::warn!("Unknown GEOCODER_BACKEND '{}', using mock", other);
            Ok(GeocodingServices::from_backend(MockGeocoder::new()))
        }
    }
}
