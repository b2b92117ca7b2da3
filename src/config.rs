//! Configuration management

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;

use crate::error::ValidationError;

const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Default minimum interval between Nominatim calls (public instance allows 1 req/s)
const DEFAULT_RATE_LIMIT_MS: u64 = 1500;
const DEFAULT_CB_THRESHOLD: u32 = 3;
const DEFAULT_CB_RECOVERY_SECS: u64 = 300;
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// "mock" or "nominatim"
    pub geocoder_backend: String,

    /// Nominatim API URL
    pub nominatim_url: String,

    pub nominatim_rate_limit: Duration,
    pub nominatim_cb_threshold: u32,
    pub nominatim_cb_recovery: Duration,

    /// Per-request timeout for geocoding calls
    pub geocoder_timeout: Duration,

    /// Timezone the duty logs are written in
    pub log_utc_offset: FixedOffset,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let geocoder_backend = std::env::var("GEOCODER_BACKEND")
            .unwrap_or_else(|_| "mock".to_string());

        let nominatim_url = std::env::var("NOMINATIM_URL")
            .unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string());

        let rate_limit_ms = env_number("NOMINATIM_RATE_LIMIT_MS", DEFAULT_RATE_LIMIT_MS)?;
        let cb_threshold = env_number("NOMINATIM_CB_THRESHOLD", DEFAULT_CB_THRESHOLD)?;
        let cb_recovery_secs = env_number("NOMINATIM_CB_RECOVERY_SECS", DEFAULT_CB_RECOVERY_SECS)?;
        let timeout_secs = env_number("GEOCODER_TIMEOUT_SECS", DEFAULT_GEOCODER_TIMEOUT_SECS)?;
        let offset_minutes = env_number("LOG_UTC_OFFSET_MINUTES", 0i32)?;

        Ok(Self {
            geocoder_backend,
            nominatim_url,
            nominatim_rate_limit: Duration::from_millis(rate_limit_ms),
            nominatim_cb_threshold: cb_threshold,
            nominatim_cb_recovery: Duration::from_secs(cb_recovery_secs),
            geocoder_timeout: Duration::from_secs(timeout_secs),
            log_utc_offset: utc_offset(offset_minutes)?,
        })
    }
}

fn env_number<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Fixed offset east of UTC, in minutes
pub fn utc_offset(minutes: i32) -> Result<FixedOffset, ValidationError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(ValidationError::InvalidUtcOffset(minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_offset_accepts_us_central() {
        let offset = utc_offset(-360).unwrap();
        assert_eq!(offset.local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn utc_offset_rejects_more_than_a_day() {
        assert_eq!(utc_offset(24 * 60), Err(ValidationError::InvalidUtcOffset(1440)));
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_defaults() {
        std::env::remove_var("GEOCODER_BACKEND");
        std::env::remove_var("NOMINATIM_URL");
        std::env::remove_var("LOG_UTC_OFFSET_MINUTES");

        let config = Config::from_env().unwrap();
        assert_eq!(config.geocoder_backend, "mock");
        assert_eq!(config.nominatim_url, DEFAULT_NOMINATIM_URL);
        assert_eq!(config.nominatim_rate_limit, Duration::from_millis(1500));
        assert_eq!(config.log_utc_offset.local_minus_utc(), 0);
    }

    #[test]
    #[ignore] // requires --test-threads=1 due to env var race
    fn test_config_rejects_non_numeric_timeout() {
        std::env::set_var("GEOCODER_TIMEOUT_SECS", "soon");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("GEOCODER_TIMEOUT_SECS"));

        std::env::remove_var("GEOCODER_TIMEOUT_SECS");
    }
}
