//! Nominatim geocoding client

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::types::{Coordinates, ReverseAddress};

/// Nominatim search response entry
#[derive(Debug, Deserialize)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NominatimReverseResult {
    #[serde(default)]
    pub display_name: Option<String>,
    pub address: Option<ReverseAddress>,
    /// Set instead of an address when nothing lies near the point
    #[serde(default)]
    pub error: Option<String>,
}

/// Nominatim geocoding client
pub struct NominatimClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimClient {
    /// Create a new client whose requests give up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("eld_trip_planner/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    fn reverse_url(&self, coords: Coordinates) -> String {
        format!(
            "{}/reverse?lat={}&lon={}&format=json&addressdetails=1",
            self.base_url, coords.lat, coords.lng
        )
    }

    /// Geocode a free-text address to coordinates
    pub async fn geocode(&self, query: &str) -> Result<Option<Coordinates>> {
        let response = self.client
            .get(self.search_url(query))
            .send()
            .await
            .context("Failed to send geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding request failed with status {}", response.status());
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        match results.first() {
            Some(result) => {
                let lat: f64 = result.lat.parse().context("Invalid latitude")?;
                let lng: f64 = result.lon.parse().context("Invalid longitude")?;
                tracing::debug!("Geocoded '{}' to {}", query, result.display_name);
                Ok(Some(Coordinates { lat, lng }))
            }
            None => Ok(None),
        }
    }

    /// Reverse geocode coordinates to address components
    pub async fn reverse_geocode(&self, coords: Coordinates) -> Result<Option<ReverseAddress>> {
        let response = self.client
            .get(self.reverse_url(coords))
            .send()
            .await
            .context("Failed to send reverse geocoding request")?;

        if !response.status().is_success() {
            anyhow::bail!("Reverse geocoding request failed with status {}", response.status());
        }

        let result: NominatimReverseResult = response
            .json()
            .await
            .context("Failed to parse reverse geocoding response")?;

        if let Some(error) = result.error {
            tracing::debug!("No address near {},{}: {}", coords.lat, coords.lng, error);
            return Ok(None);
        }

        Ok(result.address)
    }
}
