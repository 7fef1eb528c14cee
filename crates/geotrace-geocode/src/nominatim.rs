//! Nominatim-compatible reverse geocoding client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use geotrace_core::{defaults, GeocodeError, GpsCoordinate, ReverseGeocoder};

use crate::config::GeocodeConfig;

/// Subset of the `/reverse` response body that geotrace reads.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    /// Set by Nominatim when nothing lies near the position, e.g. open sea.
    #[serde(default)]
    error: Option<String>,
}

/// Reverse geocoder speaking the Nominatim `/reverse` protocol.
pub struct NominatimClient {
    client: Client,
    base_url: String,
    zoom: u8,
}

impl NominatimClient {
    /// Create a client from configuration.
    ///
    /// The configured timeout becomes the client-wide ceiling; callers may
    /// pass a shorter one per request.
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| GeocodeError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            zoom = config.zoom,
            user_agent = %config.user_agent,
            "Initializing reverse geocoder"
        );

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            zoom: config.zoom,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query(&self, coordinate: &GpsCoordinate) -> [(&'static str, String); 5] {
        [
            ("format", "json".to_string()),
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("zoom", self.zoom.to_string()),
            ("addressdetails", defaults::GEOCODE_ADDRESS_DETAILS.to_string()),
        ]
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    #[instrument(skip(self), fields(subsystem = "geocode", op = "reverse"))]
    async fn reverse_geocode(
        &self,
        coordinate: GpsCoordinate,
        timeout: Duration,
    ) -> Result<String, GeocodeError> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query(&coordinate))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Reverse geocode request failed");
                GeocodeError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Reverse geocode service returned an error");
            return Err(GeocodeError::Unavailable(format!(
                "service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let body = response.text().await.map_err(GeocodeError::from)?;
        let parsed: ReverseResponse = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let duration_ms = start.elapsed().as_millis() as u64;
        match parsed.display_name.map(|s| s.trim().to_string()) {
            Some(name) if !name.is_empty() => {
                debug!(duration_ms, "Reverse geocode resolved");
                Ok(name)
            }
            _ => {
                debug!(
                    duration_ms,
                    service_error = parsed.error.as_deref().unwrap_or(""),
                    "Reverse geocode returned no display name"
                );
                Err(GeocodeError::NotFound)
            }
        }
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}
