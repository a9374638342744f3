//! Google Geocoding API adapter

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use slotline_core::calendar_ports::GeocodingPort;
use slotline_domain::{Coordinates, GeocodingConfig, Result, SchedulingError};
use tracing::{debug, instrument};

use crate::http::HttpClient;

/// Resolves free-text addresses to coordinates.
pub struct GoogleGeocoder {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl GoogleGeocoder {
    pub fn new(http: HttpClient, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into(), api_key: api_key.into() }
    }

    /// `None` when geocoding is disabled or no key is configured.
    pub fn from_config(http: HttpClient, config: &GeocodingConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key.clone()?;
        Some(Self::new(http, config.api_base_url.clone(), api_key))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinates,
}

#[async_trait]
impl GeocodingPort for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn geocode(&self, location: &str) -> Result<Option<Coordinates>> {
        let request = self
            .http
            .request(Method::GET, &self.base_url)
            .query(&[("address", location), ("key", self.api_key.as_str())]);

        let response = self.http.send_checked(request, "geocode").await?;
        let payload: GeocodeResponse = response.json().await.map_err(|e| {
            SchedulingError::Upstream(format!("Failed to parse geocode response: {e}"))
        })?;

        match payload.status.as_str() {
            "OK" => {
                let coordinates = payload.results.into_iter().next().map(|r| r.geometry.location);
                debug!(found = coordinates.is_some(), "geocoded location");
                Ok(coordinates)
            }
            "ZERO_RESULTS" => Ok(None),
            status => Err(SchedulingError::Upstream(format!(
                "geocoder returned {status}: {}",
                payload.error_message.unwrap_or_default()
            ))),
        }
    }
}
