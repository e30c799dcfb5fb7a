use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::MapboxConfig;
use crate::types::{CampgroundError, Geometry};

/// Location candidate returned by a geocoder
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeCandidate {
    /// Full name of the matched place, when the geocoder reports one
    #[serde(default)]
    pub place_name: Option<String>,
    /// Coordinates of the match
    pub geometry: Geometry,
}

/// Trait for forward geocoding implementations
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves a free-text address into at most `limit` candidates, best first
    async fn forward_geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<GeocodeCandidate>, CampgroundError>;
}

#[derive(Debug, Deserialize)]
struct MapboxResponse {
    #[serde(default)]
    features: Vec<GeocodeCandidate>,
}

/// Client for the Mapbox forward geocoding API
pub struct MapboxGeocoder {
    client: Client,
    base_url: String,
    access_token: String,
}

impl MapboxGeocoder {
    /// Create a new Mapbox geocoding client
    pub fn new(config: &MapboxConfig) -> Result<Self, CampgroundError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| {
                CampgroundError::ExternalService(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn places_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward_geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<GeocodeCandidate>, CampgroundError> {
        debug!("Geocoding '{}' (limit {})", query, limit);

        let response = self
            .client
            .get(self.places_url(query))
            .query(&[
                ("access_token", self.access_token.clone()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CampgroundError::ExternalService(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(CampgroundError::ExternalService(format!(
                "Geocoding returned HTTP {}",
                response.status()
            )));
        }

        let body: MapboxResponse = response.json().await.map_err(|e| {
            CampgroundError::ExternalService(format!("Failed to parse geocoding response: {}", e))
        })?;

        debug!("Geocoding '{}' returned {} features", query, body.features.len());
        Ok(body.features)
    }
}

/// Mock geocoder for development/testing. Holds no per-call state.
pub struct MockGeocoder {
    candidates: Vec<GeocodeCandidate>,
}

impl MockGeocoder {
    /// Geocoder that answers every query with `candidates`, truncated to the limit
    pub fn returning(candidates: Vec<GeocodeCandidate>) -> Self {
        Self { candidates }
    }

    /// Geocoder that resolves every query to the same point
    pub fn fixed(geometry: Geometry) -> Self {
        Self::returning(vec![GeocodeCandidate {
            place_name: None,
            geometry,
        }])
    }

    /// Geocoder that never finds anything
    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn forward_geocode(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<GeocodeCandidate>, CampgroundError> {
        info!("🗺️ [MOCK GEOCODER] Query: {} (limit {})", query, limit);

        Ok(self
            .candidates
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
