use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::models::StoreConfig;
use crate::utils::geo::{classify_distance, haversine_miles, AddressClassification};

/// Client for the external geocoding API. The provider is opaque: a GET
/// returning `{"results": [{"lat": .., "lng": ..}]}`, best match first.
#[derive(Clone)]
pub struct GeocodingService {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub success: bool,
    pub valid: bool,
    pub classification: AddressClassification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl GeocodingService {
    pub fn new(config: &AppConfig) -> Self {
        info!("Geocoding client using {}", config.geocoding_base_url);
        Self {
            base_url: config.geocoding_base_url.clone(),
            api_key: config.geocoding_api_key.clone(),
            client: Client::new(),
        }
    }

    /// Best-match coordinates for a free-text address, or None when the
    /// provider has no result for it. Provider failures surface as plain
    /// messages; `validate_address` folds them into an invalid result.
    pub async fn geocode(&self, address: &str) -> Result<Option<(f64, f64)>, String> {
        let url = format!("{}/geocode", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| format!("Geocoding request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Geocoding API returned HTTP {}", response.status()));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse geocoding response: {}", e))?;

        Ok(body.results.first().map(|hit| (hit.lat, hit.lng)))
    }

    /// Geocodes and classifies an address against the store's service
    /// radius. A provider failure or no-match is reported as an invalid
    /// address, not an error: the frontend uses this to block submission.
    pub async fn validate_address(&self, address: &str, store: &StoreConfig) -> AddressValidation {
        let coords = match self.geocode(address).await {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                info!("Address did not geocode: {}", address);
                return AddressValidation {
                    success: false,
                    valid: false,
                    classification: AddressClassification::Invalid,
                    distance_miles: None,
                };
            }
            Err(e) => {
                error!("Address validation failed: {}", e);
                return AddressValidation {
                    success: false,
                    valid: false,
                    classification: AddressClassification::Invalid,
                    distance_miles: None,
                };
            }
        };

        let distance =
            haversine_miles(store.latitude, store.longitude, coords.0, coords.1);
        let classification = classify_distance(distance, store.service_radius_miles);
        AddressValidation {
            success: true,
            valid: classification == AddressClassification::Valid,
            classification,
            distance_miles: Some(distance),
        }
    }
}
