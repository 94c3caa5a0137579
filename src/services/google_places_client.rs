// src/services/google_places_client.rs
// DOCUMENTATION: Google Places API client
// PURPOSE: Text search for a place name, routed through the request cache

use crate::errors::PlacesError;
use crate::models::CreatePlaceRequest;
use crate::services::cache::{HttpTransport, RequestCache, ResponseFormat};
use crate::services::cache_key::QueryParams;
use serde::{Deserialize, Serialize};

/// Google Places API client
/// DOCUMENTATION: Holds the API key; every request goes through the caller's cache
pub struct GooglePlacesClient {
    /// Google Places API key (sent as `key`, left out of cache keys)
    api_key: String,
    /// Base URL for Google Places API
    base_url: String,
}

/// Response from Google Places Text Search
#[derive(Debug, Deserialize, Serialize)]
pub struct GoogleTextSearchResponse {
    /// Results array from API
    #[serde(default)]
    pub results: Vec<GooglePlace>,
    /// Status of the API call
    pub status: String,
    /// Error message (if status is not OK)
    pub error_message: Option<String>,
}

/// Individual place from Google Places API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GooglePlace {
    /// Place name
    pub name: String,
    /// Geographic location
    pub geometry: GoogleGeometry,
    /// Rating (0-5), absent for unrated places
    pub rating: Option<f64>,
}

/// Geographic location from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleGeometry {
    /// Location coordinates
    pub location: GoogleLocation,
}

/// Coordinates from Google
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GoogleLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

/// Accept OK and ZERO_RESULTS; anything else is a provider failure
fn check_status(response: &GoogleTextSearchResponse) -> Result<(), PlacesError> {
    match response.status.as_str() {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => {
            let msg = response
                .error_message
                .clone()
                .unwrap_or_else(|| format!("Unknown status: {}", other));
            log::error!("Google Places API status {}: {}", other, msg);
            Err(PlacesError::ExternalApiError(msg))
        }
    }
}

impl GooglePlacesClient {
    /// Create new Google Places API client
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://maps.googleapis.com/maps/api/place".to_string())
    }

    /// Client against another endpoint (tests, proxies)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url }
    }

    /// URL of the text search endpoint
    pub fn text_search_url(&self) -> String {
        format!("{}/textsearch/json", self.base_url)
    }

    /// Search places matching a free-text term
    /// DOCUMENTATION: One page of results, each normalized to a CreatePlaceRequest
    ///
    /// # Arguments
    /// * `cache` - Request cache the call is routed through
    /// * `term` - What the user typed, e.g. "Yosemite National Park"
    ///
    /// # Returns
    /// Places in provider order; empty when Google finds nothing
    pub async fn text_search<T: HttpTransport>(
        &self,
        cache: &mut RequestCache<T>,
        term: &str,
    ) -> Result<Vec<CreatePlaceRequest>, PlacesError> {
        let url = self.text_search_url();

        let mut params = QueryParams::new();
        params.insert("query".to_string(), term.to_string());
        params.insert("key".to_string(), self.api_key.clone());

        log::debug!("Google Places text search: query={}", term);

        let api_response: GoogleTextSearchResponse = cache
            .fetch_as(&url, Some(&params), &[], ResponseFormat::Json, check_status)
            .await?;

        if api_response.results.is_empty() {
            log::info!("No place found in Google Place Search for {}", term);
        } else {
            log::info!(
                "Google Places search returned {} results",
                api_response.results.len()
            );
        }
        Ok(api_response
            .results
            .iter()
            .map(|place| self.to_create_request(place))
            .collect())
    }

    /// Convert GooglePlace to CreatePlaceRequest
    pub fn to_create_request(&self, google_place: &GooglePlace) -> CreatePlaceRequest {
        CreatePlaceRequest {
            name: google_place.name.clone(),
            latitude: google_place.geometry.location.lat,
            longitude: google_place.geometry.location.lng,
            rating: google_place.rating,
        }
    }
}
