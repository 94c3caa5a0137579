// src/services/yelp_client.rs
// DOCUMENTATION: Yelp Fusion API client
// PURPOSE: Nearby businesses with rating aggregates around a coordinate

use crate::errors::PlacesError;
use crate::models::CreateReviewRequest;
use crate::services::cache::{HttpTransport, RequestCache, ResponseFormat};
use crate::services::cache_key::QueryParams;
use serde::Deserialize;

pub struct YelpClient {
    /// Bearer token; sent as a header so it never reaches the cache key
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct YelpSearchResponse {
    #[serde(default)]
    pub businesses: Vec<YelpBusiness>,
    pub error: Option<YelpError>,
}

#[derive(Debug, Deserialize)]
pub struct YelpError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YelpBusiness {
    pub name: String,
    pub coordinates: YelpCoordinates,
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: i64,
    pub price: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YelpCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// An `error` object in the body is a provider failure
fn check_error(response: &YelpSearchResponse) -> Result<(), PlacesError> {
    match &response.error {
        None => Ok(()),
        Some(error) => {
            let msg = error.description.clone().unwrap_or_else(|| error.code.clone());
            log::error!("Yelp API error {}: {}", error.code, msg);
            Err(PlacesError::ExternalApiError(msg))
        }
    }
}

impl YelpClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.yelp.com/v3".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url }
    }

    pub fn search_url(&self) -> String {
        format!("{}/businesses/search", self.base_url)
    }

    /// Businesses near a coordinate
    /// DOCUMENTATION: Every result carries `search_term` (the place that was searched)
    /// so the store can link it back; businesses without coordinates are dropped
    pub async fn search_nearby<T: HttpTransport>(
        &self,
        cache: &mut RequestCache<T>,
        latitude: f64,
        longitude: f64,
        search_term: &str,
    ) -> Result<Vec<CreateReviewRequest>, PlacesError> {
        let mut params = QueryParams::new();
        params.insert("latitude".to_string(), latitude.to_string());
        params.insert("longitude".to_string(), longitude.to_string());
        let headers = [(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )];

        log::debug!("Yelp search: lat={}, lng={} for {}", latitude, longitude, search_term);

        let response: YelpSearchResponse = cache
            .fetch_as(&self.search_url(), Some(&params), &headers, ResponseFormat::Json, check_error)
            .await?;

        log::info!("Yelp search returned {} businesses", response.businesses.len());

        Ok(response
            .businesses
            .iter()
            .filter_map(|business| Self::to_create_request(business, search_term))
            .collect())
    }

    fn to_create_request(business: &YelpBusiness, search_term: &str) -> Option<CreateReviewRequest> {
        let (Some(latitude), Some(longitude)) =
            (business.coordinates.latitude, business.coordinates.longitude)
        else {
            log::debug!("Skipping {} without coordinates", business.name);
            return None;
        };

        Some(CreateReviewRequest {
            search_name: search_term.to_string(),
            name: business.name.clone(),
            latitude,
            longitude,
            rating: business.rating,
            review_count: business.review_count,
            price: business.price.clone(),
            url: business.url.clone(),
        })
    }
}
