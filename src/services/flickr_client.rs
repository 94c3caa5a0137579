// src/services/flickr_client.rs
// DOCUMENTATION: Flickr API client
// PURPOSE: Photos taken around a coordinate; responses arrive wrapped in jsonFlickrApi(...)

use crate::errors::PlacesError;
use crate::models::{CreatePhotoRequest, PhotoOrigin};
use crate::services::cache::{HttpTransport, RequestCache, ResponseFormat};
use crate::services::cache_key::QueryParams;
use serde::Deserialize;
use serde_json::Value;

pub struct FlickrClient {
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct FlickrSearchResponse {
    pub photos: Option<FlickrPhotoPage>,
    pub stat: String,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlickrPhotoPage {
    #[serde(default)]
    pub photo: Vec<FlickrPhoto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlickrPhoto {
    pub id: String,
    /// Number in the API, kept as text in the store
    pub farm: Value,
    pub server: String,
    pub secret: String,
    pub title: Option<String>,
}

fn check_stat(response: &FlickrSearchResponse) -> Result<(), PlacesError> {
    if response.stat == "ok" {
        return Ok(());
    }
    let msg = response
        .message
        .clone()
        .unwrap_or_else(|| format!("Unknown status: {}", response.stat));
    log::error!("Flickr API error: {}", msg);
    Err(PlacesError::ExternalApiError(msg))
}

impl FlickrClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.flickr.com/services/rest/".to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Photos taken near a coordinate
    /// DOCUMENTATION: `origin` tells the store which table owns `search_term`
    pub async fn search_photos<T: HttpTransport>(
        &self,
        cache: &mut RequestCache<T>,
        latitude: f64,
        longitude: f64,
        search_term: &str,
        origin: PhotoOrigin,
    ) -> Result<Vec<CreatePhotoRequest>, PlacesError> {
        let mut params = QueryParams::new();
        params.insert("method".to_string(), "flickr.photos.search".to_string());
        params.insert("api_key".to_string(), self.api_key.clone());
        params.insert("format".to_string(), "json".to_string());
        params.insert("lat".to_string(), latitude.to_string());
        params.insert("lon".to_string(), longitude.to_string());
        params.insert("tag_mode".to_string(), "all".to_string());

        log::debug!("Flickr search: lat={}, lon={} for {}", latitude, longitude, search_term);

        let response: FlickrSearchResponse = cache
            .fetch_as(&self.base_url, Some(&params), &[], ResponseFormat::WrappedJson, check_stat)
            .await?;

        let photos = response.photos.map(|page| page.photo).unwrap_or_default();
        log::info!("Flickr search returned {} photos", photos.len());

        Ok(photos
            .iter()
            .map(|photo| Self::to_create_request(photo, search_term, origin))
            .collect())
    }

    fn to_create_request(photo: &FlickrPhoto, search_term: &str, origin: PhotoOrigin) -> CreatePhotoRequest {
        let farm_id = match &photo.farm {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        CreatePhotoRequest {
            search_name: search_term.to_string(),
            origin,
            title: photo.title.clone().filter(|t| !t.trim().is_empty()),
            farm_id,
            server_id: photo.server.clone(),
            photo_id: photo.id.clone(),
            secret: photo.secret.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cache::testing::ScriptedTransport;
    use tempfile::TempDir;

    const SEARCH: &str = r#"jsonFlickrApi({"photos": {"page": 1, "pages": 1, "perpage": 250, "photo": [
        {"id": "4001", "owner": "x@N00", "secret": "aa11", "server": "65535", "farm": 66, "title": "Half Dome"},
        {"id": "4002", "owner": "y@N00", "secret": "bb22", "server": "65535", "farm": 66, "title": ""}
    ]}, "stat": "ok"})"#;

    #[tokio::test]
    async fn test_search_photos_unwraps_and_normalizes() {
        let dir = TempDir::new().unwrap();
        let client = FlickrClient::with_base_url("k".into(), "https://flickr.test/rest/".into());
        let transport = ScriptedTransport::new().with(client.base_url(), SEARCH);
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);

        let photos = client
            .search_photos(&mut cache, 37.86, -119.53, "Yosemite National Park", PhotoOrigin::Place)
            .await
            .unwrap();

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].farm_id, "66");
        assert_eq!(photos[0].title.as_deref(), Some("Half Dome"));
        assert_eq!(photos[1].title, None);
        assert_eq!(
            photos[0].display_url(),
            "https://farm66.staticflickr.com/65535/4001_aa11_h.jpg"
        );
        assert!(photos.iter().all(|p| p.origin == PhotoOrigin::Place));
    }

    #[tokio::test]
    async fn test_failed_stat_is_an_error() {
        let dir = TempDir::new().unwrap();
        let client = FlickrClient::with_base_url("k".into(), "https://flickr.test/rest/".into());
        let transport = ScriptedTransport::new().with(
            client.base_url(),
            r#"jsonFlickrApi({"stat": "fail", "code": 100, "message": "Invalid API Key"})"#,
        );
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);

        let err = client
            .search_photos(&mut cache, 0.0, 0.0, "Anywhere", PhotoOrigin::Place)
            .await
            .unwrap_err();
        assert!(matches!(err, PlacesError::ExternalApiError(ref m) if m == "Invalid API Key"));
    }

    #[tokio::test]
    async fn test_failed_stat_is_not_cached() {
        let dir = TempDir::new().unwrap();
        let client = FlickrClient::with_base_url("k".into(), "https://flickr.test/rest/".into());
        let transport = ScriptedTransport::new().with(
            client.base_url(),
            r#"jsonFlickrApi({"stat": "fail", "code": 100, "message": "Invalid API Key"})"#,
        );
        let mut cache = RequestCache::load(dir.path().join("cache.json"), transport);

        for _ in 0..2 {
            assert!(client
                .search_photos(&mut cache, 0.0, 0.0, "Anywhere", PhotoOrigin::Place)
                .await
                .is_err());
        }

        assert!(cache.is_empty());
        assert_eq!(cache.transport().calls(), 2);
    }
}
