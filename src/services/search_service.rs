// src/services/search_service.rs
// DOCUMENTATION: User search pipeline
// PURPOSE: Resolve a place name from the store, or fetch it with its surroundings from the providers

use crate::config::Config;
use crate::db::{PhotoRepository, PlaceRepository, ReviewRepository};
use crate::errors::PlacesError;
use crate::models::{CreatePlaceRequest, OutcomeCounts, OwnerRef, PhotoOrigin, Place};
use crate::services::cache::{HttpTransport, RequestCache};
use crate::services::{FlickrClient, GooglePlacesClient, YelpClient};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// The three provider adapters a search talks to
pub struct ProviderClients {
    pub google: GooglePlacesClient,
    pub yelp: YelpClient,
    pub flickr: FlickrClient,
}

impl ProviderClients {
    pub fn from_config(config: &Config) -> Self {
        Self {
            google: GooglePlacesClient::new(config.google_places_api_key.clone()),
            yelp: YelpClient::new(config.yelp_api_key.clone()),
            flickr: FlickrClient::new(config.flickr_api_key.clone()),
        }
    }
}

/// Search statistics
/// DOCUMENTATION: Tracks what one search stored, skipped and rejected
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    /// Term that was searched
    pub term: String,
    /// True when the place was already stored and no provider was asked
    pub from_store: bool,
    pub places: OutcomeCounts,
    pub reviews: OutcomeCounts,
    pub photos: OutcomeCounts,
    /// Request cache hits during this search
    pub cache_hits: u64,
    /// Request cache misses (network calls) during this search
    pub cache_misses: u64,
    /// Provider failures that did not abort the search
    pub errors: Vec<String>,
    /// Timestamp when search started
    pub started_at: String,
    /// Timestamp when search completed
    pub completed_at: Option<String>,
}

impl SearchStats {
    pub fn new(term: String) -> Self {
        Self {
            term,
            from_store: false,
            places: OutcomeCounts::default(),
            reviews: OutcomeCounts::default(),
            photos: OutcomeCounts::default(),
            cache_hits: 0,
            cache_misses: 0,
            errors: Vec::new(),
            started_at: Utc::now().to_rfc3339(),
            completed_at: None,
        }
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now().to_rfc3339());
    }

    fn record_error(&mut self, msg: String) {
        log::warn!("{}", msg);
        self.errors.push(msg);
    }
}

/// Places a search resolved to, with what it cost
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub places: Vec<Place>,
    pub stats: SearchStats,
}

pub struct SearchService;

impl SearchService {
    /// Run a user search
    /// DOCUMENTATION: Main pipeline
    ///
    /// Process:
    /// 1. Look the term up in the store by exact name; a hit ends the search
    /// 2. Google text search, insert every place (first write wins)
    /// 3. For each stored place: Yelp businesses and Flickr photos nearby,
    ///    linked by the place id
    /// 4. Optionally Flickr photos around every stored business, linked by review id
    ///
    /// Yelp and Flickr failures land in `stats.errors`; a Google failure is returned.
    ///
    /// # Arguments
    /// * `pool` - Local store
    /// * `cache` - Request cache every provider call goes through
    /// * `clients` - Provider adapters
    /// * `term` - Place name typed by the user
    /// * `fetch_review_photos` - Also search photos around each business
    pub async fn search<T: HttpTransport>(
        pool: &SqlitePool,
        cache: &mut RequestCache<T>,
        clients: &ProviderClients,
        term: &str,
        fetch_review_photos: bool,
    ) -> Result<SearchResult, PlacesError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(PlacesError::InvalidInput("Search term is empty".to_string()));
        }

        let mut stats = SearchStats::new(term.to_string());
        let before = cache.stats();

        if let Some(place) = PlaceRepository::find_by_name(pool, term).await? {
            log::info!("{} is already stored (id {})", term, place.id);
            stats.from_store = true;
            stats.complete();
            return Ok(SearchResult {
                places: vec![place],
                stats,
            });
        }

        log::info!("Starting search for: {}", term);

        let requests = clients.google.text_search(cache, term).await?;
        let outcomes = PlaceRepository::insert_places(pool, &requests).await?;
        stats.places = OutcomeCounts::tally(&outcomes);

        let mut places = Vec::with_capacity(requests.len());
        let mut handled = HashSet::new();
        for (req, outcome) in requests.iter().zip(&outcomes) {
            let Some(place_id) = outcome.id() else {
                continue;
            };
            // Google may list the same name twice; both outcomes point at one row
            if !handled.insert(place_id) {
                log::debug!("Place {} already handled for {}", place_id, term);
                continue;
            }

            Self::collect_surroundings(pool, cache, clients, req, place_id, &mut stats).await?;

            if fetch_review_photos {
                Self::collect_review_photos(pool, cache, clients, &req.name, &mut stats).await?;
            }

            places.push(PlaceRepository::get_by_id(pool, place_id).await?);
        }

        let after = cache.stats();
        stats.cache_hits = after.hits - before.hits;
        stats.cache_misses = after.misses - before.misses;
        stats.complete();

        log::info!(
            "Search for {} completed: {} places, {} reviews, {} photos stored, {} errors",
            term,
            stats.places.inserted,
            stats.reviews.inserted,
            stats.photos.inserted,
            stats.errors.len()
        );

        Ok(SearchResult { places, stats })
    }

    /// Yelp businesses and Flickr photos around one stored place
    async fn collect_surroundings<T: HttpTransport>(
        pool: &SqlitePool,
        cache: &mut RequestCache<T>,
        clients: &ProviderClients,
        place: &CreatePlaceRequest,
        place_id: i64,
        stats: &mut SearchStats,
    ) -> Result<(), PlacesError> {
        match clients
            .yelp
            .search_nearby(cache, place.latitude, place.longitude, &place.name)
            .await
        {
            Ok(reviews) => {
                let outcomes =
                    ReviewRepository::insert_reviews(pool, &reviews, OwnerRef::Id(place_id)).await?;
                stats.reviews.add(OutcomeCounts::tally(&outcomes));
            }
            Err(e) => stats.record_error(format!("Yelp search for {} failed: {}", place.name, e)),
        }

        match clients
            .flickr
            .search_photos(cache, place.latitude, place.longitude, &place.name, PhotoOrigin::Place)
            .await
        {
            Ok(photos) => {
                let outcomes =
                    PhotoRepository::insert_photos(pool, &photos, OwnerRef::Id(place_id)).await?;
                stats.photos.add(OutcomeCounts::tally(&outcomes));
            }
            Err(e) => stats.record_error(format!("Flickr search for {} failed: {}", place.name, e)),
        }

        Ok(())
    }

    /// Flickr photos around every business stored for a place
    async fn collect_review_photos<T: HttpTransport>(
        pool: &SqlitePool,
        cache: &mut RequestCache<T>,
        clients: &ProviderClients,
        place_name: &str,
        stats: &mut SearchStats,
    ) -> Result<(), PlacesError> {
        for review in ReviewRepository::list_for(pool, place_name).await? {
            match clients
                .flickr
                .search_photos(cache, review.latitude, review.longitude, &review.name, PhotoOrigin::Review)
                .await
            {
                Ok(photos) => {
                    let outcomes =
                        PhotoRepository::insert_photos(pool, &photos, OwnerRef::Id(review.id)).await?;
                    stats.photos.add(OutcomeCounts::tally(&outcomes));
                }
                Err(e) => {
                    stats.record_error(format!("Flickr search for {} failed: {}", review.name, e))
                }
            }
        }
        Ok(())
    }
}
