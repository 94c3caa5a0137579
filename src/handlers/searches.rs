// src/handlers/searches.rs
// DOCUMENTATION: HTTP handlers for the search pipeline and the request cache
// PURPOSE: Serialize searches through the shared cache, expose cache statistics

use crate::errors::PlacesError;
use crate::models::SearchRequest;
use crate::services::{HttpTransport, ProviderClients, RequestCache, SearchService};
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use validator::Validate;

/// Shared search state
/// DOCUMENTATION: The request cache rewrites its file on every miss, so searches
/// hold the lock for their whole run; one search at a time per process
pub struct SearchState<T: HttpTransport> {
    pub cache: Mutex<RequestCache<T>>,
    pub clients: ProviderClients,
    pub fetch_review_photos: bool,
}

impl<T: HttpTransport> SearchState<T> {
    pub fn new(cache: RequestCache<T>, clients: ProviderClients, fetch_review_photos: bool) -> Self {
        Self {
            cache: Mutex::new(cache),
            clients,
            fetch_review_photos,
        }
    }
}

/// POST /searches
/// Run a search; 201 when providers were queried, 200 when the store answered
pub async fn create_search<T: HttpTransport + 'static>(
    pool: web::Data<SqlitePool>,
    state: web::Data<SearchState<T>>,
    req: web::Json<SearchRequest>,
) -> Result<impl Responder, PlacesError> {
    if let Err(e) = req.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }

    let mut cache = state.cache.lock().await;
    let result = SearchService::search(
        pool.get_ref(),
        &mut *cache,
        &state.clients,
        &req.term,
        state.fetch_review_photos,
    )
    .await?;

    if result.stats.from_store {
        Ok(HttpResponse::Ok().json(result))
    } else {
        Ok(HttpResponse::Created().json(result))
    }
}

/// GET /cache/stats
pub async fn cache_stats<T: HttpTransport + 'static>(
    state: web::Data<SearchState<T>>,
) -> Result<impl Responder, PlacesError> {
    let cache = state.cache.lock().await;
    Ok(HttpResponse::Ok().json(cache.stats()))
}

/// Configuration for search and cache routes
pub fn config<T: HttpTransport + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/searches", web::post().to(create_search::<T>))
        .route("/cache/stats", web::get().to(cache_stats::<T>));
}
