// src/handlers/places.rs
// DOCUMENTATION: HTTP handlers for the read API
// PURPOSE: Parse requests, call PlaceService, return responses

use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::SampleQuery;
use crate::services::PlaceService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::SqlitePool;
use validator::Validate;

/// Photos returned by /photos/sample when no count is given
const DEFAULT_PHOTO_SAMPLE: u32 = 10;

fn sample_count(query: &SampleQuery, default: u32) -> Result<u32, PlacesError> {
    if let Err(e) = query.validate() {
        return Err(PlacesError::ValidationError(e.to_string()));
    }
    Ok(query.count.unwrap_or(default))
}

/// GET /places/sample?count=
/// Random stored places (clamped to what is stored)
pub async fn sample_places(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    query: web::Query<SampleQuery>,
) -> Result<impl Responder, PlacesError> {
    let count = sample_count(&query, config.sample_size)?;
    let places = PlaceService::sample_places(pool.get_ref(), count).await?;
    Ok(HttpResponse::Ok().json(places))
}

/// GET /places/{name}
pub async fn get_place(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let place = PlaceService::find_place(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// GET /places/{name}/reviews
/// Nearby businesses in insertion order
pub async fn get_reviews(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let reviews = PlaceService::nearby(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// GET /places/{name}/ratings
pub async fn get_ratings(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let ranked = PlaceService::ranked_ratings(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ranked))
}

/// GET /places/{name}/photos
pub async fn get_photos(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let links = PlaceService::photo_links(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(links))
}

/// GET /places/{name}/photos/sample?count=
pub async fn sample_photos(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    query: web::Query<SampleQuery>,
) -> Result<impl Responder, PlacesError> {
    let count = sample_count(&query, DEFAULT_PHOTO_SAMPLE)?;
    let links = PlaceService::sample_photos(pool.get_ref(), &path.into_inner(), count).await?;
    Ok(HttpResponse::Ok().json(links))
}

/// GET /places/{name}/bounds
/// 404 when nothing was found around the place
pub async fn get_bounds(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let name = path.into_inner();
    let bounds = PlaceService::map_bounds(pool.get_ref(), &name)
        .await?
        .ok_or_else(|| PlacesError::NotFound(format!("No nearby places for {}", name)))?;
    Ok(HttpResponse::Ok().json(bounds))
}

/// GET /places/{name}/nearby.geojson
pub async fn get_nearby_geojson(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let collection = PlaceService::nearby_geojson(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .json(collection))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/places")
            .route("/sample", web::get().to(sample_places))
            .route("/{name}", web::get().to(get_place))
            .route("/{name}/reviews", web::get().to(get_reviews))
            .route("/{name}/ratings", web::get().to(get_ratings))
            .route("/{name}/photos", web::get().to(get_photos))
            .route("/{name}/photos/sample", web::get().to(sample_photos))
            .route("/{name}/bounds", web::get().to(get_bounds))
            .route("/{name}/nearby.geojson", web::get().to(get_nearby_geojson)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::init_memory_pool;
    use crate::db::{PlaceRepository, ReviewRepository};
    use crate::models::{CreatePlaceRequest, CreateReviewRequest, OwnerRef};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    async fn seeded_pool() -> SqlitePool {
        let pool = init_memory_pool().await.unwrap();
        for (name, lat) in [("Lake Tahoe", 39.0), ("Michigan League", 42.0)] {
            PlaceRepository::insert_place(
                &pool,
                &CreatePlaceRequest {
                    name: name.to_string(),
                    latitude: lat,
                    longitude: -100.0,
                    rating: Some(4.5),
                },
            )
            .await
            .unwrap();
        }
        let review = CreateReviewRequest {
            search_name: "Michigan League".to_string(),
            name: "Frita Batidos".to_string(),
            latitude: 42.28,
            longitude: -83.74,
            rating: Some(4.5),
            review_count: 10,
            price: Some("$$".to_string()),
            url: "https://yelp/frita".to_string(),
        };
        ReviewRepository::insert_review(&pool, &review, OwnerRef::SearchTerm("Michigan League"))
            .await
            .unwrap();
        pool
    }

    macro_rules! app {
        ($pool:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($pool))
                    .app_data(web::Data::new(Config::for_tests()))
                    .configure(config),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_get_place_by_name() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get()
            .uri("/places/Michigan%20League")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["name"], "Michigan League");
        assert_eq!(body["rating"], 4.5);
    }

    #[actix_web::test]
    async fn test_missing_place_is_404() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get().uri("/places/Atlantis").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_sample_is_not_treated_as_a_name() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get()
            .uri("/places/sample?count=50")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn test_sample_count_out_of_range() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get()
            .uri("/places/sample?count=0")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_reviews_and_bounds() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get()
            .uri("/places/Michigan%20League/reviews")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["name"], "Frita Batidos");

        let req = test::TestRequest::get()
            .uri("/places/Michigan%20League/bounds")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["center_lat"], 42.28);

        let req = test::TestRequest::get()
            .uri("/places/Lake%20Tahoe/bounds")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_nearby_geojson() {
        let app = app!(seeded_pool().await);

        let req = test::TestRequest::get()
            .uri("/places/Michigan%20League/nearby.geojson")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().map(Vec::len), Some(2));
    }
}
