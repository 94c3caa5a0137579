// src/services/place_service.rs
// DOCUMENTATION: Read API over the local store
// PURPOSE: Presentation projections - rankings, photo links, map bounds, GeoJSON

use crate::db::{PhotoRepository, PlaceRepository, ReviewRepository};
use crate::errors::PlacesError;
use crate::models::{rating_label, PhotoLink, Place, RatingEntry, Review};
use geo_types::{coord, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use std::cmp::Ordering;

/// Share of the larger span added on every side of the map
pub const MAP_PADDING: f64 = 0.5;

/// Map framing around the businesses near a place
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBounds {
    pub center_lat: f64,
    pub center_lon: f64,
    /// [min, max] latitude, padded
    pub lat_axis: [f64; 2],
    /// [min, max] longitude, padded
    pub lon_axis: [f64; 2],
}

impl MapBounds {
    /// Bounds of a set of (latitude, longitude) points
    /// DOCUMENTATION: Center is the middle of the raw box; both axes are widened by
    /// MAP_PADDING times the larger of the two spans. None for an empty set.
    pub fn from_points(points: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;

        let (mut min_lat, mut max_lat) = (first.0, first.0);
        let (mut min_lon, mut max_lon) = (first.1, first.1);
        for &(lat, lon) in rest {
            min_lat = min_lat.min(lat);
            max_lat = max_lat.max(lat);
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
        }

        // x = longitude, y = latitude
        let rect = Rect::new(
            coord! { x: min_lon, y: min_lat },
            coord! { x: max_lon, y: max_lat },
        );
        let padding = rect.width().max(rect.height()) * MAP_PADDING;
        let center = rect.center();

        Some(Self {
            center_lat: center.y,
            center_lon: center.x,
            lat_axis: [rect.min().y - padding, rect.max().y + padding],
            lon_axis: [rect.min().x - padding, rect.max().x + padding],
        })
    }
}

pub struct PlaceService;

impl PlaceService {
    /// Get a stored place by exact name
    pub async fn find_place(pool: &SqlitePool, name: &str) -> Result<Place, PlacesError> {
        PlaceRepository::find_by_name(pool, name)
            .await?
            .ok_or_else(|| PlacesError::NotFound(format!("Place {} not found", name)))
    }

    /// Random places to seed a menu
    pub async fn sample_places(pool: &SqlitePool, count: u32) -> Result<Vec<Place>, PlacesError> {
        PlaceRepository::sample_places(pool, count).await
    }

    /// Businesses found around a searched place
    pub async fn nearby(pool: &SqlitePool, term: &str) -> Result<Vec<Review>, PlacesError> {
        ReviewRepository::list_for(pool, term).await
    }

    /// Nearby businesses ranked by rating, highest first, unrated last
    pub async fn ranked_ratings(
        pool: &SqlitePool,
        term: &str,
    ) -> Result<Vec<RatingEntry>, PlacesError> {
        let reviews = ReviewRepository::list_for(pool, term).await?;
        Ok(rank_by_rating(reviews))
    }

    /// Title and display URL of every photo found for a search
    pub async fn photo_links(pool: &SqlitePool, term: &str) -> Result<Vec<PhotoLink>, PlacesError> {
        let photos = PhotoRepository::list_for(pool, term).await?;
        Ok(photos.iter().map(|p| p.to_link()).collect())
    }

    /// Random photos of a search, clamped to what is stored
    pub async fn sample_photos(
        pool: &SqlitePool,
        term: &str,
        count: u32,
    ) -> Result<Vec<PhotoLink>, PlacesError> {
        let photos = PhotoRepository::sample_for(pool, term, count).await?;
        Ok(photos.iter().map(|p| p.to_link()).collect())
    }

    /// Map bounds over the nearby businesses of a search
    pub async fn map_bounds(pool: &SqlitePool, term: &str) -> Result<Option<MapBounds>, PlacesError> {
        let reviews = ReviewRepository::list_for(pool, term).await?;
        let points: Vec<(f64, f64)> = reviews.iter().map(|r| (r.latitude, r.longitude)).collect();
        Ok(MapBounds::from_points(&points))
    }

    /// The searched place and its nearby businesses as a GeoJSON FeatureCollection
    /// DOCUMENTATION: Feature properties carry `role` ("searched" or "nearby"), name,
    /// rating label and, for businesses, the review URL
    pub async fn nearby_geojson(
        pool: &SqlitePool,
        term: &str,
    ) -> Result<FeatureCollection, PlacesError> {
        let place = Self::find_place(pool, term).await?;
        let reviews = ReviewRepository::list_for(pool, term).await?;

        let mut features = Vec::with_capacity(reviews.len() + 1);
        features.push(point_feature(
            place.latitude,
            place.longitude,
            json!({
                "role": "searched",
                "name": place.name,
                "rating": place.rating_label(),
            }),
        ));
        for review in &reviews {
            features.push(point_feature(
                review.latitude,
                review.longitude,
                json!({
                    "role": "nearby",
                    "name": review.name,
                    "rating": rating_label(review.rating),
                    "url": review.url,
                }),
            ));
        }

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        })
    }
}

/// Sort reviews by rating, descending; unrated entries keep their order at the end
pub fn rank_by_rating(reviews: Vec<Review>) -> Vec<RatingEntry> {
    let mut entries: Vec<RatingEntry> = reviews
        .into_iter()
        .map(|r| RatingEntry {
            name: r.name,
            rating: r.rating,
            url: r.url,
        })
        .collect();

    entries.sort_by(|a, b| match (a.rating, b.rating) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    entries
}

fn point_feature(latitude: f64, longitude: f64, properties: serde_json::Value) -> Feature {
    let properties: Option<JsonObject> = match properties {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(GeoValue::Point(vec![longitude, latitude]))),
        id: None,
        properties,
        foreign_members: None,
    }
}
