// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Defines the place record, its create request and the request/query DTOs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// Shown wherever a place or business has no rating
pub const UNRATED: &str = "unrated";

/// Represents a place record from the database
/// DOCUMENTATION: Maps directly to the places table
/// Identity key is `name` (exact, not normalized); rows are never updated after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Place {
    /// Surrogate id (autoincrement)
    pub id: i64,

    /// Display name - identity key, first write wins
    pub name: String,

    /// Geographic coordinates
    pub latitude: f64,
    pub longitude: f64,

    /// Rating from Google (0-5); `None` means unrated, never zero
    pub rating: Option<f64>,
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.latitude, self.longitude)
    }
}

impl Place {
    pub fn rating_label(&self) -> String {
        rating_label(self.rating)
    }
}

/// Request to create a new place
/// DOCUMENTATION: Normalized output of the Google text search adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePlaceRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
}

/// Body of POST /searches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    /// Place name to look up; also the owning search term for reviews and photos
    #[validate(length(min = 1, max = 255))]
    pub term: String,
}

/// Query string for the sampling endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SampleQuery {
    #[validate(range(min = 1, max = 100))]
    pub count: Option<u32>,
}

/// Render an optional rating the way listings show it
pub fn rating_label(rating: Option<f64>) -> String {
    match rating {
        Some(r) => r.to_string(),
        None => UNRATED.to_string(),
    }
}
