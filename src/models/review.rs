// src/models/review.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::rating_label;

/// Shown for businesses without a price tier
pub const UNKNOWN_PRICE: &str = "unknown";

/// Nearby business with its review aggregate (one Yelp search result)
/// Unique on (name, search_name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    /// Owning place, resolved at insert time
    pub place_id: i64,
    /// Name of the place whose search produced this row
    pub search_name: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub price: Option<String>,
    pub url: String,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {}) is rated {}",
            self.name,
            self.latitude,
            self.longitude,
            rating_label(self.rating)
        )
    }
}

impl Review {
    pub fn price_label(&self) -> &str {
        self.price.as_deref().unwrap_or(UNKNOWN_PRICE)
    }
}

/// Request to create a new review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReviewRequest {
    pub search_name: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub price: Option<String>,
    pub url: String,
}

/// (name, rating) pair for rating charts and listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingEntry {
    pub name: String,
    pub rating: Option<f64>,
    pub url: String,
}
