// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod cache;
pub mod cache_key;
pub mod flickr_client;
pub mod google_places_client;
pub mod place_service;
pub mod search_service;
pub mod yelp_client;

pub use cache::{CacheStats, HttpTransport, ReqwestTransport, RequestCache, ResponseFormat};
pub use cache_key::{derive_key, QueryParams, SECRET_PARAMS};
pub use flickr_client::FlickrClient;
pub use google_places_client::GooglePlacesClient;
pub use place_service::*;
pub use search_service::*;
pub use yelp_client::YelpClient;
