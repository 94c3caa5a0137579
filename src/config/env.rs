// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite connection string for the local store
    /// Format: sqlite://path/to/file.db
    pub database_url: String,

    /// Path of the durable request cache (one JSON object)
    pub cache_path: String,

    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8002)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Google Places API Key
    pub google_places_api_key: String,

    /// Yelp Fusion API Key (sent as a bearer token)
    pub yelp_api_key: String,

    /// Flickr API Key
    pub flickr_api_key: String,

    /// Maximum connections in database pool
    pub db_max_connections: u32,

    /// Connection timeout in seconds
    pub db_connection_timeout: u64,

    /// Timeout for outbound provider requests in seconds
    pub http_timeout: u64,

    /// Also search photos around every stored review
    pub fetch_review_photos: bool,

    /// Number of places offered when seeding the menu
    pub sample_size: u32,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        dotenv().ok();

        Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://places.db".to_string()),

            cache_path: env::var("CACHE_PATH").unwrap_or_else(|_| "cache.json".to_string()),

            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8002".to_string())
                .parse()
                .unwrap_or(8002),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),

            yelp_api_key: env::var("YELP_API_KEY").unwrap_or_default(),

            flickr_api_key: env::var("FLICKR_API_KEY").unwrap_or_default(),

            // The store is single-writer; more connections only add lock contention
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),

            db_connection_timeout: env::var("DB_CONNECTION_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            http_timeout: env::var("HTTP_TIMEOUT")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            fetch_review_photos: env::var("FETCH_REVIEW_PHOTOS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),

            sample_size: env::var("SAMPLE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.database_url.is_empty() {
            return Err("DATABASE_URL is required".to_string());
        }

        if self.cache_path.is_empty() {
            return Err("CACHE_PATH is required".to_string());
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - new searches will fail");
        }
        if self.yelp_api_key.is_empty() {
            log::warn!("YELP_API_KEY not configured - nearby reviews will be missing");
        }
        if self.flickr_api_key.is_empty() {
            log::warn!("FLICKR_API_KEY not configured - photos will be missing");
        }

        Ok(())
    }

    /// Configuration for unit tests: in-memory store, no provider keys
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            cache_path: "cache.json".to_string(),
            server_address: "127.0.0.1".to_string(),
            server_port: 8002,
            environment: "test".to_string(),
            log_level: "info".to_string(),
            google_places_api_key: String::new(),
            yelp_api_key: String::new(),
            flickr_api_key: String::new(),
            db_max_connections: 1,
            db_connection_timeout: 30,
            http_timeout: 30,
            fetch_review_photos: false,
            sample_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_missing_keys() {
        assert!(Config::for_tests().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_paths() {
        let mut config = Config::for_tests();
        config.database_url = String::new();
        assert!(config.validate().is_err());

        let mut config = Config::for_tests();
        config.cache_path = String::new();
        assert!(config.validate().is_err());
    }
}
