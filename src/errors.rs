// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for cache, store, adapters and handlers

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every failure the cache, the store and the provider adapters can report.
/// Each variant maps to an HTTP status code when it reaches a handler.
#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Timeout, unreachable host or non-success status
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Response body did not match the expected format
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Durable request cache could not be written
    #[error("Cache I/O error: {0}")]
    CacheIoError(String),

    /// A review or photo insert whose owner resolved to zero rows
    #[error("No owning record for: {0}")]
    NoOwningRecord(String),

    /// Provider answered with an error status document
    #[error("External API error: {0}")]
    ExternalApiError(String),
}

impl PlacesError {
    fn error_code(&self) -> &'static str {
        match self {
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::DatabaseError(_) => "DATABASE_ERROR",
            PlacesError::InvalidInput(_) => "INVALID_INPUT",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::NetworkError(_) => "NETWORK_ERROR",
            PlacesError::DecodeError(_) => "DECODE_ERROR",
            PlacesError::CacheIoError(_) => "CACHE_IO_ERROR",
            PlacesError::NoOwningRecord(_) => "NO_OWNING_RECORD",
            PlacesError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
        }
    }
}

impl From<sqlx::Error> for PlacesError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("Database operation failed: {}", e);
        PlacesError::DatabaseError(e.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::NetworkError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::DecodeError(_) => StatusCode::BAD_GATEWAY,
            PlacesError::CacheIoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PlacesError::NoOwningRecord(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PlacesError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PlacesError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::NetworkError("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            PlacesError::NoOwningRecord("Y Park".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_error_body_carries_code() {
        let resp = PlacesError::DecodeError("bad json".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
