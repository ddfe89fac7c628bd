//! # Web API Error Types
//!
//! Error types for the HTTP layer and their JSON response conversions.
//! Every error body carries at least an `error` field.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use serde_json::json;
use skycache_store::StoreError;
use skycache_weather::WeatherError;
use thiserror::Error;
use tracing::{debug, error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    Store { message: String, source: StoreError },

    #[error("Failed to fetch current weather data")]
    Weather(#[from] WeatherError),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    Internal { detail: String },
}

impl ApiError {
    /// Create a BadRequest error with a custom message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a NotFound error for a missing key
    pub fn key_not_found(key: &str) -> Self {
        Self::NotFound {
            message: format!("Key '{}' not found", key),
        }
    }

    /// Wrap a store failure with the message shown to the client
    pub fn store(message: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            message: message.into(),
            source,
        }
    }

    /// Map a middleware failure (timeout, etc.) into the API error family
    pub fn from_middleware(err: BoxError) -> Self {
        if err.is::<tower::timeout::error::Elapsed>() {
            Self::Timeout
        } else {
            Self::Internal {
                detail: err.to_string(),
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Store { .. } | ApiError::Weather(_) | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Store { message, source } => error!(error = %source, "{}", message),
            ApiError::Weather(source) => error!(error = %source, "Error fetching current weather"),
            ApiError::BadRequest { message } => warn!("Rejected request: {}", message),
            ApiError::NotFound { message } => debug!("Not found: {}", message),
            ApiError::Timeout => warn!("Request timed out"),
            ApiError::Internal { detail } => error!(error = %detail, "Unhandled middleware error"),
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
