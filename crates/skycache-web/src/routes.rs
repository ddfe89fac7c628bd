//! # Web API Routes
//!
//! Route definitions grouped by functionality. Paths are part of the
//! public contract and must not change.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Service banner and store health
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health::service_info))
        .route("/health", get(handlers::health::health_check))
}

/// Generic key-value operations
pub fn key_routes() -> Router<AppState> {
    Router::new()
        .route("/set/{key}", post(handlers::keys::set_key))
        .route("/get/{key}", get(handlers::keys::get_key))
        .route("/delete/{key}", delete(handlers::keys::delete_key))
        .route("/keys", get(handlers::keys::list_keys))
}

/// Cached weather lookups
pub fn weather_routes() -> Router<AppState> {
    Router::new().route(
        "/weather/current/{lat}/{lon}",
        get(handlers::weather::current_weather),
    )
}
