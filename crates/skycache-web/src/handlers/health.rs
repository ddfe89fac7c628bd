//! # Health Check Handlers
//!
//! Store liveness probe and the service banner.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::{error, warn};

use crate::state::AppState;

const SERVICE_MESSAGE: &str = "Redis Demo API is running!";

/// Health check response; `error` is only present when unhealthy
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub redis: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

/// Service banner
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub redis_connected: bool,
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Store health check: GET /health
///
/// Pings the store; 200 when it answers, 503 with the failure otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                redis: "connected",
                error: None,
                timestamp: timestamp(),
            }),
        ),
        Err(e) => {
            if e.is_connection() {
                warn!(error = %e, "Store unreachable during health check");
            } else {
                error!(error = %e, "Store health check failed");
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    redis: "disconnected",
                    error: Some(e.to_string()),
                    timestamp: timestamp(),
                }),
            )
        }
    }
}

/// Service banner: GET /
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    let redis_connected = state.store.ping().await.is_ok();
    Json(ServiceInfo {
        message: SERVICE_MESSAGE,
        redis_connected,
    })
}
