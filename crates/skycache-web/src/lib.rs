//! HTTP surface of SkyCache
//!
//! Key-value endpoints, the cached weather endpoint and a health probe,
//! served by axum.

use axum::error_handling::HandleErrorLayer;
use axum::{BoxError, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::{ApiError, ApiResult};
pub use state::AppState;

/// Create the web application with all routes and middleware
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .timeout(request_timeout);

    let app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::key_routes())
        .merge(routes::weather_routes())
        .layer(common_middleware)
        .with_state(state);

    info!("Web application created with all routes and middleware");
    app
}

/// Requests that outlive the timeout get a 408 with the usual JSON error body
async fn handle_middleware_error(err: BoxError) -> ApiError {
    ApiError::from_middleware(err)
}
