use axum::extract::{Path, State};
use axum::Json;
use skycache_weather::{Coordinates, SourcedWeather};

use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Current weather: GET /weather/current/{lat}/{lon}
///
/// Coordinates are validated before any store or provider call.
pub async fn current_weather(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> ApiResult<Json<SourcedWeather>> {
    let coords =
        Coordinates::parse(&lat, &lon).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let weather = state.weather.current(coords).await?;
    Ok(Json(weather))
}
