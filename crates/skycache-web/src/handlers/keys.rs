//! # Key-Value Handlers
//!
//! Values are stored as their JSON text with no expiry.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use skycache_store::{get_json, set_json};
use tracing::info;

use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SetResponse {
    pub success: bool,
    pub message: String,
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
}

/// Extract the value to store. Missing, `null` and `""` count as absent,
/// as does a body that is not a JSON object.
fn required_value(body: &[u8]) -> Option<Value> {
    let mut body: Value = serde_json::from_slice(body).ok()?;
    match body.as_object_mut()?.remove("value")? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        value => Some(value),
    }
}

/// Write a value: POST /set/{key}
pub async fn set_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> ApiResult<Json<SetResponse>> {
    let value = required_value(&body)
        .ok_or_else(|| ApiError::bad_request("Value is required in request body"))?;

    set_json(state.store.as_ref(), &key, &value, None)
        .await
        .map_err(|e| ApiError::store("Failed to set key in Redis", e))?;

    info!(%key, "Key set");
    Ok(Json(SetResponse {
        success: true,
        message: format!("Key '{}' set successfully", key),
        key,
        value,
    }))
}

/// Read a value: GET /get/{key}
pub async fn get_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<GetResponse>> {
    let value: Value = get_json(state.store.as_ref(), &key)
        .await
        .map_err(|e| ApiError::store("Failed to get key from Redis", e))?
        .ok_or_else(|| ApiError::key_not_found(&key))?;

    Ok(Json(GetResponse { key, value }))
}

/// Delete a value: DELETE /delete/{key}
pub async fn delete_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let removed = state
        .store
        .delete(&key)
        .await
        .map_err(|e| ApiError::store("Failed to delete key from Redis", e))?;

    if removed == 0 {
        return Err(ApiError::key_not_found(&key));
    }

    info!(%key, "Key deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("Key '{}' deleted successfully", key),
    }))
}

/// List every key: GET /keys
///
/// Unpaginated; fine for the small stores this service targets.
pub async fn list_keys(State(state): State<AppState>) -> ApiResult<Json<KeysResponse>> {
    let keys = state
        .store
        .keys()
        .await
        .map_err(|e| ApiError::store("Failed to get keys from Redis", e))?;

    Ok(Json(KeysResponse { keys }))
}
