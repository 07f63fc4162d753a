use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use crate::error::AppError;
use crate::models::{ApiResponse, RateLimitEntry};
use crate::state::AppState;

pub async fn home_handler() -> Json<ApiResponse> {
    Json(ApiResponse::ok(
        "Welcome to API",
        Some(serde_json::json!({ "URL": "" })),
    ))
}

pub async fn ping_handler() -> Json<ApiResponse> {
    Json(ApiResponse::ok("pong", None))
}

// Read-only view of a client's counter, does not count as a request
pub async fn entry_handler(
    State(state): State<Arc<AppState>>,
    Path(client_ip): Path<String>,
) -> Result<Json<RateLimitEntry>, AppError> {
    state
        .limiter
        .entry(&client_ip)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(client_ip))
}
