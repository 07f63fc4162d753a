use std::sync::Arc;

use axum::extract::State;
use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;
use crate::metrics::TRACKED_CLIENTS;
use crate::state::AppState;

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    // gauge is refreshed on scrape, a failing store keeps the last value
    match state.limiter.tracked_clients().await {
        Ok(count) => TRACKED_CLIENTS.set(count as f64),
        Err(e) => tracing::warn!(error = %e, "Could not count tracked clients"),
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| AppError::Internal(e.to_string()))
}
