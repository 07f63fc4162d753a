pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::{Router, middleware, routing::get};

use crate::handlers::{
    entry_handler, health_handler, home_handler, metrics_handler, ping_handler, rate_limit_guard,
};
use crate::state::AppState;

// Only the protected routes pass through the rate limit guard
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/", get(home_handler))
        .route("/api/v1/ping", get(ping_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            rate_limit_guard,
        ));

    Router::new()
        .merge(protected)
        .route("/api/v1/rate-limits/{client_ip}", get(entry_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
