use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ApiResponse;

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(#[source] sqlx::Error),

    #[error("Schema setup failed: {0}")]
    SchemaFailed(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Rate limit must be at least 1 request per window")]
    InvalidLimit,

    #[error("Rate limit window must be a positive number of seconds, got {0}")]
    InvalidWindow(f64),
}

// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Too many requests")]
    RateLimited { limit: u32, retry_after: f64 },

    #[error("Rate limiter unavailable")]
    StoreUnavailable(#[from] StoreError),

    #[error("No rate limit entry for {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::error(status, self.to_string());
        let mut response = (status, Json(body)).into_response();

        if let AppError::RateLimited { limit, retry_after } = self {
            let headers = response.headers_mut();
            insert_rate_limit_headers(headers, limit, 0, retry_after);
            // whole seconds, and never 0 on a rejection
            headers.insert(
                header::RETRY_AFTER,
                HeaderValue::from((retry_after.ceil() as u64).max(1)),
            );
        }

        response
    }
}

pub fn insert_rate_limit_headers(
    headers: &mut HeaderMap,
    limit: u32,
    remaining: u32,
    reset_after: f64,
) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(
        X_RATELIMIT_RESET,
        HeaderValue::from(reset_after.ceil() as u64),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rate_limited_maps_to_429_with_retry_after() {
        let err = AppError::RateLimited {
            limit: 3,
            retry_after: 54.2,
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "55");
        assert_eq!(response.headers()["x-ratelimit-limit"], "3");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "0");

        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "status_code": 429,
                "message": "Too many requests"
            })
        );
    }

    #[tokio::test]
    async fn rejection_at_window_edge_still_asks_for_a_second() {
        let err = AppError::RateLimited {
            limit: 3,
            retry_after: 0.0,
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    }

    #[test]
    fn rate_limit_headers_round_up_reset() {
        let mut map = HeaderMap::new();
        insert_rate_limit_headers(&mut map, 100, 42, 12.1);
        assert_eq!(map["x-ratelimit-limit"], "100");
        assert_eq!(map["x-ratelimit-remaining"], "42");
        assert_eq!(map["x-ratelimit-reset"], "13");
    }

    #[tokio::test]
    async fn store_failure_maps_to_503() {
        let err = AppError::from(StoreError::QueryFailed(sqlx::Error::PoolClosed));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().get(header::RETRY_AFTER).is_none());

        let body = body_json(response).await;
        assert_eq!(body["message"], "Rate limiter unavailable");
        assert_eq!(body["status_code"], 503);
    }

    #[test]
    fn config_error_messages() {
        assert_eq!(
            ConfigError::InvalidWindow(-1.0).to_string(),
            "Rate limit window must be a positive number of seconds, got -1"
        );
    }
}
