use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Stored counter row - one per client IP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RateLimitEntry {
    pub id: String,
    pub client_ip: String,
    pub count: i64,
    pub start_time: f64, // window start, seconds since epoch
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RateLimitEntry {
    // Fresh entry for an IP seen for the first time
    pub fn new(client_ip: &str, start_time: f64, stamp: DateTime<Utc>) -> Self {
        Self {
            id: crate::store::entry_id(client_ip),
            client_ip: client_ip.to_string(),
            count: 0,
            start_time,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

// Envelope used by every JSON response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            success: true,
            status_code: StatusCode::OK.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}
