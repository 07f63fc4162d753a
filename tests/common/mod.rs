#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use request_limiter::error::StoreError;
use request_limiter::models::RateLimitEntry;
use request_limiter::rate_limit::{FailPolicy, RateLimitConfig, RateLimiter};
use request_limiter::router;
use request_limiter::state::AppState;
use request_limiter::store::{MemoryStore, RateLimitStore};

// every call fails, as if the database were down
pub struct FailingStore;

#[async_trait]
impl RateLimitStore for FailingStore {
    async fn hit(&self, _: &str, _: f64, _: f64) -> Result<RateLimitEntry, StoreError> {
        Err(StoreError::QueryFailed(sqlx::Error::PoolClosed))
    }

    async fn get(&self, _: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        Err(StoreError::QueryFailed(sqlx::Error::PoolClosed))
    }

    async fn tracked_clients(&self) -> Result<u64, StoreError> {
        Err(StoreError::QueryFailed(sqlx::Error::PoolClosed))
    }
}

fn build_app(
    store: Arc<dyn RateLimitStore>,
    limit: u32,
    fail_policy: FailPolicy,
    trust_proxy_headers: bool,
) -> Router {
    let config = RateLimitConfig::new(limit, 600.0)
        .unwrap()
        .with_fail_policy(fail_policy);
    let state = AppState::new(RateLimiter::new(store, config))
        .with_trust_proxy_headers(trust_proxy_headers);
    router(Arc::new(state))
}

// behind a trusted proxy: requests are keyed by X-Forwarded-For
pub fn app_with_store(store: Arc<dyn RateLimitStore>, limit: u32, fail_policy: FailPolicy) -> Router {
    build_app(store, limit, fail_policy, true)
}

pub fn memory_app(limit: u32) -> Router {
    app_with_store(Arc::new(MemoryStore::new()), limit, FailPolicy::Closed)
}

// directly exposed: requests are keyed by the peer address only
pub fn exposed_memory_app(limit: u32) -> Router {
    build_app(Arc::new(MemoryStore::new()), limit, FailPolicy::Closed, false)
}

pub fn get_from_peer(uri: &str, peer: &str, forwarded_for: &str) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", forwarded_for)
        .extension(ConnectInfo(peer))
        .body(Body::empty())
        .unwrap()
}

pub fn get_from(uri: &str, client_ip: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client_ip)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
