mod memory;
mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::StoreError;
use crate::models::RateLimitEntry;

pub use memory::MemoryStore;
pub use sql::SqlStore;

// --database-url value selecting the in-process store
pub const MEMORY_URL: &str = "memory";

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    // Create-if-absent, reset-if-elapsed, increment: one atomic step.
    // Elapsed means now - start_time > window_seconds.
    async fn hit(
        &self,
        client_ip: &str,
        now: f64,
        window_seconds: f64,
    ) -> Result<RateLimitEntry, StoreError>;

    async fn get(&self, client_ip: &str) -> Result<Option<RateLimitEntry>, StoreError>;

    async fn tracked_clients(&self) -> Result<u64, StoreError>;
}

pub async fn open(database_url: &str) -> Result<Arc<dyn RateLimitStore>, StoreError> {
    if database_url == MEMORY_URL {
        tracing::info!("Using in-memory rate limit store, counters will not survive restarts");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqlStore::connect(database_url).await?;
    tracing::info!(url = %database_url, "Using SQLite rate limit store");
    Ok(Arc::new(store))
}

// Deterministic row id (hash of the client IP)
pub fn entry_id(client_ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_ip);
    format!("{:x}", hasher.finalize())
}
