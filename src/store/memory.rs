use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::RateLimitStore;
use crate::error::StoreError;
use crate::models::RateLimitEntry;

// The entry() shard lock is held across reset and increment
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, RateLimitEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(
        &self,
        client_ip: &str,
        now: f64,
        window_seconds: f64,
    ) -> Result<RateLimitEntry, StoreError> {
        let stamp = Utc::now();

        let mut entry = self
            .entries
            .entry(client_ip.to_string())
            .or_insert_with(|| RateLimitEntry::new(client_ip, now, stamp));

        // window expired..? reset it
        if now - entry.start_time > window_seconds {
            entry.count = 0;
            entry.start_time = now;
        }

        entry.count += 1;
        entry.updated_at = stamp;

        Ok(entry.value().clone())
    }

    async fn get(&self, client_ip: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        Ok(self.entries.get(client_ip).map(|entry| entry.value().clone()))
    }

    async fn tracked_clients(&self) -> Result<u64, StoreError> {
        Ok(self.entries.len() as u64)
    }
}
