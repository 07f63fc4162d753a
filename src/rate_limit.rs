use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ConfigError, StoreError};
use crate::models::RateLimitEntry;
use crate::store::RateLimitStore;

// What to do when the counter store cannot be reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FailPolicy {
    // reject with 503
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    pub limit: u32,          // max requests per window
    pub window_seconds: f64, // window length
    pub fail_policy: FailPolicy,
}

impl RateLimitConfig {
    pub fn new(limit: u32, window_seconds: f64) -> Result<Self, ConfigError> {
        let config = Self {
            limit,
            window_seconds,
            fail_policy: FailPolicy::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_fail_policy(mut self, fail_policy: FailPolicy) -> Self {
        self.fail_policy = fail_policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::InvalidLimit);
        }
        if !self.window_seconds.is_finite() || self.window_seconds <= 0.0 {
            return Err(ConfigError::InvalidWindow(self.window_seconds));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_seconds: 600.0,
            fail_policy: FailPolicy::Closed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Allowed {
        count: i64,
        remaining: u32,
        reset_after: f64, // seconds until the window restarts
    },
    Limited {
        count: i64,
        retry_after: f64,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

pub fn decide(config: &RateLimitConfig, entry: &RateLimitEntry, now: f64) -> Decision {
    // a backwards clock jump yields a negative elapsed time, clamp it away
    let remaining_window = (config.window_seconds - (now - entry.start_time))
        .min(config.window_seconds)
        .max(0.0);

    if entry.count > i64::from(config.limit) {
        Decision::Limited {
            count: entry.count,
            retry_after: remaining_window,
        }
    } else {
        Decision::Allowed {
            count: entry.count,
            remaining: (i64::from(config.limit) - entry.count).max(0) as u32,
            reset_after: remaining_window,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    // now is seconds since epoch
    pub async fn check_and_record(
        &self,
        client_ip: &str,
        now: f64,
    ) -> Result<Decision, StoreError> {
        let entry = self
            .store
            .hit(client_ip, now, self.config.window_seconds)
            .await?;

        let decision = decide(&self.config, &entry, now);
        if !decision.is_allowed() {
            tracing::debug!(
                client_ip,
                count = entry.count,
                limit = self.config.limit,
                "Rate limit exceeded"
            );
        }
        Ok(decision)
    }

    pub async fn check(&self, client_ip: &str) -> Result<Decision, StoreError> {
        self.check_and_record(client_ip, unix_now()).await
    }

    pub async fn entry(&self, client_ip: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        self.store.get(client_ip).await
    }

    pub async fn tracked_clients(&self) -> Result<u64, StoreError> {
        self.store.tracked_clients().await
    }
}

pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
