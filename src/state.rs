use crate::rate_limit::RateLimiter;

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,
    pub trust_proxy_headers: bool, // key on X-Forwarded-For / X-Real-IP instead of the peer
}

impl AppState {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            limiter,
            trust_proxy_headers: false,
        }
    }

    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}
