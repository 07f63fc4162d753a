use clap::Parser;

use crate::error::ConfigError;
use crate::rate_limit::{FailPolicy, RateLimitConfig};

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "request-limiter")]
#[command(about = "Per-client-IP request rate limiter with persistent counters")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Max requests per client IP per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 100)]
    pub rate_limit: u32,

    // Window length in seconds (fractions allowed)
    #[arg(long, env = "RATE_LIMIT_PERIOD", default_value_t = 600.0)]
    pub rate_window: f64,

    // SQLite URL for the counter table, or "memory" for in-process counters
    // Example: "sqlite://rate_limits.db"
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://rate_limits.db")]
    pub database_url: String,

    // Behaviour when the counter store fails
    #[arg(long, env = "RATE_LIMIT_FAIL_POLICY", value_enum, default_value_t = FailPolicy::Closed)]
    pub fail_policy: FailPolicy,

    // Key on X-Forwarded-For / X-Real-IP, only safe behind a proxy that sets them
    #[arg(long, env = "TRUST_PROXY_HEADERS")]
    pub trust_proxy_headers: bool,

    // Log level, RUST_LOG takes precedence when set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn rate_limit_config(&self) -> Result<RateLimitConfig, ConfigError> {
        Ok(RateLimitConfig::new(self.rate_limit, self.rate_window)?
            .with_fail_policy(self.fail_policy))
    }
}
