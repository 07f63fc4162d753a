mod api;
pub mod guard;
mod health;
mod metrics;

pub use api::{entry_handler, home_handler, ping_handler};
pub use guard::rate_limit_guard;
pub use health::health_handler;
pub use metrics::metrics_handler;
