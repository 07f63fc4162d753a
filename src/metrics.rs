use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("rate_limit_requests_total", "Requests checked by the rate limiter").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("rate_limit_rejected_total", "Requests rejected with 429").unwrap();
    pub static ref STORE_ERRORS_TOTAL: Counter =
        register_counter!("rate_limit_store_errors_total", "Counter store failures").unwrap();
    pub static ref CHECK_LATENCY: Histogram = register_histogram!(
        "rate_limit_check_latency_seconds",
        "Time spent recording and judging one request"
    )
    .unwrap();
    pub static ref TRACKED_CLIENTS: Gauge =
        register_gauge!("rate_limit_tracked_clients", "Client IPs with a stored counter").unwrap();
}
