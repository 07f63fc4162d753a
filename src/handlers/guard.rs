use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{AppError, insert_rate_limit_headers};
use crate::metrics::{CHECK_LATENCY, RATE_LIMITED_TOTAL, REQUEST_TOTAL, STORE_ERRORS_TOTAL};
use crate::rate_limit::{Decision, FailPolicy};
use crate::state::AppState;

pub const UNKNOWN_CLIENT: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

pub async fn rate_limit_guard(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = client_ip(request.headers(), peer, state.trust_proxy_headers);
    let config = *state.limiter.config();

    REQUEST_TOTAL.inc();
    let timer = CHECK_LATENCY.start_timer();
    let outcome = state.limiter.check(&client_ip).await;
    timer.observe_duration();

    match outcome {
        Ok(Decision::Allowed {
            remaining,
            reset_after,
            ..
        }) => {
            let mut response = next.run(request).await;
            insert_rate_limit_headers(response.headers_mut(), config.limit, remaining, reset_after);
            Ok(response)
        }
        Ok(Decision::Limited { count, retry_after }) => {
            RATE_LIMITED_TOTAL.inc();
            tracing::info!(client_ip = %client_ip, count, "Rejected request over rate limit");
            Err(AppError::RateLimited {
                limit: config.limit,
                retry_after,
            })
        }
        Err(e) => {
            STORE_ERRORS_TOTAL.inc();
            match config.fail_policy {
                FailPolicy::Closed => {
                    tracing::error!(client_ip = %client_ip, error = %e, "Rate limit store failed, rejecting request");
                    Err(AppError::StoreUnavailable(e))
                }
                FailPolicy::Open => {
                    tracing::warn!(client_ip = %client_ip, error = %e, "Rate limit store failed, allowing request");
                    Ok(next.run(request).await)
                }
            }
        }
    }
}

// Proxy headers (first X-Forwarded-For hop, then X-Real-IP) are only read
// when trusted. No usable address falls into the shared bucket.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_proxy_headers: bool) -> String {
    let proxied = || {
        if !trust_proxy_headers {
            return None;
        }
        header_ip(headers, X_FORWARDED_FOR, |value| value.split(',').next())
            .or_else(|| header_ip(headers, X_REAL_IP, Some))
    };

    match proxied().or(peer) {
        Some(ip) => ip.to_string(),
        None => {
            tracing::warn!("Cannot determine client IP, using shared bucket");
            UNKNOWN_CLIENT.to_string()
        }
    }
}

fn header_ip<'a>(
    headers: &'a HeaderMap,
    name: &str,
    pick: impl FnOnce(&'a str) -> Option<&'a str>,
) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    pick(value)?.trim().parse().ok()
}
