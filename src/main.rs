use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;

use request_limiter::config::Args;
use request_limiter::logging::init_tracing;
use request_limiter::rate_limit::RateLimiter;
use request_limiter::state::AppState;
use request_limiter::{router, store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // parse cli arguments
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = args.rate_limit_config()?;
    let store = store::open(&args.database_url).await?;

    let state = Arc::new(
        AppState::new(RateLimiter::new(store, config))
            .with_trust_proxy_headers(args.trust_proxy_headers),
    );
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Rate limiter running on http://localhost:{}", args.port);
    tracing::info!(
        "Rate limit: {} requests per {} seconds (fail {:?})",
        config.limit,
        config.window_seconds,
        config.fail_policy
    );
    if args.trust_proxy_headers {
        tracing::info!("Keying on X-Forwarded-For / X-Real-IP headers");
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
