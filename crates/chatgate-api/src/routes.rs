//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use chatgate_core::error::Result;

use crate::handlers;
use crate::rate_limit::{rate_limit_middleware, RateLimiter};
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// `/health` is exempt from rate limiting.
pub fn create_router(state: AppState) -> Router {
    let limiter = RateLimiter::new(state.config.api.rate_limit_per_sec);

    let rate_limited_routes = Router::new()
        .route("/messages", post(handlers::post_message))
        .route("/filter", delete(handlers::clear_all))
        .route("/filter/check", post(handlers::check))
        .route("/filter/stats", get(handlers::stats))
        .route("/filter/sweep", post(handlers::sweep))
        .route("/filter/actors/{id}", delete(handlers::clear_actor))
        .route("/filter/actors/{id}/recent", get(handlers::recent))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(limiter));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(rate_limited_routes)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on 127.0.0.1 at the configured port until the process exits.
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = format!("127.0.0.1:{}", state.config.api.port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
