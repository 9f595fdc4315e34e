//! Route configuration.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Image delivery
        .route("/download", get(handlers::download_image))
        // Supervisor release proxy
        .route(
            "/v6/supervisor_release",
            get(handlers::proxy_supervisor_release),
        )
        // Health check (intentionally unauthenticated for load balancers)
        .route("/v1/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
