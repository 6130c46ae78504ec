//! Route definitions

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the service router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/accounts", account_routes())
        .layer(axum::middleware::from_fn(
            crate::middleware::timing_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Account routes
fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:user_id/balance", get(handlers::get_balance))
        .route("/internal/update-balance", post(handlers::update_balance))
}
