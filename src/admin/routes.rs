//! Admin API route definitions.

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AdminState;

/// Create the admin router.
pub fn create_router(state: AdminState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/admin/bootstrap", post(handlers::bootstrap))
        .route("/admin/users", post(handlers::create_user))
        .route("/admin/profile", patch(handlers::update_profile))
        .route("/admin/profile/ensure", post(handlers::ensure_profile))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
