// ============================
// accountd-backend/src/router.rs
// ============================
/** HTTP router for the `accountd` server.
Public routes handle registration and login; everything else sits behind
[`require_session`]. */
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::accounts,
    middleware::require_session,
    storage::AccountStore,
    AppState,
};

/// Create the account API router
pub fn create_router<S: AccountStore>(state: Arc<AppState<S>>) -> Router {
    let private = Router::new()
        .route("/api/users/me", get(accounts::me::<S>))
        .route(
            "/api/users/{id}",
            put(accounts::update::<S>).delete(accounts::remove::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<S>,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/users", post(accounts::register::<S>))
        .route("/api/users/login", post(accounts::login::<S>))
        .route("/health", get(health_handler))
        .merge(private)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "Healthy"
}
