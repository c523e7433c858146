//! Route definitions

use axum::{Router, routing::get};

use crate::{handlers, middleware::RequestIdLayer, state::AppState};

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness
        .route("/", get(handlers::health::root).post(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        // WhatsApp webhook
        .route(
            "/webhook",
            get(handlers::whatsapp::verify_webhook).post(handlers::whatsapp::handle_webhook),
        )
        .layer(RequestIdLayer::new())
        // Attach state
        .with_state(state)
}
