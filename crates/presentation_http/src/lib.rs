//! MindBot HTTP presentation layer
//!
//! Exposes the WhatsApp webhook and liveness routes.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{REQUEST_ID_HEADER, RequestId, RequestIdLayer};
pub use routes::create_router;
pub use state::AppState;
