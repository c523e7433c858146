//! WhatsApp webhook handlers
//!
//! Handles WhatsApp Business API webhook verification and message dispatch.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use integration_whatsapp::extract_inbound_message;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{middleware::RequestId, state::AppState};

/// Query parameters for webhook verification
#[derive(Debug, Deserialize)]
pub struct WebhookVerifyQuery {
    /// The mode (should be "subscribe")
    #[serde(rename = "hub.mode")]
    pub hub_mode: Option<String>,
    /// The verify token to validate
    #[serde(rename = "hub.verify_token")]
    pub hub_verify_token: Option<String>,
    /// The challenge to return on success
    #[serde(rename = "hub.challenge")]
    pub hub_challenge: Option<String>,
}

/// Body returned for every webhook POST
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookStatus {
    pub status: String,
}

impl WebhookStatus {
    fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Status reported when the payload carries no message
pub const NO_MESSAGE_STATUS: &str = "no message";

/// WhatsApp webhook verification (GET)
///
/// Meta sends a GET request to verify webhook ownership during setup.
/// Anything but `subscribe` with the configured token and a challenge is
/// rejected with 403, including a query that does not deserialize.
#[instrument(skip(state, query))]
pub async fn verify_webhook(
    State(state): State<AppState>,
    query: Result<Query<WebhookVerifyQuery>, QueryRejection>,
) -> impl IntoResponse {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(error = %rejection, "Malformed webhook verification query");
            return (StatusCode::FORBIDDEN, "Forbidden".to_string());
        },
    };

    let verify_token = &state.config.whatsapp.verify_token;

    let verified = query.hub_mode.as_deref() == Some("subscribe")
        && query.hub_verify_token.as_deref() == Some(verify_token.as_str());

    match query.hub_challenge {
        Some(challenge) if verified => {
            info!("WhatsApp webhook verified successfully");
            (StatusCode::OK, challenge)
        },
        _ => {
            warn!(
                mode = ?query.hub_mode,
                verified,
                "WhatsApp webhook verification failed"
            );
            (StatusCode::FORBIDDEN, "Forbidden".to_string())
        },
    }
}

/// WhatsApp webhook message handler (POST)
///
/// Processes the first message of the payload and replies once to the
/// configured recipient before responding.
#[instrument(skip(state, request_id, body), fields(body_len = body.len()))]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    body: Bytes,
) -> impl IntoResponse {
    let Some(message) = extract_inbound_message(&body) else {
        debug!("Webhook carried no message");
        return (StatusCode::OK, Json(WebhookStatus::new(NO_MESSAGE_STATUS)));
    };

    let scope_id = request_id.scope_id();

    info!(
        message_type = message.message_type(),
        message_id = ?message.message_id,
        "Received WhatsApp message"
    );

    let outcome = state
        .dispatch_service
        .dispatch_detached(message, scope_id)
        .await;

    let status = if outcome.is_failure() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(WebhookStatus::new(outcome.status())))
}
