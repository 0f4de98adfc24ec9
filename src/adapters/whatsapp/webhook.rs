//! WhatsApp webhook HTTP surface (axum).
//!
//! - `GET /webhook`: subscription handshake (`hub.mode`, `hub.verify_token`, `hub.challenge`)
//! - `POST /webhook`: message notifications, mapped and handed to the InboundPort one by one

use crate::adapters::whatsapp::mapper::{self, WebhookPayload};
use crate::ports::InboundPort;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared state for the webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub handler: Arc<dyn InboundPort>,
    pub verify_token: String,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/", get(|| async { "Medpet webhook is running" }))
        .route("/webhook", get(verify).post(receive))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Returns the challenge to echo back when the handshake matches `expected_token`.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected_token: &str,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && !expected_token.is_empty() && token == expected_token {
        Some(challenge.to_string())
    } else {
        None
    }
}

async fn verify(State(state): State<WebhookState>, Query(params): Query<VerifyParams>) -> Response {
    match verify_subscription(
        params.mode.as_deref(),
        params.verify_token.as_deref(),
        params.challenge.as_deref(),
        &state.verify_token,
    ) {
        Some(challenge) => {
            info!("webhook verified");
            (StatusCode::OK, challenge).into_response()
        }
        None => {
            warn!(mode = ?params.mode, "webhook verification rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Always answers 200: the provider redelivers on anything else, and a redelivered message would
/// advance a flow twice.
async fn receive(State(state): State<WebhookState>, body: Bytes) -> StatusCode {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, len = body.len(), "ignoring unparseable webhook body");
            return StatusCode::OK;
        }
    };
    debug!(object = ?payload.object, entries = payload.entry.len(), "webhook received");

    for mapped in mapper::inbound_messages(&payload) {
        match mapped {
            Ok((event, profile)) => {
                let message_id = event.message_id.clone();
                if let Err(e) = state.handler.handle(event, profile).await {
                    warn!(message_id = %message_id, error = %e, "message handling failed");
                }
            }
            Err(e) => debug!(error = %e, "skipping malformed webhook message"),
        }
    }

    StatusCode::OK
}
