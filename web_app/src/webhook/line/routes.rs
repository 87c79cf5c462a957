//! LINE webhook endpoint handlers
//!
//! # Security
//!
//! The POST endpoint verifies `X-Line-Signature` over the raw body bytes before
//! anything is parsed. A request that fails verification is answered with 401
//! and none of its events are processed.
//!
//! # Processing
//!
//! LINE expects a fast 200. Once the signature is valid the events are handed
//! to a spawned task and the acknowledgment is returned right away; nothing the
//! task does can change the response.

use super::{schemas, security};
use crate::{consts, errors::WebhookError, webhook::AppState};
use ntex::{util::Bytes, web};
use tracing::Instrument;

/// Liveness endpoint
#[web::get("/")]
pub async fn health() -> impl web::Responder {
    web::HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(consts::HEALTH_CHECK_BODY)
}

/// Webhook receiver endpoint (POST)
///
/// # Returns
/// - 200 once the delivery is verified and queued
/// - 401 if the signature is missing or does not match
/// - 400 if a verified body is not a valid delivery
#[web::post("/webhook")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let signature = req
        .headers()
        .get(consts::LINE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if !security::verify_signature(
        signature,
        &body,
        app_state.config.line_channel_secret.as_bytes(),
    ) {
        logfire::warn!("Invalid signature");
        return Err(WebhookError::InvalidSignature.into());
    }

    // Parse the JSON payload only after the raw bytes were verified
    let payload: schemas::WebhookPayload = serde_json::from_slice(&body).map_err(|e| {
        logfire::error!(
            "Failed to parse webhook payload: {error}",
            error = e.to_string()
        );
        WebhookError::MalformedPayload(e.to_string())
    })?;

    let delivery_id = uuid::Uuid::new_v4().to_string();
    logfire::info!(
        "Received webhook delivery {delivery_id}: events={events}",
        delivery_id = delivery_id.clone(),
        events = payload.events.len() as i64
    );

    let relay = app_state.relay.clone();
    let span = logfire::span!("line_webhook", delivery_id = delivery_id);
    ntex::rt::spawn(
        async move {
            let outcomes = relay.process_webhook(payload).await;
            tracing::debug!(?outcomes, "Webhook delivery processed");
        }
        .instrument(span),
    );

    Ok(web::HttpResponse::Ok().finish())
}
