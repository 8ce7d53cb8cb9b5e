//! HTTP endpoint handlers.
//!
//! Webhook handlers take the raw body as bytes: the signature covers the
//! exact bytes received, so the body is verified before it is parsed.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{Client, SendEmail};
use crate::html;
use crate::optin::{self, ConfirmationOutcome, SubscribeOutcome, SubscribeRequest, SubscribeSettings};
use crate::ports::{ContactDirectory, EmailGateway};
use crate::web::error::ApiError;
use crate::webhook::{
    SignatureError, Verifier, WebhookEvent, WebhookHeaders, EMAIL_BOUNCED, EMAIL_DELIVERED,
    EMAIL_RECEIVED,
};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<dyn ContactDirectory>,
    pub gateway: Arc<dyn EmailGateway>,
}

impl AppState {
    /// State backed by the provider API for both contacts and email.
    pub fn new(config: Config, client: Client) -> Self {
        let client = Arc::new(client);
        Self::with_ports(config, client.clone(), client)
    }

    pub fn with_ports(
        config: Config,
        directory: Arc<dyn ContactDirectory>,
        gateway: Arc<dyn EmailGateway>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            directory,
            gateway,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Send
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SendRequest {
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub id: String,
}

/// Send a single plain message wrapped in a paragraph.
pub async fn send(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<SendResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "send_body_invalid");
        ApiError::InvalidBody
    })?;

    if request.to.trim().is_empty() || request.subject.is_empty() || request.message.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: to, subject, message".to_string(),
        ));
    }

    let email = SendEmail::new(&state.config.email_from, [request.to.trim()], &request.subject)
        .with_html(html::paragraph(&request.message));

    let id = state.gateway.send_email(email).await.map_err(|e| {
        warn!(to = %request.to, error = %e, "send_failed");
        ApiError::Upstream(e.to_string())
    })?;

    info!(email_id = %id, "send_accepted");

    Ok(Json(SendResponse { success: true, id }))
}

// =============================================================================
// Webhooks
// =============================================================================

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(rename = "type")]
    pub event_type: String,
}

/// Check the signature headers against the configured secret, then parse.
fn verified_event(config: &Config, headers: &HeaderMap, body: &[u8]) -> Result<WebhookEvent, ApiError> {
    let headers = WebhookHeaders::from_header_map(headers).map_err(|e| {
        warn!(error = %e, "webhook_headers_missing");
        ApiError::MissingWebhookHeaders
    })?;

    let secret = config.webhook_secret.as_ref().ok_or_else(|| {
        warn!("webhook_secret_not_configured");
        ApiError::NotConfigured("Webhook secret")
    })?;

    let verifier = Verifier::new(secret.expose_secret(), config.webhook_tolerance_secs)
        .map_err(|_| ApiError::InvalidWebhookSecret)?;

    verifier.verify(&headers, body).map_err(|e| {
        warn!(msg_id = %headers.id, error = %e, "webhook_signature_invalid");
        match e {
            SignatureError::MissingHeader(_) => ApiError::MissingWebhookHeaders,
            _ => ApiError::InvalidSignature,
        }
    })?;

    WebhookEvent::from_slice(body).map_err(|e| {
        warn!(msg_id = %headers.id, error = %e, "webhook_payload_invalid");
        ApiError::InvalidPayload
    })
}

/// Generic event receiver: verifies, logs a few event types, acknowledges.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let event = verified_event(&state.config, &headers, &body)?;

    match event.event_type.as_str() {
        EMAIL_RECEIVED => info!(
            from = event.data_str("from").unwrap_or_default(),
            subject = event.data_str("subject").unwrap_or_default(),
            "inbound_email_received"
        ),
        EMAIL_DELIVERED => info!(
            email_id = event.data_str("email_id").unwrap_or_default(),
            "email_delivered"
        ),
        EMAIL_BOUNCED => warn!(
            email_id = event.data_str("email_id").unwrap_or_default(),
            "email_bounced"
        ),
        other => info!(event_type = %other, "webhook_received"),
    }

    Ok(Json(WebhookResponse {
        received: true,
        event_type: event.event_type,
    }))
}

// =============================================================================
// Double opt-in
// =============================================================================

/// Create a pending contact and send the confirmation email.
pub async fn double_optin_subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<SubscribeOutcome>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!(error = %e, "subscribe_body_invalid");
        ApiError::InvalidBody
    })?;

    if request.email.trim().is_empty() {
        return Err(optin::SubscribeError::MissingEmail.into());
    }

    let audience_id = state
        .config
        .audience_id
        .as_deref()
        .ok_or(ApiError::NotConfigured("RESEND_AUDIENCE_ID"))?;

    let settings = SubscribeSettings {
        audience_id,
        from: &state.config.email_from,
        confirm_url: &state.config.confirm_redirect_url,
    };

    let outcome = optin::subscribe(
        state.directory.as_ref(),
        state.gateway.as_ref(),
        &request,
        &settings,
    )
    .await?;

    Ok(Json(outcome))
}

/// Confirm the pending contact whose confirmation link was clicked.
pub async fn double_optin_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConfirmationOutcome>, ApiError> {
    let event = verified_event(&state.config, &headers, &body)?;

    let Some(audience_id) = state.config.audience_id.as_deref() else {
        if event.is_click() {
            return Err(ApiError::NotConfigured("RESEND_AUDIENCE_ID"));
        }
        return Ok(Json(ConfirmationOutcome::ignored(&event)));
    };

    let outcome = optin::confirm(state.directory.as_ref(), &event, audience_id).await?;

    Ok(Json(outcome))
}
