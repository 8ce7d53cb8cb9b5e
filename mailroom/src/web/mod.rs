//! HTTP surface: health check, plain send, event webhooks and the double
//! opt-in endpoints.

pub mod error;
pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{
    double_optin_subscribe, double_optin_webhook, health, send, webhook, AppState,
    HealthResponse, SendRequest, SendResponse, WebhookResponse,
};

/// Build the application router.
///
/// Request bodies above `webhook_max_body_bytes` are rejected with 413.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.webhook_max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/send", post(send))
        .route("/webhook", post(webhook))
        .route("/double-optin/subscribe", post(double_optin_subscribe))
        .route("/double-optin/webhook", post(double_optin_webhook))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
