//! Error responses for the HTTP endpoints.
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status code
//! matching the failure kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::optin::{ConfirmError, SubscribeError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request body")]
    InvalidBody,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("Missing webhook headers")]
    MissingWebhookHeaders,

    #[error("Invalid webhook secret")]
    InvalidWebhookSecret,

    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Invalid webhook payload")]
    InvalidPayload,

    #[error("Contact not found")]
    ContactNotFound,

    /// The email provider rejected or failed the call; its message is passed through.
    #[error("{0}")]
    Upstream(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody
            | ApiError::BadRequest(_)
            | ApiError::MissingWebhookHeaders
            | ApiError::InvalidSignature
            | ApiError::InvalidPayload => StatusCode::BAD_REQUEST,
            ApiError::ContactNotFound => StatusCode::NOT_FOUND,
            ApiError::NotConfigured(_) | ApiError::InvalidWebhookSecret | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ConfirmError> for ApiError {
    fn from(err: ConfirmError) -> Self {
        match err {
            ConfirmError::MalformedEvent => ApiError::BadRequest(err.to_string()),
            ConfirmError::ContactNotFound { .. } => ApiError::ContactNotFound,
            ConfirmError::DirectoryUnavailable(source) => ApiError::Upstream(source.to_string()),
        }
    }
}

impl From<SubscribeError> for ApiError {
    fn from(err: SubscribeError) -> Self {
        match err {
            SubscribeError::MissingEmail => ApiError::BadRequest(err.to_string()),
            SubscribeError::Directory(source) | SubscribeError::Gateway(source) => {
                ApiError::Upstream(source.to_string())
            }
        }
    }
}
