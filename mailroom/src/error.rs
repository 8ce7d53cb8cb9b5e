//! Error type shared by the API client and the ports built on it.

use reqwest::StatusCode;
use serde::Deserialize;

/// Failure talking to the email provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (connect, timeout, TLS, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("{message}")]
    Api {
        status: u16,
        name: String,
        message: String,
    },

    /// The provider answered with a body we could not decode
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was rejected before being sent
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Client misconfiguration (missing key, unusable base URL)
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error body returned by the provider, e.g.
/// `{"statusCode": 422, "name": "validation_error", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl Error {
    /// Build an [`Error::Api`] from a failed response.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
        let (name, message) = match parsed {
            Some(ApiErrorBody { name, message }) => (name, message),
            None => (None, None),
        };

        let fallback = status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string();

        Error::Api {
            status: status.as_u16(),
            name: name.unwrap_or_else(|| "application_error".to_string()),
            message: message
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
                .unwrap_or(fallback),
        }
    }

    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
