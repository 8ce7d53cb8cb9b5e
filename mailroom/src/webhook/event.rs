//! Webhook event payloads.
//!
//! The provider posts events shaped like
//! `{"type": "email.clicked", "created_at": "...", "data": {...}}`. Only a few
//! fields are typed; `data` is kept as raw JSON of any shape, object or not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EMAIL_CLICKED: &str = "email.clicked";
pub const EMAIL_DELIVERED: &str = "email.delivered";
pub const EMAIL_BOUNCED: &str = "email.bounced";
pub const EMAIL_RECEIVED: &str = "email.received";

/// A verified webhook event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl WebhookEvent {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            created_at: None,
            data,
        }
    }

    pub fn from_slice(payload: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(payload)
    }

    pub fn is_click(&self) -> bool {
        self.event_type == EMAIL_CLICKED
    }

    /// First address of `data.to`.
    ///
    /// `None` when `data` is not an object, or `to` is missing, not an
    /// array, empty, or starts with a non-string.
    pub fn first_recipient(&self) -> Option<&str> {
        self.data.get("to")?.as_array()?.first()?.as_str()
    }

    /// A string field of `data`, e.g. `email_id` or `from`.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key)?.as_str()
    }
}
