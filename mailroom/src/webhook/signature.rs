//! Webhook signature verification.
//!
//! The provider signs webhooks with the svix scheme:
//! - `svix-id`: unique message id
//! - `svix-timestamp`: Unix epoch seconds when the message was sent
//! - `svix-signature`: space-separated list of `v1,<base64 HMAC-SHA256>`
//!
//! The signed content is `{id}.{timestamp}.{raw body}`, keyed with the
//! base64-decoded part of the `whsec_...` secret.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_ID: &str = "svix-id";
pub const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub const HEADER_SIGNATURE: &str = "svix-signature";

const SECRET_PREFIX: &str = "whsec_";
const SIGNATURE_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing webhook header {0}")]
    MissingHeader(&'static str),

    #[error("webhook secret is not valid base64")]
    InvalidSecret,

    #[error("webhook timestamp is not a number")]
    InvalidTimestamp,

    #[error("webhook timestamp outside the allowed tolerance")]
    TimestampOutOfTolerance,

    #[error("no matching webhook signature")]
    Mismatch,
}

/// The three signature headers of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookHeaders<'a> {
    pub id: &'a str,
    pub timestamp: &'a str,
    pub signature: &'a str,
}

impl<'a> WebhookHeaders<'a> {
    /// Extract the signature headers, failing on the first one missing.
    pub fn from_header_map(headers: &'a HeaderMap) -> Result<Self, SignatureError> {
        let get = |name: &'static str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .ok_or(SignatureError::MissingHeader(name))
        };

        Ok(Self {
            id: get(HEADER_ID)?,
            timestamp: get(HEADER_TIMESTAMP)?,
            signature: get(HEADER_SIGNATURE)?,
        })
    }
}

/// Verifies (and produces) webhook signatures for one shared secret.
#[derive(Clone)]
pub struct Verifier {
    mac: HmacSha256,
    tolerance_secs: u64,
}

impl Verifier {
    /// Build a verifier from a `whsec_...` secret. The prefix is optional.
    pub fn new(secret: &str, tolerance_secs: u64) -> Result<Self, SignatureError> {
        let encoded = secret.trim();
        let encoded = encoded.strip_prefix(SECRET_PREFIX).unwrap_or(encoded);

        let key = BASE64.decode(encoded).map_err(|_| {
            warn!("webhook_secret_invalid");
            SignatureError::InvalidSecret
        })?;
        if key.is_empty() {
            warn!("webhook_secret_empty");
            return Err(SignatureError::InvalidSecret);
        }

        let mac = HmacSha256::new_from_slice(&key).map_err(|e| {
            warn!(error = %e, "webhook_secret_rejected");
            SignatureError::InvalidSecret
        })?;

        Ok(Self {
            mac,
            tolerance_secs,
        })
    }

    /// Verify a delivery against the current time.
    pub fn verify(&self, headers: &WebhookHeaders<'_>, payload: &[u8]) -> Result<(), SignatureError> {
        self.verify_at(headers, payload, now_secs())
    }

    /// Verify a delivery as if the current time were `now` (Unix seconds).
    pub fn verify_at(
        &self,
        headers: &WebhookHeaders<'_>,
        payload: &[u8],
        now: u64,
    ) -> Result<(), SignatureError> {
        // Verify timestamp is not stale (prevents replay attacks)
        let webhook_time: u64 = headers.timestamp.trim().parse().map_err(|_| {
            warn!(timestamp = %headers.timestamp, "webhook_signature_invalid_timestamp");
            SignatureError::InvalidTimestamp
        })?;

        let age = now.abs_diff(webhook_time);
        if age > self.tolerance_secs {
            warn!(
                webhook_time = webhook_time,
                current_time = now,
                age_seconds = age,
                max_age_seconds = self.tolerance_secs,
                "webhook_signature_stale"
            );
            return Err(SignatureError::TimestampOutOfTolerance);
        }

        let matched = headers
            .signature
            .split_whitespace()
            .filter_map(|entry| entry.split_once(','))
            .filter(|(version, _)| *version == SIGNATURE_VERSION)
            .filter_map(|(_, candidate)| BASE64.decode(candidate).ok())
            .any(|candidate| {
                // verify_slice compares in constant time
                self.keyed(headers.id, headers.timestamp.trim(), payload)
                    .verify_slice(&candidate)
                    .is_ok()
            });

        if !matched {
            warn!(
                msg_id = %headers.id,
                candidates = headers.signature.split_whitespace().count(),
                "webhook_signature_mismatch"
            );
            return Err(SignatureError::Mismatch);
        }

        Ok(())
    }

    /// Produce a `v1,<signature>` header value for `payload`.
    pub fn sign(&self, msg_id: &str, timestamp: u64, payload: &[u8]) -> String {
        let mac = self.keyed(msg_id, &timestamp.to_string(), payload);
        format!(
            "{SIGNATURE_VERSION},{}",
            BASE64.encode(mac.finalize().into_bytes())
        )
    }

    /// MAC over `{id}.{timestamp}.{payload}`.
    fn keyed(&self, msg_id: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac
    }
}

/// Current Unix time in seconds.
pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
