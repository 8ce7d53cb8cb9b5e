//! Inbound webhook handling: signature verification and event payloads.

pub mod event;
pub mod signature;

pub use event::{WebhookEvent, EMAIL_BOUNCED, EMAIL_CLICKED, EMAIL_DELIVERED, EMAIL_RECEIVED};
pub use signature::{
    now_secs, SignatureError, Verifier, WebhookHeaders, HEADER_ID, HEADER_SIGNATURE,
    HEADER_TIMESTAMP,
};
