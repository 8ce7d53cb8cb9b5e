//! Mailroom - transactional email with double opt-in.
//!
//! This library backs the two Mailroom binaries:
//! - `mailroom`: command line client for the email provider's REST API
//! - `mailroom-web`: web server for sending mail and receiving signed webhooks
//!
//! ## Double opt-in
//!
//! ```text
//! POST /double-optin/subscribe → pending contact + confirmation email
//!   → click → email.clicked webhook → POST /double-optin/webhook → confirmed
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod html;
pub mod optin;
pub mod ports;
pub mod web;
pub mod webhook;

// Re-export commonly used types
pub use api::Client;
pub use config::Config;
pub use error::{Error, Result};
pub use optin::{confirm, subscribe, ConfirmError, ConfirmationOutcome};
pub use ports::{ContactDirectory, EmailGateway};
pub use web::{router, AppState};
pub use webhook::{Verifier, WebhookEvent};
