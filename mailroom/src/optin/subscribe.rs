//! Subscribe step of double opt-in.
//!
//! The contact is created as pending (`unsubscribed = true`) and receives an
//! email whose link, once clicked, triggers [`confirm`](super::confirm).

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{CreateContact, SendEmail};
use crate::html;
use crate::ports::{ContactDirectory, EmailGateway};

pub const CONFIRMATION_SUBJECT: &str = "Confirm your subscription";

/// Signup form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Where pending contacts go and what the confirmation email looks like.
#[derive(Debug, Clone, Copy)]
pub struct SubscribeSettings<'a> {
    pub audience_id: &'a str,
    pub from: &'a str,
    pub confirm_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscribeOutcome {
    pub success: bool,
    pub message: String,
    pub contact_id: String,
    pub email_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("Missing required field: email")]
    MissingEmail,

    /// Creating the pending contact failed.
    #[error("{0}")]
    Directory(#[source] crate::Error),

    /// The contact exists but the confirmation email was not accepted.
    #[error("{0}")]
    Gateway(#[source] crate::Error),
}

/// Build the confirmation email for one subscriber.
pub fn confirmation_email(
    from: &str,
    to: &str,
    name: Option<&str>,
    confirm_url: &str,
) -> SendEmail {
    SendEmail::new(from, [to], CONFIRMATION_SUBJECT)
        .with_html(html::confirmation_email(name, confirm_url))
}

/// Register a pending contact and send the confirmation email.
pub async fn subscribe<D, G>(
    directory: &D,
    gateway: &G,
    request: &SubscribeRequest,
    settings: &SubscribeSettings<'_>,
) -> Result<SubscribeOutcome, SubscribeError>
where
    D: ContactDirectory + ?Sized,
    G: EmailGateway + ?Sized,
{
    let email = request.email.trim();
    if email.is_empty() {
        return Err(SubscribeError::MissingEmail);
    }
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let mut contact = CreateContact::new(settings.audience_id, email).with_unsubscribed(true);
    if let Some(name) = name {
        contact = contact.with_first_name(name);
    }

    let contact_id = directory.create_contact(contact).await.map_err(|e| {
        warn!(audience_id = %settings.audience_id, error = %e, "double_optin_contact_create_failed");
        SubscribeError::Directory(e)
    })?;

    info!(contact_id = %contact_id, "double_optin_contact_pending");

    let message = confirmation_email(settings.from, email, name, settings.confirm_url);
    let email_id = gateway.send_email(message).await.map_err(|e| {
        warn!(contact_id = %contact_id, error = %e, "double_optin_email_failed");
        SubscribeError::Gateway(e)
    })?;

    info!(contact_id = %contact_id, email_id = %email_id, "double_optin_email_sent");

    Ok(SubscribeOutcome {
        success: true,
        message: "Confirmation email sent".to_string(),
        contact_id,
        email_id,
    })
}
