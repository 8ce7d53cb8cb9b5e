//! Confirmation step of double opt-in.
//!
//! A click on the link in the confirmation email arrives as an
//! `email.clicked` webhook. The contact with the clicked recipient's address
//! is flipped from pending (`unsubscribed = true`) to confirmed
//! (`unsubscribed = false`). Repeated deliveries simply set the flag again.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::UpdateContact;
use crate::ports::ContactDirectory;
use crate::webhook::{WebhookEvent, EMAIL_CLICKED};

pub const IGNORED_MESSAGE: &str = "Event type ignored";

/// Result of handling one webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConfirmationOutcome {
    /// The event is not a click and was acknowledged without action.
    Ignored {
        received: bool,
        #[serde(rename = "type")]
        event_type: String,
        message: String,
    },
    /// The clicked recipient's contact is now subscribed.
    Confirmed {
        received: bool,
        #[serde(rename = "type")]
        event_type: String,
        confirmed: bool,
        email: String,
        contact_id: String,
    },
}

impl ConfirmationOutcome {
    pub fn ignored(event: &WebhookEvent) -> Self {
        ConfirmationOutcome::Ignored {
            received: true,
            event_type: event.event_type.clone(),
            message: IGNORED_MESSAGE.to_string(),
        }
    }

    fn confirmed(email: &str, contact_id: String) -> Self {
        ConfirmationOutcome::Confirmed {
            received: true,
            event_type: EMAIL_CLICKED.to_string(),
            confirmed: true,
            email: email.to_string(),
            contact_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmError {
    /// The click event carries no usable recipient address.
    #[error("No recipient in webhook data")]
    MalformedEvent,

    /// No contact in the audience has the recipient's address.
    #[error("Contact not found: {email}")]
    ContactNotFound { email: String },

    /// Listing or updating contacts failed; the provider error is kept as is.
    #[error("{0}")]
    DirectoryUnavailable(#[source] crate::Error),
}

/// Confirm the subscription of the contact whose link was clicked.
///
/// `event` must already be signature-verified. Only `email.clicked` events
/// reach the directory; the first address of `data.to` is matched exactly
/// (case-sensitive) against the audience's contacts and the first match in
/// directory order wins.
pub async fn confirm<D>(
    directory: &D,
    event: &WebhookEvent,
    audience_id: &str,
) -> Result<ConfirmationOutcome, ConfirmError>
where
    D: ContactDirectory + ?Sized,
{
    if !event.is_click() {
        info!(event_type = %event.event_type, "double_optin_event_ignored");
        return Ok(ConfirmationOutcome::ignored(event));
    }

    let recipient = event.first_recipient().ok_or_else(|| {
        warn!("double_optin_missing_recipient");
        ConfirmError::MalformedEvent
    })?;

    let contacts = directory
        .list_contacts(audience_id)
        .await
        .map_err(|e| {
            warn!(audience_id = %audience_id, error = %e, "double_optin_list_failed");
            ConfirmError::DirectoryUnavailable(e)
        })?;

    let contact = contacts
        .into_iter()
        .find(|c| c.email == recipient)
        .ok_or_else(|| {
            warn!(audience_id = %audience_id, email = %recipient, "double_optin_contact_not_found");
            ConfirmError::ContactNotFound {
                email: recipient.to_string(),
            }
        })?;

    directory
        .update_contact(UpdateContact::new(audience_id, &contact.id).with_unsubscribed(false))
        .await
        .map_err(|e| {
            warn!(contact_id = %contact.id, error = %e, "double_optin_update_failed");
            ConfirmError::DirectoryUnavailable(e)
        })?;

    info!(
        audience_id = %audience_id,
        contact_id = %contact.id,
        email = %recipient,
        was_pending = contact.unsubscribed,
        "double_optin_confirmed"
    );

    Ok(ConfirmationOutcome::confirmed(recipient, contact.id))
}
