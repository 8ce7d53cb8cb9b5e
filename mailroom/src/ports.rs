//! Seams between the workflows and the email provider.
//!
//! The double opt-in workflows only need a handful of provider calls. They
//! take these traits instead of [`api::Client`](crate::api::Client) so a
//! single configured client can be injected at startup, and tests can swap
//! in fakes.

use async_trait::async_trait;

use crate::api::{Client, Contact, CreateContact, SendEmail, UpdateContact};
use crate::error::Result;

/// Audience-scoped contact storage.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// All contacts of an audience, in the directory's own order.
    async fn list_contacts(&self, audience_id: &str) -> Result<Vec<Contact>>;

    /// Create a contact and return its id.
    async fn create_contact(&self, contact: CreateContact) -> Result<String>;

    async fn update_contact(&self, update: UpdateContact) -> Result<()>;
}

/// Outbound email delivery.
#[async_trait]
pub trait EmailGateway: Send + Sync {
    /// Send one email and return the provider-assigned message id.
    async fn send_email(&self, email: SendEmail) -> Result<String>;
}

#[async_trait]
impl ContactDirectory for Client {
    async fn list_contacts(&self, audience_id: &str) -> Result<Vec<Contact>> {
        Client::list_contacts(self, audience_id).await
    }

    async fn create_contact(&self, contact: CreateContact) -> Result<String> {
        Client::create_contact(self, &contact).await
    }

    async fn update_contact(&self, update: UpdateContact) -> Result<()> {
        Client::update_contact(self, &update).await
    }
}

#[async_trait]
impl EmailGateway for Client {
    async fn send_email(&self, email: SendEmail) -> Result<String> {
        Client::send_email(self, &email).await.map(|sent| sent.id)
    }
}
