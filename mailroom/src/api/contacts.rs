//! Contacts scoped to an audience.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Client, ListResponse, ObjectId};
use crate::error::Result;

/// A recipient record inside an audience.
///
/// `unsubscribed == true` doubles as "pending confirmation" for double
/// opt-in contacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub unsubscribed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Parameters for creating a contact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateContact {
    #[serde(skip)]
    pub audience_id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub unsubscribed: bool,
}

impl CreateContact {
    pub fn new(audience_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            audience_id: audience_id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            unsubscribed: false,
        }
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn with_unsubscribed(mut self, unsubscribed: bool) -> Self {
        self.unsubscribed = unsubscribed;
        self
    }
}

/// Partial update of a contact. Unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateContact {
    #[serde(skip)]
    pub audience_id: String,
    #[serde(skip)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unsubscribed: Option<bool>,
}

impl UpdateContact {
    pub fn new(audience_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            audience_id: audience_id.into(),
            id: id.into(),
            first_name: None,
            last_name: None,
            unsubscribed: None,
        }
    }

    pub fn with_first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    pub fn with_last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    pub fn with_unsubscribed(mut self, unsubscribed: bool) -> Self {
        self.unsubscribed = Some(unsubscribed);
        self
    }
}

impl Client {
    /// Create a contact and return its id.
    pub async fn create_contact(&self, contact: &CreateContact) -> Result<String> {
        let created: ObjectId = self
            .post(&["audiences", &contact.audience_id, "contacts"], contact)
            .await?;

        info!(
            audience_id = %contact.audience_id,
            contact_id = %created.id,
            unsubscribed = contact.unsubscribed,
            "contact_created"
        );

        Ok(created.id)
    }

    /// List every contact of an audience, in the provider's order.
    pub async fn list_contacts(&self, audience_id: &str) -> Result<Vec<Contact>> {
        let response: ListResponse<Contact> =
            self.get(&["audiences", audience_id, "contacts"]).await?;
        Ok(response.data)
    }

    pub async fn get_contact(&self, audience_id: &str, id: &str) -> Result<Contact> {
        self.get(&["audiences", audience_id, "contacts", id]).await
    }

    pub async fn update_contact(&self, update: &UpdateContact) -> Result<()> {
        self.patch(
            &["audiences", &update.audience_id, "contacts", &update.id],
            update,
        )
        .await?;

        info!(
            audience_id = %update.audience_id,
            contact_id = %update.id,
            unsubscribed = ?update.unsubscribed,
            "contact_updated"
        );

        Ok(())
    }

    pub async fn remove_contact(&self, audience_id: &str, id: &str) -> Result<()> {
        self.delete(&["audiences", audience_id, "contacts", id])
            .await?;
        info!(audience_id = %audience_id, contact_id = %id, "contact_removed");
        Ok(())
    }
}
