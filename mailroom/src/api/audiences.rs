//! Audiences: named contact lists.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Client, ListResponse};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize)]
struct CreateAudience<'a> {
    name: &'a str,
}

impl Client {
    pub async fn create_audience(&self, name: &str) -> Result<Audience> {
        let audience: Audience = self.post(&["audiences"], &CreateAudience { name }).await?;
        info!(audience_id = %audience.id, name = %audience.name, "audience_created");
        Ok(audience)
    }

    pub async fn list_audiences(&self) -> Result<Vec<Audience>> {
        let response: ListResponse<Audience> = self.get(&["audiences"]).await?;
        Ok(response.data)
    }

    pub async fn get_audience(&self, id: &str) -> Result<Audience> {
        self.get(&["audiences", id]).await
    }

    pub async fn remove_audience(&self, id: &str) -> Result<()> {
        self.delete(&["audiences", id]).await?;
        info!(audience_id = %id, "audience_removed");
        Ok(())
    }
}
