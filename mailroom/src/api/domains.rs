//! Sending domains and their DNS verification records.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Client, ListResponse};
use crate::error::Result;

/// A sending domain. `records` is only populated by create and get.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub records: Vec<DnsRecord>,
}

/// A DNS record the domain owner must publish (SPF, DKIM, MX).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsRecord {
    #[serde(default)]
    pub record: String,
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDomain {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl CreateDomain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
        }
    }

    /// Region to send from, e.g. `us-east-1` or `eu-west-1`.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

impl Client {
    pub async fn create_domain(&self, domain: &CreateDomain) -> Result<Domain> {
        let created: Domain = self.post(&["domains"], domain).await?;
        info!(
            domain_id = %created.id,
            name = %created.name,
            records = created.records.len(),
            "domain_created"
        );
        Ok(created)
    }

    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let response: ListResponse<Domain> = self.get(&["domains"]).await?;
        Ok(response.data)
    }

    pub async fn get_domain(&self, id: &str) -> Result<Domain> {
        self.get(&["domains", id]).await
    }

    /// Ask the provider to re-check the domain's DNS records.
    pub async fn verify_domain(&self, id: &str) -> Result<()> {
        self.post_action(&["domains", id, "verify"]).await?;
        info!(domain_id = %id, "domain_verification_requested");
        Ok(())
    }

    pub async fn remove_domain(&self, id: &str) -> Result<()> {
        self.delete(&["domains", id]).await?;
        info!(domain_id = %id, "domain_removed");
        Ok(())
    }
}
