//! `domains` commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use mailroom::api::CreateDomain;
use mailroom::Config;

use super::{client, print_json};

#[derive(Args, Debug)]
pub struct DomainsArgs {
    #[command(subcommand)]
    pub command: DomainsCommands,
}

#[derive(Subcommand, Debug)]
pub enum DomainsCommands {
    /// List sending domains
    List,
    /// Show a domain with its DNS records
    Get { id: String },
    /// Register a new sending domain
    Create {
        name: String,
        /// Sending region, e.g. us-east-1 or eu-west-1
        #[arg(long)]
        region: Option<String>,
    },
    /// Start DNS verification of a domain
    Verify { id: String },
    /// Delete a domain
    Remove { id: String },
}

pub async fn execute(args: DomainsArgs, config: &Config) -> Result<()> {
    let client = client(config)?;

    match args.command {
        DomainsCommands::List => {
            print_json(&client.list_domains().await.context("Failed to list domains")?)
        }
        DomainsCommands::Get { id } => {
            print_json(&client.get_domain(&id).await.context("Failed to fetch domain")?)
        }
        DomainsCommands::Create { name, region } => {
            let mut domain = CreateDomain::new(name);
            if let Some(region) = region {
                domain = domain.with_region(region);
            }
            print_json(&client.create_domain(&domain).await.context("Failed to create domain")?)
        }
        DomainsCommands::Verify { id } => {
            client.verify_domain(&id).await.context("Failed to verify domain")?;
            print_json(&json!({ "id": id, "verification_started": true }))
        }
        DomainsCommands::Remove { id } => {
            client.remove_domain(&id).await.context("Failed to remove domain")?;
            print_json(&json!({ "id": id, "deleted": true }))
        }
    }
}
