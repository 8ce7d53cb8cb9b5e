//! `audiences` commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use mailroom::Config;

use super::{client, print_json};

#[derive(Args, Debug)]
pub struct AudiencesArgs {
    #[command(subcommand)]
    pub command: AudiencesCommands,
}

#[derive(Subcommand, Debug)]
pub enum AudiencesCommands {
    List,
    Get { id: String },
    Create { name: String },
    Remove { id: String },
}

pub async fn execute(args: AudiencesArgs, config: &Config) -> Result<()> {
    let client = client(config)?;

    match args.command {
        AudiencesCommands::List => {
            print_json(&client.list_audiences().await.context("Failed to list audiences")?)
        }
        AudiencesCommands::Get { id } => {
            print_json(&client.get_audience(&id).await.context("Failed to fetch audience")?)
        }
        AudiencesCommands::Create { name } => print_json(
            &client
                .create_audience(&name)
                .await
                .context("Failed to create audience")?,
        ),
        AudiencesCommands::Remove { id } => {
            client.remove_audience(&id).await.context("Failed to remove audience")?;
            print_json(&json!({ "id": id, "deleted": true }))
        }
    }
}
