//! `email` commands for already-sent emails.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Args, Subcommand};
use serde_json::json;

use mailroom::Config;

use super::{client, print_json};

#[derive(Args, Debug)]
pub struct EmailArgs {
    #[command(subcommand)]
    pub command: EmailCommands,
}

#[derive(Subcommand, Debug)]
pub enum EmailCommands {
    /// Show a sent or received email
    Get { id: String },
    /// Move a scheduled email
    Reschedule {
        id: String,
        /// New delivery time, in minutes from now
        #[arg(long = "in", value_name = "MINUTES")]
        minutes: u32,
    },
    /// Cancel a scheduled email
    Cancel { id: String },
}

pub async fn execute(args: EmailArgs, config: &Config) -> Result<()> {
    let client = client(config)?;

    match args.command {
        EmailCommands::Get { id } => {
            let email = client.get_email(&id).await.context("Failed to fetch email")?;
            print_json(&email)
        }
        EmailCommands::Reschedule { id, minutes } => {
            let at = Utc::now() + Duration::minutes(i64::from(minutes));
            client
                .reschedule_email(&id, at)
                .await
                .context("Failed to reschedule email")?;
            print_json(&json!({ "id": id, "scheduled_at": at.to_rfc3339() }))
        }
        EmailCommands::Cancel { id } => {
            client.cancel_email(&id).await.context("Failed to cancel email")?;
            print_json(&json!({ "id": id, "cancelled": true }))
        }
    }
}
