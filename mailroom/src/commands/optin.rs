//! `optin` commands: drive the double opt-in flow without the web server.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use mailroom::optin::{self, SubscribeRequest, SubscribeSettings};
use mailroom::webhook::{WebhookEvent, EMAIL_CLICKED};
use mailroom::Config;

use super::{audience_id, client, print_json};

#[derive(Args, Debug)]
pub struct OptinArgs {
    /// Audience id, defaults to RESEND_AUDIENCE_ID
    #[arg(long, global = true)]
    pub audience: Option<String>,

    #[command(subcommand)]
    pub command: OptinCommands,
}

#[derive(Subcommand, Debug)]
pub enum OptinCommands {
    /// Add a pending contact and send the confirmation email
    Subscribe {
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Confirm a pending contact as if its confirmation link was clicked
    Confirm { email: String },
}

pub async fn execute(args: OptinArgs, config: &Config) -> Result<()> {
    let audience = audience_id(args.audience, config)?;
    let client = client(config)?;

    match args.command {
        OptinCommands::Subscribe { email, name } => {
            let request = SubscribeRequest { email, name };
            let settings = SubscribeSettings {
                audience_id: &audience,
                from: &config.email_from,
                confirm_url: &config.confirm_redirect_url,
            };
            let outcome = optin::subscribe(&client, &client, &request, &settings)
                .await
                .context("Double opt-in subscribe failed")?;
            print_json(&outcome)
        }
        OptinCommands::Confirm { email } => {
            let event = clicked_event(&email);
            let outcome = optin::confirm(&client, &event, &audience)
                .await
                .context("Double opt-in confirmation failed")?;
            print_json(&outcome)
        }
    }
}

/// The `email.clicked` event the provider would deliver for `email`.
fn clicked_event(email: &str) -> WebhookEvent {
    WebhookEvent::new(EMAIL_CLICKED, json!({ "to": [email] }))
}
