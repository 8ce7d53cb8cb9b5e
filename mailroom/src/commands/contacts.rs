//! `contacts` commands. The audience comes from `--audience` or
//! `RESEND_AUDIENCE_ID`.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use mailroom::api::{CreateContact, UpdateContact};
use mailroom::Config;

use super::{audience_id, client, print_json};

#[derive(Args, Debug)]
pub struct ContactsArgs {
    /// Audience id, defaults to RESEND_AUDIENCE_ID
    #[arg(long, global = true)]
    pub audience: Option<String>,

    #[command(subcommand)]
    pub command: ContactsCommands,
}

#[derive(Subcommand, Debug)]
pub enum ContactsCommands {
    List,
    Get {
        id: String,
    },
    Create {
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Create the contact as unsubscribed (pending)
        #[arg(long)]
        unsubscribed: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        unsubscribed: Option<bool>,
    },
    Remove {
        id: String,
    },
}

pub async fn execute(args: ContactsArgs, config: &Config) -> Result<()> {
    let audience = audience_id(args.audience, config)?;
    let client = client(config)?;

    match args.command {
        ContactsCommands::List => print_json(
            &client
                .list_contacts(&audience)
                .await
                .context("Failed to list contacts")?,
        ),
        ContactsCommands::Get { id } => print_json(
            &client
                .get_contact(&audience, &id)
                .await
                .context("Failed to fetch contact")?,
        ),
        ContactsCommands::Create {
            email,
            first_name,
            last_name,
            unsubscribed,
        } => {
            let mut contact = CreateContact::new(&audience, email).with_unsubscribed(unsubscribed);
            if let Some(name) = first_name {
                contact = contact.with_first_name(name);
            }
            if let Some(name) = last_name {
                contact = contact.with_last_name(name);
            }
            let id = client
                .create_contact(&contact)
                .await
                .context("Failed to create contact")?;
            print_json(&json!({ "id": id }))
        }
        ContactsCommands::Update {
            id,
            first_name,
            last_name,
            unsubscribed,
        } => {
            if first_name.is_none() && last_name.is_none() && unsubscribed.is_none() {
                bail!("nothing to update: pass --first-name, --last-name or --unsubscribed");
            }
            let update = UpdateContact {
                first_name,
                last_name,
                unsubscribed,
                ..UpdateContact::new(&audience, &id)
            };
            client
                .update_contact(&update)
                .await
                .context("Failed to update contact")?;
            print_json(&json!({ "id": id, "updated": true }))
        }
        ContactsCommands::Remove { id } => {
            client
                .remove_contact(&audience, &id)
                .await
                .context("Failed to remove contact")?;
            print_json(&json!({ "id": id, "deleted": true }))
        }
    }
}
