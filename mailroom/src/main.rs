//! Mailroom CLI - command line client for the email provider's REST API.
//!
//! Every command prints the provider's answer as pretty JSON on stdout.
//! Logs go to stderr.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mailroom::Config;

/// Send email and manage domains, audiences and contacts
#[derive(Parser)]
#[command(name = "mailroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one email
    Send(commands::send::SendArgs),

    /// Send several emails from a JSON file in one request
    Batch(commands::send::BatchArgs),

    /// Inspect, reschedule or cancel a sent email
    Email(commands::email::EmailArgs),

    /// Manage sending domains
    Domains(commands::domains::DomainsArgs),

    /// Manage audiences
    Audiences(commands::audiences::AudiencesArgs),

    /// Manage the contacts of an audience
    Contacts(commands::contacts::ContactsArgs),

    /// Run the double opt-in flow by hand
    Optin(commands::optin::OptinArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Send(args) => commands::send::execute(args, &config).await,
        Commands::Batch(args) => commands::send::execute_batch(args, &config).await,
        Commands::Email(args) => commands::email::execute(args, &config).await,
        Commands::Domains(args) => commands::domains::execute(args, &config).await,
        Commands::Audiences(args) => commands::audiences::execute(args, &config).await,
        Commands::Contacts(args) => commands::contacts::execute(args, &config).await,
        Commands::Optin(args) => commands::optin::execute(args, &config).await,
    }
}
