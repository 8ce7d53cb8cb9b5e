//! CLI subcommands.

pub mod audiences;
pub mod contacts;
pub mod domains;
pub mod email;
pub mod optin;
pub mod send;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;

use mailroom::{Client, Config};

pub fn client(config: &Config) -> Result<Client> {
    Client::from_config(config).context("Failed to create API client")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Audience from `--audience`, falling back to `RESEND_AUDIENCE_ID`.
pub fn audience_id(flag: Option<String>, config: &Config) -> Result<String> {
    flag.or_else(|| config.audience_id.clone())
        .ok_or_else(|| anyhow!("RESEND_AUDIENCE_ID not configured (or pass --audience)"))
}

/// clap value parser for `KEY=VALUE` arguments.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
