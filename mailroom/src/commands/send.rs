//! `send` and `batch` commands.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use mailroom::api::{Attachment, SendEmail, Template};
use mailroom::Config;

use super::{client, parse_key_value, print_json};

/// Header that stops Gmail from threading otherwise identical emails.
const ENTITY_REF_HEADER: &str = "X-Entity-Ref-ID";

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Sender, defaults to EMAIL_FROM
    #[arg(long)]
    pub from: Option<String>,

    /// Recipient address (repeatable)
    #[arg(long, required = true)]
    pub to: Vec<String>,

    #[arg(long, default_value = "")]
    pub subject: String,

    /// HTML body
    #[arg(long)]
    pub html: Option<String>,

    /// Plain text body
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub cc: Vec<String>,

    #[arg(long)]
    pub bcc: Vec<String>,

    #[arg(long)]
    pub reply_to: Vec<String>,

    /// Custom header as NAME=VALUE (repeatable)
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// Attach a local file (repeatable)
    #[arg(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// Attach a remote file as FILENAME=URL (repeatable)
    #[arg(long = "attach-url", value_parser = parse_key_value)]
    pub remote_attachments: Vec<(String, String)>,

    /// Inline image as CID=PATH, referenced from HTML as `cid:CID` (repeatable)
    #[arg(long = "inline", value_parser = parse_key_value)]
    pub inline: Vec<(String, String)>,

    /// Tag as NAME=VALUE (repeatable)
    #[arg(long = "tag", value_parser = parse_key_value)]
    pub tags: Vec<(String, String)>,

    /// Hosted template id; replaces --html and --text
    #[arg(long)]
    pub template: Option<String>,

    /// Template variable as NAME=VALUE (repeatable)
    #[arg(long = "var", value_parser = parse_key_value, requires = "template")]
    pub variables: Vec<(String, String)>,

    /// Add a fresh X-Entity-Ref-ID header so the email starts its own thread
    #[arg(long)]
    pub unique_thread: bool,

    /// Deliver this many minutes from now
    #[arg(long, value_name = "MINUTES")]
    pub schedule_in: Option<u32>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON file holding an array of `{from?, to, subject, html?, text?}`
    pub file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    #[serde(default)]
    from: Option<String>,
    to: Vec<String>,
    subject: String,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

pub async fn execute(args: SendArgs, config: &Config) -> Result<()> {
    let email = build_email(args, config).await?;
    let sent = client(config)?
        .send_email(&email)
        .await
        .context("Failed to send email")?;
    print_json(&sent)
}

pub async fn execute_batch(args: BatchArgs, config: &Config) -> Result<()> {
    let raw = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let emails = parse_batch(&raw, config)?;

    let sent = client(config)?
        .send_batch(&emails)
        .await
        .context("Failed to send batch")?;
    print_json(&sent)
}

async fn build_email(args: SendArgs, config: &Config) -> Result<SendEmail> {
    let from = args.from.unwrap_or_else(|| config.email_from.clone());
    let mut email = SendEmail::new(from, args.to, args.subject);

    match args.template {
        Some(id) => {
            let template = args
                .variables
                .into_iter()
                .fold(Template::new(id), |t, (name, value)| t.with_variable(name, value));
            email = email.with_template(template);
        }
        None => {
            if args.html.is_none() && args.text.is_none() {
                bail!("one of --html, --text or --template is required");
            }
            if let Some(html) = args.html {
                email = email.with_html(html);
            }
            if let Some(text) = args.text {
                email = email.with_text(text);
            }
        }
    }

    for address in args.cc {
        email = email.with_cc(address);
    }
    for address in args.bcc {
        email = email.with_bcc(address);
    }
    for address in args.reply_to {
        email = email.with_reply_to(address);
    }
    for (name, value) in args.headers {
        email = email.with_header(name, value);
    }
    if args.unique_thread {
        email = email.with_header(ENTITY_REF_HEADER, Uuid::new_v4().to_string());
    }
    for (name, value) in args.tags {
        email = email.with_tag(name, value);
    }

    for path in &args.attachments {
        email = email.with_attachment(read_attachment(path).await?);
    }
    for (filename, url) in args.remote_attachments {
        email = email.with_attachment(Attachment::from_url(filename, url));
    }
    for (content_id, path) in &args.inline {
        let attachment = read_attachment(Path::new(path)).await?;
        email = email.with_attachment(attachment.with_content_id(content_id));
    }

    if let Some(minutes) = args.schedule_in {
        email = email.with_scheduled_at(Utc::now() + Duration::minutes(i64::from(minutes)));
    }

    Ok(email)
}

async fn read_attachment(path: &Path) -> Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("Attachment path has no file name: {}", path.display()))?;

    let attachment = Attachment::from_bytes(filename, &bytes);
    Ok(match content_type_for(path) {
        Some(content_type) => attachment.with_content_type(content_type),
        None => attachment,
    })
}

/// MIME type for extensions mail clients treat specially; others are left
/// to the provider.
fn content_type_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "ics" => "text/calendar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => return None,
    };
    Some(content_type)
}

fn parse_batch(raw: &[u8], config: &Config) -> Result<Vec<SendEmail>> {
    let entries: Vec<BatchEntry> =
        serde_json::from_slice(raw).context("Batch file must be a JSON array of emails")?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let from = entry.from.unwrap_or_else(|| config.email_from.clone());
            let mut email = SendEmail::new(from, entry.to, entry.subject);
            email.html = entry.html;
            email.text = entry.text;
            email
        })
        .collect())
}
