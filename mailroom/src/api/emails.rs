//! Email sending: single, batch and scheduled delivery.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Client, ListResponse};
use crate::error::{Error, Result};

/// Maximum recipients in the `to` field of one email.
pub const MAX_RECIPIENTS: usize = 50;

/// Maximum emails in one batch request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Maximum total attachment size per email (decoded bytes).
pub const MAX_ATTACHMENT_BYTES: usize = 40 * 1024 * 1024;

/// An outgoing email.
///
/// Built with [`SendEmail::new`] and the `with_*` methods, then handed to
/// [`Client::send_email`] or [`Client::send_batch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SendEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

impl SendEmail {
    pub fn new<I, S>(from: impl Into<String>, to: I, subject: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    pub fn with_bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    pub fn with_reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Add a custom header, e.g. `X-Entity-Ref-ID` to keep Gmail from threading.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Render a hosted template instead of inline `html`/`text`.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    /// Deliver at `at` instead of immediately.
    pub fn with_scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }

    /// Check the constraints the provider would otherwise reject.
    pub fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() {
            return Err(Error::Validation("`from` is required".to_string()));
        }
        if self.to.is_empty() {
            return Err(Error::Validation("at least one recipient is required".to_string()));
        }
        if self.to.len() > MAX_RECIPIENTS {
            return Err(Error::Validation(format!(
                "at most {MAX_RECIPIENTS} recipients are allowed, got {}",
                self.to.len()
            )));
        }
        if self.template.is_some() && (self.html.is_some() || self.text.is_some()) {
            return Err(Error::Validation(
                "`html` and `text` cannot be combined with a template".to_string(),
            ));
        }

        let mut total = 0usize;
        for attachment in &self.attachments {
            attachment.validate()?;
            total += attachment.decoded_len();
        }
        if total > MAX_ATTACHMENT_BYTES {
            return Err(Error::Validation(format!(
                "attachments total {total} bytes, limit is {MAX_ATTACHMENT_BYTES}"
            )));
        }

        Ok(())
    }

    /// Extra constraints for emails sent through the batch endpoint.
    fn validate_for_batch(&self) -> Result<()> {
        self.validate()?;
        if !self.attachments.is_empty() {
            return Err(Error::Validation(
                "batch emails do not support attachments".to_string(),
            ));
        }
        if self.scheduled_at.is_some() {
            return Err(Error::Validation(
                "batch emails do not support scheduling".to_string(),
            ));
        }
        Ok(())
    }
}

/// A file attached to an email, either inline (base64 `content`) or fetched
/// by the provider from a remote `path`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Attachment {
    /// Attach raw bytes; they are base64-encoded here.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: Some(BASE64.encode(bytes)),
            ..Default::default()
        }
    }

    /// Attach a file the provider downloads from `url`.
    pub fn from_url(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            path: Some(url.into()),
            ..Default::default()
        }
    }

    /// Make the attachment referable from HTML as `cid:<id>`.
    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Approximate decoded size of inline content.
    fn decoded_len(&self) -> usize {
        self.content
            .as_ref()
            .map(|c| {
                let padding = c.bytes().rev().take_while(|&b| b == b'=').count();
                (c.len() / 4 * 3).saturating_sub(padding)
            })
            .unwrap_or(0)
    }

    fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(Error::Validation("attachment filename is required".to_string()));
        }
        match (&self.content, &self.path) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(Error::Validation(format!(
                "attachment {} needs exactly one of content or path",
                self.filename
            ))),
        }
    }
}

/// Key/value tag for filtering events by email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// Reference to a hosted template. Variable names are case-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub id: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, serde_json::Value>,
}

impl Template {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variables: BTreeMap::new(),
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Identifier assigned to an accepted email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// A stored email, sent or received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<String>,
    #[serde(default)]
    pub last_event: Option<String>,
}

#[derive(Serialize)]
struct Reschedule<'a> {
    scheduled_at: &'a str,
}

impl Client {
    /// Send one email and return the provider-assigned id.
    pub async fn send_email(&self, email: &SendEmail) -> Result<SentEmail> {
        email.validate()?;

        let sent: SentEmail = self.post(&["emails"], email).await?;

        info!(
            email_id = %sent.id,
            recipients = email.to.len(),
            attachments = email.attachments.len(),
            scheduled = email.scheduled_at.is_some(),
            "email_sent"
        );

        Ok(sent)
    }

    /// Send up to [`MAX_BATCH_SIZE`] emails in one request.
    ///
    /// Ids come back in the same order as `emails`.
    pub async fn send_batch(&self, emails: &[SendEmail]) -> Result<Vec<SentEmail>> {
        if emails.is_empty() || emails.len() > MAX_BATCH_SIZE {
            return Err(Error::Validation(format!(
                "a batch holds 1 to {MAX_BATCH_SIZE} emails, got {}",
                emails.len()
            )));
        }
        for email in emails {
            email.validate_for_batch()?;
        }

        let response: ListResponse<SentEmail> = self.post(&["emails", "batch"], emails).await?;

        info!(count = response.data.len(), "email_batch_sent");

        Ok(response.data)
    }

    /// Fetch an email by id, including inbound emails announced by `email.received`.
    pub async fn get_email(&self, id: &str) -> Result<Email> {
        self.get(&["emails", id]).await
    }

    /// Move a scheduled email to a new delivery time.
    pub async fn reschedule_email(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let scheduled_at = at.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.patch(
            &["emails", id],
            &Reschedule {
                scheduled_at: &scheduled_at,
            },
        )
        .await?;
        info!(email_id = %id, scheduled_at = %scheduled_at, "email_rescheduled");
        Ok(())
    }

    /// Cancel a scheduled email before it is delivered.
    pub async fn cancel_email(&self, id: &str) -> Result<()> {
        self.post_action(&["emails", id, "cancel"]).await?;
        info!(email_id = %id, "email_cancelled");
        Ok(())
    }
}
