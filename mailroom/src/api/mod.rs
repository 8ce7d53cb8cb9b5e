//! Client for the email provider's REST API.
//!
//! One [`Client`] is built per process and shared behind an `Arc`; the
//! underlying `reqwest::Client` pools connections and is safe to use from
//! many tasks at once.
//!
//! Resource operations live in the submodules as `impl Client` blocks:
//! - [`emails`]: send, batch send, fetch, reschedule, cancel
//! - [`contacts`]: audience-scoped contact CRUD
//! - [`audiences`]: audience CRUD
//! - [`domains`]: sending domain management

pub mod audiences;
pub mod contacts;
pub mod domains;
pub mod emails;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::Config;

pub use audiences::Audience;
pub use contacts::{Contact, CreateContact, UpdateContact};
pub use domains::{CreateDomain, DnsRecord, Domain};
pub use emails::{Attachment, Email, SendEmail, SentEmail, Tag, Template};

/// List envelope used by every collection endpoint: `{"object": "list", "data": [...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub data: Vec<T>,
}

/// Minimal `{"id": "..."}` body returned by create endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ObjectId {
    pub id: String,
}

/// Authenticated client for the provider API.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    api_key: Secret<String>,
}

impl Client {
    /// Create a client for `base_url` authenticating with `api_key`.
    pub fn new(api_key: impl Into<String>, base_url: &str, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("API base URL {base_url} cannot be a base")));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mailroom/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: Secret::new(api_key),
        })
    }

    /// Create a client from the environment-derived configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().as_str())
            .ok_or_else(|| Error::Config("RESEND_API_KEY environment variable is required".to_string()))?;

        Self::new(
            api_key,
            &config.api_base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new(), so path_segments_mut succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(segments))
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Send a request and decode the JSON body of a successful response.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.execute_raw(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send a request, turning non-success statuses into [`Error::Api`].
    async fn execute_raw(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Error::from_response(status, &body);
            warn!(
                path = %url,
                status_code = status.as_u16(),
                error = %err,
                "provider_request_failed"
            );
            return Err(err);
        }

        debug!(path = %url, status_code = status.as_u16(), "provider_request_ok");

        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.execute(self.request(Method::GET, segments)).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.execute(self.request(Method::POST, segments).json(body))
            .await
    }

    async fn patch<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<()> {
        self.execute_raw(self.request(Method::PATCH, segments).json(body))
            .await
            .map(drop)
    }

    /// POST without a body, for action endpoints like verify and cancel.
    async fn post_action(&self, segments: &[&str]) -> Result<()> {
        self.execute_raw(self.request(Method::POST, segments))
            .await
            .map(drop)
    }

    async fn delete(&self, segments: &[&str]) -> Result<()> {
        self.execute_raw(self.request(Method::DELETE, segments))
            .await
            .map(drop)
    }
}
