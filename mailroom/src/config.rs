//! Configuration module for environment variable parsing.
//!
//! Every binary reads its configuration from the environment. Secrets are
//! optional at load time; the components that need them report a clear error
//! when they are missing.

use std::env;
use std::str::FromStr;

use secrecy::Secret;
use tracing::warn;

/// Default API endpoint of the email provider.
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Sender used when `EMAIL_FROM` is not set.
pub const DEFAULT_EMAIL_FROM: &str = "Acme <onboarding@resend.dev>";

/// Landing page linked from confirmation emails when `CONFIRM_REDIRECT_URL` is not set.
pub const DEFAULT_CONFIRM_URL: &str = "https://example.com/confirmed";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the email provider
    pub api_key: Option<Secret<String>>,

    /// Base URL of the email provider's REST API
    pub api_base_url: String,

    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Sender address for outgoing mail
    pub email_from: String,

    /// Audience that double opt-in contacts belong to
    pub audience_id: Option<String>,

    /// Link placed in the confirmation email
    pub confirm_redirect_url: String,

    // =========================================================================
    // Web Server Configuration
    // =========================================================================

    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret (`whsec_...`) for webhook signature verification
    pub webhook_secret: Option<Secret<String>>,

    /// Maximum allowed distance in seconds between a webhook timestamp and now
    pub webhook_tolerance_secs: u64,

    /// Maximum accepted webhook body size in bytes
    pub webhook_max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            api_key: non_empty("RESEND_API_KEY").map(Secret::new),

            api_base_url: non_empty("RESEND_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 8000),

            email_from: non_empty("EMAIL_FROM")
                .unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),

            audience_id: non_empty("RESEND_AUDIENCE_ID"),

            confirm_redirect_url: non_empty("CONFIRM_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_CONFIRM_URL.to_string()),

            port: parse_or("PORT", 3000),

            webhook_secret: non_empty("RESEND_WEBHOOK_SECRET").map(Secret::new),

            webhook_tolerance_secs: parse_or("WEBHOOK_TOLERANCE_SECS", 300),

            webhook_max_body_bytes: parse_or("WEBHOOK_MAX_BODY_BYTES", 1024 * 1024),
        }
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset or invalid.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
