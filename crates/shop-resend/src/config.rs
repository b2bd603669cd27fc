//! # Resend Configuration
//!
//! Credentials for the Resend email API, loaded from environment variables.

use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.resend.com";

/// Resend API configuration
#[derive(Debug, Clone)]
pub struct ResendConfig {
    /// API key (re_...)
    pub api_key: String,

    /// Verified sender address
    pub from_email: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl ResendConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `RESEND_API_KEY` and `RESEND_FROM_EMAIL`
    /// are set; digital fulfillment is disabled in that case.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        let api_key = non_empty_var("RESEND_API_KEY")?;
        let from_email = non_empty_var("RESEND_FROM_EMAIL")?;

        Some(Self {
            api_key,
            from_email,
            api_base_url: non_empty_var("RESEND_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>, from_email: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from_email: from_email.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
