//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables. A missing secret does
//! not stop the service; the endpoint needing it answers with a
//! configuration error instead.

use shop_core::ShopError;
use std::env;
use tracing::warn;

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_API_VERSION: &str = "2024-12-18.acacia";

/// Stripe API configuration
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_..., sk_live_... or a restricted rk_ key)
    pub secret_key: Option<String>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Read env vars:
    /// - `STRIPE_SECRET_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_API_BASE_URL` (optional)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        let secret_key = non_empty_var("STRIPE_SECRET_KEY");
        let webhook_secret = non_empty_var("STRIPE_WEBHOOK_SECRET");

        match &secret_key {
            None => warn!("STRIPE_SECRET_KEY not set; checkout endpoints will fail"),
            Some(key) if !key.starts_with("sk_") && !key.starts_with("rk_") => {
                warn!("STRIPE_SECRET_KEY does not look like a Stripe secret key")
            }
            Some(_) => {}
        }

        match &webhook_secret {
            None => warn!("STRIPE_WEBHOOK_SECRET not set; webhooks will be rejected"),
            Some(secret) if !secret.starts_with("whsec_") => {
                warn!("STRIPE_WEBHOOK_SECRET does not start with whsec_")
            }
            Some(_) => {}
        }

        Self {
            secret_key,
            webhook_secret,
            api_base_url: non_empty_var("STRIPE_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: Some(secret_key.into()),
            webhook_secret: Some(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Secret key, or a configuration error when absent
    pub fn require_secret_key(&self) -> Result<&str, ShopError> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| ShopError::Configuration("Missing STRIPE_SECRET_KEY".to_string()))
    }

    /// Webhook signing secret, or a configuration error when absent
    pub fn require_webhook_secret(&self) -> Result<&str, ShopError> {
        self.webhook_secret
            .as_deref()
            .ok_or_else(|| ShopError::Configuration("Missing STRIPE_WEBHOOK_SECRET".to_string()))
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key
            .as_deref()
            .is_some_and(|key| key.starts_with("sk_test_") || key.starts_with("rk_test_"))
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> Result<String, ShopError> {
        Ok(format!("Bearer {}", self.require_secret_key()?))
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
