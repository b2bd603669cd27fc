//! # Provider Traits
//!
//! Seams to the two external services the shop talks to.
//!
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────┐
//! │  CheckoutProvider (trait)    │     │     Mailer (trait)       │
//! │  ├── create_session()        │     │  ├── send()              │
//! │  ├── retrieve_session()      │     │  └── provider_name()     │
//! │  └── provider_name()         │     └────────────▲─────────────┘
//! └──────────────▲───────────────┘                  │
//!                │                         ┌────────┴────────┐
//!       ┌────────┴────────┐                │  ResendMailer   │
//!       │  StripeCheckout │                └─────────────────┘
//!       │     Client      │
//!       └─────────────────┘
//! ```

use crate::error::ShopResult;
use crate::order::{CreatedSession, RetrievedSession, SessionRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// A hosted checkout provider.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    /// Open a hosted checkout session and return its id and redirect URL.
    async fn create_session(&self, request: &SessionRequest) -> ShopResult<CreatedSession>;

    /// Fetch an existing session by id.
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<RetrievedSession>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared checkout provider (dynamic dispatch)
pub type SharedCheckoutProvider = Arc<dyn CheckoutProvider>;

/// An HTML email to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Sender address
    pub from: String,
    /// Recipient addresses
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl Email {
    /// Create a new email to a single recipient
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: vec![to.into()],
            subject: subject.into(),
            html: String::new(),
        }
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = body.into();
        self
    }
}

/// A transactional email backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send an email, returning the provider's message id.
    async fn send(&self, email: &Email) -> ShopResult<String>;

    /// Sender address configured for this backend
    fn from_address(&self) -> &str;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared mailer (dynamic dispatch)
pub type SharedMailer = Arc<dyn Mailer>;
