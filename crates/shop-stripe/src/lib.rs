//! # shop-stripe
//!
//! Stripe integration for the shop checkout service.
//!
//! This crate provides:
//!
//! 1. **StripeCheckoutClient** - Checkout Sessions API behind `CheckoutProvider`
//!    - Price-id line items
//!    - Shipping rates for physical goods
//!    - Customer email prefill and metadata
//!
//! 2. **Webhook verification** - `Stripe-Signature` parsing and HMAC-SHA256
//!    checking with a 300 second tolerance window
//!
//! 3. **Webhook dispatch** - closed `EventKind` enum routed to a `WebhookHandler`
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use shop_stripe::{dispatch_webhook_event, verify_payload, StripeEvent};
//!
//! // In your webhook endpoint:
//! let payload = verify_payload(&body, signature, webhook_secret)?;
//! let event = StripeEvent::parse(payload)?;
//! dispatch_webhook_event(&handler, &event).await;
//! ```

pub mod checkout;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use checkout::{session_form_params, StripeCheckoutClient};
pub use config::StripeConfig;
pub use signature::{
    compute_signature, verify, verify_payload, verify_payload_at, SignatureError,
    SignatureHeader, VerifiedPayload, TOLERANCE_SECS,
};
pub use webhook::{
    dispatch_webhook_event, CheckoutSessionObject, Dispatched, EventKind, StripeEvent,
    WebhookHandler, REQUIRED_WEBHOOK_EVENTS,
};
