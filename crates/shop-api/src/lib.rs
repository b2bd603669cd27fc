//! # shop-api
//!
//! HTTP edge layer for the shop checkout service.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout session creation and lookup
//! - Stripe webhook endpoint with digital download fulfillment
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session` | Create checkout session |
//! | GET | `/checkout-session-details` | Paid/digital status for the success page |
//! | POST | `/webhook` | Stripe webhook |

pub mod fulfillment;
pub mod handlers;
pub mod routes;
pub mod state;

pub use fulfillment::FulfillmentEmailer;
pub use routes::create_router;
pub use state::{AppConfig, AppState};
