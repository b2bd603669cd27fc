//! # shop-resend
//!
//! Resend transactional email backend for the shop checkout service.
//!
//! ```rust,ignore
//! use shop_resend::{ResendConfig, ResendMailer};
//!
//! if let Some(config) = ResendConfig::from_env() {
//!     let mailer = ResendMailer::new(config)?;
//!     mailer.send(&email).await?;
//! }
//! ```

pub mod client;
pub mod config;

pub use client::ResendMailer;
pub use config::ResendConfig;
