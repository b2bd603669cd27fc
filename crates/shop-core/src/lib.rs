//! # shop-core
//!
//! Core types and checkout policy for the storefront checkout service.
//!
//! This crate provides:
//! - `OrderIntent` and `SessionRequest` for the checkout flow
//! - `Catalog` / `LookupMap` for item-name → price id and download URL lookups
//! - `Storefront` for redirect URLs and shipping policy
//! - `CheckoutSessionBuilder` applying the shop's pricing/shipping rules
//! - `CheckoutProvider` and `Mailer` traits for the external services
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{Catalog, CheckoutSessionBuilder, OrderIntent, Storefront};
//!
//! let catalog = Catalog::from_json(r#"{"Ceramic Mug": "price_mug"}"#, "{}");
//! let storefront = Storefront::default();
//!
//! let intent = OrderIntent::new("Ceramic Mug").with_customer_email("ada@example.com");
//! let request = CheckoutSessionBuilder::new(&storefront, &catalog).build(&intent)?;
//!
//! let session = provider.create_session(&request).await?;
//! // Redirect the customer to session.url
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod fulfillment;
pub mod order;
pub mod provider;
pub mod storefront;

// Re-exports for convenience
pub use catalog::{Catalog, LookupMap, PRICE_ID_PREFIX};
pub use checkout::CheckoutSessionBuilder;
pub use error::{ShopError, ShopResult};
pub use fulfillment::{FulfillmentOutcome, SkipReason};
pub use order::{
    is_digital_item, CheckoutMode, CreatedSession, LineItem, OrderIntent, RetrievedSession,
    SessionRequest, ShippingPolicy, ShippingRate, META_CUSTOMER_NAME, META_ORDER_NOTES,
    META_SELECTED_ITEM_NAME,
};
pub use provider::{CheckoutProvider, Email, Mailer, SharedCheckoutProvider, SharedMailer};
pub use storefront::{Storefront, PROCESSING_NOTICE};
