//! # shop-checkout
//!
//! Checkout and digital fulfillment service for the storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export RESEND_API_KEY=re_...
//! export RESEND_FROM_EMAIL=orders@example.com
//!
//! # Run the server
//! shop-checkout
//! ```

use shop_api::{routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    if config.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    // Initialize application state
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;

    info!("Environment: {}", state.config.environment);
    info!("Shop: {}", state.storefront.name);
    info!(
        "Catalog: {} prices, {} downloads",
        state.catalog.prices.len(),
        state.catalog.downloads.len()
    );
    info!(
        "Checkout configured: {}, webhooks configured: {}, download emails configured: {}",
        state.checkout.is_some(),
        state.webhook_secret.is_some(),
        state.fulfillment.is_configured()
    );

    let is_prod = state.config.is_production();

    // Create router
    let app = routes::create_router(state);

    info!("shop-checkout {} listening on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Checkout: POST http://{}/create-checkout-session", addr);
        info!("Webhook: POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
