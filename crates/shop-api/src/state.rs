//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup and never mutated; every handler clones it.

use crate::fulfillment::FulfillmentEmailer;
use shop_core::{Catalog, SharedCheckoutProvider, SharedMailer, Storefront};
use shop_resend::{ResendConfig, ResendMailer};
use shop_stripe::{StripeCheckoutClient, StripeConfig, REQUIRED_WEBHOOK_EVENTS};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_CATALOG_PATHS: [&str; 3] = [
    "config/catalog.toml",
    "../config/catalog.toml",
    "../../config/catalog.toml",
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Value for `Access-Control-Allow-Origin`; `*` when unset
    pub allowed_origin: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            json_logs: std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")),
            allowed_origin: non_empty_var("ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}: {}", addr, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            json_logs: false,
            allowed_origin: "*".to_string(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Shop name, redirect URLs and shipping policy
    pub storefront: Arc<Storefront>,
    /// Price and download lookups
    pub catalog: Arc<Catalog>,
    /// Checkout provider; `None` when the secret key is not configured
    pub checkout: Option<SharedCheckoutProvider>,
    /// Webhook signing secret
    pub webhook_secret: Option<Arc<str>>,
    /// Digital download delivery
    pub fulfillment: Arc<FulfillmentEmailer>,
}

impl AppState {
    /// Create state with no providers configured
    pub fn new(config: AppConfig, storefront: Storefront, catalog: Catalog) -> Self {
        let storefront = Arc::new(storefront);
        let catalog = Arc::new(catalog);
        let fulfillment = Arc::new(FulfillmentEmailer::new(
            None,
            catalog.clone(),
            storefront.clone(),
        ));

        Self {
            config: Arc::new(config),
            storefront,
            catalog,
            checkout: None,
            webhook_secret: None,
            fulfillment,
        }
    }

    /// Build the full state from environment variables.
    ///
    /// Missing provider secrets are not fatal; the endpoints that need them
    /// answer with a configuration error instead.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(AppConfig::from_env())
    }

    /// Build the state around an already loaded [`AppConfig`]
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let storefront = load_storefront();
        let catalog = load_catalog()?;

        let stripe = StripeConfig::from_env();
        let webhook_secret = stripe.webhook_secret.clone();

        let mut state = Self::new(config, storefront, catalog);

        if stripe.is_test_mode() {
            info!("Stripe is using test mode keys");
        }

        if stripe.secret_key.is_some() {
            let client = StripeCheckoutClient::new(stripe)
                .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
            state = state.with_checkout_provider(Arc::new(client));
        }

        if let Some(secret) = webhook_secret {
            info!(
                "Stripe webhook endpoint expects events: {}",
                REQUIRED_WEBHOOK_EVENTS.join(", ")
            );
            state = state.with_webhook_secret(secret);
        }

        match ResendConfig::from_env() {
            Some(resend) => {
                let mailer = ResendMailer::new(resend)
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Resend: {}", e))?;
                state = state.with_mailer(Arc::new(mailer));
            }
            None => warn!("RESEND_API_KEY or RESEND_FROM_EMAIL not set; download emails disabled"),
        }

        Ok(state)
    }

    /// Builder: set the checkout provider
    pub fn with_checkout_provider(mut self, provider: SharedCheckoutProvider) -> Self {
        self.checkout = Some(provider);
        self
    }

    /// Builder: set the webhook signing secret
    pub fn with_webhook_secret(mut self, secret: impl AsRef<str>) -> Self {
        self.webhook_secret = Some(Arc::from(secret.as_ref()));
        self
    }

    /// Builder: set the mailer used for digital fulfillment
    pub fn with_mailer(mut self, mailer: SharedMailer) -> Self {
        self.fulfillment = Arc::new(FulfillmentEmailer::new(
            Some(mailer),
            self.catalog.clone(),
            self.storefront.clone(),
        ));
        self
    }
}

/// Storefront settings from `SHOP_NAME`, `SUCCESS_URL`, `CANCEL_URL`, `SUPPORT_EMAIL`
fn load_storefront() -> Storefront {
    let mut storefront = Storefront::default();

    if let Some(name) = non_empty_var("SHOP_NAME") {
        storefront.name = name;
    }
    if let Some(url) = non_empty_var("SUCCESS_URL") {
        storefront = storefront.with_success_url(url);
    }
    if let Some(url) = non_empty_var("CANCEL_URL") {
        storefront = storefront.with_cancel_url(url);
    }
    if let Some(email) = non_empty_var("SUPPORT_EMAIL") {
        storefront = storefront.with_support_email(email);
    }

    storefront
}

/// Load the price and download maps.
///
/// `ITEM_PRICE_MAP` / `DOWNLOAD_LINK_MAP` (JSON) take precedence; when neither
/// is set the catalog comes from `CATALOG_PATH` or `config/catalog.toml`.
fn load_catalog() -> anyhow::Result<Catalog> {
    let price_map = non_empty_var("ITEM_PRICE_MAP");
    let download_map = non_empty_var("DOWNLOAD_LINK_MAP");

    if price_map.is_some() || download_map.is_some() {
        let catalog = Catalog::from_json(
            price_map.as_deref().unwrap_or("{}"),
            download_map.as_deref().unwrap_or("{}"),
        );
        info!(
            "Loaded {} prices and {} downloads from environment",
            catalog.prices.len(),
            catalog.downloads.len()
        );
        return Ok(catalog);
    }

    let explicit = non_empty_var("CATALOG_PATH");
    let candidates: Vec<&str> = match explicit.as_deref() {
        Some(path) => vec![path],
        None => DEFAULT_CATALOG_PATHS.to_vec(),
    };

    for path in candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = Catalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            info!(
                "Loaded {} prices and {} downloads from {}",
                catalog.prices.len(),
                catalog.downloads.len(),
                path
            );
            return Ok(catalog);
        }
    }

    if let Some(path) = explicit {
        anyhow::bail!("CATALOG_PATH {} could not be read", path);
    }

    warn!("No item catalog found, using empty catalog");
    Ok(Catalog::new())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
