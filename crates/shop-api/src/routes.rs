//! # Routes
//!
//! Axum router configuration for the checkout API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /create-checkout-session - Create checkout session
/// - GET  /checkout-session-details?session_id=cs_... - Success page lookup
/// - POST /webhook - Stripe webhook handler (raw body)
///
/// Anything else, including a known path with the wrong method, answers
/// 404 `{"error": "Not found"}`.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origin);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/create-checkout-session", post(handlers::create_checkout_session))
        .route("/checkout-session-details", get(handlers::checkout_session_details))
        .route("/webhook", post(handlers::stripe_webhook))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        // State
        .with_state(state)
}

/// CORS for the storefront: one configured origin, or `*`
fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(allowed_origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!("ALLOWED_ORIGIN {:?} is not a valid header value, allowing any origin", allowed_origin);
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
