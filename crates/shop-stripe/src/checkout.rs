//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API behind the
//! [`CheckoutProvider`] trait. Requests are sent form-encoded, the way the
//! Stripe API expects them.

use crate::config::StripeConfig;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use shop_core::{
    CheckoutProvider, CreatedSession, RetrievedSession, SessionRequest, ShopError, ShopResult,
};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session client
///
/// Uses Stripe's hosted checkout page; card data never touches this service.
pub struct StripeCheckoutClient {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutClient {
    /// Create a new Stripe checkout client
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// `{base}/v1/checkout/sessions/{id}` with the id encoded as a single
    /// path segment, so `/` or `..` in it cannot reach another endpoint.
    fn session_url(&self, session_id: &str) -> ShopResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            ShopError::Configuration(format!("Invalid Stripe API base URL: {}", e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ShopError::Configuration("Stripe API base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["v1", "checkout", "sessions", session_id]);

        Ok(url)
    }

    /// Read the response body, turning non-success statuses into provider errors
    async fn read_body(response: reqwest::Response) -> ShopResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .ok()
                .and_then(|r| r.error.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Stripe error".to_string());

            return Err(ShopError::provider(PROVIDER, message));
        }

        Ok(body)
    }
}

/// Encode a session request as Stripe form parameters
pub fn session_form_params(request: &SessionRequest) -> Vec<(String, String)> {
    let mut form_params: Vec<(String, String)> = vec![
        ("mode".to_string(), request.mode.as_str().to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        form_params.push((format!("line_items[{}][price]", i), item.price_id.clone()));
        form_params.push((
            format!("line_items[{}][quantity]", i),
            item.quantity.to_string(),
        ));
    }

    match &request.shipping {
        Some(shipping) => {
            for (i, country) in shipping.allowed_countries.iter().enumerate() {
                form_params.push((
                    format!("shipping_address_collection[allowed_countries][{}]", i),
                    country.clone(),
                ));
            }
            form_params.push((
                "custom_text[shipping_address][message]".to_string(),
                request.processing_notice.clone(),
            ));

            for (i, rate) in shipping.options.iter().enumerate() {
                let prefix = format!("shipping_options[{}][shipping_rate_data]", i);
                form_params.push((format!("{}[type]", prefix), "fixed_amount".to_string()));
                form_params.push((
                    format!("{}[fixed_amount][amount]", prefix),
                    rate.amount.to_string(),
                ));
                form_params.push((
                    format!("{}[fixed_amount][currency]", prefix),
                    rate.currency.clone(),
                ));
                form_params.push((format!("{}[display_name]", prefix), rate.display_name.clone()));
            }
        }
        None => {
            // shipping_address text is rejected without address collection
            if !request.processing_notice.is_empty() {
                form_params.push((
                    "custom_text[submit][message]".to_string(),
                    request.processing_notice.clone(),
                ));
            }
        }
    }

    if let Some(ref email) = request.customer_email {
        form_params.push(("customer_email".to_string(), email.clone()));
    }

    for (key, value) in &request.metadata {
        form_params.push((format!("metadata[{}]", key), value.clone()));
    }

    form_params
}

#[async_trait]
impl CheckoutProvider for StripeCheckoutClient {
    #[instrument(skip(self, request), fields(items = request.line_items.len()))]
    async fn create_session(&self, request: &SessionRequest) -> ShopResult<CreatedSession> {
        let auth = self.config.auth_header()?;
        let form_params = session_form_params(request);

        debug!(
            "Creating Stripe checkout session: {} params, shipping={}",
            form_params.len(),
            request.collects_shipping()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", auth)
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;

        let session: StripeCheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe checkout session: id={}", session.id);

        Ok(CreatedSession {
            id: session.id,
            url: session.url.unwrap_or_default(),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> ShopResult<RetrievedSession> {
        let auth = self.config.auth_header()?;
        let url = self.session_url(session_id)?;

        let response = self
            .client
            .get(url)
            .header("Authorization", auth)
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;

        let session: StripeRetrievedSession = serde_json::from_str(&body).map_err(|e| {
            ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        debug!(
            "Retrieved Stripe checkout session: id={}, payment_status={:?}",
            session.id, session.payment_status
        );

        Ok(RetrievedSession {
            id: session.id,
            payment_status: session.payment_status.unwrap_or_default(),
            metadata: session.metadata.unwrap_or_default(),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeRetrievedSession {
    id: String,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shop_core::{Catalog, CheckoutSessionBuilder, LookupMap, OrderIntent, Storefront};
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog() -> Catalog {
        Catalog {
            prices: LookupMap::new()
                .with_entry("Ceramic Mug", "price_mug")
                .with_entry("Birthday Card (PDF Download)", "price_card"),
            downloads: LookupMap::new(),
        }
    }

    fn build(intent: OrderIntent) -> SessionRequest {
        CheckoutSessionBuilder::new(&Storefront::default(), &catalog())
            .build(&intent)
            .unwrap()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_physical_form_params() {
        let params = session_form_params(&build(
            OrderIntent::new("Ceramic Mug").with_customer_email("ada@example.com"),
        ));

        assert_eq!(param(&params, "mode"), Some("payment"));
        assert_eq!(param(&params, "line_items[0][price]"), Some("price_mug"));
        assert_eq!(param(&params, "line_items[0][quantity]"), Some("1"));
        assert_eq!(
            param(&params, "shipping_address_collection[allowed_countries][0]"),
            Some("US")
        );
        assert_eq!(
            param(&params, "shipping_options[1][shipping_rate_data][fixed_amount][amount]"),
            Some("499")
        );
        assert_eq!(
            param(&params, "shipping_options[2][shipping_rate_data][fixed_amount][currency]"),
            Some("usd")
        );
        assert!(param(&params, "custom_text[shipping_address][message]").is_some());
        assert_eq!(param(&params, "customer_email"), Some("ada@example.com"));
        assert_eq!(param(&params, "metadata[selected_item_name]"), Some("Ceramic Mug"));
        assert!(param(&params, "shipping_options[3][shipping_rate_data][type]").is_none());
    }

    #[test]
    fn test_digital_form_params() {
        let params = session_form_params(&build(OrderIntent::new("Birthday Card (PDF Download)")));

        assert!(params.iter().all(|(k, _)| !k.starts_with("shipping")));
        assert!(param(&params, "custom_text[shipping_address][message]").is_none());
        assert!(param(&params, "custom_text[submit][message]").is_some());
        assert!(param(&params, "customer_email").is_none());
    }

    #[tokio::test]
    async fn test_create_session_against_mock() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_abc"))
            .and(header_exists("idempotency-key"))
            .and(body_string_contains("line_items%5B0%5D%5Bprice%5D=price_mug"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = StripeConfig::new("sk_test_abc", "whsec_x").with_api_base_url(server.uri());
        let client = StripeCheckoutClient::new(config).unwrap();

        let session = client
            .create_session(&build(OrderIntent::new("Ceramic Mug")))
            .await
            .unwrap();

        assert_eq!(session.id, "cs_test_123");
        assert_eq!(session.url, "https://checkout.stripe.com/c/pay/cs_test_123");
    }

    #[tokio::test]
    async fn test_create_session_surfaces_provider_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "No such price: 'price_mug'", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let config = StripeConfig::new("sk_test_abc", "whsec_x").with_api_base_url(server.uri());
        let client = StripeCheckoutClient::new(config).unwrap();

        let err = client
            .create_session(&build(OrderIntent::new("Ceramic Mug")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShopError::ProviderError { .. }));
        assert_eq!(err.to_string(), "No such price: 'price_mug'");
    }

    #[tokio::test]
    async fn test_provider_error_without_message_falls_back() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let config = StripeConfig::new("sk_test_abc", "whsec_x").with_api_base_url(server.uri());
        let client = StripeCheckoutClient::new(config).unwrap();

        let err = client
            .create_session(&build(OrderIntent::new("Ceramic Mug")))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Stripe error");
    }

    #[tokio::test]
    async fn test_retrieve_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "object": "checkout.session",
                "payment_status": "paid",
                "metadata": { "selected_item_name": "Birthday Card (PDF Download)" }
            })))
            .mount(&server)
            .await;

        let config = StripeConfig::new("sk_test_abc", "whsec_x").with_api_base_url(server.uri());
        let client = StripeCheckoutClient::new(config).unwrap();

        let session = client.retrieve_session("cs_test_123").await.unwrap();

        assert!(session.is_paid());
        assert_eq!(session.item_name(), "Birthday Card (PDF Download)");
    }

    #[tokio::test]
    async fn test_retrieve_session_id_cannot_escape_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/customers/cus_victim"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cus_victim",
                "metadata": { "selected_item_name": "customer metadata" }
            })))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_x%2F..%2F..%2F..%2Fcustomers%2Fcus_victim"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "message": "No such checkout.session" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = StripeConfig::new("sk_test_abc", "whsec_x").with_api_base_url(server.uri());
        let client = StripeCheckoutClient::new(config).unwrap();

        let err = client
            .retrieve_session("cs_x/../../../customers/cus_victim")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No such checkout.session");
    }

    #[test]
    fn test_session_url_keeps_base_path() {
        let config = StripeConfig::new("sk_test_abc", "whsec_x")
            .with_api_base_url("http://localhost:12111/");
        let client = StripeCheckoutClient::new(config).unwrap();

        assert_eq!(
            client.session_url("cs_test_1").unwrap().as_str(),
            "http://localhost:12111/v1/checkout/sessions/cs_test_1"
        );
    }

    #[tokio::test]
    async fn test_missing_secret_is_configuration_error() {
        let mut config = StripeConfig::new("sk_test_abc", "whsec_x");
        config.secret_key = None;
        let client = StripeCheckoutClient::new(config).unwrap();

        let err = client.retrieve_session("cs_test_123").await.unwrap_err();
        assert!(matches!(err, ShopError::Configuration(_)));
    }
}
