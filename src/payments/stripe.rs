use async_trait::async_trait;
use emporium_schema::{CheckoutSession, Customer, LineItem, StripeErrorBody, StripeList};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::{CheckoutItem, CheckoutSummary, PaymentGateway};
use crate::config::PaymentsResolvedConfig;
use crate::error::PaymentError;
use crate::utils::http::body_preview;

/// Stripe REST client (bearer secret key, form-encoded bodies).
pub struct StripeGateway {
    client: reqwest::Client,
    api_url: Url,
    secret_key: String,
    client_base_url: String,
    currency: String,
}

impl StripeGateway {
    pub fn new(cfg: &PaymentsResolvedConfig, client: reqwest::Client) -> Self {
        Self {
            client,
            api_url: cfg.api_url.clone(),
            secret_key: cfg.secret_key.clone(),
            client_base_url: cfg.client_base_url.as_str().trim_end_matches('/').to_string(),
            currency: cfg.currency.clone(),
        }
    }

    /// Appends `segments` to the API base, percent-encoding each one.
    ///
    /// Ids never escape their segment: `/`, `?` and `#` are encoded and
    /// dot segments are dropped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PaymentError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| PaymentError::Parse {
                message: format!("api url {} cannot be a base", self.api_url),
                body: String::new(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn ensure_configured(&self) -> Result<(), PaymentError> {
        if self.secret_key.trim().is_empty() {
            return Err(PaymentError::NotConfigured);
        }
        Ok(())
    }

    /// Form parameters of `POST /v1/checkout/sessions`.
    pub(crate) fn session_params(
        &self,
        customer_id: &str,
        items: &[CheckoutItem],
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("customer".to_string(), customer_id.to_string()),
            ("mode".to_string(), "payment".to_string()),
            (
                "success_url".to_string(),
                format!(
                    "{}/payment/complete/{{CHECKOUT_SESSION_ID}}",
                    self.client_base_url
                ),
            ),
            (
                "cancel_url".to_string(),
                format!("{}/payment/cancel", self.client_base_url),
            ),
        ];

        for (i, item) in items.iter().enumerate() {
            let prefix = format!("line_items[{i}]");
            params.push((
                format!("{prefix}[price_data][currency]"),
                self.currency.clone(),
            ));
            params.push((
                format!("{prefix}[price_data][product_data][name]"),
                item.short_name(),
            ));
            params.push((
                format!("{prefix}[price_data][unit_amount]"),
                item.unit_amount().to_string(),
            ));
            params.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
        }
        params
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, PaymentError> {
        let resp = req.header(AUTHORIZATION, format!("Bearer {}", self.secret_key)).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<StripeErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| body_preview(&bytes));
            return Err(PaymentError::UpstreamStatus { status, message });
        }

        serde_json::from_slice(&bytes).map_err(|e| PaymentError::Parse {
            message: e.to_string(),
            body: body_preview(&bytes),
        })
    }

    async fn retrieve_session(
        &self,
        session_id: &str,
        expand: Option<&str>,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = self.endpoint(&["v1", "checkout", "sessions", session_id])?;
        let mut req = self.client.get(url);
        if let Some(expand) = expand {
            req = req.query(&[("expand[]", expand)]);
        }
        self.send(req).await
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout(&self, items: &[CheckoutItem]) -> Result<String, PaymentError> {
        self.ensure_configured()?;

        let cart = serde_json::to_string(items).map_err(|e| PaymentError::Parse {
            message: e.to_string(),
            body: String::new(),
        })?;
        let customer: Customer = self
            .send(
                self.client
                    .post(self.endpoint(&["v1", "customers"])?)
                    .form(&[("metadata[cart]", cart)]),
            )
            .await?;
        debug!(customer = %customer.id, "checkout customer created");

        let session: CheckoutSession = self
            .send(
                self.client
                    .post(self.endpoint(&["v1", "checkout", "sessions"])?)
                    .form(&self.session_params(&customer.id, items)),
            )
            .await?;
        info!(session = %session.id, items = items.len(), "checkout session created");
        Ok(session.id)
    }

    async fn complete(&self, session_id: &str) -> Result<CheckoutSummary, PaymentError> {
        self.ensure_configured()?;

        let session = self
            .retrieve_session(session_id, Some("payment_intent.payment_method"))
            .await?;
        let url = self.endpoint(&["v1", "checkout", "sessions", session_id, "line_items"])?;
        let line_items: StripeList<LineItem> = self.send(self.client.get(url)).await?;

        Ok(CheckoutSummary {
            customer_email: session
                .customer_details
                .as_ref()
                .and_then(|d| d.email.clone()),
            payment_status: session.payment_status.clone(),
            payment_method: session.payment_method_type().map(str::to_string),
            products: line_items.data,
            total_amount: session.amount_total.unwrap_or_default() as f64 / 100.0,
        })
    }

    async fn customer_cart(&self, session_id: &str) -> Result<Vec<Value>, PaymentError> {
        self.ensure_configured()?;

        let session = self.retrieve_session(session_id, None).await?;
        let customer_id = session
            .customer
            .ok_or(PaymentError::MissingField("customer"))?;
        let url = self.endpoint(&["v1", "customers", &customer_id])?;
        let customer: Customer = self.send(self.client.get(url)).await?;

        let raw = customer
            .metadata
            .get("cart")
            .map(String::as_str)
            .unwrap_or("[]");
        serde_json::from_str(raw).map_err(|e| PaymentError::Parse {
            message: e.to_string(),
            body: body_preview(raw.as_bytes()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(secret: &str) -> StripeGateway {
        let cfg = PaymentsResolvedConfig {
            api_url: Url::parse("http://stripe.example.test").expect("invalid url"),
            secret_key: secret.to_string(),
            client_base_url: Url::parse("http://shop.example.test/").expect("invalid url"),
            currency: "usd".to_string(),
            proxy: None,
            enable_multiplexing: false,
        };
        StripeGateway::new(&cfg, reqwest::Client::new())
    }

    fn item(name: &str, price: f64, quantity: i64) -> CheckoutItem {
        CheckoutItem {
            product_name: name.to_string(),
            price,
            quantity,
            extra: Default::default(),
        }
    }

    fn get<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn session_params_encode_line_items_and_redirects() {
        let g = gateway("sk_test");
        let params = g.session_params(
            "cus_1",
            &[item("Leather Boots Deluxe", 49.5, 2), item("Cap", 5.0, 1)],
        );

        assert_eq!(get(&params, "customer"), Some("cus_1"));
        assert_eq!(get(&params, "mode"), Some("payment"));
        assert_eq!(get(&params, "payment_method_types[0]"), Some("card"));
        assert_eq!(
            get(&params, "success_url"),
            Some("http://shop.example.test/payment/complete/{CHECKOUT_SESSION_ID}")
        );
        assert_eq!(
            get(&params, "cancel_url"),
            Some("http://shop.example.test/payment/cancel")
        );
        assert_eq!(
            get(&params, "line_items[0][price_data][product_data][name]"),
            Some("Leather Bo..")
        );
        assert_eq!(
            get(&params, "line_items[0][price_data][unit_amount]"),
            Some("4950")
        );
        assert_eq!(get(&params, "line_items[0][quantity]"), Some("2"));
        assert_eq!(
            get(&params, "line_items[1][price_data][currency]"),
            Some("usd")
        );
    }

    #[test]
    fn endpoint_keeps_ids_inside_their_segment() {
        let g = gateway("sk_test");

        let url = g
            .endpoint(&["v1", "checkout", "sessions", "cs_test_1", "line_items"])
            .expect("endpoint");
        assert_eq!(
            url.as_str(),
            "http://stripe.example.test/v1/checkout/sessions/cs_test_1/line_items"
        );

        let url = g
            .endpoint(&["v1", "checkout", "sessions", "../../customers?limit=100#"])
            .expect("endpoint");
        assert!(
            url.path().starts_with("/v1/checkout/sessions/"),
            "{url}"
        );
        assert!(!url.path().contains("/customers"), "{url}");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = g
            .endpoint(&["v1", "customers", ".."])
            .expect("endpoint");
        assert_eq!(url.as_str(), "http://stripe.example.test/v1/customers");
    }

    #[tokio::test]
    async fn missing_secret_key_is_reported_before_any_call() {
        let err = gateway("")
            .create_checkout(&[item("x", 1.0, 1)])
            .await
            .expect_err("must fail");
        assert!(matches!(err, PaymentError::NotConfigured));
    }
}
