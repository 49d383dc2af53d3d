//! Checkout through an external payment provider.
//!
//! Layout:
//! - `mod.rs`: checkout types and the `PaymentGateway` seam
//! - `stripe.rs`: production gateway over the Stripe REST API

mod stripe;

pub use stripe::StripeGateway;

use async_trait::async_trait;
use emporium_schema::LineItem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::PaymentError;

/// One cart line sent to checkout.
///
/// Unknown fields are kept so the whole cart round-trips through the customer
/// metadata unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    #[serde(default)]
    pub product_name: String,

    #[serde(default)]
    pub price: f64,

    #[serde(default = "default_quantity")]
    pub quantity: i64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_quantity() -> i64 {
    1
}

impl CheckoutItem {
    /// Display name on the hosted checkout page: first 10 characters plus `..`.
    pub fn short_name(&self) -> String {
        let head: String = self.product_name.chars().take(10).collect();
        format!("{head}..")
    }

    /// Price in minor units.
    pub fn unit_amount(&self) -> i64 {
        (self.price * 100.0).round() as i64
    }
}

/// Order summary returned once the hosted checkout completed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub customer_email: Option<String>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub products: Vec<LineItem>,
    pub total_amount: f64,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a customer carrying the cart and a checkout session; returns the session id.
    async fn create_checkout(&self, items: &[CheckoutItem]) -> Result<String, PaymentError>;

    async fn complete(&self, session_id: &str) -> Result<CheckoutSummary, PaymentError>;

    /// Cart stored on the session's customer at checkout creation.
    async fn customer_cart(&self, session_id: &str) -> Result<Vec<Value>, PaymentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_item_formats_name_and_amount() {
        let item: CheckoutItem = serde_json::from_str(
            r#"{"productName":"Ultraboost Running Shoe","price":19.99,"quantity":2,"productId":7}"#,
        )
        .expect("parse item");

        assert_eq!(item.short_name(), "Ultraboost..");
        assert_eq!(item.unit_amount(), 1999);
        assert_eq!(item.extra.get("productId"), Some(&Value::from(7)));
    }

    #[test]
    fn short_names_count_characters_not_bytes() {
        let item = CheckoutItem {
            product_name: "Crème brûlée set".to_string(),
            price: 1.005,
            quantity: 1,
            extra: Map::new(),
        };
        assert_eq!(item.short_name(), "Crème brûl..");
    }
}
