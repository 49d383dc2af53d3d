use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Stripe list envelope (`{"object":"list","data":[...]}`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Customer {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    /// Minor currency units (cents).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<Expandable<PaymentIntent>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A field that is either an object id or, when requested via `expand[]`, the object itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn as_object(&self) -> Option<&T> {
        match self {
            Expandable::Id(_) => None,
            Expandable::Object(obj) => Some(obj.as_ref()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntent {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<Expandable<PaymentMethod>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItem {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_total: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// Stripe error envelope.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StripeErrorBody {
    #[serde(default)]
    pub error: StripeErrorObject,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StripeErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(rename = "type")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl CheckoutSession {
    /// Card / wallet type of the expanded payment method, if it was expanded.
    pub fn payment_method_type(&self) -> Option<&str> {
        self.payment_intent
            .as_ref()?
            .as_object()?
            .payment_method
            .as_ref()?
            .as_object()
            .map(|pm| pm.kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_session_exposes_payment_method_type() {
        let raw = r#"{
            "id": "cs_test_1",
            "customer": "cus_1",
            "customer_details": { "email": "a@b.test" },
            "payment_status": "paid",
            "amount_total": 2599,
            "payment_intent": {
                "id": "pi_1",
                "payment_method": { "id": "pm_1", "type": "card" }
            }
        }"#;

        let session: CheckoutSession = serde_json::from_str(raw).expect("parse session");
        assert_eq!(session.payment_method_type(), Some("card"));
        assert_eq!(session.amount_total, Some(2599));
    }

    #[test]
    fn unexpanded_session_has_no_payment_method_type() {
        let raw = r#"{ "id": "cs_test_2", "payment_intent": "pi_2" }"#;

        let session: CheckoutSession = serde_json::from_str(raw).expect("parse session");
        assert!(session.payment_method_type().is_none());
    }
}
