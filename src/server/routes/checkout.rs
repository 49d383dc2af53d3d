use axum::{
    Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use crate::error::EmporiumError;
use crate::payments::CheckoutItem;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, empty_as_none};
use crate::server::router::EmporiumState;
use crate::utils::logging::debug_json;

#[derive(Debug, Deserialize)]
struct CheckoutBody {
    #[serde(default)]
    products: Vec<CheckoutItem>,
}

#[derive(Debug, Default, Deserialize)]
struct CompleteQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    session_id: Option<String>,
}

/// Checkout session ids are opaque `[A-Za-z0-9_]` tokens.
fn session_id(raw: &str) -> Result<&str, EmporiumError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return Err(EmporiumError::validation("Invalid session id"));
    }
    Ok(raw)
}

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/create", post(create))
        .route("/payment/complete", get(complete))
        .route("/cancel", get(cancel))
        .route("/customer/{id}", get(customer_cart))
}

async fn create(
    State(state): State<EmporiumState>,
    ApiJson(body): ApiJson<CheckoutBody>,
) -> Result<ApiResponse, EmporiumError> {
    if body.products.is_empty() {
        return Err(EmporiumError::validation("No products to check out"));
    }
    debug_json("checkout cart", &body.products);

    let session_id = state.payments.create_checkout(&body.products).await?;
    info!(session_id = %session_id, items = body.products.len(), "checkout session created");
    ApiResponse::ok().with("id", session_id)
}

async fn complete(
    State(state): State<EmporiumState>,
    ApiQuery(query): ApiQuery<CompleteQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let raw = query
        .session_id
        .ok_or_else(|| EmporiumError::validation("session_id is required"))?;

    let summary = state.payments.complete(session_id(&raw)?).await?;
    debug_json("checkout completed", &summary);
    ApiResponse::ok().extend(summary)
}

async fn cancel() -> Redirect {
    Redirect::to("/cart")
}

async fn customer_cart(
    State(state): State<EmporiumState>,
    ApiPath(raw): ApiPath<String>,
) -> Result<ApiResponse, EmporiumError> {
    let cart = state.payments.customer_cart(session_id(&raw)?).await?;
    ApiResponse::ok().with("cart", cart)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_accepts_stripe_tokens_only() {
        assert_eq!(session_id("cs_test_a1B2").ok(), Some("cs_test_a1B2"));
        for bad in ["", "../customers", "cs_1?limit=100", "cs_1#", "cs 1", "cs-1"] {
            assert!(session_id(bad).is_err(), "{bad}");
        }
    }
}
