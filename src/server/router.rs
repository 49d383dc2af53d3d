use crate::assets::AssetReconciler;
use crate::auth::TokenIssuer;
use crate::db::{AccountKind, BasketKind, PageRequest, Repositories};
use crate::error::EmporiumError;
use crate::payments::PaymentGateway;
use crate::server::extract::PageQuery;
use crate::server::routes::{
    accounts, banners, baskets, categories, checkout, orders, product_sizes, products, reviews,
    samples, search, subcategories,
};

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Shared handler state: repositories plus the two external services.
#[derive(Clone)]
pub struct EmporiumState {
    pub repos: Repositories,
    pub assets: AssetReconciler,
    pub payments: Arc<dyn PaymentGateway>,
    pub tokens: TokenIssuer,
    pub per_page: u32,
}

impl EmporiumState {
    pub fn new(
        repos: Repositories,
        assets: AssetReconciler,
        payments: Arc<dyn PaymentGateway>,
        tokens: TokenIssuer,
        per_page: u32,
    ) -> Self {
        Self {
            repos,
            assets,
            payments,
            tokens,
            per_page,
        }
    }

    pub fn page(&self, query: &PageQuery) -> PageRequest {
        query.request(self.per_page)
    }
}

async fn not_found_handler() -> EmporiumError {
    EmporiumError::not_found("Route not found")
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let path = uri.path();
    let protocol = format_http_version(version);

    if status.is_server_error() {
        error!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
            status.as_u16(),
            request_id,
            method.as_str(),
            protocol,
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
}

pub fn emporium_router(state: EmporiumState) -> Router {
    let api = Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/subcategories", subcategories::router())
        .nest("/productsize", product_sizes::router())
        .nest("/user", accounts::router(AccountKind::User))
        .nest("/admin", accounts::router(AccountKind::Admin))
        .nest("/cart", baskets::router(BasketKind::Cart))
        .nest("/mywishlist", baskets::router(BasketKind::Wishlist))
        .nest("/reviews", reviews::router())
        .nest("/orders", orders::router())
        .nest("/checkout", checkout::router())
        .nest("/banner", banners::router())
        .nest("/search", search::router())
        .nest("/test", samples::router());

    Router::new()
        .nest("/api", api)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors_layer())
        .layer(middleware::from_fn(access_log))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_request_ids_are_short_and_url_safe() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(id, generate_request_id());
    }

    #[test]
    fn http_versions_render_for_the_log_line() {
        assert_eq!(format_http_version(Version::HTTP_11), "HTTP/1.1");
        assert_eq!(format_http_version(Version::HTTP_2), "HTTP/2");
    }
}
