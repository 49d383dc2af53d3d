#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use emporium::assets::{AssetHost, AssetPayload, AssetReconciler, AssetRef};
use emporium::auth::TokenIssuer;
use emporium::db::{self, Repositories};
use emporium::error::{AssetError, PaymentError};
use emporium::payments::{CheckoutItem, CheckoutSummary, PaymentGateway};
use emporium::server::{EmporiumState, emporium_router};
use serde_json::Value;
use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

pub const BOUNDARY: &str = "emporium-test-boundary";

/// Image host that hands out `https://cdn/{n}` / `pid{n}` and records every call.
#[derive(Default)]
pub struct RecordingAssetHost {
    next: AtomicUsize,
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_uploads: AtomicBool,
}

impl RecordingAssetHost {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().expect("uploads lock").len()
    }

    pub fn deleted(&self) -> Vec<String> {
        let mut ids = self.deletes.lock().expect("deletes lock").clone();
        ids.sort();
        ids
    }
}

#[async_trait]
impl AssetHost for RecordingAssetHost {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetRef, AssetError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(AssetError::Parse {
                message: "upload refused".to_string(),
                body: String::new(),
            });
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        let source = match payload {
            AssetPayload::Remote(src) => src.clone(),
            AssetPayload::Bytes { mime, .. } => format!("bytes:{mime}"),
        };
        self.uploads.lock().expect("uploads lock").push(source);
        Ok(AssetRef::new(format!("https://cdn/{n}"), format!("pid{n}")))
    }

    async fn delete(&self, external_id: &str) -> Result<(), AssetError> {
        self.deletes
            .lock()
            .expect("deletes lock")
            .push(external_id.to_string());
        Ok(())
    }
}

/// Gateway that never leaves the process.
#[derive(Default)]
pub struct FakePayments {
    pub carts: Mutex<Vec<Vec<CheckoutItem>>>,
}

#[async_trait]
impl PaymentGateway for FakePayments {
    async fn create_checkout(&self, items: &[CheckoutItem]) -> Result<String, PaymentError> {
        self.carts.lock().expect("carts lock").push(items.to_vec());
        Ok("cs_test_1".to_string())
    }

    async fn complete(&self, session_id: &str) -> Result<CheckoutSummary, PaymentError> {
        if session_id != "cs_test_1" {
            return Err(PaymentError::MissingField("session"));
        }
        Ok(CheckoutSummary {
            customer_email: Some("buyer@example.test".to_string()),
            payment_status: Some("paid".to_string()),
            payment_method: Some("card".to_string()),
            products: Vec::new(),
            total_amount: 39.98,
        })
    }

    async fn customer_cart(&self, _session_id: &str) -> Result<Vec<Value>, PaymentError> {
        let carts = self.carts.lock().expect("carts lock");
        let last = carts.last().cloned().unwrap_or_default();
        Ok(last
            .iter()
            .map(|item| serde_json::to_value(item).expect("serialize cart item"))
            .collect())
    }
}

pub struct TestApp {
    pub app: Router,
    pub host: Arc<RecordingAssetHost>,
    pub payments: Arc<FakePayments>,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

pub async fn spawn_app(label: &str) -> TestApp {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut db_path = std::env::temp_dir();
    db_path.push(format!(
        "emporium-{label}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", db_path.display());
    let pool = db::connect(&database_url)
        .await
        .expect("failed to open test database");

    let host = Arc::new(RecordingAssetHost::default());
    let payments = Arc::new(FakePayments::default());
    let state = EmporiumState::new(
        Repositories::new(pool),
        AssetReconciler::new(host.clone(), 2),
        payments.clone(),
        TokenIssuer::new("test-secret", 3600),
        12,
    );

    TestApp {
        app: emporium_router(state),
        host,
        payments,
        db_path,
    }
}

/// One part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"\x89PNG fake image bytes");
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
}

pub async fn json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("failed to build request"),
    )
    .await
}

pub async fn multipart(
    app: &Router,
    method: &str,
    uri: &str,
    parts: &[Part<'_>],
) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .expect("failed to build request"),
    )
    .await
}
