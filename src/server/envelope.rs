use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::Page;
use crate::error::EmporiumError;

/// Success envelope: `{"success": true, <key>: <value>, ...}`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: Map<String, Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn created() -> Self {
        Self::with_status(StatusCode::CREATED)
    }

    fn with_status(status: StatusCode) -> Self {
        let mut body = Map::new();
        body.insert("success".to_string(), Value::Bool(true));
        Self { status, body }
    }

    pub fn with(mut self, key: &str, value: impl Serialize) -> Result<Self, EmporiumError> {
        self.body.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(self)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body
            .insert("message".to_string(), Value::String(message.into()));
        self
    }

    /// Merges the fields of a serialized struct into the envelope.
    pub fn extend(mut self, value: impl Serialize) -> Result<Self, EmporiumError> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => self.body.extend(fields),
            other => {
                return Err(EmporiumError::UnexpectedError(format!(
                    "expected an object to merge, got {other}"
                )));
            }
        }
        Ok(self)
    }

    /// List envelope: items under `key` plus the pagination counters.
    pub fn page<T: Serialize>(key: &str, page: Page<T>) -> Result<Self, EmporiumError> {
        let mut resp = Self::ok().with(key, page.items)?;
        resp.body
            .insert("totalPages".to_string(), Value::from(page.total_pages));
        resp.body.insert("page".to_string(), Value::from(page.page));
        resp.body
            .insert("totalPosts".to_string(), Value::from(page.total_posts));
        resp.body
            .insert("perPage".to_string(), Value::from(page.per_page));
        Ok(resp)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(Value::Object(self.body))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_envelope_carries_counters() {
        let page = Page {
            items: vec![1, 2],
            total_pages: 3,
            page: 2,
            total_posts: 26,
            per_page: 12,
        };
        let resp = ApiResponse::page("productList", page).expect("envelope");
        let body = Value::Object(resp.body().clone());

        assert_eq!(body["success"], true);
        assert_eq!(body["productList"], serde_json::json!([1, 2]));
        assert_eq!(body["totalPages"], 3);
        assert_eq!(body["page"], 2);
        assert_eq!(body["totalPosts"], 26);
        assert_eq!(body["perPage"], 12);
    }

    #[test]
    fn created_sets_status_and_message() {
        let resp = ApiResponse::created()
            .with("id", 7)
            .expect("envelope")
            .message("Created");
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.body()["message"], "Created");
        assert_eq!(resp.body()["id"], 7);
    }
}
