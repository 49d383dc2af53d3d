//! Request extractors that reject with the crate's JSON error envelope.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

use crate::assets::AssetPayload;
use crate::db::PageRequest;
use crate::error::EmporiumError;

/// `axum::Json` with envelope rejections.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EmporiumError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `axum::extract::Query` with envelope rejections.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = EmporiumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// `axum::extract::Path` with envelope rejections.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = EmporiumError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query values where an empty string means "not given".
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// `?page=&perPage=` shared by every list route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub per_page: Option<i64>,
}

impl PageQuery {
    pub fn request(&self, default_per_page: u32) -> PageRequest {
        PageRequest::new(self.page, self.per_page, default_per_page)
    }
}

/// A buffered `multipart/form-data` body: text fields by name plus file parts.
///
/// Field names ending in `[]` are stored without the suffix, so `images[]`
/// and `images` are the same field.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: Vec<AssetPayload>,
}

impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = EmporiumError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| EmporiumError::validation(e.body_text()))?;

        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field
                .name()
                .unwrap_or_default()
                .trim_end_matches("[]")
                .to_string();

            if field.file_name().is_some() {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                form.files.push(AssetPayload::bytes(data, mime));
            } else {
                let text = field.text().await?;
                form.fields.entry(name).or_default().push(text);
            }
        }

        debug!(
            fields = form.fields.len(),
            files = form.files.len(),
            "multipart form buffered"
        );
        Ok(form)
    }
}

impl FormData {
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Last non-blank value of `key`, trimmed.
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .and_then(|values| values.last())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn require(&self, key: &str) -> Result<String, EmporiumError> {
        self.text(key)
            .ok_or_else(|| EmporiumError::validation(format!("{key} is required")))
    }

    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, EmporiumError>
    where
        T: FromStr,
    {
        match self.text(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| EmporiumError::validation(format!("Invalid value for {key}"))),
            None => Ok(None),
        }
    }

    /// `true` / `1` / `on` are true, anything else false.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.text(key)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "on"))
    }

    /// Every value of `key`. A value holding a JSON array of strings is expanded.
    pub fn list(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        for value in self.fields.get(key).into_iter().flatten() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match serde_json::from_str::<Vec<String>>(value) {
                Ok(items) => out.extend(items.into_iter().filter(|s| !s.is_empty())),
                Err(_) => out.push(value.to_string()),
            }
        }
        out
    }

    /// Like [`FormData::list`], also splitting comma-joined values.
    pub fn list_split(&self, key: &str) -> Vec<String> {
        self.list(key)
            .iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// `Some` when the field is present at all, so an explicit empty list can be set.
    pub fn list_opt(&self, key: &str) -> Option<Vec<String>> {
        self.has(key).then(|| self.list_split(key))
    }

    /// URLs the client keeps, or `None` when the request does not touch assets.
    ///
    /// Files without any `images` field replace every existing asset.
    pub fn desired_images(&self) -> Option<Vec<String>> {
        if !self.has("images") && self.files.is_empty() {
            return None;
        }
        Some(self.list("images"))
    }

    pub fn files(&self) -> &[AssetPayload] {
        &self.files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)], files: usize) -> FormData {
        let mut form = FormData::default();
        for (k, v) in fields {
            form.fields
                .entry((*k).to_string())
                .or_default()
                .push((*v).to_string());
        }
        for _ in 0..files {
            form.files.push(AssetPayload::bytes(vec![1_u8], "image/png"));
        }
        form
    }

    #[test]
    fn text_ignores_blank_values() {
        let f = form(&[("name", "  "), ("color", " red ")], 0);
        assert_eq!(f.text("name"), None);
        assert_eq!(f.text("color").as_deref(), Some("red"));
        assert!(f.require("name").is_err());
    }

    #[test]
    fn parse_reports_the_field() {
        let f = form(&[("newprice", "abc")], 0);
        let err = f.parse::<f64>("newprice").expect_err("not a number");
        assert!(err.to_string().contains("newprice"));
    }

    #[test]
    fn lists_expand_repeats_json_arrays_and_commas() {
        let f = form(
            &[("color", r#"["red","blue"]"#), ("color", "green"), ("productsize", "1,2")],
            0,
        );
        assert_eq!(f.list("color"), vec!["red", "blue", "green"]);
        assert_eq!(f.list_split("productsize"), vec!["1", "2"]);
        assert_eq!(f.list_opt("missing"), None);
    }

    #[test]
    fn desired_images_distinguishes_untouched_from_replace() {
        assert_eq!(form(&[("name", "x")], 0).desired_images(), None);
        assert_eq!(form(&[], 1).desired_images(), Some(Vec::new()));
        assert_eq!(
            form(&[("images", "https://cdn/a.png")], 1).desired_images(),
            Some(vec!["https://cdn/a.png".to_string()])
        );
    }

    #[test]
    fn empty_query_values_are_none() {
        let q: PageQuery = serde_json::from_value(serde_json::json!({"page": "", "perPage": "5"}))
            .expect("query");
        assert_eq!(q.page, None);
        assert_eq!(q.per_page, Some(5));
    }
}
