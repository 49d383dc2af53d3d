//! Remote image assets owned by resources.
//!
//! Layout:
//! - `mod.rs`: `AssetRef`, `AssetPayload` and the `AssetHost` seam
//! - `cloudinary.rs`: production host over the Cloudinary upload API
//! - `reconciler.rs`: upload / diff / release orchestration with bounded fan-out

mod cloudinary;
mod reconciler;

pub use cloudinary::CloudinaryHost;
pub use reconciler::{AssetReconciler, ReconcilePlan, Reconciliation, plan};

use async_trait::async_trait;
use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// One stored image: delivery URL plus the host's opaque id used to delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub url: String,
    pub external_id: String,
}

impl AssetRef {
    pub fn new(url: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            external_id: external_id.into(),
        }
    }
}

/// Something to upload.
#[derive(Debug, Clone)]
pub enum AssetPayload {
    /// Raw bytes from a multipart file part.
    Bytes { data: Bytes, mime: String },
    /// A source the host fetches itself (http(s) URL or data URI).
    Remote(String),
}

impl AssetPayload {
    pub fn bytes(data: impl Into<Bytes>, mime: impl Into<String>) -> Self {
        AssetPayload::Bytes {
            data: data.into(),
            mime: mime.into(),
        }
    }

    pub fn remote(source: impl Into<String>) -> Self {
        AssetPayload::Remote(source.into())
    }
}

/// External image storage.
#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetRef, AssetError>;

    async fn delete(&self, external_id: &str) -> Result<(), AssetError>;
}

/// Records whose `images` / `imagePublicId` columns hold owned assets.
pub trait AssetBacked {
    fn assets(&self) -> Vec<AssetRef>;
}

/// Pairs positional url / id columns. Extra entries on either side are dropped.
pub fn zip_assets(urls: &[String], external_ids: &[String]) -> Vec<AssetRef> {
    urls.iter()
        .zip(external_ids)
        .map(|(url, id)| AssetRef::new(url.clone(), id.clone()))
        .collect()
}

/// Splits assets back into lockstep url / id columns.
pub fn unzip_assets(assets: &[AssetRef]) -> (Vec<String>, Vec<String>) {
    assets
        .iter()
        .map(|a| (a.url.clone(), a.external_id.clone()))
        .unzip()
}

/// Single-asset columns (avatars, banners) use empty strings for "none".
pub fn single_asset(url: &str, external_id: &str) -> Vec<AssetRef> {
    if url.is_empty() && external_id.is_empty() {
        Vec::new()
    } else {
        vec![AssetRef::new(url, external_id)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_and_unzip_keep_positions() {
        let urls = vec!["u1".to_string(), "u2".to_string()];
        let ids = vec!["p1".to_string(), "p2".to_string()];

        let assets = zip_assets(&urls, &ids);
        assert_eq!(assets[1], AssetRef::new("u2", "p2"));

        let (u, i) = unzip_assets(&assets);
        assert_eq!(u, urls);
        assert_eq!(i, ids);
    }

    #[test]
    fn empty_single_asset_columns_mean_no_asset() {
        assert!(single_asset("", "").is_empty());
        assert_eq!(single_asset("u", "p").len(), 1);
    }
}
