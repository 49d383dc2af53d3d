//! Insert payloads and partial updates.
//!
//! Patch fields are `None` => do not change, `Some(v)` => set to `v`, so a
//! present falsy value (`quantity: 0`, `isFeatured: false`) is applied.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::assets::AssetRef;
use crate::error::EmporiumError;

/// Applies a partial update to one row of `table`; returns the number of rows touched.
///
/// `table` is always one of the crate's own table names, never client input.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError>;
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
    pub assets: Vec<AssetRef>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    /// Replacement asset list, in final order.
    pub assets: Option<Vec<AssetRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubcategory {
    pub category: i64,
    pub subcategory: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubcategoryPatch {
    pub category: Option<i64>,
    pub subcategory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProductSize {
    pub productsize: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSizePatch {
    pub productsize: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub brand: String,
    pub oldprice: f64,
    pub newprice: f64,
    pub category: i64,
    pub cat_name: String,
    pub subcategory: i64,
    pub count_in_stock: i64,
    pub discount: f64,
    pub product_weight: f64,
    pub rating: f64,
    pub productsize: Vec<i64>,
    pub color: Vec<String>,
    pub is_featured: bool,
    pub assets: Vec<AssetRef>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub oldprice: Option<f64>,
    pub newprice: Option<f64>,
    pub category: Option<i64>,
    pub cat_name: Option<String>,
    pub subcategory: Option<i64>,
    pub count_in_stock: Option<i64>,
    pub discount: Option<f64>,
    pub product_weight: Option<f64>,
    pub rating: Option<f64>,
    pub productsize: Option<Vec<i64>>,
    pub color: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub assets: Option<Vec<AssetRef>>,
}

/// Cart / wishlist line as submitted by the storefront.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBasketItem {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub subtotal: f64,
    pub product_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub product_size: String,
    #[serde(default)]
    pub product_color: String,
    #[serde(skip)]
    pub assets: Vec<AssetRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketPatch {
    pub product_name: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<f64>,
    pub quantity: Option<i64>,
    pub subtotal: Option<f64>,
    pub product_size: Option<String>,
    pub product_color: Option<String>,
    #[serde(skip)]
    pub assets: Option<Vec<AssetRef>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: i64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub review: String,
    #[serde(default = "default_review_rating")]
    pub rating: f64,
}

fn default_review_rating() -> f64 {
    1.0
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub image: String,
}

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    /// New avatar; the previous one is released by the caller.
    pub avatar: Option<AssetRef>,
}

#[derive(Debug, Clone)]
pub struct NewSample {
    pub product_name: String,
    pub description: String,
    pub assets: Vec<AssetRef>,
}

#[derive(Debug, Clone, Default)]
pub struct SamplePatch {
    pub product_name: Option<String>,
    pub description: Option<String>,
    pub assets: Option<Vec<AssetRef>>,
}
