use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

use crate::assets::{AssetBacked, AssetRef, single_asset, zip_assets};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbCategory {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub images: Json<Vec<String>>,
    pub image_public_id: Json<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbSubcategory {
    pub id: i64,
    pub category: i64,
    pub subcategory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbProductSize {
    pub id: i64,
    pub productsize: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbProduct {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub images: Json<Vec<String>>,
    pub image_public_id: Json<Vec<String>>,
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
    /// `product_sizes` ids.
    pub productsize: Json<Vec<i64>>,
    pub color: Json<Vec<String>>,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its relations resolved, as served by read endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: DbProduct,
    pub category_detail: Option<DbCategory>,
    pub subcategory_detail: Option<DbSubcategory>,
    pub productsize_detail: Vec<DbProductSize>,
}

/// Subcategory with its parent category resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryView {
    #[serde(flatten)]
    pub subcategory: DbSubcategory,
    pub category_detail: Option<DbCategory>,
}

/// Row of `cart_items` or `wishlist_items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbBasketItem {
    pub id: i64,
    pub product_name: String,
    pub images: Json<Vec<String>>,
    pub image_public_id: Json<Vec<String>>,
    pub rating: f64,
    pub price: f64,
    pub quantity: i64,
    pub subtotal: f64,
    pub product_id: i64,
    pub user_id: i64,
    pub product_size: String,
    pub product_color: String,
}

/// Product snapshot embedded in an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderProduct {
    pub product_name: String,
    pub images: Vec<String>,
    pub image_public_id: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub subtotal: f64,
    pub product_id: i64,
    #[serde(default)]
    pub product_size: String,
    #[serde(default)]
    pub product_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbOrder {
    pub id: i64,
    pub order_id: String,
    pub user_id: i64,
    pub products: Json<Vec<OrderProduct>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbReview {
    pub id: i64,
    pub product_id: i64,
    pub customer_name: String,
    pub customer_id: Option<i64>,
    pub review: String,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of `users` or `admins`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Argon2 PHC string; `None` for accounts created through Google sign-in.
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    pub image: String,
    pub image_public_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbBanner {
    pub id: i64,
    pub image: String,
    pub image_public_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DbSample {
    pub id: i64,
    pub product_name: String,
    pub description: String,
    pub images: Json<Vec<String>>,
    pub image_public_id: Json<Vec<String>>,
}

impl AssetBacked for DbCategory {
    fn assets(&self) -> Vec<AssetRef> {
        zip_assets(&self.images, &self.image_public_id)
    }
}

impl AssetBacked for DbProduct {
    fn assets(&self) -> Vec<AssetRef> {
        zip_assets(&self.images, &self.image_public_id)
    }
}

impl AssetBacked for DbBasketItem {
    fn assets(&self) -> Vec<AssetRef> {
        zip_assets(&self.images, &self.image_public_id)
    }
}

impl AssetBacked for OrderProduct {
    fn assets(&self) -> Vec<AssetRef> {
        zip_assets(&self.images, &self.image_public_id)
    }
}

impl AssetBacked for DbOrder {
    fn assets(&self) -> Vec<AssetRef> {
        self.products.iter().flat_map(|p| p.assets()).collect()
    }
}

impl AssetBacked for DbAccount {
    fn assets(&self) -> Vec<AssetRef> {
        single_asset(&self.image, &self.image_public_id)
            .into_iter()
            .filter(|a| !a.external_id.is_empty())
            .collect()
    }
}

impl AssetBacked for DbBanner {
    fn assets(&self) -> Vec<AssetRef> {
        single_asset(&self.image, &self.image_public_id)
    }
}

impl AssetBacked for DbSample {
    fn assets(&self) -> Vec<AssetRef> {
        zip_assets(&self.images, &self.image_public_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_password_is_never_serialized() {
        let account = DbAccount {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            phone: None,
            password: Some("$argon2id$secret".to_string()),
            image: String::new(),
            image_public_id: String::new(),
        };

        let json = serde_json::to_value(&account).expect("serialize account");
        assert!(json.get("password").is_none());
        assert_eq!(json["imagePublicId"], "");
    }

    #[test]
    fn google_avatar_without_host_id_is_not_owned() {
        let account = DbAccount {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.test".to_string(),
            phone: None,
            password: None,
            image: "https://lh3.example.test/a.png".to_string(),
            image_public_id: String::new(),
        };
        assert!(account.assets().is_empty());
    }

    #[test]
    fn order_assets_flatten_embedded_products() {
        let snapshot = |ids: &[&str]| OrderProduct {
            product_name: "p".to_string(),
            images: ids.iter().map(|i| format!("u-{i}")).collect(),
            image_public_id: ids.iter().map(|i| i.to_string()).collect(),
            rating: 0.0,
            price: 0.0,
            quantity: 1,
            subtotal: 0.0,
            product_id: 1,
            product_size: String::new(),
            product_color: String::new(),
        };
        let order = DbOrder {
            id: 1,
            order_id: "o".to_string(),
            user_id: 1,
            products: Json(vec![snapshot(&["a", "b"]), snapshot(&["c"])]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let ids: Vec<_> = order.assets().into_iter().map(|a| a.external_id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
