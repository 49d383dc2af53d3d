use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::assets::unzip_assets;
use crate::db::models::DbBasketItem;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{BasketPatch, NewBasketItem};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

/// Carts and wishlists share one row shape; they differ only by table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasketKind {
    Cart,
    Wishlist,
}

impl BasketKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            BasketKind::Cart => "cart_items",
            BasketKind::Wishlist => "wishlist_items",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasketRepo {
    pool: SqlitePool,
    kind: BasketKind,
}

impl BasketRepo {
    pub fn new(pool: SqlitePool, kind: BasketKind) -> Self {
        Self { pool, kind }
    }

    pub async fn list(
        &self,
        user_id: Option<i64>,
        product_id: Option<i64>,
        req: PageRequest,
    ) -> Result<Page<DbBasketItem>, EmporiumError> {
        let filter = Filter::new()
            .eq_opt("user_id", user_id)
            .eq_opt("product_id", product_id);
        query::fetch_page(&self.pool, self.kind.table(), &filter, req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbBasketItem>, EmporiumError> {
        query::fetch_by_id(&self.pool, self.kind.table(), id).await
    }

    pub async fn contains(&self, product_id: i64, user_id: i64) -> Result<bool, EmporiumError> {
        let filter = Filter::new()
            .eq("product_id", product_id)
            .eq("user_id", user_id);
        Ok(query::count(&self.pool, self.kind.table(), &filter).await? > 0)
    }

    pub async fn create(&self, new: NewBasketItem) -> Result<DbBasketItem, EmporiumError> {
        let (images, public_ids) = unzip_assets(&new.assets);
        let sql = format!(
            r#"
            INSERT INTO {} (
                product_name, images, image_public_id, rating, price, quantity, subtotal,
                product_id, user_id, product_size, product_color
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
            self.kind.table()
        );
        let row = sqlx::query_as::<_, DbBasketItem>(&sql)
            .bind(new.product_name)
            .bind(Json(images))
            .bind(Json(public_ids))
            .bind(new.rating)
            .bind(new.price)
            .bind(new.quantity)
            .bind(new.subtotal)
            .bind(new.product_id)
            .bind(new.user_id)
            .bind(new.product_size)
            .bind(new.product_color)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &BasketPatch,
    ) -> Result<Option<DbBasketItem>, EmporiumError> {
        query::patch_and_fetch(&self.pool, self.kind.table(), id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, self.kind.table(), id).await? > 0)
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64, EmporiumError> {
        query::count(&self.pool, self.kind.table(), &Filter::new().eq("user_id", user_id)).await
    }

    pub async fn items_for_user(&self, user_id: i64) -> Result<Vec<DbBasketItem>, EmporiumError> {
        query::fetch_all(&self.pool, self.kind.table(), &Filter::new().eq("user_id", user_id))
            .await
    }

    pub async fn clear_user(&self, user_id: i64) -> Result<u64, EmporiumError> {
        let sql = format!("DELETE FROM {} WHERE user_id = ?", self.kind.table());
        Ok(sqlx::query(&sql)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}
