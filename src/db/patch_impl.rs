//! Patch -> DbPatchable implementations.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use tracing::debug;

use super::patch::{
    AccountPatch, BasketPatch, CategoryPatch, DbPatchable, ProductPatch, ProductSizePatch,
    SamplePatch, SubcategoryPatch,
};
use crate::assets::{AssetRef, unzip_assets};
use crate::error::EmporiumError;

type AssetColumns = (Option<Json<Vec<String>>>, Option<Json<Vec<String>>>);

/// Lockstep `images` / `image_public_id` column values, or `(None, None)`.
fn asset_columns(assets: Option<&[AssetRef]>) -> AssetColumns {
    match assets {
        Some(assets) => {
            let (urls, ids) = unzip_assets(assets);
            (Some(Json(urls)), Some(Json(ids)))
        }
        None => (None, None),
    }
}

#[async_trait]
impl DbPatchable for CategoryPatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let (images, public_ids) = asset_columns(self.assets.as_deref());
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                name = COALESCE(?, name),
                color = COALESCE(?, color),
                images = COALESCE(?, images),
                image_public_id = COALESCE(?, image_public_id)
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.name.clone())
            .bind(self.color.clone())
            .bind(images)
            .bind(public_ids)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(
            table,
            id,
            affected,
            name_set = self.name.is_some(),
            color_set = self.color.is_some(),
            assets_set = self.assets.is_some(),
            "db patch applied"
        );
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for SubcategoryPatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                category = COALESCE(?, category),
                subcategory = COALESCE(?, subcategory)
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.category)
            .bind(self.subcategory.clone())
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(
            table,
            id,
            affected,
            category_set = self.category.is_some(),
            subcategory_set = self.subcategory.is_some(),
            "db patch applied"
        );
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for ProductSizePatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let sql = format!("UPDATE {table} SET productsize = COALESCE(?, productsize) WHERE id = ?");
        let affected = sqlx::query(&sql)
            .bind(self.productsize.clone())
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(table, id, affected, "db patch applied");
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for ProductPatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let (images, public_ids) = asset_columns(self.assets.as_deref());
        let updated_at = Utc::now();

        // Use the non-macro query API so we don't have to keep SQLx's offline cache in sync.
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                brand = COALESCE(?, brand),
                oldprice = COALESCE(?, oldprice),
                newprice = COALESCE(?, newprice),
                category = COALESCE(?, category),
                cat_name = COALESCE(?, cat_name),
                subcategory = COALESCE(?, subcategory),
                count_in_stock = COALESCE(?, count_in_stock),
                discount = COALESCE(?, discount),
                product_weight = COALESCE(?, product_weight),
                rating = COALESCE(?, rating),
                productsize = COALESCE(?, productsize),
                color = COALESCE(?, color),
                is_featured = COALESCE(?, is_featured),
                images = COALESCE(?, images),
                image_public_id = COALESCE(?, image_public_id),
                updated_at = ?
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.name.clone())
            .bind(self.description.clone())
            .bind(self.brand.clone())
            .bind(self.oldprice)
            .bind(self.newprice)
            .bind(self.category)
            .bind(self.cat_name.clone())
            .bind(self.subcategory)
            .bind(self.count_in_stock)
            .bind(self.discount)
            .bind(self.product_weight)
            .bind(self.rating)
            .bind(self.productsize.clone().map(Json))
            .bind(self.color.clone().map(Json))
            .bind(self.is_featured)
            .bind(images)
            .bind(public_ids)
            .bind(updated_at)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(
            table,
            id,
            affected,
            updated_at = %updated_at,
            is_featured_set = self.is_featured.is_some(),
            count_in_stock_set = self.count_in_stock.is_some(),
            assets_set = self.assets.is_some(),
            "db patch applied"
        );
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for BasketPatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let (images, public_ids) = asset_columns(self.assets.as_deref());
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                product_name = COALESCE(?, product_name),
                rating = COALESCE(?, rating),
                price = COALESCE(?, price),
                quantity = COALESCE(?, quantity),
                subtotal = COALESCE(?, subtotal),
                product_size = COALESCE(?, product_size),
                product_color = COALESCE(?, product_color),
                images = COALESCE(?, images),
                image_public_id = COALESCE(?, image_public_id)
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.product_name.clone())
            .bind(self.rating)
            .bind(self.price)
            .bind(self.quantity)
            .bind(self.subtotal)
            .bind(self.product_size.clone())
            .bind(self.product_color.clone())
            .bind(images)
            .bind(public_ids)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(
            table,
            id,
            affected,
            quantity_set = self.quantity.is_some(),
            assets_set = self.assets.is_some(),
            "db patch applied"
        );
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for AccountPatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let (image, image_public_id) = match &self.avatar {
            Some(a) => (Some(a.url.clone()), Some(a.external_id.clone())),
            None => (None, None),
        };
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                phone = COALESCE(?, phone),
                password = COALESCE(?, password),
                image = COALESCE(?, image),
                image_public_id = COALESCE(?, image_public_id)
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.name.clone())
            .bind(self.email.clone())
            .bind(self.phone.clone())
            .bind(self.password_hash.clone())
            .bind(image)
            .bind(image_public_id)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(
            table,
            id,
            affected,
            password_set = self.password_hash.is_some(),
            avatar_set = self.avatar.is_some(),
            "db patch applied"
        );
        Ok(affected)
    }
}

#[async_trait]
impl DbPatchable for SamplePatch {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        table: &'static str,
        id: i64,
    ) -> Result<u64, EmporiumError> {
        let (images, public_ids) = asset_columns(self.assets.as_deref());
        let sql = format!(
            r#"
            UPDATE {table}
            SET
                product_name = COALESCE(?, product_name),
                description = COALESCE(?, description),
                images = COALESCE(?, images),
                image_public_id = COALESCE(?, image_public_id)
            WHERE id = ?
            "#
        );
        let affected = sqlx::query(&sql)
            .bind(self.product_name.clone())
            .bind(self.description.clone())
            .bind(images)
            .bind(public_ids)
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        debug!(table, id, affected, "db patch applied");
        Ok(affected)
    }
}
