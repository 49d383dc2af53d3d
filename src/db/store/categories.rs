use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::assets::unzip_assets;
use crate::db::models::DbCategory;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{CategoryPatch, NewCategory};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "categories";

#[derive(Debug, Clone)]
pub struct CategoryRepo {
    pool: SqlitePool,
}

impl CategoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, req: PageRequest) -> Result<Page<DbCategory>, EmporiumError> {
        query::fetch_page(&self.pool, TABLE, &Filter::new(), req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbCategory>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn create(&self, new: NewCategory) -> Result<DbCategory, EmporiumError> {
        let (images, public_ids) = unzip_assets(&new.assets);
        let row = sqlx::query_as::<_, DbCategory>(
            r#"
            INSERT INTO categories (name, color, images, image_public_id)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.name)
        .bind(new.color)
        .bind(Json(images))
        .bind(Json(public_ids))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &CategoryPatch,
    ) -> Result<Option<DbCategory>, EmporiumError> {
        query::patch_and_fetch(&self.pool, TABLE, id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
