use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::assets::unzip_assets;
use crate::db::models::DbSample;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{NewSample, SamplePatch};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "samples";

#[derive(Debug, Clone)]
pub struct SampleRepo {
    pool: SqlitePool,
}

impl SampleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewSample) -> Result<DbSample, EmporiumError> {
        let (images, public_ids) = unzip_assets(&new.assets);
        let row = sqlx::query_as::<_, DbSample>(
            r#"
            INSERT INTO samples (product_name, description, images, image_public_id)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.product_name)
        .bind(new.description)
        .bind(Json(images))
        .bind(Json(public_ids))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, req: PageRequest) -> Result<Page<DbSample>, EmporiumError> {
        query::fetch_page(&self.pool, TABLE, &Filter::new(), req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbSample>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &SamplePatch,
    ) -> Result<Option<DbSample>, EmporiumError> {
        query::patch_and_fetch(&self.pool, TABLE, id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
