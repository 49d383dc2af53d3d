use chrono::Utc;
use sqlx::SqlitePool;

use crate::assets::AssetRef;
use crate::db::models::DbBanner;
use crate::db::page::{Page, PageRequest};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "banners";

#[derive(Debug, Clone)]
pub struct BannerRepo {
    pool: SqlitePool,
}

impl BannerRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, image: &AssetRef) -> Result<DbBanner, EmporiumError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbBanner>(
            r#"
            INSERT INTO banners (image, image_public_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(image.url.clone())
        .bind(image.external_id.clone())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(&self, req: PageRequest) -> Result<Page<DbBanner>, EmporiumError> {
        query::fetch_page(&self.pool, TABLE, &Filter::new(), req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbBanner>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
