use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::DbReview;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::NewReview;
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "reviews";

#[derive(Debug, Clone)]
pub struct ReviewRepo {
    pool: SqlitePool,
}

impl ReviewRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        product_id: Option<i64>,
        req: PageRequest,
    ) -> Result<Page<DbReview>, EmporiumError> {
        let filter = Filter::new().eq_opt("product_id", product_id);
        query::fetch_page(&self.pool, TABLE, &filter, req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbReview>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn create(&self, new: NewReview) -> Result<DbReview, EmporiumError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbReview>(
            r#"
            INSERT INTO reviews (product_id, customer_name, customer_id, review, rating, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.product_id)
        .bind(new.customer_name)
        .bind(new.customer_id)
        .bind(new.review)
        .bind(new.rating)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
