use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::models::{DbOrder, OrderProduct};
use crate::db::page::{Page, PageRequest};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "orders";

#[derive(Debug, Clone)]
pub struct OrderRepo {
    pool: SqlitePool,
}

impl OrderRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stores a new order under a fresh uuid v4 `orderId`.
    pub async fn create(
        &self,
        user_id: i64,
        products: Vec<OrderProduct>,
    ) -> Result<DbOrder, EmporiumError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbOrder>(
            r#"
            INSERT INTO orders (order_id, user_id, products, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(Json(products))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list(
        &self,
        user_id: Option<i64>,
        order_id: Option<String>,
        req: PageRequest,
    ) -> Result<Page<DbOrder>, EmporiumError> {
        let filter = Filter::new()
            .eq_opt("user_id", user_id)
            .eq_opt("order_id", order_id);
        query::fetch_page(&self.pool, TABLE, &filter, req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbOrder>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
