use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::models::DbProductSize;
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{NewProductSize, ProductSizePatch};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "product_sizes";

#[derive(Debug, Clone)]
pub struct ProductSizeRepo {
    pool: SqlitePool,
}

impl ProductSizeRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, req: PageRequest) -> Result<Page<DbProductSize>, EmporiumError> {
        query::fetch_page(&self.pool, TABLE, &Filter::new(), req).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<DbProductSize>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    /// Sizes for `ids`, in the order of `ids`; unknown ids are skipped.
    pub async fn get_many(&self, ids: &[i64]) -> Result<Vec<DbProductSize>, EmporiumError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM product_sizes WHERE id IN (");
        let mut sep = qb.separated(", ");
        for id in ids {
            sep.push_bind(*id);
        }
        sep.push_unseparated(")");

        let rows: Vec<DbProductSize> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(ids
            .iter()
            .filter_map(|id| rows.iter().find(|r| r.id == *id).cloned())
            .collect())
    }

    pub async fn create(&self, new: NewProductSize) -> Result<DbProductSize, EmporiumError> {
        let row = sqlx::query_as::<_, DbProductSize>(
            "INSERT INTO product_sizes (productsize) VALUES (?) RETURNING *",
        )
        .bind(new.productsize)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &ProductSizePatch,
    ) -> Result<Option<DbProductSize>, EmporiumError> {
        query::patch_and_fetch(&self.pool, TABLE, id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
