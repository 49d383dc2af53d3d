use sqlx::SqlitePool;

use super::categories::{self, CategoryRepo};
use crate::db::models::{DbSubcategory, SubcategoryView};
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{NewSubcategory, SubcategoryPatch};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "subcategories";

#[derive(Debug, Clone)]
pub struct SubcategoryRepo {
    pool: SqlitePool,
    categories: CategoryRepo,
}

impl SubcategoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            categories: CategoryRepo::new(pool.clone()),
            pool,
        }
    }

    async fn populate(&self, subcategory: DbSubcategory) -> Result<SubcategoryView, EmporiumError> {
        let category_detail = self.categories.get(subcategory.category).await?;
        Ok(SubcategoryView {
            subcategory,
            category_detail,
        })
    }

    async fn ensure_category(&self, category: i64) -> Result<(), EmporiumError> {
        if !query::exists(&self.pool, categories::TABLE, category).await? {
            return Err(EmporiumError::validation("The category doesnt exist"));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        category_id: Option<i64>,
        req: PageRequest,
    ) -> Result<Page<SubcategoryView>, EmporiumError> {
        let filter = Filter::new().eq_opt("category", category_id);
        let page: Page<DbSubcategory> = query::fetch_page(&self.pool, TABLE, &filter, req).await?;

        let mut items = Vec::with_capacity(page.items.len());
        for sub in page.items.iter().cloned() {
            items.push(self.populate(sub).await?);
        }
        Ok(page.with_items(items))
    }

    pub async fn get(&self, id: i64) -> Result<Option<SubcategoryView>, EmporiumError> {
        match query::fetch_by_id::<DbSubcategory>(&self.pool, TABLE, id).await? {
            Some(sub) => Ok(Some(self.populate(sub).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, new: NewSubcategory) -> Result<SubcategoryView, EmporiumError> {
        self.ensure_category(new.category).await?;
        let row = sqlx::query_as::<_, DbSubcategory>(
            "INSERT INTO subcategories (category, subcategory) VALUES (?, ?) RETURNING *",
        )
        .bind(new.category)
        .bind(new.subcategory)
        .fetch_one(&self.pool)
        .await?;
        self.populate(row).await
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &SubcategoryPatch,
    ) -> Result<Option<SubcategoryView>, EmporiumError> {
        if let Some(category) = patch.category {
            self.ensure_category(category).await?;
        }
        match query::patch_and_fetch::<_, DbSubcategory>(&self.pool, TABLE, id, patch).await? {
            Some(sub) => Ok(Some(self.populate(sub).await?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}
