use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;

use super::categories::{self, CategoryRepo};
use super::product_sizes::ProductSizeRepo;
use super::subcategories;
use crate::assets::unzip_assets;
use crate::db::models::{DbProduct, DbSubcategory, ProductView};
use crate::db::page::{Page, PageRequest};
use crate::db::patch::{NewProduct, ProductPatch};
use crate::db::query::{self, Filter};
use crate::error::EmporiumError;

pub(crate) const TABLE: &str = "products";

const SEARCH_COLUMN: &str = "search_text";

/// Case-folded text the search endpoint matches against.
///
/// Fields are joined with a unit separator so a needle cannot span two of them.
fn search_text(name: &str, brand: &str, cat_name: &str) -> String {
    query::fold_case(&[name, brand, cat_name].join("\u{1f}"))
}

/// Product list filters; all present filters must match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub cat_name: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub rating: Option<f64>,
    pub is_featured: Option<bool>,
}

impl ProductFilter {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .eq_opt("cat_name", self.cat_name.clone())
            .eq_opt("category", self.category_id)
            .eq_opt("subcategory", self.subcategory_id)
            .cmp_opt("newprice", ">=", self.min_price)
            .cmp_opt("newprice", "<=", self.max_price)
            .eq_opt("rating", self.rating)
            .eq_opt("is_featured", self.is_featured)
    }
}

#[derive(Debug, Clone)]
pub struct ProductRepo {
    pool: SqlitePool,
    categories: CategoryRepo,
    sizes: ProductSizeRepo,
}

impl ProductRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            categories: CategoryRepo::new(pool.clone()),
            sizes: ProductSizeRepo::new(pool.clone()),
            pool,
        }
    }

    async fn populate(&self, product: DbProduct) -> Result<ProductView, EmporiumError> {
        let category_detail = self.categories.get(product.category).await?;
        let subcategory_detail =
            query::fetch_by_id::<DbSubcategory>(&self.pool, subcategories::TABLE, product.subcategory)
                .await?;
        let productsize_detail = self.sizes.get_many(&product.productsize).await?;
        Ok(ProductView {
            product,
            category_detail,
            subcategory_detail,
            productsize_detail,
        })
    }

    async fn populate_page(&self, page: Page<DbProduct>) -> Result<Page<ProductView>, EmporiumError> {
        let mut items = Vec::with_capacity(page.items.len());
        for product in page.items.iter().cloned() {
            items.push(self.populate(product).await?);
        }
        Ok(page.with_items(items))
    }

    /// Checks that referenced category, subcategory and sizes exist.
    ///
    /// Runs before any image upload so a bad reference costs no host calls.
    pub async fn validate_relations(
        &self,
        category: Option<i64>,
        subcategory: Option<i64>,
        sizes: Option<&[i64]>,
    ) -> Result<(), EmporiumError> {
        if let Some(category) = category
            && !query::exists(&self.pool, categories::TABLE, category).await?
        {
            return Err(EmporiumError::validation(
                "The category to edit to doesnt exist",
            ));
        }
        if let Some(subcategory) = subcategory
            && !query::exists(&self.pool, subcategories::TABLE, subcategory).await?
        {
            return Err(EmporiumError::validation("The subcategory doesnt exist"));
        }
        for size in sizes.unwrap_or_default() {
            if !query::exists(&self.pool, super::product_sizes::TABLE, *size).await? {
                return Err(EmporiumError::validation(format!(
                    "The product size {size} doesnt exist"
                )));
            }
        }
        Ok(())
    }

    pub async fn list(
        &self,
        filter: &ProductFilter,
        req: PageRequest,
    ) -> Result<Page<ProductView>, EmporiumError> {
        let page = query::fetch_page(&self.pool, TABLE, &filter.to_filter(), req).await?;
        self.populate_page(page).await
    }

    /// Case-insensitive substring search over name, brand and category name.
    pub async fn search(
        &self,
        needle: &str,
        req: PageRequest,
    ) -> Result<Page<ProductView>, EmporiumError> {
        let filter = Filter::new().contains_folded(SEARCH_COLUMN, needle);
        let page = query::fetch_page(&self.pool, TABLE, &filter, req).await?;
        self.populate_page(page).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<ProductView>, EmporiumError> {
        match self.get_row(id).await? {
            Some(product) => Ok(Some(self.populate(product).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_row(&self, id: i64) -> Result<Option<DbProduct>, EmporiumError> {
        query::fetch_by_id(&self.pool, TABLE, id).await
    }

    pub async fn create(&self, new: NewProduct) -> Result<ProductView, EmporiumError> {
        let now = Utc::now();
        let (images, public_ids) = unzip_assets(&new.assets);
        let search = search_text(&new.name, &new.brand, &new.cat_name);

        let row = sqlx::query_as::<_, DbProduct>(
            r#"
            INSERT INTO products (
                name, description, images, image_public_id, brand, oldprice, newprice,
                category, cat_name, subcategory, count_in_stock, discount, product_weight,
                rating, productsize, color, is_featured, search_text, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.name)
        .bind(new.description)
        .bind(Json(images))
        .bind(Json(public_ids))
        .bind(new.brand)
        .bind(new.oldprice)
        .bind(new.newprice)
        .bind(new.category)
        .bind(new.cat_name)
        .bind(new.subcategory)
        .bind(new.count_in_stock)
        .bind(new.discount)
        .bind(new.product_weight)
        .bind(new.rating)
        .bind(Json(new.productsize))
        .bind(Json(new.color))
        .bind(new.is_featured)
        .bind(search)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.populate(row).await
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &ProductPatch,
    ) -> Result<Option<ProductView>, EmporiumError> {
        let Some(product) =
            query::patch_and_fetch::<_, DbProduct>(&self.pool, TABLE, id, patch).await?
        else {
            return Ok(None);
        };

        if patch.name.is_some() || patch.brand.is_some() || patch.cat_name.is_some() {
            sqlx::query("UPDATE products SET search_text = ? WHERE id = ?")
                .bind(search_text(&product.name, &product.brand, &product.cat_name))
                .bind(id)
                .execute(&self.pool)
                .await?;
        }
        Ok(Some(self.populate(product).await?))
    }

    pub async fn delete(&self, id: i64) -> Result<bool, EmporiumError> {
        Ok(query::delete_by_id(&self.pool, TABLE, id).await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::{QueryBuilder, Sqlite};

    #[test]
    fn product_filter_combines_with_and() {
        let filter = ProductFilter {
            category_id: Some(2),
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM products");
        filter.to_filter().push_to(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM products WHERE category = ? AND newprice >= ? AND newprice <= ?"
        );
    }

    #[test]
    fn search_text_folds_non_ascii_and_separates_fields() {
        let text = search_text("ÉCLAIR Boots", "Acme", "Footwear");
        assert_eq!(text, "éclair boots\u{1f}acme\u{1f}footwear");
        assert!(!text.contains("bootsacme"));
    }

    #[test]
    fn empty_product_filter_matches_everything() {
        assert!(ProductFilter::default().to_filter().is_empty());
    }
}
