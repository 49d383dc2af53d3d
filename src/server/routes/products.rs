use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use super::{create_with_assets, release_owned, write_with_assets};
use crate::assets::AssetBacked;
use crate::db::ProductFilter;
use crate::db::patch::{NewProduct, ProductPatch};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiPath, ApiQuery, FormData, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

const NOT_FOUND: &str = "The product doesnt exist";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    cat_name: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    category_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    subcategory_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    min_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    max_price: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    is_featured: Option<bool>,
}

impl From<ProductQuery> for ProductFilter {
    fn from(q: ProductQuery) -> Self {
        ProductFilter {
            cat_name: q.cat_name,
            category_id: q.category_id,
            subcategory_id: q.subcategory_id,
            min_price: q.min_price,
            max_price: q.max_price,
            rating: q.rating,
            is_featured: q.is_featured,
        }
    }
}

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/featured", get(featured))
        .route("/create", post(create))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

fn parse_sizes(form: &FormData) -> Result<Option<Vec<i64>>, EmporiumError> {
    form.list_opt("productsize")
        .map(|raw| {
            raw.iter()
                .map(|v| {
                    v.parse::<i64>()
                        .map_err(|_| EmporiumError::validation("Invalid value for productsize"))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let filter = ProductFilter::from(query);
    let page = state
        .repos
        .products
        .list(&filter, state.page(&paging))
        .await?;
    ApiResponse::page("productList", page)
}

async fn featured(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let filter = ProductFilter {
        is_featured: Some(true),
        ..Default::default()
    };
    let page = state
        .repos
        .products
        .list(&filter, state.page(&paging))
        .await?;
    ApiResponse::page("productList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let product = state
        .repos
        .products
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;
    ApiResponse::ok().with("productItem", product)
}

async fn create(
    State(state): State<EmporiumState>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let category = form
        .parse::<i64>("category")?
        .ok_or_else(|| EmporiumError::validation("category is required"))?;
    let subcategory = form
        .parse::<i64>("subcategory")?
        .ok_or_else(|| EmporiumError::validation("subcategory is required"))?;
    let productsize = parse_sizes(&form)?.unwrap_or_default();

    let new = NewProduct {
        name: form.require("name")?,
        description: form.require("description")?,
        brand: form.text("brand").unwrap_or_default(),
        oldprice: form.parse("oldprice")?.unwrap_or_default(),
        newprice: form.parse("newprice")?.unwrap_or_default(),
        category,
        cat_name: form.text("catName").unwrap_or_default(),
        subcategory,
        count_in_stock: form
            .parse("countInStock")?
            .ok_or_else(|| EmporiumError::validation("countInStock is required"))?,
        discount: form.parse("discount")?.unwrap_or_default(),
        product_weight: form.parse("productWeight")?.unwrap_or_default(),
        rating: form.parse("rating")?.unwrap_or_default(),
        productsize,
        color: form.list_split("color"),
        is_featured: form.flag("isFeatured").unwrap_or(false),
        assets: Vec::new(),
    };

    let repo = &state.repos.products;
    repo.validate_relations(Some(category), Some(subcategory), Some(&new.productsize))
        .await?;

    let product = create_with_assets(&state, form.files(), 1, |assets| async move {
        repo.create(NewProduct { assets, ..new }).await
    })
    .await?;

    info!(
        id = product.product.id,
        images = product.product.images.len(),
        "product created"
    );
    Ok(ApiResponse::created()
        .with("product", product)?
        .message("Successfully created product item"))
}

async fn update(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.products;
    let existing = repo
        .get_row(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;

    let patch = ProductPatch {
        name: form.text("name"),
        description: form.text("description"),
        brand: form.text("brand"),
        oldprice: form.parse("oldprice")?,
        newprice: form.parse("newprice")?,
        category: form.parse("category")?,
        cat_name: form.text("catName"),
        subcategory: form.parse("subcategory")?,
        count_in_stock: form.parse("countInStock")?,
        discount: form.parse("discount")?,
        product_weight: form.parse("productWeight")?,
        rating: form.parse("rating")?,
        productsize: parse_sizes(&form)?,
        color: form.list_opt("color"),
        is_featured: form.flag("isFeatured"),
        assets: None,
    };
    repo.validate_relations(patch.category, patch.subcategory, patch.productsize.as_deref())
        .await?;

    let product = write_with_assets(
        &state,
        &existing.assets(),
        form.desired_images(),
        form.files(),
        1,
        |assets| async move {
            let patch = ProductPatch { assets, ..patch };
            repo.update(id, &patch)
                .await?
                .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))
        },
    )
    .await?;

    Ok(ApiResponse::ok()
        .with("product", product)?
        .message("Successfully updated Product Item"))
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.products;
    let existing = repo
        .get_row(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("Product doesnt exist"))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;

    info!(id, "product deleted");
    Ok(ApiResponse::ok().message("Product deleted"))
}
