use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::db::patch::{NewProductSize, ProductSizePatch};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, PageQuery};
use crate::server::router::EmporiumState;

const NOT_FOUND: &str = "The product size doesnt exist";

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state.repos.product_sizes.list(state.page(&paging)).await?;
    ApiResponse::page("productSizeList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let size = state
        .repos
        .product_sizes
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;
    ApiResponse::ok().with("productSizeItem", size)
}

async fn create(
    State(state): State<EmporiumState>,
    ApiJson(new): ApiJson<NewProductSize>,
) -> Result<ApiResponse, EmporiumError> {
    if new.productsize.trim().is_empty() {
        return Err(EmporiumError::validation("productsize is required"));
    }
    let size = state.repos.product_sizes.create(new).await?;
    ApiResponse::created().with("productSize", size)
}

async fn update(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ProductSizePatch>,
) -> Result<ApiResponse, EmporiumError> {
    let size = state
        .repos
        .product_sizes
        .update(id, &patch)
        .await?
        .ok_or_else(|| EmporiumError::not_found("ProductSize not found"))?;
    ApiResponse::ok().with("productSize", size)
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    if !state.repos.product_sizes.delete(id).await? {
        return Err(EmporiumError::not_found("Product Size doesnt exist"));
    }
    Ok(ApiResponse::ok().message("Product Size deleted"))
}
