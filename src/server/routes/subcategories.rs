use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use crate::db::patch::{NewSubcategory, SubcategoryPatch};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

const NOT_FOUND: &str = "Sub-Category not found";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubcategoryQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    category_id: Option<i64>,
}

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<SubcategoryQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state
        .repos
        .subcategories
        .list(query.category_id, state.page(&paging))
        .await?;
    ApiResponse::page("subCategoryList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let sub = state
        .repos
        .subcategories
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("The subcategory with the given id doesnt exist"))?;
    ApiResponse::ok().with("subcategory", sub)
}

async fn create(
    State(state): State<EmporiumState>,
    ApiJson(new): ApiJson<NewSubcategory>,
) -> Result<ApiResponse, EmporiumError> {
    if new.subcategory.trim().is_empty() {
        return Err(EmporiumError::validation("subcategory is required"));
    }
    let sub = state.repos.subcategories.create(new).await?;
    Ok(ApiResponse::created()
        .with("subcategory", sub)?
        .message("Successfully Created Subcategory"))
}

async fn update(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<SubcategoryPatch>,
) -> Result<ApiResponse, EmporiumError> {
    let sub = state
        .repos
        .subcategories
        .update(id, &patch)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;
    ApiResponse::ok().with("subcategory", sub)
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    if !state.repos.subcategories.delete(id).await? {
        return Err(EmporiumError::not_found("sub-Category doesnt exist"));
    }
    Ok(ApiResponse::ok().message("Sub-Category deleted"))
}
