use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;

use crate::db::patch::NewReview;
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    product_id: Option<i64>,
}

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/add", post(add))
        .route("/{id}", get(get_one))
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<ReviewQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state
        .repos
        .reviews
        .list(query.product_id, state.page(&paging))
        .await?;
    ApiResponse::page("productReviews", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let review = state
        .repos
        .reviews
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("The productReview doesnt exist"))?;
    ApiResponse::ok().with("productReview", review)
}

async fn add(
    State(state): State<EmporiumState>,
    ApiJson(new): ApiJson<NewReview>,
) -> Result<ApiResponse, EmporiumError> {
    if state.repos.products.get_row(new.product_id).await?.is_none() {
        return Err(EmporiumError::validation("The product doesnt exist"));
    }
    let review = state.repos.reviews.create(new).await?;
    ApiResponse::created().with("productReview", review)
}
