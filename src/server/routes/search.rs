use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use tracing::debug;

use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiQuery, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    q: Option<String>,
}

pub fn router() -> Router<EmporiumState> {
    Router::new().route("/", get(search))
}

async fn search(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let needle = query
        .q
        .ok_or_else(|| EmporiumError::validation("No search query has been provided"))?;

    let page = state
        .repos
        .products
        .search(&needle, state.page(&paging))
        .await?;
    debug!(q = %needle, matches = page.total_posts, "product search");
    ApiResponse::page("productList", page)
}
