use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use tracing::info;

use super::{create_with_assets, release_owned, write_with_assets};
use crate::assets::AssetBacked;
use crate::db::patch::{CategoryPatch, NewCategory};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiPath, ApiQuery, FormData, PageQuery};
use crate::server::router::EmporiumState;

const NOT_FOUND: &str = "Category doesnt exist";

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
    let page = state.repos.categories.list(state.page(&paging)).await?;
    ApiResponse::page("categoryList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let category = state
        .repos
        .categories
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;
    ApiResponse::ok().with("category", category)
}

async fn create(
    State(state): State<EmporiumState>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let name = form.require("name")?;
    let color = form.require("color")?;

    let repo = &state.repos.categories;
    let category = create_with_assets(&state, form.files(), 1, |assets| async move {
        repo.create(NewCategory {
            name,
            color,
            assets,
        })
        .await
    })
    .await?;

    info!(id = category.id, images = category.images.len(), "category created");
    Ok(ApiResponse::created()
        .with("category", category)?
        .message("Category created"))
}

async fn update(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.categories;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;

    let patch = CategoryPatch {
        name: form.text("name"),
        color: form.text("color"),
        assets: None,
    };
    let category = write_with_assets(
        &state,
        &existing.assets(),
        form.desired_images(),
        form.files(),
        1,
        |assets| async move {
            let patch = CategoryPatch { assets, ..patch };
            repo.update(id, &patch)
                .await?
                .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))
        },
    )
    .await?;

    Ok(ApiResponse::ok()
        .with("category", category)?
        .message("Category updated successfully"))
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.categories;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;

    info!(id, "category deleted");
    Ok(ApiResponse::ok().message("Category deleted"))
}
