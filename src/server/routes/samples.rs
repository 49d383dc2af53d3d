use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use super::{create_with_assets, release_owned, write_with_assets};
use crate::assets::AssetBacked;
use crate::db::patch::{NewSample, SamplePatch};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiPath, ApiQuery, FormData, PageQuery};
use crate::server::router::EmporiumState;

const NOT_FOUND: &str = "Product not found";

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/{id}", get(get_one).patch(update).delete(remove))
}

async fn create(
    State(state): State<EmporiumState>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let product_name = form.require("productName")?;
    let description = form.require("description")?;

    let repo = &state.repos.samples;
    let sample = create_with_assets(&state, form.files(), 1, |assets| async move {
        repo.create(NewSample {
            product_name,
            description,
            assets,
        })
        .await
    })
    .await?;

    Ok(ApiResponse::created()
        .with("prodTest", sample)?
        .message("Product created"))
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state.repos.samples.list(state.page(&paging)).await?;
    ApiResponse::page("productList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let sample = state
        .repos
        .samples
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;
    ApiResponse::ok().with("product", sample)
}

async fn update(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.samples;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))?;

    let patch = SamplePatch {
        product_name: form.text("productName"),
        description: form.text("description"),
        assets: None,
    };
    let sample = write_with_assets(
        &state,
        &existing.assets(),
        form.desired_images(),
        form.files(),
        1,
        |assets| async move {
            let patch = SamplePatch { assets, ..patch };
            repo.update(id, &patch)
                .await?
                .ok_or_else(|| EmporiumError::not_found(NOT_FOUND))
        },
    )
    .await?;

    Ok(ApiResponse::ok()
        .with("product", sample)?
        .message("Product updated successfully"))
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.samples;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("Product doesnt exist"))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;
    Ok(ApiResponse::ok().message("Product deleted"))
}
