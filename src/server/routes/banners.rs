use axum::{
    Router,
    extract::State,
    routing::{delete, get, post},
};
use tracing::info;

use super::{create_with_assets, release_owned};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiPath, ApiQuery, FormData, PageQuery};
use crate::server::router::EmporiumState;

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/{id}", delete(remove))
}

async fn create(
    State(state): State<EmporiumState>,
    form: FormData,
) -> Result<ApiResponse, EmporiumError> {
    // A banner holds exactly one image; extra files are ignored.
    let Some(file) = form.files().first() else {
        return Err(EmporiumError::validation("No image uploaded"));
    };

    let repo = &state.repos.banners;
    let banner = create_with_assets(&state, std::slice::from_ref(file), 1, |assets| async move {
        let image = assets
            .first()
            .ok_or_else(|| EmporiumError::UnexpectedError("upload returned no asset".to_string()))?;
        repo.create(image).await
    })
    .await?;

    info!(id = banner.id, "banner created");
    Ok(ApiResponse::created()
        .with("bannerImage", banner)?
        .message("Successfully Created bannerImage"))
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state.repos.banners.list(state.page(&paging)).await?;
    ApiResponse::page("bannerList", page)
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.banners;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("Banner item doesnt exist"))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;
    Ok(ApiResponse::ok().message("Banner item deleted successfully"))
}
