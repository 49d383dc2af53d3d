//! Carts and wishlists: same routes, same row shape, different table and keys.

use axum::{
    Extension, Router,
    extract::State,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;

use super::{create_with_assets, release_owned, write_with_assets};
use crate::assets::{AssetBacked, AssetPayload};
use crate::db::BasketKind;
use crate::db::patch::{BasketPatch, NewBasketItem};
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

/// Response keys and messages of one basket flavour.
#[derive(Clone, Copy)]
struct Labels {
    list: &'static str,
    item: &'static str,
    count: &'static str,
    duplicate: &'static str,
    not_found: &'static str,
    nothing_to_clear: &'static str,
}

fn labels(kind: BasketKind) -> Labels {
    match kind {
        BasketKind::Cart => Labels {
            list: "cartList",
            item: "cartItem",
            count: "cartCount",
            duplicate: "Item already added to cart",
            not_found: "Cart Item doesnt exist",
            nothing_to_clear: "No cart items found for the user",
        },
        BasketKind::Wishlist => Labels {
            list: "wishList",
            item: "wishItem",
            count: "wishCount",
            duplicate: "Items already added to wishList",
            not_found: "wish Item doesnt exist",
            nothing_to_clear: "No wishlist items found for the user",
        },
    }
}

#[derive(Debug, Deserialize)]
struct AddBody {
    #[serde(flatten)]
    item: NewBasketItem,
    /// Remote image sources the host fetches.
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PatchBody {
    #[serde(flatten)]
    patch: BasketPatch,
    /// Full desired image list; owned URLs are kept, others uploaded.
    #[serde(default)]
    images: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BasketQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    user_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    product_id: Option<i64>,
}

pub fn router(kind: BasketKind) -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/add", post(add))
        .route("/get/count", get(count))
        .route("/clear/{user_id}", delete(clear))
        .route("/{id}", get(get_one).patch(update).delete(remove))
        .layer(Extension(kind))
}

async fn list(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<BasketQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state
        .repos
        .baskets(kind)
        .list(query.user_id, query.product_id, state.page(&paging))
        .await?;
    ApiResponse::page(labels(kind).list, page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let item = state
        .repos
        .baskets(kind)
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.not_found))?;
    ApiResponse::ok().with(labels.item, item)
}

async fn add(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiJson(body): ApiJson<AddBody>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.baskets(kind);

    if repo
        .contains(body.item.product_id, body.item.user_id)
        .await?
    {
        return Err(EmporiumError::validation(labels.duplicate));
    }

    let payloads: Vec<AssetPayload> = body
        .images
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(AssetPayload::remote)
        .collect();
    let item = body.item;
    let created = create_with_assets(&state, &payloads, 0, |assets| async move {
        repo.create(NewBasketItem { assets, ..item }).await
    })
    .await?;

    info!(
        kind = ?kind,
        id = created.id,
        user_id = created.user_id,
        product_id = created.product_id,
        "basket item added"
    );
    ApiResponse::created().with(labels.list, created)
}

async fn update(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<PatchBody>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.baskets(kind);
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.not_found))?;
    let owned = existing.assets();

    let (desired, payloads) = match body.images.filter(|images| !images.is_empty()) {
        Some(images) => {
            let (kept, fresh): (Vec<String>, Vec<String>) = images
                .into_iter()
                .partition(|url| owned.iter().any(|a| &a.url == url));
            let payloads = fresh.iter().map(AssetPayload::remote).collect();
            (Some(kept), payloads)
        }
        None => (None, Vec::new()),
    };

    let patch = body.patch;
    let item = write_with_assets(&state, &owned, desired, &payloads, 0, |assets| async move {
        let patch = BasketPatch { assets, ..patch };
        repo.update(id, &patch)
            .await?
            .ok_or_else(|| EmporiumError::not_found(labels.not_found))
    })
    .await?;

    ApiResponse::ok().with(labels.item, item)
}

async fn remove(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.baskets(kind);
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found(labels.not_found))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;
    Ok(ApiResponse::ok().message("Item deleted"))
}

async fn count(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiQuery(query): ApiQuery<BasketQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let user_id = query
        .user_id
        .ok_or_else(|| EmporiumError::validation("User ID is required"))?;
    let total = state.repos.baskets(kind).count_for_user(user_id).await?;
    ApiResponse::ok().with(labels(kind).count, total)
}

async fn clear(
    State(state): State<EmporiumState>,
    Extension(kind): Extension<BasketKind>,
    ApiPath(user_id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let labels = labels(kind);
    let repo = state.repos.baskets(kind);
    let items = repo.items_for_user(user_id).await?;
    if items.is_empty() {
        return Err(EmporiumError::not_found(labels.nothing_to_clear));
    }

    state
        .assets
        .release_all(
            items
                .iter()
                .flat_map(|item| item.assets())
                .map(|a| a.external_id),
        )
        .await;
    let removed = repo.clear_user(user_id).await?;

    info!(kind = ?kind, user_id, removed, "basket cleared");
    Ok(ApiResponse::ok()
        .with("deletedCount", removed)?
        .message("Items cleared"))
}
