use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;

use super::{create_with_assets, release_owned};
use crate::assets::{AssetPayload, AssetRef, unzip_assets};
use crate::db::OrderProduct;
use crate::error::EmporiumError;
use crate::server::envelope::ApiResponse;
use crate::server::extract::{ApiJson, ApiPath, ApiQuery, PageQuery, empty_as_none};
use crate::server::router::EmporiumState;

/// Order line as posted by the storefront; images are remote sources.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLine {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    quantity: i64,
    #[serde(default)]
    subtotal: f64,
    #[serde(default)]
    product_id: Option<i64>,
    #[serde(default)]
    product_size: String,
    #[serde(default)]
    product_color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrder {
    user_id: i64,
    #[serde(default)]
    products: Vec<OrderLine>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    user_id: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    order_id: Option<String>,
}

/// A validated line plus its image sources.
struct PendingLine {
    product: OrderProduct,
    sources: Vec<String>,
}

impl TryFrom<OrderLine> for PendingLine {
    type Error = EmporiumError;

    fn try_from(line: OrderLine) -> Result<Self, Self::Error> {
        let missing =
            || EmporiumError::validation("Missing required fields in one of the order products");
        let product_name = line
            .product_name
            .filter(|n| !n.is_empty())
            .ok_or_else(missing)?;
        let product_id = line.product_id.ok_or_else(missing)?;
        let sources = line.images.ok_or_else(missing)?;

        Ok(PendingLine {
            product: OrderProduct {
                product_name,
                images: Vec::new(),
                image_public_id: Vec::new(),
                rating: line.rating,
                price: line.price,
                quantity: line.quantity,
                subtotal: line.subtotal,
                product_id,
                product_size: line.product_size,
                product_color: line.product_color,
            },
            sources,
        })
    }
}

/// Hands the uploaded assets back to their lines, in submission order.
fn attach_assets(lines: Vec<PendingLine>, assets: &[AssetRef]) -> Vec<OrderProduct> {
    let mut rest = assets;
    lines
        .into_iter()
        .map(|line| {
            let take = line.sources.len().min(rest.len());
            let (mine, tail) = rest.split_at(take);
            rest = tail;
            let (images, image_public_id) = unzip_assets(mine);
            OrderProduct {
                images,
                image_public_id,
                ..line.product
            }
        })
        .collect()
}

pub fn router() -> Router<EmporiumState> {
    Router::new()
        .route("/", get(list))
        .route("/create", post(create))
        .route("/{id}", get(get_one).delete(remove))
}

async fn create(
    State(state): State<EmporiumState>,
    ApiJson(body): ApiJson<CreateOrder>,
) -> Result<ApiResponse, EmporiumError> {
    let lines = body
        .products
        .into_iter()
        .map(PendingLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let payloads: Vec<AssetPayload> = lines
        .iter()
        .flat_map(|line| line.sources.iter().map(AssetPayload::remote))
        .collect();

    let repo = &state.repos.orders;
    let user_id = body.user_id;
    let order = create_with_assets(&state, &payloads, 0, |assets| async move {
        repo.create(user_id, attach_assets(lines, &assets)).await
    })
    .await?;

    info!(
        id = order.id,
        order_id = %order.order_id,
        user_id,
        products = order.products.len(),
        "order created"
    );
    ApiResponse::created().with("orderList", order)
}

async fn list(
    State(state): State<EmporiumState>,
    ApiQuery(paging): ApiQuery<PageQuery>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<ApiResponse, EmporiumError> {
    let page = state
        .repos
        .orders
        .list(query.user_id, query.order_id, state.page(&paging))
        .await?;
    ApiResponse::page("orderList", page)
}

async fn get_one(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let order = state
        .repos
        .orders
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("No such Order Exists"))?;
    ApiResponse::ok().with("orderList", order)
}

async fn remove(
    State(state): State<EmporiumState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<ApiResponse, EmporiumError> {
    let repo = &state.repos.orders;
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| EmporiumError::not_found("Order Item doesnt exist"))?;

    release_owned(&state, &existing).await;
    repo.delete(id).await?;

    info!(id, order_id = %existing.order_id, "order deleted");
    Ok(ApiResponse::ok().message("Order Item and associated images deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, sources: usize) -> PendingLine {
        PendingLine {
            product: OrderProduct {
                product_name: name.to_string(),
                images: Vec::new(),
                image_public_id: Vec::new(),
                rating: 0.0,
                price: 1.0,
                quantity: 1,
                subtotal: 1.0,
                product_id: 1,
                product_size: String::new(),
                product_color: String::new(),
            },
            sources: (0..sources).map(|i| format!("https://src/{name}/{i}")).collect(),
        }
    }

    #[test]
    fn uploaded_assets_are_split_back_per_line() {
        let assets = vec![
            AssetRef::new("u1", "p1"),
            AssetRef::new("u2", "p2"),
            AssetRef::new("u3", "p3"),
        ];
        let products = attach_assets(vec![line("a", 2), line("b", 0), line("c", 1)], &assets);

        assert_eq!(products[0].image_public_id, vec!["p1", "p2"]);
        assert!(products[1].images.is_empty());
        assert_eq!(products[2].images, vec!["u3"]);
    }

    #[test]
    fn lines_without_images_array_are_rejected() {
        let raw: OrderLine =
            serde_json::from_str(r#"{"productName":"Shoe","productId":3}"#).expect("line");
        assert!(PendingLine::try_from(raw).is_err());
    }
}
