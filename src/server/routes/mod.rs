//! One module per `/api/<resource>` prefix.

pub mod accounts;
pub mod banners;
pub mod baskets;
pub mod categories;
pub mod checkout;
pub mod orders;
pub mod product_sizes;
pub mod products;
pub mod reviews;
pub mod samples;
pub mod search;
pub mod subcategories;

use std::future::Future;

use crate::assets::{AssetBacked, AssetPayload, AssetRef};
use crate::error::EmporiumError;
use crate::server::router::EmporiumState;

/// Update flow for an asset-backed record.
///
/// With `desired == None` the record's assets are left alone and `write`
/// gets `None`. Otherwise uploads run first, `write` receives the final
/// asset list, and stale or orphaned assets are released depending on
/// whether the write succeeded.
pub(crate) async fn write_with_assets<T, F, Fut>(
    state: &EmporiumState,
    existing: &[AssetRef],
    desired: Option<Vec<String>>,
    payloads: &[AssetPayload],
    min_assets: usize,
    write: F,
) -> Result<T, EmporiumError>
where
    F: FnOnce(Option<Vec<AssetRef>>) -> Fut,
    Fut: Future<Output = Result<T, EmporiumError>>,
{
    let Some(desired) = desired else {
        return write(None).await;
    };

    let reconciliation = state
        .assets
        .reconcile(existing, &desired, payloads, min_assets)
        .await?;
    let outcome = write(Some(reconciliation.assets().to_vec())).await;
    state.assets.settle(reconciliation, outcome).await
}

/// Create flow: upload everything, insert, release the uploads if the insert fails.
pub(crate) async fn create_with_assets<T, F, Fut>(
    state: &EmporiumState,
    payloads: &[AssetPayload],
    min_assets: usize,
    write: F,
) -> Result<T, EmporiumError>
where
    F: FnOnce(Vec<AssetRef>) -> Fut,
    Fut: Future<Output = Result<T, EmporiumError>>,
{
    let reconciliation = state.assets.create(payloads, min_assets).await?;
    let outcome = write(reconciliation.assets().to_vec()).await;
    state.assets.settle(reconciliation, outcome).await
}

/// Releases every asset a record owns before the record itself is deleted.
pub(crate) async fn release_owned(state: &EmporiumState, record: &impl AssetBacked) {
    state
        .assets
        .release_all(record.assets().into_iter().map(|a| a.external_id))
        .await;
}
