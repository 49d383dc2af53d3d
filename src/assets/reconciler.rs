use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::{AssetHost, AssetPayload, AssetRef};
use crate::error::{AssetError, EmporiumError};

/// Partition of a resource's current assets against the URLs the client keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Existing assets whose URL is still wanted, in their original order.
    pub kept: Vec<AssetRef>,
    /// Existing assets to release once the new record is stored.
    pub stale: Vec<AssetRef>,
}

/// Splits `existing` into kept / stale by URL membership in `desired`.
pub fn plan(existing: &[AssetRef], desired: &[String]) -> ReconcilePlan {
    let desired: HashSet<&str> = desired.iter().map(String::as_str).collect();
    let (kept, stale) = existing
        .iter()
        .cloned()
        .partition(|a| desired.contains(a.url.as_str()));
    ReconcilePlan { kept, stale }
}

/// Outcome of the upload phase; must be handed back to [`AssetReconciler::settle`].
#[derive(Debug)]
#[must_use = "a reconciliation must be settled to release stale or orphaned assets"]
pub struct Reconciliation {
    assets: Vec<AssetRef>,
    stale: Vec<String>,
    uploaded: Vec<String>,
}

impl Reconciliation {
    /// Final asset list: kept assets first, then the new uploads.
    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    pub fn urls(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.url.clone()).collect()
    }

    pub fn external_ids(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.external_id.clone()).collect()
    }
}

/// Drives the image host for one resource operation.
///
/// Every host call holds one of `concurrency` permits, so a single operation
/// never has more than that many uploads or deletes in flight.
#[derive(Clone)]
pub struct AssetReconciler {
    host: Arc<dyn AssetHost>,
    concurrency: usize,
}

impl AssetReconciler {
    pub fn new(host: Arc<dyn AssetHost>, concurrency: usize) -> Self {
        Self {
            host,
            concurrency: concurrency.max(1),
        }
    }

    /// Upload phase of a create: nothing existing, every payload is new.
    pub async fn create(
        &self,
        payloads: &[AssetPayload],
        min_assets: usize,
    ) -> Result<Reconciliation, EmporiumError> {
        self.reconcile(&[], &[], payloads, min_assets).await
    }

    /// Upload phase of an update.
    ///
    /// Nothing is released here. Stale assets are released by `settle` once
    /// the record write succeeded; if it failed, the fresh uploads are
    /// released instead.
    pub async fn reconcile(
        &self,
        existing: &[AssetRef],
        desired: &[String],
        payloads: &[AssetPayload],
        min_assets: usize,
    ) -> Result<Reconciliation, EmporiumError> {
        let ReconcilePlan { kept, stale } = plan(existing, desired);

        if kept.len() + payloads.len() < min_assets {
            return Err(EmporiumError::validation(if min_assets == 1 {
                "No images uploaded".to_string()
            } else {
                format!("At least {min_assets} images are required")
            }));
        }

        let uploaded = self.upload_all(payloads).await?;
        debug!(
            kept = kept.len(),
            stale = stale.len(),
            uploaded = uploaded.len(),
            "asset reconciliation prepared"
        );

        let uploaded_ids = uploaded.iter().map(|a| a.external_id.clone()).collect();
        let mut assets = kept;
        assets.extend(uploaded);

        Ok(Reconciliation {
            assets,
            stale: stale.into_iter().map(|a| a.external_id).collect(),
            uploaded: uploaded_ids,
        })
    }

    /// Finishes a reconciliation after the record write.
    pub async fn settle<T>(
        &self,
        reconciliation: Reconciliation,
        outcome: Result<T, EmporiumError>,
    ) -> Result<T, EmporiumError> {
        match outcome {
            Ok(value) => {
                self.release_all(reconciliation.stale).await;
                Ok(value)
            }
            Err(e) => {
                warn!(
                    orphaned = reconciliation.uploaded.len(),
                    error = %e,
                    "record write failed, releasing fresh uploads"
                );
                self.release_all(reconciliation.uploaded).await;
                Err(e)
            }
        }
    }

    /// Uploads every payload, keeping submission order.
    ///
    /// On any failure the uploads that did succeed are released and the first
    /// error is returned.
    pub async fn upload_all(&self, payloads: &[AssetPayload]) -> Result<Vec<AssetRef>, AssetError> {
        if payloads.is_empty() {
            return Ok(Vec::new());
        }

        let permits = Semaphore::new(self.concurrency);
        let results = join_all(payloads.iter().map(|payload| {
            let permits = &permits;
            async move {
                let _permit = permits
                    .acquire()
                    .await
                    .map_err(|_| AssetError::LimiterClosed)?;
                self.host.upload(payload).await
            }
        }))
        .await;

        let mut uploaded = Vec::with_capacity(results.len());
        let mut first_err = None;
        for result in results {
            match result {
                Ok(asset) => uploaded.push(asset),
                Err(e) if first_err.is_none() => first_err = Some(e),
                Err(e) => warn!(error = %e, "additional upload failure"),
            }
        }

        match first_err {
            None => Ok(uploaded),
            Some(e) => {
                self.release_all(uploaded.into_iter().map(|a| a.external_id))
                    .await;
                Err(e)
            }
        }
    }

    /// Best-effort release. Each id reaches the host once; failures are logged.
    pub async fn release_all(&self, external_ids: impl IntoIterator<Item = String>) {
        let ids: Vec<String> = external_ids
            .into_iter()
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return;
        }

        let permits = Semaphore::new(self.concurrency);
        join_all(ids.iter().map(|id| {
            let permits = &permits;
            async move {
                let Ok(_permit) = permits.acquire().await else {
                    return;
                };
                match self.host.delete(id).await {
                    Ok(()) => debug!(external_id = %id, "asset released"),
                    Err(e) => warn!(external_id = %id, error = %e, "asset release failed"),
                }
            }
        }))
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeHost {
        next: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        deleted: Mutex<Vec<String>>,
        fail_on: Option<String>,
    }

    #[async_trait]
    impl AssetHost for FakeHost {
        async fn upload(&self, payload: &AssetPayload) -> Result<AssetRef, AssetError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let (Some(bad), AssetPayload::Remote(src)) = (&self.fail_on, payload)
                && bad == src
            {
                return Err(AssetError::Parse {
                    message: "boom".to_string(),
                    body: String::new(),
                });
            }

            let n = self.next.fetch_add(1, Ordering::SeqCst);
            let label = match payload {
                AssetPayload::Remote(src) => src.clone(),
                AssetPayload::Bytes { .. } => format!("bytes-{n}"),
            };
            Ok(AssetRef::new(
                format!("https://cdn.test/{label}"),
                format!("new-{label}"),
            ))
        }

        async fn delete(&self, external_id: &str) -> Result<(), AssetError> {
            self.deleted
                .lock()
                .expect("deleted lock")
                .push(external_id.to_string());
            Ok(())
        }
    }

    fn existing() -> Vec<AssetRef> {
        vec![
            AssetRef::new("u1", "p1"),
            AssetRef::new("u2", "p2"),
            AssetRef::new("u3", "p3"),
        ]
    }

    fn deleted(host: &FakeHost) -> Vec<String> {
        let mut out = host.deleted.lock().expect("deleted lock").clone();
        out.sort();
        out
    }

    #[test]
    fn plan_partitions_by_url_and_keeps_order() {
        let p = plan(&existing(), &["u3".to_string(), "u1".to_string()]);
        assert_eq!(p.kept, vec![AssetRef::new("u1", "p1"), AssetRef::new("u3", "p3")]);
        assert_eq!(p.stale, vec![AssetRef::new("u2", "p2")]);
    }

    #[test]
    fn plan_ignores_unknown_desired_urls() {
        let p = plan(&existing(), &["elsewhere".to_string()]);
        assert!(p.kept.is_empty());
        assert_eq!(p.stale.len(), 3);
    }

    #[tokio::test]
    async fn reconcile_appends_uploads_after_kept_and_releases_stale_once() {
        let host = Arc::new(FakeHost::default());
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let desired = vec!["u1".to_string(), "u3".to_string()];
        let payloads = vec![AssetPayload::remote("a"), AssetPayload::remote("b")];
        let rec = reconciler
            .reconcile(&existing(), &desired, &payloads, 0)
            .await
            .expect("reconcile");

        assert_eq!(
            rec.urls(),
            vec!["u1", "u3", "https://cdn.test/a", "https://cdn.test/b"]
        );
        assert_eq!(rec.external_ids(), vec!["p1", "p3", "new-a", "new-b"]);

        // Nothing released before the record write settles.
        assert!(deleted(&host).is_empty());

        let urls = rec.urls();
        reconciler.settle(rec, Ok(())).await.expect("settle");
        assert_eq!(deleted(&host), vec!["p2"]);

        let allowed: HashSet<String> = desired
            .iter()
            .cloned()
            .chain(["https://cdn.test/a".to_string(), "https://cdn.test/b".to_string()])
            .collect();
        assert!(urls.iter().all(|u| allowed.contains(u)));
    }

    #[tokio::test]
    async fn empty_desired_without_payloads_releases_everything() {
        let host = Arc::new(FakeHost::default());
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let rec = reconciler
            .reconcile(&existing(), &[], &[], 0)
            .await
            .expect("reconcile");
        assert!(rec.assets().is_empty());

        reconciler.settle(rec, Ok(())).await.expect("settle");
        assert_eq!(deleted(&host), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn required_asset_missing_fails_without_host_calls() {
        let host = Arc::new(FakeHost::default());
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let err = reconciler.create(&[], 1).await.expect_err("must fail");
        assert!(matches!(err, EmporiumError::Validation(_)));
        assert_eq!(host.next.load(Ordering::SeqCst), 0);
        assert!(deleted(&host).is_empty());
    }

    #[tokio::test]
    async fn failed_upload_keeps_existing_and_releases_partial_uploads() {
        let host = Arc::new(FakeHost {
            fail_on: Some("bad".to_string()),
            ..Default::default()
        });
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let payloads = vec![AssetPayload::remote("ok"), AssetPayload::remote("bad")];
        let err = reconciler
            .reconcile(&existing(), &[], &payloads, 0)
            .await
            .expect_err("upload failure aborts");
        assert!(matches!(err, EmporiumError::Asset(_)));

        // Only the orphaned fresh upload is released; p1..p3 stay.
        assert_eq!(deleted(&host), vec!["new-ok"]);
    }

    #[tokio::test]
    async fn failed_record_write_releases_fresh_uploads_not_stale() {
        let host = Arc::new(FakeHost::default());
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let rec = reconciler
            .reconcile(&existing(), &["u1".to_string()], &[AssetPayload::remote("n")], 0)
            .await
            .expect("reconcile");

        let res: Result<(), _> = reconciler
            .settle(rec, Err(EmporiumError::UnexpectedError("write".to_string())))
            .await;
        assert!(res.is_err());
        assert_eq!(deleted(&host), vec!["new-n"]);
    }

    #[tokio::test]
    async fn uploads_never_exceed_concurrency_cap() {
        let host = Arc::new(FakeHost::default());
        let reconciler = AssetReconciler::new(host.clone(), 2);

        let payloads: Vec<_> = (0..6)
            .map(|i| AssetPayload::remote(format!("img{i}")))
            .collect();
        let uploaded = reconciler.upload_all(&payloads).await.expect("upload");

        assert_eq!(uploaded.len(), 6);
        assert_eq!(uploaded[0].url, "https://cdn.test/img0");
        assert_eq!(uploaded[5].url, "https://cdn.test/img5");
        assert_eq!(host.max_in_flight.load(Ordering::SeqCst), 2);
    }
}
