//! Snapshot refresh engine.
//!
//! Owns the fetch/normalize/cache cycle for the primary catalog: check
//! freshness, fan out one fetch per configured product, assemble a complete
//! snapshot with failure retention, commit it in a single store write.
//!
//! The engine is an explicit injected service; refreshing is an idempotent
//! method, not a constructor side effect, so concurrent admin requests can
//! trigger it redundantly without harm.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::catalog::{CatalogEntry, CatalogError, CatalogSnapshot, SnapshotStore, Slot};
use crate::config::CatalogConfig;
use crate::events::{Event, EventBus};
use crate::metrics;
use crate::normalize::normalize;
use crate::remote::{CatalogClient, VersionRequest};

/// One product's failure in the current refresh pass.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub key: String,
    pub reason: String,
}

/// Outcome of one refresh cycle.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub snapshot: CatalogSnapshot,
    /// Products fetched and normalized fresh this cycle.
    pub fetched: usize,
    /// Products that failed but kept their prior cached entry.
    pub retained: usize,
    /// All per-product failures, retained or not.
    pub failures: Vec<FailureRecord>,
}

/// The primary catalog synchronization service.
pub struct CatalogSync {
    client: Arc<dyn CatalogClient>,
    store: Arc<dyn SnapshotStore>,
    config: CatalogConfig,
    events: Option<Arc<EventBus>>,
}

impl CatalogSync {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        store: Arc<dyn SnapshotStore>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
            events: None,
        }
    }

    /// Publish refresh events on the given bus.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_secs)
    }

    /// Return the current snapshot, refreshing when the cache misses.
    ///
    /// A concurrent request that committed a fresh snapshot first wins; this
    /// call then serves it without re-fetching. Nothing here fails the
    /// request: a read error counts as a miss, a write error still leaves
    /// the in-memory result usable, and total fetch failure on a first run
    /// yields an empty snapshot.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        match self.store.get(Slot::Primary, self.ttl()) {
            Ok(Some(snapshot)) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Primary.name(), "hit"])
                    .inc();
                debug!(entries = snapshot.len(), "Serving fresh catalog snapshot");
                return snapshot;
            }
            Ok(None) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Primary.name(), "miss"])
                    .inc();
            }
            Err(e) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Primary.name(), "error"])
                    .inc();
                warn!(error = %e, "Snapshot read failed, treating as cache miss");
            }
        }

        self.refresh().await.snapshot
    }

    /// Fetch every configured product and commit a new snapshot.
    ///
    /// Products are fetched concurrently; each failure falls back to the
    /// product's entry in the previously stored snapshot when one exists.
    /// The store is written exactly once, after the whole snapshot is
    /// assembled, so an aborted refresh contributes nothing.
    pub async fn refresh(&self) -> RefreshOutcome {
        let started = Instant::now();

        // Prior entries feed the retention policy; TTL does not apply here,
        // a stale entry beats a dropped one.
        let prior = match self.store.peek(Slot::Primary) {
            Ok(prior) => prior,
            Err(e) => {
                warn!(error = %e, "Prior snapshot unavailable, refreshing without retention");
                None
            }
        };

        let results = join_all(self.config.products.iter().map(|product| {
            let request = VersionRequest::for_product(&self.config, product);
            async move {
                let result = self.fetch_one(&request, product).await;
                (product.key.clone(), result)
            }
        }))
        .await;

        let mut snapshot = CatalogSnapshot::new(Utc::now());
        let mut fetched = 0;
        let mut retained = 0;
        let mut failures = Vec::new();

        for (key, result) in results {
            match result {
                Ok(entry) => {
                    fetched += 1;
                    snapshot.entries.insert(key, entry);
                }
                Err(reason) => {
                    warn!(product = %key, reason = %reason, "Product refresh failed");
                    if let Some(prior_entry) = prior.as_ref().and_then(|p| p.get(&key)) {
                        retained += 1;
                        snapshot.entries.insert(key.clone(), prior_entry.clone());
                    }
                    failures.push(FailureRecord { key, reason });
                }
            }
        }

        if let Err(e) = self.store.set(Slot::Primary, &snapshot) {
            // Persistence failed; the snapshot still serves this request.
            warn!(error = %e, "Snapshot write failed, serving unpersisted result");
        }

        metrics::REFRESH_DURATION.observe(started.elapsed().as_secs_f64());
        debug!(
            fetched = fetched,
            retained = retained,
            failed = failures.len(),
            "Catalog refresh committed"
        );

        if let Some(events) = &self.events {
            events.emit(&Event::CatalogRefreshed {
                fetched,
                retained,
                failed: failures.len(),
            });
        }

        RefreshOutcome {
            snapshot,
            fetched,
            retained,
            failures,
        }
    }

    /// Force the next `snapshot` call to refresh.
    pub fn invalidate(&self) -> Result<(), CatalogError> {
        self.store.invalidate(Slot::Primary)
    }

    async fn fetch_one(
        &self,
        request: &VersionRequest,
        product: &crate::config::ProductConfig,
    ) -> Result<CatalogEntry, String> {
        let raw = match self.client.fetch_plugin_version(request).await {
            Ok(raw) => raw,
            Err(e) => {
                metrics::CATALOG_FETCHES
                    .with_label_values(&["fetch_error"])
                    .inc();
                return Err(e.to_string());
            }
        };

        match normalize(&raw, product, &self.config) {
            Ok(entry) => {
                metrics::CATALOG_FETCHES.with_label_values(&["ok"]).inc();
                Ok(entry)
            }
            Err(e) => {
                metrics::CATALOG_FETCHES
                    .with_label_values(&["normalize_error"])
                    .inc();
                Err(e.to_string())
            }
        }
    }
}
