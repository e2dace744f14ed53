//! Secondary recommendation source.
//!
//! The host-ecosystem plugin directory serves public metadata for
//! recommended companion plugins. Records are fetched independently of the
//! primary catalog, cached in their own slot with the same TTL machinery,
//! and merged into the listing only (never into update detection).

mod http;

pub use http::HttpDirectoryClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::catalog::{CatalogEntry, CatalogError, CatalogSnapshot, SnapshotStore, Slot};
use crate::config::DirectoryConfig;
use crate::metrics;
use crate::remote::FetchError;

/// Trait for plugin-directory backends.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Fetch public metadata for one directory plugin.
    async fn plugin_information(&self, slug: &str) -> Result<CatalogEntry, FetchError>;
}

/// Keeps the recommended-plugin snapshot fresh.
pub struct DirectorySync {
    client: Arc<dyn DirectoryClient>,
    store: Arc<dyn SnapshotStore>,
    config: DirectoryConfig,
}

impl DirectorySync {
    pub fn new(
        client: Arc<dyn DirectoryClient>,
        store: Arc<dyn SnapshotStore>,
        config: DirectoryConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_secs)
    }

    /// Return the current recommendation snapshot, refreshing on a miss.
    /// An empty snapshot is a valid terminal state, not an error.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        match self.store.get(Slot::Recommended, self.ttl()) {
            Ok(Some(snapshot)) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Recommended.name(), "hit"])
                    .inc();
                return snapshot;
            }
            Ok(None) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Recommended.name(), "miss"])
                    .inc();
            }
            Err(e) => {
                metrics::CACHE_READS
                    .with_label_values(&[Slot::Recommended.name(), "error"])
                    .inc();
                warn!(error = %e, "Recommended snapshot read failed, treating as cache miss");
            }
        }

        self.refresh().await
    }

    /// Fetch every recommended plugin and commit a new snapshot.
    ///
    /// Same retention rules as the primary refresh: a failed fetch keeps the
    /// prior stored entry when one exists, and the store is written once.
    pub async fn refresh(&self) -> CatalogSnapshot {
        let prior = self.store.peek(Slot::Recommended).unwrap_or_else(|e| {
            warn!(error = %e, "Prior recommended snapshot unavailable");
            None
        });

        let results = join_all(self.config.recommended.iter().map(|rec| async {
            let result = self.client.plugin_information(&rec.slug).await;
            (rec.slug.clone(), result)
        }))
        .await;

        let mut snapshot = CatalogSnapshot::new(Utc::now());
        for (slug, result) in results {
            match result {
                Ok(entry) => {
                    snapshot.entries.insert(slug, entry);
                }
                Err(e) => {
                    warn!(plugin = %slug, error = %e, "Directory fetch failed");
                    if let Some(prior_entry) = prior.as_ref().and_then(|p| p.get(&slug)) {
                        snapshot.entries.insert(slug, prior_entry.clone());
                    }
                }
            }
        }

        if let Err(e) = self.store.set(Slot::Recommended, &snapshot) {
            warn!(error = %e, "Recommended snapshot write failed, serving unpersisted result");
        }

        debug!(entries = snapshot.len(), "Recommended snapshot committed");
        snapshot
    }

    /// Force the next `snapshot` call to refresh.
    pub fn invalidate(&self) -> Result<(), CatalogError> {
        self.store.invalidate(Slot::Recommended)
    }
}
