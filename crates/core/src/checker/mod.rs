//! Post-update detection for locally installed plugins.
//!
//! Compares the plugins on disk against a durable (slug, version) ledger.
//! A pair not yet in the ledger means the plugin is new or was just
//! updated: an event fires per plugin, plus one summary event that
//! subscribers typically use to invalidate the cache slots.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::debug;

use crate::events::{Event, EventBus};
use crate::host::{InstalledPlugin, LocalPlugins};

/// Errors from the version ledger.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Version ledger error: {0}")]
    Ledger(String),
}

/// Durable ledger of (slug, version) pairs already observed.
pub trait SeenVersions: Send + Sync {
    fn is_seen(&self, slug: &str, version: &str) -> Result<bool, CheckerError>;
    fn record(&self, slug: &str, version: &str) -> Result<(), CheckerError>;
}

/// SQLite-backed version ledger.
pub struct SqliteSeenVersions {
    conn: Mutex<Connection>,
}

impl SqliteSeenVersions {
    /// Open (or create) the ledger at the given database path.
    pub fn new(path: &Path) -> Result<Self, CheckerError> {
        let conn = Connection::open(path).map_err(|e| CheckerError::Ledger(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory ledger (useful for testing).
    pub fn in_memory() -> Result<Self, CheckerError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CheckerError::Ledger(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CheckerError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS plugin_versions_seen (
                slug TEXT NOT NULL,
                version TEXT NOT NULL,
                seen_at TEXT NOT NULL,
                PRIMARY KEY (slug, version)
            );
            "#,
        )
        .map_err(|e| CheckerError::Ledger(e.to_string()))?;

        Ok(())
    }
}

impl SeenVersions for SqliteSeenVersions {
    fn is_seen(&self, slug: &str, version: &str) -> Result<bool, CheckerError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT 1 FROM plugin_versions_seen WHERE slug = ? AND version = ?",
            params![slug, version],
            |_| Ok(true),
        )
        .map(|_| true)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(false),
            _ => Err(CheckerError::Ledger(e.to_string())),
        })
    }

    fn record(&self, slug: &str, version: &str) -> Result<(), CheckerError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO plugin_versions_seen (slug, version, seen_at) VALUES (?, ?, ?)",
            params![slug, version, Utc::now().to_rfc3339()],
        )
        .map_err(|e| CheckerError::Ledger(e.to_string()))?;

        Ok(())
    }
}

/// Detects newly installed or updated catalog-managed plugins.
pub struct UpdateChecker {
    seen: Arc<dyn SeenVersions>,
    events: Arc<EventBus>,
    plugin_prefix: String,
}

impl UpdateChecker {
    pub fn new(
        seen: Arc<dyn SeenVersions>,
        events: Arc<EventBus>,
        plugin_prefix: impl Into<String>,
    ) -> Self {
        Self {
            seen,
            events,
            plugin_prefix: plugin_prefix.into(),
        }
    }

    /// Scan local plugins and fire events for unseen (slug, version) pairs.
    ///
    /// Returns the plugins found new or updated this pass. Every observed
    /// pair is recorded, so each update fires exactly once.
    pub fn run(&self, local: &dyn LocalPlugins) -> Result<Vec<InstalledPlugin>, CheckerError> {
        let mut updated = Vec::new();

        for plugin in local.installed() {
            if !plugin.slug.starts_with(&self.plugin_prefix) {
                continue;
            }

            if !self.seen.is_seen(&plugin.slug, &plugin.version)? {
                debug!(
                    slug = %plugin.slug,
                    version = %plugin.version,
                    "Plugin new or updated"
                );
                self.events.emit(&Event::PluginUpdated {
                    slug: plugin.slug.clone(),
                    version: plugin.version.clone(),
                });
                updated.push(plugin.clone());
            }

            self.seen.record(&plugin.slug, &plugin.version)?;
        }

        if !updated.is_empty() {
            self.events.emit(&Event::PluginsUpdated);
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLocalPlugins;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn checker() -> (UpdateChecker, Arc<EventBus>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let events = Arc::new(EventBus::new());
        let per_plugin = Arc::new(AtomicUsize::new(0));
        let summaries = Arc::new(AtomicUsize::new(0));

        let per_plugin_clone = Arc::clone(&per_plugin);
        let summaries_clone = Arc::clone(&summaries);
        events.subscribe(move |event| match event {
            Event::PluginUpdated { .. } => {
                per_plugin_clone.fetch_add(1, Ordering::SeqCst);
            }
            Event::PluginsUpdated => {
                summaries_clone.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        });

        let checker = UpdateChecker::new(
            Arc::new(SqliteSeenVersions::in_memory().unwrap()),
            Arc::clone(&events),
            "plugsync-",
        );
        (checker, events, per_plugin, summaries)
    }

    #[test]
    fn test_first_run_fires_for_each_plugin() {
        let (checker, _events, per_plugin, summaries) = checker();
        let local = MockLocalPlugins::with_installed(&[
            ("plugsync-backup", "1.2.0"),
            ("plugsync-seo", "2.0.0"),
        ]);

        let updated = checker.run(&local).unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(per_plugin.load(Ordering::SeqCst), 2);
        assert_eq!(summaries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_second_run_is_quiet() {
        let (checker, _events, per_plugin, summaries) = checker();
        let local = MockLocalPlugins::with_installed(&[("plugsync-backup", "1.2.0")]);

        checker.run(&local).unwrap();
        let updated = checker.run(&local).unwrap();

        assert!(updated.is_empty());
        assert_eq!(per_plugin.load(Ordering::SeqCst), 1);
        assert_eq!(summaries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_version_bump_fires_again() {
        let (checker, _events, per_plugin, _summaries) = checker();

        let local = MockLocalPlugins::with_installed(&[("plugsync-backup", "1.2.0")]);
        checker.run(&local).unwrap();

        let local = MockLocalPlugins::with_installed(&[("plugsync-backup", "1.3.0")]);
        let updated = checker.run(&local).unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].version, "1.3.0");
        assert_eq!(per_plugin.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_foreign_plugins_are_ignored() {
        let (checker, _events, per_plugin, summaries) = checker();
        let local = MockLocalPlugins::with_installed(&[("formcraft", "3.1.4")]);

        let updated = checker.run(&local).unwrap();
        assert!(updated.is_empty());
        assert_eq!(per_plugin.load(Ordering::SeqCst), 0);
        assert_eq!(summaries.load(Ordering::SeqCst), 0);
    }
}
