//! Refresh lifecycle integration tests.
//!
//! These tests exercise the complete fetch -> normalize -> cache -> merge
//! cycle against the durable store: freshness, failure retention, redundant
//! concurrent refreshes and the update-registry reconciliation.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use plugsync_core::{
    merge,
    testing::{fixtures, MockCatalogClient, MockLocalPlugins},
    CatalogClient, CatalogConfig, CatalogSync, Event, EventBus, SeenVersions, Slot, SnapshotStore,
    SqliteSeenVersions, SqliteSnapshotStore, UpdateChecker, UpdateRegistry,
};

/// Test helper bundling the engine with its durable store.
struct TestHarness {
    sync: CatalogSync,
    client: Arc<MockCatalogClient>,
    store: Arc<SqliteSnapshotStore>,
    config: CatalogConfig,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(product_keys: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("plugsync.db");

        let store =
            Arc::new(SqliteSnapshotStore::new(&db_path).expect("Failed to create snapshot store"));
        let client = Arc::new(MockCatalogClient::new());
        let config = Self::config(product_keys);

        let sync = CatalogSync::new(
            Arc::clone(&client) as Arc<dyn CatalogClient>,
            Arc::clone(&store) as Arc<dyn SnapshotStore>,
            config.clone(),
        );

        Self {
            sync,
            client,
            store,
            config,
            _temp_dir: temp_dir,
        }
    }

    fn config(product_keys: &[&str]) -> CatalogConfig {
        let mut toml = String::from(
            r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "abc123"
host_version = "6.4.2"
"#,
        );
        for key in product_keys {
            toml.push_str(&format!(
                r#"
[[catalog.products]]
key = "{key}"
local_file = "{key}/plugin.toml"
installed_version = "1.0.0"
"#
            ));
        }
        plugsync_core::load_config_from_str(&toml).unwrap().catalog
    }
}

#[tokio::test]
async fn test_refresh_then_merge_produces_update() {
    let harness = TestHarness::new(&["plugsync-backup"]);
    harness.client.set_payload(
        "plugsync-backup",
        fixtures::raw_payload("PlugSync Backup", "1.1.0"),
    );

    let snapshot = harness.sync.snapshot().await;
    assert_eq!(snapshot.len(), 1);

    let local = MockLocalPlugins::with_plugins(&["plugsync-backup"]);
    let registry = merge(
        &snapshot,
        &harness.config.products,
        UpdateRegistry::default(),
        &local,
    );

    let record = registry
        .response
        .get("plugsync-backup/plugin.toml")
        .expect("catalog update should surface in the response bucket");
    assert_eq!(record.new_version, "1.1.0");
    assert_eq!(
        record.package,
        snapshot.get("plugsync-backup").unwrap().download_link
    );
}

#[tokio::test]
async fn test_retention_survives_process_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("plugsync.db");
    let config = TestHarness::config(&["plugsync-backup"]);

    // First process run: successful refresh
    {
        let store = Arc::new(SqliteSnapshotStore::new(&db_path).unwrap());
        let client = Arc::new(MockCatalogClient::new());
        client.set_payload(
            "plugsync-backup",
            fixtures::raw_payload("PlugSync Backup", "1.1.0"),
        );
        let sync = CatalogSync::new(
            client as Arc<dyn CatalogClient>,
            store as Arc<dyn SnapshotStore>,
            config.clone(),
        );
        sync.refresh().await;
    }

    // Second process run: the remote is down, the prior entry survives
    let store = Arc::new(SqliteSnapshotStore::new(&db_path).unwrap());
    let client = Arc::new(MockCatalogClient::new());
    client.set_error(
        "plugsync-backup",
        plugsync_core::FetchError::ConnectionFailed("remote down".to_string()),
    );
    let sync = CatalogSync::new(
        client as Arc<dyn CatalogClient>,
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        config,
    );

    let outcome = sync.refresh().await;
    assert_eq!(outcome.retained, 1);
    assert_eq!(
        outcome.snapshot.get("plugsync-backup").unwrap().new_version,
        "1.1.0"
    );

    // And the committed snapshot holds the retained entry
    let stored = store.peek(Slot::Primary).unwrap().unwrap();
    assert_eq!(stored.get("plugsync-backup").unwrap().new_version, "1.1.0");
}

#[tokio::test]
async fn test_concurrent_snapshot_requests_are_idempotent() {
    let harness = TestHarness::new(&["plugsync-backup", "plugsync-seo"]);
    harness.client.set_payload(
        "plugsync-backup",
        fixtures::raw_payload("PlugSync Backup", "1.1.0"),
    );
    harness.client.set_payload(
        "plugsync-seo",
        fixtures::raw_payload("PlugSync SEO", "2.0.0"),
    );

    // Two admin tabs load at once, both miss the cache
    let (first, second) = tokio::join!(harness.sync.snapshot(), harness.sync.snapshot());

    // Same deterministic result either way, and the store holds a full
    // snapshot regardless of which write landed last
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(
        first.get("plugsync-backup").unwrap(),
        second.get("plugsync-backup").unwrap()
    );

    let stored = harness.store.peek(Slot::Primary).unwrap().unwrap();
    assert_eq!(stored.len(), 2);

    // A third request now prefers the freshly written snapshot
    let fetches_before = harness.client.fetch_count();
    harness.sync.snapshot().await;
    assert_eq!(harness.client.fetch_count(), fetches_before);
}

#[tokio::test]
async fn test_plugin_update_event_invalidates_cache() {
    let harness = TestHarness::new(&["plugsync-backup"]);
    harness.client.set_payload(
        "plugsync-backup",
        fixtures::raw_payload("PlugSync Backup", "1.1.0"),
    );

    // Wire the bus the way the server does: plugin updates flush the slot
    let events = Arc::new(EventBus::new());
    let store_for_events = Arc::clone(&harness.store);
    events.subscribe(move |event| {
        if matches!(event, Event::PluginsUpdated) {
            let _ = store_for_events.invalidate(Slot::Primary);
        }
    });

    harness.sync.snapshot().await;
    assert_eq!(harness.client.fetch_count(), 1);

    // A plugin lands on disk; the checker notices and fires
    let seen = Arc::new(SqliteSeenVersions::in_memory().unwrap());
    seen.record("plugsync-backup", "1.0.0").unwrap();
    let checker = UpdateChecker::new(
        Arc::clone(&seen) as Arc<dyn SeenVersions>,
        Arc::clone(&events),
        "plugsync-",
    );
    let local = MockLocalPlugins::with_installed(&[("plugsync-backup", "1.1.0")]);
    let updated = checker.run(&local).unwrap();
    assert_eq!(updated.len(), 1);

    // The invalidated slot forces the next snapshot to refetch
    harness.sync.snapshot().await;
    assert_eq!(harness.client.fetch_count(), 2);
}

#[tokio::test]
async fn test_empty_catalog_is_a_valid_terminal_state() {
    let harness = TestHarness::new(&["plugsync-backup"]);
    harness.client.set_error(
        "plugsync-backup",
        plugsync_core::FetchError::Status {
            status: 503,
            body: "maintenance".to_string(),
        },
    );

    let snapshot = harness.sync.snapshot().await;
    assert!(snapshot.is_empty());

    // Merging an empty snapshot touches nothing
    let local = MockLocalPlugins::with_plugins(&["plugsync-backup"]);
    let registry = merge(
        &snapshot,
        &harness.config.products,
        UpdateRegistry::with_no_update_bucket(),
        &local,
    );
    assert!(registry.response.is_empty());
    assert!(registry.no_update.unwrap().is_empty());
}

#[tokio::test]
async fn test_snapshot_expiry_triggers_refetch() {
    let harness = TestHarness::new(&["plugsync-backup"]);
    harness.client.set_payload(
        "plugsync-backup",
        fixtures::raw_payload("PlugSync Backup", "1.1.0"),
    );

    harness.sync.snapshot().await;
    assert_eq!(harness.client.fetch_count(), 1);

    // Age the stored snapshot past the 8h ttl
    let mut stored = harness.store.peek(Slot::Primary).unwrap().unwrap();
    stored.fetched_at = chrono::Utc::now() - chrono::Duration::hours(9);
    harness.store.set(Slot::Primary, &stored).unwrap();

    let snapshot = harness.sync.snapshot().await;
    assert_eq!(harness.client.fetch_count(), 2);
    assert_eq!(snapshot.len(), 1);

    // The fresh get path also works after re-commit
    assert!(harness
        .store
        .get(Slot::Primary, Duration::from_secs(60))
        .unwrap()
        .is_some());
}
