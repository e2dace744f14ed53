//! Plugin catalog cache - normalized remote metadata with a TTL.
//!
//! The catalog holds one snapshot per slot, swapped atomically on refresh.
//! Storage is durable across process restarts so every admin page load does
//! not pay for a full remote fetch.

mod sqlite;
mod types;

pub use sqlite::SqliteSnapshotStore;
pub use types::*;

use std::time::Duration;

/// Trait for durable snapshot storage.
pub trait SnapshotStore: Send + Sync {
    /// Return the slot's snapshot if it is younger than `ttl`, else `None`.
    fn get(&self, slot: Slot, ttl: Duration) -> Result<Option<CatalogSnapshot>, CatalogError>;

    /// Return the slot's snapshot regardless of age.
    ///
    /// Feeds the failure-retention policy: entries are never evicted by a
    /// failed refresh, only replaced by a successful one.
    fn peek(&self, slot: Slot) -> Result<Option<CatalogSnapshot>, CatalogError>;

    /// Atomically replace the slot's snapshot and its timestamp.
    fn set(&self, slot: Slot, snapshot: &CatalogSnapshot) -> Result<(), CatalogError>;

    /// Force the next `get` to miss regardless of age.
    fn invalidate(&self, slot: Slot) -> Result<(), CatalogError>;
}
