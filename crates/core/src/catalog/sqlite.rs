//! SQLite-backed snapshot store implementation.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{CatalogError, CatalogSnapshot, SnapshotStore, Slot};

/// SQLite-backed snapshot store.
///
/// One row per slot; the snapshot travels as serialized JSON next to its
/// RFC 3339 fetch timestamp. `set` is a single upsert, so readers observe
/// either the old snapshot or the new one, never a mix.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
}

impl SqliteSnapshotStore {
    /// Open (or create) the store at the given database path.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Read {
            slot: Slot::Primary,
            message: e.to_string(),
        })?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory().map_err(|e| CatalogError::Read {
            slot: Slot::Primary,
            message: e.to_string(),
        })?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per well-known cache slot
            CREATE TABLE IF NOT EXISTS snapshot_slots (
                slot TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| CatalogError::Read {
            slot: Slot::Primary,
            message: e.to_string(),
        })?;

        Ok(())
    }

    fn read_slot(&self, slot: Slot) -> Result<Option<CatalogSnapshot>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT payload, fetched_at FROM snapshot_slots WHERE slot = ?",
                params![slot.name()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                _ => Err(CatalogError::Read {
                    slot,
                    message: e.to_string(),
                }),
            })?;

        let Some((payload, fetched_at_str)) = row else {
            return Ok(None);
        };

        let mut snapshot: CatalogSnapshot =
            serde_json::from_str(&payload).map_err(|e| CatalogError::Read {
                slot,
                message: format!("corrupt snapshot payload: {}", e),
            })?;

        // The column is authoritative for freshness checks
        snapshot.fetched_at = DateTime::parse_from_rfc3339(&fetched_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CatalogError::Read {
                slot,
                message: format!("corrupt fetched_at: {}", e),
            })?;

        Ok(Some(snapshot))
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn get(&self, slot: Slot, ttl: Duration) -> Result<Option<CatalogSnapshot>, CatalogError> {
        match self.read_slot(slot)? {
            Some(snapshot) if snapshot.is_fresh(ttl, Utc::now()) => Ok(Some(snapshot)),
            _ => Ok(None),
        }
    }

    fn peek(&self, slot: Slot) -> Result<Option<CatalogSnapshot>, CatalogError> {
        self.read_slot(slot)
    }

    fn set(&self, slot: Slot, snapshot: &CatalogSnapshot) -> Result<(), CatalogError> {
        let payload = serde_json::to_string(snapshot).map_err(|e| CatalogError::Write {
            slot,
            message: format!("serialize snapshot: {}", e),
        })?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO snapshot_slots (slot, payload, fetched_at) VALUES (?, ?, ?)
             ON CONFLICT(slot) DO UPDATE SET
                payload = excluded.payload,
                fetched_at = excluded.fetched_at",
            params![
                slot.name(),
                &payload,
                snapshot.fetched_at.to_rfc3339(),
            ],
        )
        .map_err(|e| CatalogError::Write {
            slot,
            message: e.to_string(),
        })?;

        Ok(())
    }

    fn invalidate(&self, slot: Slot) -> Result<(), CatalogError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM snapshot_slots WHERE slot = ?",
            params![slot.name()],
        )
        .map_err(|e| CatalogError::Write {
            slot,
            message: e.to_string(),
        })?;

        Ok(())
    }
}
