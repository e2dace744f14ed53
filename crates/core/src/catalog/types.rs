//! Types for the plugin catalog (normalized remote metadata cache).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Default snapshot time-to-live: 8 hours.
pub const DEFAULT_TTL_SECS: u64 = 8 * 60 * 60;

/// A normalized catalog record for one plugin.
///
/// Created fresh on every cache refresh and never mutated in place; a
/// refresh replaces the whole snapshot per product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// URL-safe identifier derived from `name`.
    pub slug: String,
    /// Display name, from the remote `title`.
    pub name: String,
    /// Latest published version.
    pub new_version: String,
    /// Search tags, lowercase-comparable.
    pub tags: BTreeSet<String>,
    /// Section name -> HTML text (description, changelog, faq, ...).
    pub sections: BTreeMap<String, String>,
    /// Plain-text description, at most 150 chars plus an ellipsis marker.
    pub short_description: String,
    /// Author label; an anchor combining the product site URL and the
    /// configured author name (kept for host compatibility).
    pub author: String,
    /// Synthesized icon URLs, not taken from the payload.
    pub icons: IconSet,
    /// Banner name -> URL.
    pub banners: BTreeMap<String, String>,
    /// Release date of `new_version`, as reported by the remote.
    pub last_updated: String,
    /// Constant catalog-wide added date (compatibility quirk).
    pub added: String,
    /// Asset-server download URL for `new_version`.
    pub download_link: String,
    /// Product site URL.
    pub url: String,
    /// Highest host version the release was tested against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_host_version: Option<String>,
}

/// Fixed-pattern icon URLs for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSet {
    #[serde(rename = "1x")]
    pub one_x: String,
    #[serde(rename = "2x")]
    pub two_x: String,
    pub svg: String,
}

/// One complete, atomically-swapped copy of the catalog.
///
/// Keyed by product key. Owned by the snapshot store; superseded wholesale
/// on refresh, never edited field-by-field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub entries: BTreeMap<String, CatalogEntry>,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Create an empty snapshot stamped `fetched_at`.
    pub fn new(fetched_at: DateTime<Utc>) -> Self {
        Self {
            entries: BTreeMap::new(),
            fetched_at,
        }
    }

    /// Whether this snapshot is still fresh at `now` for the given TTL.
    pub fn is_fresh(&self, ttl: std::time::Duration, now: DateTime<Utc>) -> bool {
        let ttl = Duration::from_std(ttl).unwrap_or(Duration::MAX);
        now.signed_duration_since(self.fetched_at) < ttl
    }

    pub fn get(&self, key: &str) -> Option<&CatalogEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The two well-known durable cache slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Primary catalog snapshot.
    Primary,
    /// Secondary recommendation snapshot.
    Recommended,
}

impl Slot {
    /// Stable storage key for this slot.
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Primary => "plugin_catalog",
            Slot::Recommended => "recommended_catalog",
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors from the durable snapshot store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the slot failed; callers treat this as a cache miss.
    #[error("Cache read failed for slot {slot}: {message}")]
    Read { slot: Slot, message: String },

    /// Writing the slot failed; the in-memory snapshot is still usable.
    #[error("Cache write failed for slot {slot}: {message}")]
    Write { slot: Slot, message: String },
}
