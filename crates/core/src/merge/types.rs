//! Types for the host update registry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A host-facing update descriptor, derived per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    /// Local plugin file identifier, the registry key.
    pub plugin_file: String,
    pub slug: String,
    pub new_version: String,
    /// Plugin homepage.
    pub url: String,
    /// Download URL the host installs from.
    pub package: String,
    /// Highest host version the release was tested against; populated only
    /// for update-available records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested: Option<String>,
}

/// The host's native update registry: one bucket for plugins with an update
/// available, one for plugins known to be current.
///
/// The `no_update` bucket is optional on purpose: when the host never
/// initialized it, the merger must not fabricate it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRegistry {
    #[serde(default)]
    pub response: BTreeMap<String, UpdateRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_update: Option<BTreeMap<String, UpdateRecord>>,
}

impl UpdateRegistry {
    /// Registry with an initialized (empty) no-update bucket.
    pub fn with_no_update_bucket() -> Self {
        Self {
            response: BTreeMap::new(),
            no_update: Some(BTreeMap::new()),
        }
    }
}
