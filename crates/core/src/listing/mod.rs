//! Human-facing listing assembly.
//!
//! Ordering and recommendation merging apply only to the listing path the
//! admin panel renders from; update detection never goes through here.

use crate::catalog::{CatalogEntry, CatalogSnapshot};
use crate::config::{ProductConfig, RecommendedConfig};
use crate::host::LocalPlugins;

/// Priority used when a product has none configured, and for every entry
/// from the secondary recommendation source.
pub const DEFAULT_PRIORITY: u16 = 99;

/// Stable-sort entries ascending by configured priority.
///
/// Equal priorities preserve relative input order; callers rely on that,
/// it is not an optimization.
pub fn order_by_priority(
    mut entries: Vec<CatalogEntry>,
    products: &[ProductConfig],
) -> Vec<CatalogEntry> {
    entries.sort_by_key(|entry| {
        products
            .iter()
            .find(|p| p.key == entry.slug)
            .and_then(|p| p.priority)
            .unwrap_or(DEFAULT_PRIORITY)
    });
    entries
}

/// Append the secondary recommendation snapshot to the primary list, then
/// drop any entry whose configured prerequisite plugin file is absent
/// locally.
pub fn merge_recommended(
    mut primary: Vec<CatalogEntry>,
    secondary: Option<&CatalogSnapshot>,
    recommended: &[RecommendedConfig],
    local: &dyn LocalPlugins,
) -> Vec<CatalogEntry> {
    if let Some(snapshot) = secondary {
        primary.extend(snapshot.entries.values().cloned());
    }

    primary.retain(|entry| {
        match recommended
            .iter()
            .find(|r| r.slug == entry.slug)
            .and_then(|r| r.requires.as_deref())
        {
            Some(requirement) => local.plugin_file(requirement).is_some(),
            None => true,
        }
    });

    primary
}
