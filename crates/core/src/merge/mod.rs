//! Update-registry reconciliation.
//!
//! Merges the catalog snapshot into the host's native "plugin updates"
//! structure so catalog-sourced plugins surface exactly like native ones.
//! The host stays the single source of truth for plugins the snapshot does
//! not cover.

mod types;

pub use types::{UpdateRecord, UpdateRegistry};

use crate::catalog::CatalogSnapshot;
use crate::config::ProductConfig;
use crate::host::LocalPlugins;

/// Reconcile the snapshot against the host's update registry.
///
/// For each snapshot entry with a matching product config, an update record
/// lands in the `response` bucket when the installed version differs from
/// the catalog version and the plugin file is actually present on disk;
/// otherwise it lands in the `no_update` bucket, but only when the host
/// initialized that bucket. Entries with no matching config are ignored.
pub fn merge(
    snapshot: &CatalogSnapshot,
    products: &[ProductConfig],
    mut registry: UpdateRegistry,
    local: &dyn LocalPlugins,
) -> UpdateRegistry {
    for (key, entry) in &snapshot.entries {
        let Some(product) = products.iter().find(|p| &p.key == key) else {
            continue;
        };

        let mut record = UpdateRecord {
            plugin_file: product.local_file.clone(),
            slug: entry.slug.clone(),
            new_version: entry.new_version.clone(),
            url: entry.url.clone(),
            package: entry.download_link.clone(),
            tested: None,
        };

        let version_differs =
            product.installed_version.as_deref() != Some(entry.new_version.as_str());
        let file_present = local.plugin_file(&entry.slug).is_some();

        if version_differs && file_present {
            record.tested = entry.tested_host_version.clone();
            registry.response.insert(record.plugin_file.clone(), record);
        } else if let Some(no_update) = registry.no_update.as_mut() {
            no_update.insert(record.plugin_file.clone(), record);
        }
    }

    registry
}
