//! Local plugin inspection.
//!
//! The host CMS installs plugins under a single directory, one subdirectory
//! per plugin with a `plugin.toml` manifest. This module answers two
//! questions for the engine: "is this plugin actually installed" and "what
//! version is on disk".

use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::config::ProductConfig;

/// A plugin found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub slug: String,
    /// Local plugin file identifier, relative to the plugins directory.
    pub file: String,
    pub name: String,
    pub version: String,
}

/// Trait for local plugin presence and version checks.
pub trait LocalPlugins: Send + Sync {
    /// Return the plugin file identifier for `slug` when its plugin is
    /// present on disk.
    fn plugin_file(&self, slug: &str) -> Option<String>;

    /// Enumerate plugins present on disk.
    fn installed(&self) -> Vec<InstalledPlugin>;
}

/// Plugin manifest, the `plugin.toml` next to each installed plugin.
#[derive(Debug, Deserialize)]
struct PluginManifest {
    name: String,
    version: String,
}

/// Filesystem-backed plugin inspection.
pub struct FsLocalPlugins {
    plugins_dir: PathBuf,
}

impl FsLocalPlugins {
    pub fn new(plugins_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugins_dir: plugins_dir.into(),
        }
    }

    fn manifest_path(&self, slug: &str) -> PathBuf {
        self.plugins_dir.join(slug).join("plugin.toml")
    }

    fn read_manifest(&self, slug: &str) -> Option<PluginManifest> {
        let path = self.manifest_path(slug);
        let contents = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&contents) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!(slug = slug, error = %e, "Unreadable plugin manifest, treating as not installed");
                None
            }
        }
    }
}

impl LocalPlugins for FsLocalPlugins {
    fn plugin_file(&self, slug: &str) -> Option<String> {
        if self.manifest_path(slug).is_file() {
            Some(format!("{}/plugin.toml", slug))
        } else {
            None
        }
    }

    fn installed(&self) -> Vec<InstalledPlugin> {
        let entries = match std::fs::read_dir(&self.plugins_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut plugins = Vec::new();
        for entry in entries.flatten() {
            let Ok(slug) = entry.file_name().into_string() else {
                continue;
            };
            if let Some(manifest) = self.read_manifest(&slug) {
                plugins.push(InstalledPlugin {
                    file: format!("{}/plugin.toml", slug),
                    slug,
                    name: manifest.name,
                    version: manifest.version,
                });
            }
        }

        plugins.sort_by(|a, b| a.slug.cmp(&b.slug));
        plugins
    }
}

/// Fill in each product's installed version from disk.
///
/// Config-supplied versions win; only products without one are hydrated.
/// Products whose plugin is absent keep `None`.
pub fn hydrate_installed_versions(products: &mut [ProductConfig], local: &dyn LocalPlugins) {
    let installed = local.installed();
    for product in products.iter_mut() {
        if product.installed_version.is_some() {
            continue;
        }
        if let Some(plugin) = installed.iter().find(|p| p.slug == product.key) {
            product.installed_version = Some(plugin.version.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_plugin(dir: &std::path::Path, slug: &str, name: &str, version: &str) {
        let plugin_dir = dir.join(slug);
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(
            plugin_dir.join("plugin.toml"),
            format!("name = \"{}\"\nversion = \"{}\"\n", name, version),
        )
        .unwrap();
    }

    #[test]
    fn test_plugin_file_present() {
        let dir = tempfile::tempdir().unwrap();
        write_plugin(dir.path(), "plugsync-backup", "PlugSync Backup", "1.2.0");

        let local = FsLocalPlugins::new(dir.path());
        assert_eq!(
            local.plugin_file("plugsync-backup").as_deref(),
            Some("plugsync-backup/plugin.toml")
        );
        assert!(local.plugin_file("plugsync-seo").is_none());
    }

    #[test]
    fn test_installed_enumerates_manifests() {
        let dir = tempfile::tempdir().unwrap();
        write_plugin(dir.path(), "plugsync-backup", "PlugSync Backup", "1.2.0");
        write_plugin(dir.path(), "formcraft", "FormCraft", "3.1.4");
        // A directory without a manifest is not a plugin
        fs::create_dir_all(dir.path().join("not-a-plugin")).unwrap();

        let local = FsLocalPlugins::new(dir.path());
        let installed = local.installed();
        assert_eq!(installed.len(), 2);
        assert_eq!(installed[0].slug, "formcraft");
        assert_eq!(installed[1].slug, "plugsync-backup");
        assert_eq!(installed[1].version, "1.2.0");
    }

    #[test]
    fn test_broken_manifest_is_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("broken");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join("plugin.toml"), "not valid toml [[[").unwrap();

        let local = FsLocalPlugins::new(dir.path());
        assert!(local.installed().is_empty());
        // Presence check only looks for the file
        assert!(local.plugin_file("broken").is_some());
    }

    #[test]
    fn test_missing_plugins_dir_is_empty() {
        let local = FsLocalPlugins::new("/nonexistent/plugins");
        assert!(local.installed().is_empty());
        assert!(local.plugin_file("anything").is_none());
    }

    #[test]
    fn test_hydrate_installed_versions() {
        let dir = tempfile::tempdir().unwrap();
        write_plugin(dir.path(), "plugsync-backup", "PlugSync Backup", "1.2.0");
        let local = FsLocalPlugins::new(dir.path());

        let mut products = vec![
            ProductConfig {
                key: "plugsync-backup".to_string(),
                local_file: "plugsync-backup/plugin.toml".to_string(),
                installed_version: None,
                priority: None,
                hide_premium: false,
                author: "PlugSync.io".to_string(),
            },
            ProductConfig {
                key: "plugsync-seo".to_string(),
                local_file: "plugsync-seo/plugin.toml".to_string(),
                installed_version: Some("9.9.9".to_string()),
                priority: None,
                hide_premium: false,
                author: "PlugSync.io".to_string(),
            },
        ];

        hydrate_installed_versions(&mut products, &local);

        assert_eq!(products[0].installed_version.as_deref(), Some("1.2.0"));
        // Config-supplied version wins
        assert_eq!(products[1].installed_version.as_deref(), Some("9.9.9"));
    }
}
