//! Mock local plugin inspection for testing.

use std::collections::HashSet;

use crate::host::{InstalledPlugin, LocalPlugins};

/// Mock implementation of the [`LocalPlugins`] trait.
pub struct MockLocalPlugins {
    present: HashSet<String>,
    installed: Vec<InstalledPlugin>,
}

impl MockLocalPlugins {
    /// Plugins whose file is present on disk, without version data.
    pub fn with_plugins(slugs: &[&str]) -> Self {
        Self {
            present: slugs.iter().map(|s| s.to_string()).collect(),
            installed: Vec::new(),
        }
    }

    /// Plugins present on disk with name and version data.
    pub fn with_installed(plugins: &[(&str, &str)]) -> Self {
        Self {
            present: plugins.iter().map(|(slug, _)| slug.to_string()).collect(),
            installed: plugins
                .iter()
                .map(|(slug, version)| InstalledPlugin {
                    slug: slug.to_string(),
                    file: format!("{}/plugin.toml", slug),
                    name: slug.to_string(),
                    version: version.to_string(),
                })
                .collect(),
        }
    }
}

impl LocalPlugins for MockLocalPlugins {
    fn plugin_file(&self, slug: &str) -> Option<String> {
        self.present
            .contains(slug)
            .then(|| format!("{}/plugin.toml", slug))
    }

    fn installed(&self) -> Vec<InstalledPlugin> {
        self.installed.clone()
    }
}
