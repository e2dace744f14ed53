use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub directory: Option<DirectoryConfig>,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("plugsync.db")
}

/// Remote catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Base URL of the remote catalog service (e.g. "https://api.plugsync.io")
    pub api_base: String,
    /// Account access key, embedded in asset download links
    pub access_key: String,
    /// Version of the host CMS this install runs on
    pub host_version: String,
    /// Release channels reported to the catalog service
    #[serde(default)]
    pub release_channel: ReleaseChannel,
    /// Snapshot time-to-live in seconds (default: 8 hours)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Catalog products this install tracks
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Release channels for plugins and themes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReleaseChannel {
    #[serde(default = "default_channel")]
    pub plugins: String,
    #[serde(default = "default_channel")]
    pub themes: String,
}

impl Default for ReleaseChannel {
    fn default() -> Self {
        Self {
            plugins: default_channel(),
            themes: default_channel(),
        }
    }
}

fn default_channel() -> String {
    "stable".to_string()
}

fn default_ttl_secs() -> u64 {
    8 * 60 * 60
}

fn default_timeout() -> u32 {
    30
}

/// One catalog product, admin-supplied and immutable per process run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProductConfig {
    /// Product key, also the slug the snapshot is keyed by
    pub key: String,
    /// Local plugin file identifier (e.g. "plugsync-backup/plugin.toml")
    pub local_file: String,
    /// Currently installed version; None when the plugin is not installed
    #[serde(default)]
    pub installed_version: Option<String>,
    /// Listing priority; lower sorts first, absent falls back to 99
    #[serde(default)]
    pub priority: Option<u16>,
    /// Hide premium upsell info on the listing for this product
    #[serde(default)]
    pub hide_premium: bool,
    /// Author name used when building the author label
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_author() -> String {
    "PlugSync.io".to_string()
}

/// Secondary recommendation source configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Base URL of the host-ecosystem plugin directory
    pub base_url: String,
    /// Snapshot time-to-live in seconds (default: 8 hours)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Recommended plugins to pull from the directory
    #[serde(default)]
    pub recommended: Vec<RecommendedConfig>,
}

/// One recommended directory plugin
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendedConfig {
    pub slug: String,
    /// Slug whose local plugin file must be present for this
    /// recommendation to appear in the listing
    #[serde(default)]
    pub requires: Option<String>,
}

/// Local plugin inspection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    /// Directory the host CMS installs plugins into
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: PathBuf,
    /// Prefix identifying catalog-managed plugins for the update checker
    #[serde(default = "default_plugin_prefix")]
    pub plugin_prefix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugins_dir: default_plugins_dir(),
            plugin_prefix: default_plugin_prefix(),
        }
    }
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("plugins")
}

fn default_plugin_prefix() -> String {
    "plugsync-".to_string()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<SanitizedDirectoryConfig>,
    pub host: HostConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

/// Sanitized catalog config (access key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub api_base: String,
    pub access_key_configured: bool,
    pub host_version: String,
    pub ttl_secs: u64,
    pub products: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedDirectoryConfig {
    pub base_url: String,
    pub ttl_secs: u64,
    pub recommended: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                api_base: config.catalog.api_base.clone(),
                access_key_configured: !config.catalog.access_key.is_empty(),
                host_version: config.catalog.host_version.clone(),
                ttl_secs: config.catalog.ttl_secs,
                products: config
                    .catalog
                    .products
                    .iter()
                    .map(|p| p.key.clone())
                    .collect(),
            },
            directory: config.directory.as_ref().map(|d| SanitizedDirectoryConfig {
                base_url: d.base_url.clone(),
                ttl_secs: d.ttl_secs,
                recommended: d.recommended.iter().map(|r| r.slug.clone()).collect(),
            }),
            host: config.host.clone(),
            server: config.server.clone(),
            database: config.database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "abc123"
host_version = "6.4.2"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.api_base, "https://api.plugsync.io");
        assert_eq!(config.catalog.ttl_secs, 28_800);
        assert_eq!(config.catalog.release_channel.plugins, "stable");
        assert!(config.catalog.products.is_empty());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path.to_str().unwrap(), "plugsync.db");
    }

    #[test]
    fn test_deserialize_missing_catalog_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_products() {
        let toml = r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "abc123"
host_version = "6.4.2"

[[catalog.products]]
key = "plugsync-backup"
local_file = "plugsync-backup/plugin.toml"
installed_version = "1.2.0"
priority = 1

[[catalog.products]]
key = "plugsync-seo"
local_file = "plugsync-seo/plugin.toml"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.catalog.products.len(), 2);

        let backup = &config.catalog.products[0];
        assert_eq!(backup.key, "plugsync-backup");
        assert_eq!(backup.installed_version.as_deref(), Some("1.2.0"));
        assert_eq!(backup.priority, Some(1));
        assert!(!backup.hide_premium);
        assert_eq!(backup.author, "PlugSync.io");

        let seo = &config.catalog.products[1];
        assert!(seo.installed_version.is_none());
        assert!(seo.priority.is_none());
    }

    #[test]
    fn test_deserialize_directory_config() {
        let toml = r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "abc123"
host_version = "6.4.2"

[directory]
base_url = "https://directory.examplecms.org"

[[directory.recommended]]
slug = "formcraft"
requires = "formcraft"

[[directory.recommended]]
slug = "gallerypress"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let directory = config.directory.as_ref().unwrap();
        assert_eq!(directory.base_url, "https://directory.examplecms.org");
        assert_eq!(directory.ttl_secs, 28_800);
        assert_eq!(directory.recommended.len(), 2);
        assert_eq!(
            directory.recommended[0].requires.as_deref(),
            Some("formcraft")
        );
        assert!(directory.recommended[1].requires.is_none());
    }

    #[test]
    fn test_sanitized_config_hides_access_key() {
        let toml = r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "super-secret"
host_version = "6.4.2"

[[catalog.products]]
key = "plugsync-backup"
local_file = "plugsync-backup/plugin.toml"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.catalog.access_key_configured);
        assert_eq!(sanitized.catalog.products, vec!["plugsync-backup"]);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret"));
    }
}
