//! Wire types for the remote catalog service.

use serde::{Deserialize, Serialize};

use crate::config::{CatalogConfig, ProductConfig};

/// Parameters for one `getPluginVersion` call.
#[derive(Debug, Clone, Serialize)]
pub struct VersionRequest {
    /// Product key.
    pub key: String,
    /// Plugin release channel.
    pub channel: String,
    /// Theme release channel.
    pub theme_channel: String,
    /// Installed version of this product, if any.
    pub installed_version: Option<String>,
    /// Version of the host CMS.
    pub host_version: String,
}

impl VersionRequest {
    /// Build a request for one configured product.
    pub fn for_product(catalog: &CatalogConfig, product: &ProductConfig) -> Self {
        Self {
            key: product.key.clone(),
            channel: catalog.release_channel.plugins.clone(),
            theme_channel: catalog.release_channel.themes.clone(),
            installed_version: product.installed_version.clone(),
            host_version: catalog.host_version.clone(),
        }
    }

    /// Flat key-value parameter set for the wire.
    ///
    /// The installed-version parameter name embeds the product key
    /// (`installed_<key>_version`), as the service expects.
    pub fn params(&self) -> Vec<(String, String)> {
        vec![
            ("key".to_string(), self.key.clone()),
            ("channel".to_string(), self.channel.clone()),
            ("theme_channel".to_string(), self.theme_channel.clone()),
            (
                format!("installed_{}_version", self.key),
                self.installed_version.clone().unwrap_or_default(),
            ),
            (
                "installed_host_version".to_string(),
                self.host_version.clone(),
            ),
        ]
    }
}

/// Raw remote payload for one plugin, as returned by `getPluginVersion`.
///
/// Every field is optional on the wire; the normalizer decides which are
/// required and fails with a typed error when one is absent. No dynamic
/// property bags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPluginPayload {
    /// Latest published version.
    #[serde(default)]
    pub version: Option<String>,
    /// Display title; the slug is derived from this.
    #[serde(default)]
    pub title: Option<String>,
    /// JSON-encoded map of section name -> HTML, with noisy whitespace.
    #[serde(default)]
    pub sections: Option<String>,
    /// JSON-encoded array of tag strings.
    #[serde(default)]
    pub tags: Option<String>,
    /// Release date of `version`.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Product site URL.
    #[serde(default)]
    pub siteurl: Option<String>,
    /// JSON-encoded map of banner name -> URL.
    #[serde(default)]
    pub banners: Option<String>,
    /// Asset id used to build the download link.
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Highest host version this release was tested against.
    #[serde(default)]
    pub tested_host_version: Option<String>,
}

/// Remote response envelope: `{"result": {"data": {...}}}`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub result: ApiResult,
}

#[derive(Debug, Deserialize)]
pub struct ApiResult {
    pub data: RawPluginPayload,
}
