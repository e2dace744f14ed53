//! HTTP implementation of the directory client.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::DirectoryClient;
use crate::catalog::{CatalogEntry, IconSet};
use crate::normalize::slugify;
use crate::remote::FetchError;

/// reqwest-based directory client.
pub struct HttpDirectoryClient {
    client: Client,
    base_url: String,
}

impl HttpDirectoryClient {
    /// Create a new client for the given directory base URL.
    pub fn new(base_url: &str, timeout_secs: u32) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs as u64))
            .build()
            .map_err(|e| FetchError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn info_url(&self, slug: &str) -> String {
        format!(
            "{}/plugins/info/{}",
            self.base_url,
            urlencoding::encode(slug)
        )
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn plugin_information(&self, slug: &str) -> Result<CatalogEntry, FetchError> {
        let url = self.info_url(slug);
        debug!(plugin = slug, "Fetching directory plugin information");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::ConnectionFailed(e.to_string())
            } else {
                FetchError::MalformedBody(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let info: DirectoryInfo = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedBody(e.to_string()))?;

        Ok(info.into())
    }
}

/// Directory wire record. Unlike the catalog service, the directory returns
/// structured JSON directly; only the fields the listing needs are kept.
#[derive(Debug, Deserialize)]
struct DirectoryInfo {
    name: String,
    version: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    sections: BTreeMap<String, String>,
    #[serde(default)]
    icons: DirectoryIcons,
    #[serde(default)]
    banners: BTreeMap<String, String>,
    #[serde(default)]
    last_updated: String,
    #[serde(default)]
    added: String,
    #[serde(default)]
    homepage: String,
    #[serde(default)]
    download_link: String,
}

#[derive(Debug, Default, Deserialize)]
struct DirectoryIcons {
    #[serde(rename = "1x", default)]
    one_x: String,
    #[serde(rename = "2x", default)]
    two_x: String,
    #[serde(default)]
    svg: String,
}

impl From<DirectoryInfo> for CatalogEntry {
    fn from(info: DirectoryInfo) -> Self {
        let tags: BTreeSet<String> = info.tags.into_iter().map(|t| t.to_lowercase()).collect();
        Self {
            slug: slugify(&info.name),
            name: info.name,
            new_version: info.version,
            tags,
            sections: info.sections,
            short_description: info.short_description,
            author: info.author,
            icons: IconSet {
                one_x: info.icons.one_x,
                two_x: info.icons.two_x,
                svg: info.icons.svg,
            },
            banners: info.banners,
            last_updated: info.last_updated,
            added: info.added,
            download_link: info.download_link,
            url: info.homepage,
            tested_host_version: None,
        }
    }
}
