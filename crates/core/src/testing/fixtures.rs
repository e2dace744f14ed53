//! Fixture builders shared across tests.

use std::collections::BTreeMap;

use crate::catalog::{CatalogEntry, IconSet};
use crate::config::{ProductConfig, RecommendedConfig};
use crate::merge::UpdateRecord;
use crate::normalize::{slugify, ASSET_BASE, CATALOG_ADDED_DATE};
use crate::remote::RawPluginPayload;

/// A complete raw payload, as the catalog service would return it.
pub fn raw_payload(title: &str, version: &str) -> RawPluginPayload {
    RawPluginPayload {
        version: Some(version.to_string()),
        title: Some(title.to_string()),
        sections: Some(
            r#"{"description": "Backs up and restores every part of a site.", "changelog": "Fixes and improvements."}"#
                .to_string(),
        ),
        tags: Some(r#"["backup", "restore", "migration"]"#.to_string()),
        release_date: Some("2024-06-15".to_string()),
        siteurl: Some("https://plugsync.io/backup".to_string()),
        banners: Some(
            r#"{"low": "https://repo.plugsync.io/assets/banner-772x250.png", "high": "https://repo.plugsync.io/assets/banner-1544x500.png"}"#
                .to_string(),
        ),
        asset_id: Some("4021".to_string()),
        tested_host_version: Some("6.4".to_string()),
    }
}

/// A product config with sensible defaults.
pub fn product(key: &str, installed_version: Option<&str>) -> ProductConfig {
    ProductConfig {
        key: key.to_string(),
        local_file: format!("{}/plugin.toml", key),
        installed_version: installed_version.map(|v| v.to_string()),
        priority: None,
        hide_premium: false,
        author: "PlugSync.io".to_string(),
    }
}

/// A recommended-plugin config.
pub fn recommended(slug: &str, requires: Option<&str>) -> RecommendedConfig {
    RecommendedConfig {
        slug: slug.to_string(),
        requires: requires.map(|r| r.to_string()),
    }
}

/// A normalized catalog entry, as a refresh would produce it.
pub fn catalog_entry(name: &str, version: &str) -> CatalogEntry {
    let slug = slugify(name);
    let mut sections = BTreeMap::new();
    sections.insert(
        "description".to_string(),
        "Backs up and restores every part of a site.".to_string(),
    );

    CatalogEntry {
        name: name.to_string(),
        new_version: version.to_string(),
        tags: ["backup", "restore"].iter().map(|t| t.to_string()).collect(),
        sections,
        short_description: "Backs up and restores every part of a site.".to_string(),
        author: format!(
            "<a href=\"https://plugsync.io/{}\" target=\"_blank\">PlugSync.io</a>",
            slug
        ),
        icons: IconSet {
            one_x: format!("{}/icon-{}-128x128.png", ASSET_BASE, slug),
            two_x: format!("{}/icon-{}-256x256.png", ASSET_BASE, slug),
            svg: format!("{}/icon-{}-128x128.svg", ASSET_BASE, slug),
        },
        banners: BTreeMap::new(),
        last_updated: "2024-06-15".to_string(),
        added: CATALOG_ADDED_DATE.to_string(),
        download_link: format!(
            "https://api.plugsync.io/api/open/getAsset?key=abc123&id={}&installed_plugin_version=&installed_host_version=6.4.2",
            slug
        ),
        url: format!("https://plugsync.io/{}", slug),
        tested_host_version: Some("6.4".to_string()),
        slug,
    }
}

/// An update record for registry tests.
pub fn update_record(slug: &str, version: &str) -> UpdateRecord {
    let entry = catalog_entry(slug, version);
    UpdateRecord {
        plugin_file: format!("{}/plugin.toml", slug),
        slug: entry.slug,
        new_version: entry.new_version,
        url: entry.url,
        package: entry.download_link,
        tested: entry.tested_host_version,
    }
}
