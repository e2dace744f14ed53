//! Payload normalization.
//!
//! Transforms one raw remote payload into the canonical [`CatalogEntry`]
//! shape: field renames, section parsing, description trimming, asset-URL
//! synthesis and download-URL construction. Pure and deterministic; no I/O.

mod text;

pub use text::{collapse_blank_lines, collapse_whitespace, decode_entities, slugify, strip_tags};

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::catalog::{CatalogEntry, IconSet};
use crate::config::{CatalogConfig, ProductConfig};
use crate::remote::RawPluginPayload;

/// Asset host serving icon images, keyed by slug with fixed file patterns.
pub const ASSET_BASE: &str = "https://repo.plugsync.io/assets";

/// Path of the asset-fetch endpoint under the API base.
pub const ASSET_ENDPOINT: &str = "/api/open/getAsset";

/// Catalog-wide added date. The remote never reports one; this fixed value
/// goes out for every entry and hosts expect it unchanged.
pub const CATALOG_ADDED_DATE: &str = "2015-03-19";

/// Maximum short-description length before the ellipsis marker.
pub const SHORT_DESCRIPTION_LIMIT: usize = 150;

/// Errors from normalizing one payload.
///
/// Callers treat these identically to fetch failures: the product falls
/// back to its prior cached entry for the cycle.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Payload for '{slug}' is missing required field '{field}'")]
    MissingField { slug: String, field: String },

    #[error("Payload for '{slug}' has malformed field '{field}': {message}")]
    MalformedField {
        slug: String,
        field: String,
        message: String,
    },
}

/// Normalize one raw payload into a catalog entry.
///
/// Step order matters: later steps read fields written by earlier ones
/// (the slug feeds the icon URLs, the parsed sections feed the short
/// description).
pub fn normalize(
    raw: &RawPluginPayload,
    product: &ProductConfig,
    catalog: &CatalogConfig,
) -> Result<CatalogEntry, NormalizeError> {
    // Version and name renames; slug is derived, never sent by the remote.
    let new_version = require(raw.version.as_deref(), &product.key, "version")?.to_string();
    let name = require(raw.title.as_deref(), &product.key, "title")?.to_string();
    let slug = slugify(&name);

    // Sections arrive as JSON with noisy whitespace; collapse before
    // parsing, then clean each section's text.
    let sections_raw = require(raw.sections.as_deref(), &slug, "sections")?;
    let collapsed = collapse_whitespace(sections_raw);
    let parsed: BTreeMap<String, String> =
        serde_json::from_str(&collapsed).map_err(|e| NormalizeError::MalformedField {
            slug: slug.clone(),
            field: "sections".to_string(),
            message: e.to_string(),
        })?;
    let sections: BTreeMap<String, String> = parsed
        .into_iter()
        .map(|(name, text)| (name, decode_entities(&collapse_blank_lines(&text))))
        .collect();

    // Tags, lowercase for comparability.
    let tags_raw = require(raw.tags.as_deref(), &slug, "tags")?;
    let tags: Vec<String> =
        serde_json::from_str(tags_raw).map_err(|e| NormalizeError::MalformedField {
            slug: slug.clone(),
            field: "tags".to_string(),
            message: e.to_string(),
        })?;
    let tags: BTreeSet<String> = tags.into_iter().map(|t| t.to_lowercase()).collect();

    // Short description comes from the description section.
    let description = sections
        .get("description")
        .ok_or_else(|| NormalizeError::MissingField {
            slug: slug.clone(),
            field: "sections.description".to_string(),
        })?;
    let short_description = strip_tags(&shorten_description(description));

    // The remote reports the release date; hosts call it last_updated.
    let last_updated = require(raw.release_date.as_deref(), &slug, "release_date")?.to_string();

    // Author label combines the product site URL with the configured
    // author name. An anchor in a data field is a host compatibility quirk.
    let site_url = require(raw.siteurl.as_deref(), &slug, "siteurl")?.to_string();
    let author = format!(
        "<a href=\"{}\" target=\"_blank\">{}</a>",
        site_url, product.author
    );

    // Banners are a JSON-encoded map on the wire.
    let banners_raw = require(raw.banners.as_deref(), &slug, "banners")?;
    let banners: BTreeMap<String, String> =
        serde_json::from_str(banners_raw).map_err(|e| NormalizeError::MalformedField {
            slug: slug.clone(),
            field: "banners".to_string(),
            message: e.to_string(),
        })?;

    // Icon URLs follow a fixed naming pattern on the asset host; the
    // payload never carries them.
    let icons = IconSet {
        one_x: format!("{}/icon-{}-128x128.png", ASSET_BASE, slug),
        two_x: format!("{}/icon-{}-256x256.png", ASSET_BASE, slug),
        svg: format!("{}/icon-{}-128x128.svg", ASSET_BASE, slug),
    };

    // Download link against the asset endpoint.
    let asset_id = require(raw.asset_id.as_deref(), &slug, "asset_id")?;
    let download_link = format!(
        "{}{}?key={}&id={}&installed_plugin_version={}&installed_host_version={}",
        catalog.api_base.trim_end_matches('/'),
        ASSET_ENDPOINT,
        urlencoding::encode(&catalog.access_key),
        urlencoding::encode(asset_id),
        urlencoding::encode(product.installed_version.as_deref().unwrap_or_default()),
        urlencoding::encode(&catalog.host_version),
    );

    Ok(CatalogEntry {
        slug,
        name,
        new_version,
        tags,
        sections,
        short_description,
        author,
        icons,
        banners,
        last_updated,
        // Constant added date, identical for every entry.
        added: CATALOG_ADDED_DATE.to_string(),
        download_link,
        // Hosts expect the site URL under `url`.
        url: site_url,
        tested_host_version: raw.tested_host_version.clone(),
    })
}

fn require<'a>(
    field: Option<&'a str>,
    slug: &str,
    name: &str,
) -> Result<&'a str, NormalizeError> {
    field.ok_or_else(|| NormalizeError::MissingField {
        slug: slug.to_string(),
        field: name.to_string(),
    })
}

/// Apply the short-description truncation rules.
///
/// Over the limit, cut to 150 chars and append an ellipsis; when the cut
/// does not land on a sentence end but a period falls within the final 20%
/// of the truncated text, cut at that period instead.
fn shorten_description(description: &str) -> String {
    let chars: Vec<char> = description.chars().collect();
    if chars.len() <= SHORT_DESCRIPTION_LIMIT {
        return description.to_string();
    }

    let truncated: String = chars[..SHORT_DESCRIPTION_LIMIT].iter().collect();
    let ends_with_period = truncated.ends_with('.');
    let last_period = truncated
        .chars()
        .rev()
        .position(|c| c == '.')
        .map(|from_end| SHORT_DESCRIPTION_LIMIT - 1 - from_end);

    match last_period {
        Some(pos) if !ends_with_period && pos + 1 > SHORT_DESCRIPTION_LIMIT * 4 / 5 => {
            chars[..=pos].iter().collect()
        }
        _ => format!("{}\u{2026}", truncated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;
    use crate::testing::fixtures;

    fn config() -> CatalogConfig {
        load_config_from_str(
            r#"
[catalog]
api_base = "https://api.plugsync.io"
access_key = "abc123"
host_version = "6.4.2"

[[catalog.products]]
key = "plugsync-backup"
local_file = "plugsync-backup/plugin.toml"
installed_version = "1.2.0"
"#,
        )
        .unwrap()
        .catalog
    }

    #[test]
    fn test_normalize_full_payload() {
        let catalog = config();
        let raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");

        let entry = normalize(&raw, &catalog.products[0], &catalog).unwrap();

        assert_eq!(entry.slug, "plugsync-backup");
        assert_eq!(entry.name, "PlugSync Backup");
        assert_eq!(entry.new_version, "1.3.0");
        assert_eq!(entry.last_updated, "2024-06-15");
        assert_eq!(entry.added, CATALOG_ADDED_DATE);
        assert_eq!(entry.url, "https://plugsync.io/backup");
        assert!(entry.tags.contains("backup"));
        assert_eq!(
            entry.author,
            "<a href=\"https://plugsync.io/backup\" target=\"_blank\">PlugSync.io</a>"
        );
        assert_eq!(
            entry.icons.one_x,
            "https://repo.plugsync.io/assets/icon-plugsync-backup-128x128.png"
        );
        assert_eq!(
            entry.icons.two_x,
            "https://repo.plugsync.io/assets/icon-plugsync-backup-256x256.png"
        );
        assert_eq!(
            entry.icons.svg,
            "https://repo.plugsync.io/assets/icon-plugsync-backup-128x128.svg"
        );
        assert_eq!(
            entry.download_link,
            "https://api.plugsync.io/api/open/getAsset?key=abc123&id=4021&installed_plugin_version=1.2.0&installed_host_version=6.4.2"
        );
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let catalog = config();
        let raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");

        let first = normalize(&raw, &catalog.products[0], &catalog).unwrap();
        let second = normalize(&raw, &catalog.products[0], &catalog).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_normalize_cleans_sections() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.sections = Some(
            "  {\n  \"description\": \"Backs   up &amp; restores.\",\n  \"changelog\": \"1.3.0\\n\\n\\nInitial.\" }  "
                .to_string(),
        );

        let entry = normalize(&raw, &catalog.products[0], &catalog).unwrap();
        assert_eq!(
            entry.sections.get("description").unwrap(),
            "Backs up & restores."
        );
        assert_eq!(entry.sections.get("changelog").unwrap(), "1.3.0\nInitial.");
    }

    #[test]
    fn test_normalize_lowercases_tags() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.tags = Some(r#"["Backup", "RESTORE"]"#.to_string());

        let entry = normalize(&raw, &catalog.products[0], &catalog).unwrap();
        assert!(entry.tags.contains("backup"));
        assert!(entry.tags.contains("restore"));
        assert_eq!(entry.tags.len(), 2);
    }

    #[test]
    fn test_normalize_missing_version_fails() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.version = None;

        let err = normalize(&raw, &catalog.products[0], &catalog).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingField { ref field, .. } if field == "version"
        ));
    }

    #[test]
    fn test_normalize_missing_description_section_fails() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.sections = Some(r#"{"changelog": "1.3.0"}"#.to_string());

        let err = normalize(&raw, &catalog.products[0], &catalog).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MissingField { ref field, .. } if field == "sections.description"
        ));
    }

    #[test]
    fn test_normalize_malformed_tags_fails() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.tags = Some("not json".to_string());

        let err = normalize(&raw, &catalog.products[0], &catalog).unwrap_err();
        assert!(matches!(
            err,
            NormalizeError::MalformedField { ref field, .. } if field == "tags"
        ));
    }

    #[test]
    fn test_short_description_under_limit_untouched() {
        let text = "Short and sweet.";
        assert_eq!(shorten_description(text), text);
    }

    #[test]
    fn test_short_description_truncates_with_ellipsis() {
        let text = "a".repeat(300);
        let short = shorten_description(&text);
        assert_eq!(short.chars().count(), SHORT_DESCRIPTION_LIMIT + 1);
        assert!(short.ends_with('\u{2026}'));
    }

    #[test]
    fn test_short_description_retruncates_at_late_period() {
        // Sentence end lands at char 140 of the truncated text - inside the
        // final 20%, so the cut moves back to the period.
        let text = format!("{}.{}", "b".repeat(139), "c".repeat(200));
        let short = shorten_description(&text);
        assert_eq!(short.chars().count(), 140);
        assert!(short.ends_with('.'));
    }

    #[test]
    fn test_short_description_ignores_early_period() {
        // Last period at char 50 is outside the final 20%; keep the ellipsis.
        let text = format!("{}.{}", "b".repeat(49), "c".repeat(300));
        let short = shorten_description(&text);
        assert!(short.ends_with('\u{2026}'));
        assert_eq!(short.chars().count(), SHORT_DESCRIPTION_LIMIT + 1);
    }

    #[test]
    fn test_short_description_strips_markup() {
        let catalog = config();
        let mut raw = fixtures::raw_payload("PlugSync Backup", "1.3.0");
        raw.sections = Some(
            r#"{"description": "<p>Backs up <strong>everything</strong>.</p>"}"#.to_string(),
        );

        let entry = normalize(&raw, &catalog.products[0], &catalog).unwrap();
        assert_eq!(entry.short_description, "Backs up everything.");
    }
}
