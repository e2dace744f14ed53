//! Text helpers for payload normalization.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static BLANK_LINE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^[\r\n]*|[\r\n]+)[ \t]*[\r\n]+").unwrap());

static MARKUP_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Derive a URL-safe slug from a display name.
///
/// Lowercase, every run of non-alphanumeric characters becomes a single
/// hyphen, no leading or trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text.trim(), " ").into_owned()
}

/// Collapse runs of two-or-more newlines (with only blanks between them)
/// to single newlines, dropping leading newline runs.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_LINE_RUNS.replace_all(text, "\n").into_owned()
}

/// Strip all markup tags, leaving the text content.
pub fn strip_tags(text: &str) -> String {
    MARKUP_TAGS.replace_all(text, "").into_owned()
}

/// Decode the HTML entities the catalog service emits (named set with
/// quotes, plus numeric references). Unknown entities pass through as-is.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail.find(';') {
            // Entities are short; anything longer is not one
            Some(end) if end <= 9 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "hellip" => Some('\u{2026}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}
