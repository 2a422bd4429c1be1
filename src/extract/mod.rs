// src/extract/mod.rs
//! Turning fetched payloads into candidate content items.
//!
//! Variant extractors (anchor scan, JSON listing) live in submodules; this
//! module owns the shared item type, the filtering helpers, and the text
//! normalization used on display titles.

pub mod html_links;
pub mod json_feed;

use thiserror::Error;

use crate::config::{Config, ExtractorVariant};
use crate::identity::identity;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed json listing: {0}")]
    Json(#[from] serde_json::Error),
}

/// One candidate content item within a single fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub title: String,
    /// Absolute URL, or the feed key for keyed sources without one.
    pub locator: String,
    /// Deduplication token, derived once at construction.
    pub token: String,
}

impl CandidateItem {
    /// Item identified by its canonical locator.
    pub fn from_locator(title: String, locator: String) -> Self {
        let token = identity(&locator);
        Self {
            title,
            locator,
            token,
        }
    }

    /// Item identified by a site-provided language-agnostic key.
    pub fn from_key(title: String, locator: String, key: &str) -> Self {
        let token = identity(key);
        Self {
            title,
            locator,
            token,
        }
    }
}

/// Filtering policy shared by the extractors, borrowed from the config.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRules<'a> {
    pub origin: &'a str,
    pub domain: &'a str,
    pub denylist: &'a [String],
    pub min_text_len: usize,
    pub title_max_len: usize,
}

impl<'a> ExtractRules<'a> {
    pub fn from_config(cfg: &'a Config) -> Self {
        Self {
            origin: cfg.origin_trimmed(),
            domain: &cfg.site.domain,
            denylist: &cfg.denylist,
            min_text_len: cfg.detect.min_text_len,
            title_max_len: cfg.detect.title_max_len,
        }
    }
}

/// Run the section's configured extractor over one payload.
pub fn extract(
    payload: &str,
    variant: ExtractorVariant,
    rules: &ExtractRules<'_>,
) -> Result<Vec<CandidateItem>, ExtractError> {
    match variant {
        ExtractorVariant::Html => Ok(html_links::extract(payload, rules)),
        ExtractorVariant::Json => json_feed::extract(payload, rules),
    }
}

/// Normalize display text: decode HTML entities, strip tags, collapse
/// control characters and whitespace runs to single spaces, trim.
pub fn normalize_display_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, " ");

    collapse_whitespace(&stripped)
}

/// Collapse control characters and whitespace runs to single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"[\s\p{Cc}]+").unwrap());
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Truncate on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect()
}

/// Resolve a raw href against the site origin. Relative paths join the
/// origin; absolute http(s) locators pass through; anything else (mailto,
/// protocol-relative, bare fragments) is not content.
pub fn resolve_locator(href: &str, origin: &str) -> Option<String> {
    if href.starts_with('/') {
        Some(format!("{origin}{href}"))
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

/// Navigation/legal/account pages are matched on the raw href so the
/// denylist works for relative and absolute locators alike.
pub fn is_denylisted(href: &str, denylist: &[String]) -> bool {
    let lower = href.to_ascii_lowercase();
    denylist.iter().any(|frag| lower.contains(&frag.to_ascii_lowercase()))
}
