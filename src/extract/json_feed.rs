// src/extract/json_feed.rs
//! Extractor for JSON listing endpoints.
//!
//! Feed-like sources carry a site-provided language-agnostic key per entry,
//! which becomes the identity basis instead of the URL (the same logical
//! item keeps its key across locale or layout changes). The parse is
//! tolerant of the two shapes observed in the wild: a bare array of entries
//! or an `{"items": [...]}` wrapper.

use std::collections::HashSet;

use serde::Deserialize;

use super::{
    collapse_whitespace, resolve_locator, truncate_chars, CandidateItem, ExtractError,
    ExtractRules,
};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Wrapped { items: Vec<Entry> },
    Bare(Vec<Entry>),
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    key: Option<String>,
    // Some endpoints name the key "lank".
    #[serde(default)]
    lank: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl Entry {
    fn key(&self) -> Option<&str> {
        self.key
            .as_deref()
            .or(self.lank.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

pub fn extract(
    payload: &str,
    rules: &ExtractRules<'_>,
) -> Result<Vec<CandidateItem>, ExtractError> {
    let listing: Listing = serde_json::from_str(payload)?;
    let entries = match listing {
        Listing::Wrapped { items } => items,
        Listing::Bare(items) => items,
    };

    let mut out = Vec::with_capacity(entries.len());
    let mut seen_keys: HashSet<String> = HashSet::new();

    for entry in &entries {
        let Some(key) = entry.key() else {
            continue;
        };
        let title = collapse_whitespace(
            &html_escape::decode_html_entities(entry.title.as_deref().unwrap_or_default()),
        );
        if title.is_empty() {
            continue;
        }
        if !seen_keys.insert(key.to_string()) {
            continue;
        }

        let locator = entry
            .url
            .as_deref()
            .and_then(|u| resolve_locator(u.trim(), rules.origin))
            .unwrap_or_else(|| key.to_string());

        let title = truncate_chars(&title, rules.title_max_len);
        out.push(CandidateItem::from_key(title, locator, key));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules<'a>(denylist: &'a [String]) -> ExtractRules<'a> {
        ExtractRules {
            origin: "https://www.example.org",
            domain: "example.org",
            denylist,
            min_text_len: 15,
            title_max_len: 100,
        }
    }

    #[test]
    fn wrapped_and_bare_shapes_parse_alike() {
        let deny = vec![];
        let wrapped = r#"{"items":[{"key":"k1","title":"First","url":"/en/a/"}]}"#;
        let bare = r#"[{"key":"k1","title":"First","url":"/en/a/"}]"#;
        let a = extract(wrapped, &rules(&deny)).unwrap();
        let b = extract(bare, &rules(&deny)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].locator, "https://www.example.org/en/a/");
    }

    #[test]
    fn lank_field_works_as_key() {
        let deny = vec![];
        let json = r#"[{"lank":"pub-w_2026_05","title":"Study article"}]"#;
        let items = extract(json, &rules(&deny)).unwrap();
        assert_eq!(items.len(), 1);
        // no URL: the key itself is the locator
        assert_eq!(items[0].locator, "pub-w_2026_05");
    }

    #[test]
    fn entries_missing_key_or_title_are_skipped() {
        let deny = vec![];
        let json = r#"[
            {"title":"no key here"},
            {"key":"  ","title":"blank key"},
            {"key":"k1"},
            {"key":"k2","title":"kept entry"}
        ]"#;
        let items = extract(json, &rules(&deny)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "kept entry");
    }

    #[test]
    fn duplicate_keys_collapse_first_wins() {
        let deny = vec![];
        let json = r#"[
            {"key":"k1","title":"first"},
            {"key":"k1","title":"second"}
        ]"#;
        let items = extract(json, &rules(&deny)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "first");
    }

    #[test]
    fn malformed_payload_is_an_extract_error() {
        let deny = vec![];
        assert!(extract("<html>not json</html>", &rules(&deny)).is_err());
    }
}
