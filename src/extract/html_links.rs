// src/extract/html_links.rs
//! Anchor-scan extractor for HTML section pages.
//!
//! A regex pass over the raw markup is enough here: we only need hrefs and
//! their display text, and the filtering policy below discards everything
//! that is not content (navigation chrome, off-site links, denylisted
//! paths). Emitted order is document order of first occurrence, which flows
//! through to dispatch order.

use std::collections::HashSet;

use super::{
    is_denylisted, normalize_display_text, resolve_locator, truncate_chars, CandidateItem,
    ExtractRules,
};

pub fn extract(payload: &str, rules: &ExtractRules<'_>) -> Vec<CandidateItem> {
    static RE_ANCHOR: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_anchor = RE_ANCHOR.get_or_init(|| {
        regex::Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#).unwrap()
    });

    let mut items = Vec::new();
    let mut seen_locators: HashSet<String> = HashSet::new();

    for cap in re_anchor.captures_iter(payload) {
        let href = cap.get(1).map(|m| m.as_str()).unwrap_or_default().trim();
        let inner = cap.get(2).map(|m| m.as_str()).unwrap_or_default();

        // Too-short display text is navigation chrome, not content.
        let text = normalize_display_text(inner);
        if text.chars().count() < rules.min_text_len {
            continue;
        }

        // Script pseudo-links and fragment anchors never identify content.
        if href.starts_with("javascript:") || href.contains('#') {
            continue;
        }

        let Some(locator) = resolve_locator(href, rules.origin) else {
            continue;
        };
        if !locator.contains(rules.domain) {
            continue;
        }
        if is_denylisted(href, rules.denylist) {
            continue;
        }

        // One item per locator per fetch, first occurrence wins.
        if !seen_locators.insert(locator.clone()) {
            continue;
        }

        let title = truncate_chars(&text, rules.title_max_len);
        items.push(CandidateItem::from_locator(title, locator));
    }

    items
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
    fn short_text_is_chrome_boundary_at_minimum() {
        let deny = vec![];
        let html = r#"
            <a href="/en/a/">only ten ch</a>
            <a href="/en/b/">exactly 15 chars</a>
        "#;
        // first link text is 11 chars, second is 16 — threshold is 15
        let items = extract(html, &rules(&deny));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].locator, "https://www.example.org/en/b/");
    }

    #[test]
    fn off_site_and_denylisted_links_are_dropped() {
        let deny = vec!["/contact".to_string()];
        let html = r#"
            <a href="https://elsewhere.net/post">a long enough off-site title</a>
            <a href="/en/contact/">a long enough contact page link</a>
            <a href="/en/news/item/">a long enough real content link</a>
        "#;
        let items = extract(html, &rules(&deny));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].locator, "https://www.example.org/en/news/item/");
    }

    #[test]
    fn fragment_and_javascript_links_are_dropped() {
        let deny = vec![];
        let html = r#"
            <a href="javascript:void(0)">a long enough script pseudo link</a>
            <a href="/en/page/#section">a long enough fragment anchor link</a>
        "#;
        assert!(extract(html, &rules(&deny)).is_empty());
    }

    #[test]
    fn repeated_locator_yields_one_item_in_document_order() {
        let deny = vec![];
        let html = r#"
            <a href="/en/one/">the first interesting article</a>
            <a href="/en/two/">the second interesting article</a>
            <a href="/en/one/">the first interesting article again</a>
        "#;
        let items = extract(html, &rules(&deny));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].locator, "https://www.example.org/en/one/");
        assert_eq!(items[1].locator, "https://www.example.org/en/two/");
        assert_eq!(items[0].title, "the first interesting article");
    }

    #[test]
    fn nested_markup_in_titles_is_flattened_and_truncated() {
        let deny = vec![];
        let long_tail = "x".repeat(200);
        let html = format!(
            r#"<a href="/en/item/"><span>Some&nbsp;headline</span> with markup {long_tail}</a>"#
        );
        let items = extract(&html, &rules(&deny));
        assert_eq!(items.len(), 1);
        assert!(items[0].title.starts_with("Some headline with markup"));
        assert_eq!(items[0].title.chars().count(), 100);
    }
}
