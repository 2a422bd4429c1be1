// src/identity.rs
//! Stable identity fingerprints for content items. The token is the sole
//! deduplication key, so it must be deterministic across runs.

use sha2::{Digest, Sha256};

/// Fingerprint a canonical locator (or a site-provided feed key).
///
/// Same input always yields the same 64-char lowercase hex token. Callers
/// must not pass empty locators; the extractor filters those out first.
pub fn identity(locator: &str) -> String {
    debug_assert!(!locator.is_empty(), "identity() requires a non-empty locator");
    let mut hasher = Sha256::new();
    hasher.update(locator.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
