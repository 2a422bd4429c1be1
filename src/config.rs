// src/config.rs
//! Watch configuration: the site, its sections, the navigation denylist,
//! and the numeric tunables. Built once at startup and passed into the
//! orchestrator — no module-scope mutable state.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "SITEWATCH_CONFIG_PATH";
pub const DEFAULT_CONFIG_TOML: &str = "config/sitewatch.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/sitewatch.json";

/// Which extractor interprets a section's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorVariant {
    /// Anchor scan over an HTML page.
    Html,
    /// Keyed entries from a JSON listing endpoint.
    Json,
}

impl Default for ExtractorVariant {
    fn default() -> Self {
        ExtractorVariant::Html
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub name: String,
    pub url: String,
    pub label: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub variant: ExtractorVariant,
}

fn default_priority() -> u8 {
    3
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Absolute origin relative locators resolve against,
    /// e.g. "https://www.example.org".
    pub origin: String,
    /// Domain substring a locator must contain to count as site content.
    pub domain: String,
    /// Global label attached to every created task.
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            max_attempts: 3,
            backoff_base_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub history_cap: usize,
    pub title_max_len: usize,
    pub min_text_len: usize,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            history_cap: 100,
            title_max_len: 100,
            min_text_len: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub section_delay_secs: u64,
    pub state_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            section_delay_secs: 3,
            state_path: "state/state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub run: RunConfig,
    /// Path fragments of navigation/legal/account pages to skip.
    #[serde(default)]
    pub denylist: Vec<String>,
    pub sections: Vec<Section>,
}

impl Config {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn from_path(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load using env var + fallbacks:
    /// 1) $SITEWATCH_CONFIG_PATH
    /// 2) config/sitewatch.toml
    /// 3) config/sitewatch.json
    pub fn load_default() -> Result<Config> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Config::from_path(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from(DEFAULT_CONFIG_TOML);
        if toml_p.exists() {
            return Config::from_path(&toml_p);
        }
        let json_p = PathBuf::from(DEFAULT_CONFIG_JSON);
        if json_p.exists() {
            return Config::from_path(&json_p);
        }
        Err(anyhow!(
            "no config found (set {ENV_CONFIG_PATH} or create {DEFAULT_CONFIG_TOML})"
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(anyhow!("config has no sections"));
        }
        if !self.site.origin.starts_with("http") {
            return Err(anyhow!("site.origin must be an absolute http(s) URL"));
        }
        let mut names = std::collections::HashSet::new();
        for s in &self.sections {
            if s.name.trim().is_empty() {
                return Err(anyhow!("section with empty name"));
            }
            if !names.insert(s.name.as_str()) {
                return Err(anyhow!("duplicate section name: {}", s.name));
            }
            if !(1..=4).contains(&s.priority) {
                return Err(anyhow!(
                    "section {}: priority {} outside 1..=4",
                    s.name,
                    s.priority
                ));
            }
        }
        Ok(())
    }

    /// Origin without a trailing slash, for locator resolution.
    pub fn origin_trimmed(&self) -> &str {
        self.site.origin.trim_end_matches('/')
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<Config> {
    // Try TOML first if hinted or content looks like toml.
    let try_toml = hint_ext == "toml" || s.contains("[[sections]]");
    if try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = serde_json::from_str(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = toml::from_str(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported config format"))
}
