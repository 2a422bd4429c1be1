// src/sink/mod.rs
//! Task sinks: where new content items get dispatched.

pub mod todoist;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::Section;
use crate::extract::{collapse_whitespace, truncate_chars, CandidateItem};

/// Longest failure reason we keep for logs and summaries.
const REASON_MAX: usize = 120;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("sink request failed: {0}")]
    Request(String),
    #[error("sink returned status {0}")]
    Status(u16),
}

/// Outcome of one dispatch attempt. Failures carry a truncated reason and
/// never propagate into the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Created { id: String },
    Failed { reason: String },
}

/// A task-creation payload as the external service expects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPayload {
    pub title: String,
    pub description: String,
    pub priority: u8,
    pub labels: Vec<String>,
}

impl TaskPayload {
    /// Compose the payload for one new item: section label + cleaned title,
    /// description with the locator and a human dispatch timestamp.
    pub fn build(
        section: &Section,
        item: &CandidateItem,
        site_tag: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let clean_title = collapse_whitespace(&item.title);
        Self {
            title: format!("{}: {}", section.label, clean_title),
            description: format!(
                "Link: {}\n\nAdded {} UTC\nSection: {}",
                item.locator,
                now.format("%Y-%m-%d %H:%M"),
                section.label
            ),
            priority: section.priority,
            labels: vec![site_tag.to_string(), section.label.clone()],
        }
    }
}

#[async_trait]
pub trait TaskSink: Send + Sync {
    async fn create_task(&self, task: &TaskPayload) -> Result<String, DispatchError>;
    fn name(&self) -> &'static str;
}

/// One outbound call for one new item. Errors become `Failed` results;
/// the caller decides what an un-committed token means.
pub async fn dispatch(
    sink: &dyn TaskSink,
    section: &Section,
    item: &CandidateItem,
    site_tag: &str,
) -> DispatchResult {
    let payload = TaskPayload::build(section, item, site_tag, Utc::now());
    match sink.create_task(&payload).await {
        Ok(id) => DispatchResult::Created { id },
        Err(e) => DispatchResult::Failed {
            reason: truncate_chars(&e.to_string(), REASON_MAX),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExtractorVariant, Section};
    use chrono::TimeZone;

    fn section() -> Section {
        Section {
            name: "news".into(),
            url: "https://www.example.org/en/news/".into(),
            label: "News".into(),
            priority: 2,
            variant: ExtractorVariant::Html,
        }
    }

    #[test]
    fn payload_composes_title_description_and_labels() {
        let item = CandidateItem::from_locator(
            "A fresh article".into(),
            "https://www.example.org/en/news/fresh/".into(),
        );
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 12, 30, 0).unwrap();
        let p = TaskPayload::build(&section(), &item, "example", now);
        assert_eq!(p.title, "News: A fresh article");
        assert!(p.description.contains("Link: https://www.example.org/en/news/fresh/"));
        assert!(p.description.contains("Added 2026-08-06 12:30 UTC"));
        assert!(p.description.contains("Section: News"));
        assert_eq!(p.priority, 2);
        assert_eq!(p.labels, vec!["example".to_string(), "News".to_string()]);
    }

    #[test]
    fn title_cleaning_collapses_control_chars_and_runs() {
        let item = CandidateItem::from_locator(
            "Line\none\t\ttwo   three".into(),
            "https://www.example.org/en/x/".into(),
        );
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 0, 0, 0).unwrap();
        let p = TaskPayload::build(&section(), &item, "example", now);
        assert_eq!(p.title, "News: Line one two three");
    }
}
