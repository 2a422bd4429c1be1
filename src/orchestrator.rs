// src/orchestrator.rs
//! One full run: every configured section, strictly sequential —
//! fetch → extract → detect → dispatch → persist.

use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::detect::detect;
use crate::extract::{self, CandidateItem, ExtractRules};
use crate::fetch::PageFetcher;
use crate::sink::{dispatch, DispatchResult, TaskSink};
use crate::state::{RunState, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sections_checked: usize,
    pub sections_skipped: usize,
    pub tasks_created: usize,
    pub dispatch_failures: usize,
}

pub struct Orchestrator<'a> {
    config: &'a Config,
    fetcher: &'a dyn PageFetcher,
    sink: &'a dyn TaskSink,
    store: &'a StateStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a dyn PageFetcher,
        sink: &'a dyn TaskSink,
        store: &'a StateStore,
    ) -> Self {
        Self {
            config,
            fetcher,
            sink,
            store,
        }
    }

    /// Process all sections once. Per-section and per-item failures are
    /// logged and skipped; only a state-persistence failure aborts the run.
    pub async fn run(&self, state: &mut RunState) -> Result<RunSummary> {
        let rules = ExtractRules::from_config(self.config);
        let cap = self.config.detect.history_cap;
        let delay = Duration::from_secs(self.config.run.section_delay_secs);
        let mut summary = RunSummary::default();

        for (i, section) in self.config.sections.iter().enumerate() {
            // politeness throttle between sections, not before the first
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            info!(section = %section.name, url = %section.url, "checking section");

            let payload = match self.fetcher.fetch(&section.url).await {
                Ok(p) => p,
                Err(e) => {
                    warn!(section = %section.name, error = %e, "fetch failed, skipping section");
                    summary.sections_skipped += 1;
                    continue;
                }
            };

            let candidates = match extract::extract(&payload, section.variant, &rules) {
                Ok(c) => c,
                Err(e) => {
                    warn!(section = %section.name, error = %e, "extract failed, skipping section");
                    summary.sections_skipped += 1;
                    continue;
                }
            };

            let new_items: Vec<CandidateItem> = {
                let sect = state.section_mut(&section.name);
                detect(&candidates, &sect.seen).into_iter().cloned().collect()
            };

            if new_items.is_empty() {
                info!(
                    section = %section.name,
                    candidates = candidates.len(),
                    "no new content"
                );
            }

            for item in &new_items {
                match dispatch(self.sink, section, item, &self.config.site.tag).await {
                    DispatchResult::Created { id } => {
                        info!(
                            section = %section.name,
                            task_id = %id,
                            title = %item.title,
                            "task created"
                        );
                        // commit immediately so the token is never re-detected
                        state.section_mut(&section.name).seen.record(&item.token, cap);
                        summary.tasks_created += 1;
                    }
                    DispatchResult::Failed { reason } => {
                        // token stays un-recorded: the item is new again next run
                        warn!(
                            section = %section.name,
                            locator = %item.locator,
                            %reason,
                            "dispatch failed, will retry next run"
                        );
                        summary.dispatch_failures += 1;
                    }
                }
            }

            state.section_mut(&section.name).last_check = Some(Utc::now());
            summary.sections_checked += 1;

            // per-section persistence narrows the replay window on crash
            self.store
                .persist(state)
                .await
                .with_context(|| format!("persisting state after section {}", section.name))?;
        }

        state.last_run = Some(Utc::now());
        self.store
            .persist(state)
            .await
            .context("persisting final run state")?;

        Ok(summary)
    }
}
