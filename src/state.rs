// src/state.rs
//! Persisted run state: per-section bounded histories of already-dispatched
//! identity tokens, plus check timestamps.
//!
//! On disk this is a single JSON document. A missing or unreadable file
//! bootstraps an empty state instead of failing the run; a failed write is
//! loud, because silently losing recorded tokens would re-dispatch items.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("encoding run state: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("writing state to {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Bounded FIFO history of identity tokens with O(1) membership.
///
/// Unlike a plain trimmed list, re-recording a present token is a no-op:
/// the token keeps its original position and the set never grows past the
/// cap. Serialized as the ordered token list (oldest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SeenSet {
    order: VecDeque<String>,
    index: HashSet<String>,
}

impl SeenSet {
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains(token)
    }

    /// Record a token, evicting the oldest entries past `cap`.
    /// Returns false if the token was already present.
    pub fn record(&mut self, token: &str, cap: usize) -> bool {
        if self.index.contains(token) {
            return false;
        }
        self.order.push_back(token.to_string());
        self.index.insert(token.to_string());
        while self.order.len() > cap {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tokens oldest-first, as persisted.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for SeenSet {
    fn from(tokens: Vec<String>) -> Self {
        let mut set = SeenSet::default();
        for t in tokens {
            if set.index.insert(t.clone()) {
                set.order.push_back(t);
            }
        }
        set
    }
}

impl From<SeenSet> for Vec<String> {
    fn from(set: SeenSet) -> Self {
        set.order.into_iter().collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionState {
    #[serde(default)]
    pub seen: SeenSet,
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,
}

/// Whole-document state, keyed by section name. Sections absent from the
/// document start empty, so adding sections to the config stays
/// forward-readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub sections: BTreeMap<String, SectionState>,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
}

impl RunState {
    pub fn section_mut(&mut self, name: &str) -> &mut SectionState {
        self.sections.entry(name.to_string()).or_default()
    }

    pub fn section(&self, name: &str) -> Option<&SectionState> {
        self.sections.get(name)
    }
}

/// Reads and writes the state document as a unit.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lenient bootstrap: a missing or corrupt file yields an empty state.
    pub async fn load(&self) -> RunState {
        match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "corrupt state file, starting empty"
                    );
                    RunState::default()
                }
            },
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "unreadable state file, starting empty"
                    );
                }
                RunState::default()
            }
        }
    }

    /// Write-to-temp-then-rename so a crash mid-write cannot leave the next
    /// run's `load` with a half-written document.
    pub async fn persist(&self, state: &RunState) -> Result<(), PersistError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).await.map_err(|source| PersistError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &bytes).await.map_err(|source| PersistError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|source| PersistError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}
