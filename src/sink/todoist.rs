// src/sink/todoist.rs
//! Todoist REST v2 sink.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{DispatchError, TaskPayload, TaskSink};

pub const ENV_TODOIST_TOKEN: &str = "TODOIST_TOKEN";
const DEFAULT_API_URL: &str = "https://api.todoist.com/rest/v2/tasks";

pub struct TodoistSink {
    token: String,
    api_url: String,
    client: Client,
    timeout: Duration,
}

impl TodoistSink {
    pub fn new(token: String) -> Self {
        Self {
            token,
            api_url: DEFAULT_API_URL.to_string(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    /// The credential is the one startup requirement: absent token is fatal.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(ENV_TODOIST_TOKEN)
            .map_err(|_| anyhow!("{ENV_TODOIST_TOKEN} is not set"))?;
        if token.trim().is_empty() {
            return Err(anyhow!("{ENV_TODOIST_TOKEN} is empty"));
        }
        Ok(Self::new(token))
    }

    /// Point at a different endpoint (tests, mock servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[derive(Serialize)]
struct TodoistTask<'a> {
    content: &'a str,
    description: &'a str,
    priority: u8,
    labels: &'a [String],
}

#[derive(Deserialize)]
struct CreatedTask {
    id: String,
}

#[async_trait]
impl TaskSink for TodoistSink {
    async fn create_task(&self, task: &TaskPayload) -> Result<String, DispatchError> {
        let body = TodoistTask {
            content: &task.title,
            description: &task.description,
            priority: task.priority,
            labels: &task.labels,
        };

        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Request(e.to_string()))?;

        if let Err(e) = resp.error_for_status_ref() {
            return Err(DispatchError::Status(
                e.status().map(|s| s.as_u16()).unwrap_or(0),
            ));
        }

        let created: CreatedTask = resp
            .json()
            .await
            .map_err(|e| DispatchError::Request(format!("decoding sink response: {e}")))?;
        Ok(created.id)
    }

    fn name(&self) -> &'static str {
        "Todoist"
    }
}
