//! Client-side task source backed by the generation endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{LocalPool, TaskSource, TaskSourceError};
use crate::task::{next_task_id, Task};

/// Calls `POST {url}` and falls back to the local pool on any failure.
pub struct EndpointSource {
    client: Client,
    url: String,
    pool: Arc<LocalPool>,
}

/// Response body of the generation endpoint. `task` stays loosely typed
/// so it can be coerced field by field.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    task: serde_json::Value,
    #[serde(default)]
    source: Option<String>,
}

impl EndpointSource {
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        pool: Arc<LocalPool>,
    ) -> Result<Self, TaskSourceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            pool,
        })
    }

    async fn request(&self) -> anyhow::Result<(Task, Option<String>)> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Endpoint returned HTTP {}", status.as_u16()));
        }

        let body = response.text().await.context("Failed to read response body")?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Malformed endpoint response")?;
        let task = Task::from_payload(&parsed.task, next_task_id())
            .ok_or_else(|| anyhow!("Endpoint task is not a JSON object"))?;
        Ok((task, parsed.source))
    }
}

#[async_trait]
impl TaskSource for EndpointSource {
    async fn fetch(&self) -> Task {
        match self.request().await {
            Ok((task, source)) => {
                tracing::debug!(
                    "Task {} resolved: source={} category={}",
                    task.id,
                    source.as_deref().unwrap_or("unknown"),
                    task.category
                );
                task
            }
            Err(e) => {
                tracing::warn!("Task endpoint unavailable, using local pool: {:#}", e);
                let task = self.pool.draw();
                tracing::debug!(
                    "Task {} resolved: source=local category={}",
                    task.id,
                    task.category
                );
                task
            }
        }
    }
}
