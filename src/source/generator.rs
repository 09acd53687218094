//! Provider-direct task source: generate remotely, fall back to the pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{LocalPool, TaskSource};
use crate::config::LlmConfig;
use crate::llm::{LlmError, LlmProvider, ProviderRegistry};
use crate::task::{GeneratedTask, Task, TaskOrigin};

pub struct GeneratorSource {
    provider: Option<Arc<dyn LlmProvider>>,
    pool: Arc<LocalPool>,
    timeout: Duration,
}

impl GeneratorSource {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        pool: Arc<LocalPool>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            pool,
            timeout,
        }
    }

    /// Resolve the configured provider through the built-in registry.
    pub fn from_config(config: &LlmConfig, pool: Arc<LocalPool>) -> Self {
        let provider = ProviderRegistry::builtin().resolve(config);
        Self::new(provider, pool, config.timeout)
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.id())
    }

    pub fn pool(&self) -> &LocalPool {
        &self.pool
    }

    /// Produce a task together with where it came from.
    pub async fn generate(&self) -> GeneratedTask {
        if let Some(provider) = &self.provider {
            match tokio::time::timeout(self.timeout, provider.generate_task()).await {
                Ok(Ok(task)) => {
                    return GeneratedTask {
                        task,
                        source: TaskOrigin::Llm,
                    }
                }
                Ok(Err(e)) => {
                    let transient = e
                        .downcast_ref::<LlmError>()
                        .map(LlmError::is_transient)
                        .unwrap_or(false);
                    tracing::warn!(
                        "LLM generation failed, falling back (transient: {}): {}",
                        transient,
                        e
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        "LLM generation timed out after {:?}, falling back",
                        self.timeout
                    );
                }
            }
        }

        GeneratedTask {
            task: self.pool.draw(),
            source: TaskOrigin::Local,
        }
    }
}

#[async_trait]
impl TaskSource for GeneratorSource {
    async fn fetch(&self) -> Task {
        let generated = self.generate().await;
        tracing::debug!(
            "Task {} resolved: source={} category={}",
            generated.task.id,
            generated.source,
            generated.task.category
        );
        generated.task
    }
}
