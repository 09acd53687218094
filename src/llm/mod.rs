//! Remote task generation.
//!
//! This module provides a trait-based abstraction over text-generation
//! providers, with an OpenAI-compatible chat-completions implementation.
//! Providers are looked up by id in a [`ProviderRegistry`]; a missing
//! credential or an unknown id yields no provider, which callers treat as
//! "use the local pool".

mod error;
mod openai;
mod prompt;

pub use error::{classify_http_status, LlmError, LlmErrorKind};
pub use openai::OpenAiProvider;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::task::Task;

/// A remote generator of tasks.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Registry id of this provider.
    fn id(&self) -> &str;

    /// Generate one task. The returned task carries a fresh id.
    async fn generate_task(&self) -> anyhow::Result<Task>;
}

type ProviderFactory = fn(&LlmConfig, String) -> anyhow::Result<Arc<dyn LlmProvider>>;

/// Provider constructors keyed by provider id.
pub struct ProviderRegistry {
    factories: HashMap<&'static str, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every provider this crate ships.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(OpenAiProvider::ID, openai_factory);
        registry
    }

    pub fn register(&mut self, id: &'static str, factory: ProviderFactory) {
        self.factories.insert(id, factory);
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.factories.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Build the configured provider, or `None` when generation is unavailable.
    pub fn resolve(&self, config: &LlmConfig) -> Option<Arc<dyn LlmProvider>> {
        let Some(api_key) = config.api_key.clone() else {
            tracing::info!("No LLM API key configured, tasks will come from the local pool");
            return None;
        };

        let Some(factory) = self.factories.get(config.provider.as_str()) else {
            tracing::warn!(
                "Unknown LLM provider: {}, falling back (known: {:?})",
                config.provider,
                self.ids()
            );
            return None;
        };

        match factory(config, api_key) {
            Ok(provider) => {
                tracing::info!(
                    "LLM provider ready: provider={} model={}",
                    config.provider,
                    config.model
                );
                Some(provider)
            }
            Err(e) => {
                tracing::warn!("Failed to initialise LLM provider {}: {}", config.provider, e);
                None
            }
        }
    }
}

fn openai_factory(config: &LlmConfig, api_key: String) -> anyhow::Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(config, api_key)?);
    Ok(provider)
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
