//! Task acquisition.
//!
//! Every [`TaskSource`] resolves to *some* task: remote generation is tried
//! first and any failure falls back to a uniform draw from the [`LocalPool`].
//! Provenance is only logged.

mod endpoint;
mod generator;
mod pool;

pub use endpoint::EndpointSource;
pub use generator::GeneratorSource;
pub use pool::{LocalPool, TaskTemplate};

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::task::Task;

/// Startup-time failures building a task source. Fetching itself never fails.
#[derive(Debug, Error)]
pub enum TaskSourceError {
    #[error("Local task pool is empty")]
    EmptyPool,

    #[error("Failed to read task pool {path}: {source}")]
    PoolIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid task pool {path}: {source}")]
    PoolFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Produces one task per call and never fails.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn fetch(&self) -> Task;
}
