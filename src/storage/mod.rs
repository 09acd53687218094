//! Device-scoped key-value storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: JSON file in the data directory

mod file;
mod memory;

pub use file::FileKvStore;
pub use memory::InMemoryKvStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode store snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Narrow string-to-string store. Absent keys read as `None`, never an error.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
