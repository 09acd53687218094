//! API request and response types.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Resolved generation provider; absent when only the local pool is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Number of tasks in the local pool
    pub pool_size: usize,
}
