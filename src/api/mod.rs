//! HTTP API for task generation.
//!
//! ## Endpoints
//!
//! - `POST /api/generate-task` - Generate one task (`{ task, source }`), always 200
//! - `GET /api/health` - Health check

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
pub use types::*;
