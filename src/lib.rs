//! # Little Things
//!
//! A capsule-toy ("gashapon") for small self-care tasks: pull the lever, an
//! egg rolls out in the colours of the task inside, it hatches, and the task
//! can be done, swapped, or ignored. Completions are counted per week.
//!
//! This library provides:
//! - Task acquisition with provider-backed generation and a local fallback pool
//! - A timed interaction state machine driving any front-end
//! - A weekly completion counter over a pluggable key-value store
//! - An HTTP endpoint that serves generated tasks
//!
//! ## Architecture
//!
//! ```text
//!   front-end ──draw/swap/complete──▶ InteractionController ──▶ WeeklyCounter ──▶ KvStore
//!        ▲                                  │
//!        └──────── ControllerEvent ─────────┤
//!                                           ▼
//!                                      TaskSource
//!                              ┌────────────┴────────────┐
//!                       EndpointSource            GeneratorSource
//!                       (HTTP, api::serve)        (LlmProvider)
//!                              └──── LocalPool fallback ─┘
//! ```
//!
//! ## Modules
//! - `controller`: interaction state machine (actor)
//! - `source`: task sources and the local pool
//! - `llm`: generation providers
//! - `counter`: weekly completion counter
//! - `storage`: key-value stores
//! - `theme`: category palettes
//! - `api`: HTTP generation endpoint

pub mod api;
pub mod config;
pub mod controller;
pub mod counter;
pub mod feedback;
pub mod llm;
pub mod source;
pub mod storage;
pub mod task;
pub mod theme;

pub use config::Config;
pub use controller::{CommandOutcome, ControllerEvent, InteractionController, InteractionState};
pub use counter::WeeklyCounter;
pub use source::TaskSource;
pub use task::Task;
