//! Task module - the task value object, its provenance and id allocation.

pub mod task;

pub use task::{
    next_task_id, GeneratedTask, Task, TaskOrigin, DEFAULT_CATEGORY, DEFAULT_MINUTES,
    DEFAULT_SOFT, DEFAULT_TEXT,
};
