//! Core Task type.
//!
//! # Invariants
//! - `text` is never empty
//! - `id` is unique within a process, whichever source produced the task

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category used when a generator omits one (the relax theme).
pub const DEFAULT_CATEGORY: &str = "放松";
/// Instruction used when a generator omits one.
pub const DEFAULT_TEXT: &str = "对自己说一句温柔的话。";
/// Duration label used when a generator omits one.
pub const DEFAULT_MINUTES: &str = "2–5";
/// Encouragement used when a generator omits one.
pub const DEFAULT_SOFT: &str = "你已经很棒了。";

/// Last id handed out, shared by every source in the process.
static LAST_TASK_ID: AtomicU64 = AtomicU64::new(0);

/// Allocate a fresh task id.
///
/// Ids are seeded from wall-clock milliseconds and strictly increase within
/// the process, even when several tasks are created in the same millisecond.
pub fn next_task_id() -> u64 {
    let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
    let mut prev = LAST_TASK_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(prev.saturating_add(1));
        match LAST_TASK_ID.compare_exchange_weak(
            prev,
            candidate,
            Ordering::AcqRel,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => prev = actual,
        }
    }
}

/// A single self-care task. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    /// Key into the theme table
    pub category: String,
    /// The instruction shown in the bubble
    pub text: String,
    /// Free-form duration label, e.g. "2–5"
    pub minutes: String,
    /// Encouragement shown under the instruction
    pub soft: String,
}

impl Task {
    /// Coerce a loosely-typed generator payload into a task.
    ///
    /// Missing, empty or non-scalar fields are replaced with the fixed
    /// defaults. Returns `None` when the payload is not a JSON object at all.
    /// Any id present in the payload is ignored in favour of `id`.
    pub fn from_payload(payload: &Value, id: u64) -> Option<Task> {
        if !payload.is_object() {
            return None;
        }
        Some(Task {
            id,
            category: scalar_field(payload, "category")
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            text: scalar_field(payload, "text").unwrap_or_else(|| DEFAULT_TEXT.to_string()),
            minutes: scalar_field(payload, "minutes")
                .unwrap_or_else(|| DEFAULT_MINUTES.to_string()),
            soft: scalar_field(payload, "soft").unwrap_or_else(|| DEFAULT_SOFT.to_string()),
        })
    }
}

fn scalar_field(payload: &Value, name: &str) -> Option<String> {
    match payload.get(name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Where a task came from. Diagnostic only; never drives behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOrigin {
    /// Produced by a remote text generator
    Llm,
    /// Drawn from the local pool
    Local,
}

impl TaskOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskOrigin::Llm => "llm",
            TaskOrigin::Local => "local",
        }
    }
}

impl fmt::Display for TaskOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of the generation endpoint: a task plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTask {
    pub task: Task,
    pub source: TaskOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_strictly_increase() {
        let a = next_task_id();
        let b = next_task_id();
        let c = next_task_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn payload_fields_are_kept() {
        let payload = json!({
            "id": 7,
            "category": "音乐",
            "text": "听一首喜欢的歌。",
            "minutes": "3–4",
            "soft": "耳朵也需要休息。"
        });
        let task = Task::from_payload(&payload, 42).unwrap();
        assert_eq!(task.id, 42);
        assert_eq!(task.category, "音乐");
        assert_eq!(task.text, "听一首喜欢的歌。");
        assert_eq!(task.minutes, "3–4");
        assert_eq!(task.soft, "耳朵也需要休息。");
    }

    #[test]
    fn missing_and_empty_fields_get_defaults() {
        let payload = json!({ "text": "   ", "minutes": null, "soft": ["x"] });
        let task = Task::from_payload(&payload, 1).unwrap();
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert_eq!(task.text, DEFAULT_TEXT);
        assert_eq!(task.minutes, DEFAULT_MINUTES);
        assert_eq!(task.soft, DEFAULT_SOFT);
    }

    #[test]
    fn numeric_minutes_are_stringified() {
        let task = Task::from_payload(&json!({ "minutes": 5 }), 1).unwrap();
        assert_eq!(task.minutes, "5");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(Task::from_payload(&json!("just text"), 1).is_none());
        assert!(Task::from_payload(&json!([1, 2]), 1).is_none());
    }

    #[test]
    fn origin_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TaskOrigin::Llm).unwrap(), "\"llm\"");
        assert_eq!(TaskOrigin::Local.to_string(), "local");
    }
}
