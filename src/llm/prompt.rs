//! Prompts for task generation.

use crate::theme;

pub const SYSTEM_PROMPT: &str = "You are a gentle companion who hands out tiny self-care tasks. \
Each task must be doable in a few minutes, need no special equipment, and feel kind rather than \
productive. Reply with a single JSON object and nothing else, in Simplified Chinese, with the keys: \
\"category\" (one of the allowed categories), \"text\" (one short instruction sentence), \
\"minutes\" (a duration label such as \"2–5\"), \"soft\" (one short encouraging sentence).";

/// User prompt listing the categories the theme table knows about.
pub fn user_prompt() -> String {
    let categories: Vec<&str> = theme::categories().collect();
    format!(
        "请给我一件小事。可选分类：{}。只返回 JSON。",
        categories.join("、")
    )
}
