//! Category themes: egg palette and bird accessory per task category.
//!
//! Resolution is a pure table lookup. Unknown categories get [`DEFAULT_THEME`],
//! the same relax palette used for tasks whose generator omitted a category.

use serde::Serialize;

/// Visual theme derived from a task category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeDescriptor {
    /// Category key this theme belongs to
    pub key: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Main egg shell colour
    pub egg_color: &'static str,
    /// Darker shade for egg details
    pub egg_color_dark: &'static str,
    /// Accent colour for the bird's accessory
    pub accent: &'static str,
    /// Accessory identifier
    pub accessory: &'static str,
}

const fn theme(
    key: &'static str,
    label: &'static str,
    egg_color: &'static str,
    egg_color_dark: &'static str,
    accent: &'static str,
    accessory: &'static str,
) -> ThemeDescriptor {
    ThemeDescriptor {
        key,
        label,
        egg_color,
        egg_color_dark,
        accent,
        accessory,
    }
}

const THEMES: [ThemeDescriptor; 11] = [
    theme("文学", "Literature", "#E8DFF5", "#C9B8E8", "#9B7DC8", "scarf"),
    theme("艺术", "Art", "#FFE5CC", "#F5C89A", "#E8943A", "beret"),
    theme("写作", "Writing", "#D6EAF8", "#AED6F1", "#5DADE2", "bowtie"),
    theme("音乐", "Music", "#FADBD8", "#F1948A", "#E57498", "headphones"),
    theme("放松", "Relaxation", "#D5F5E3", "#A9DFBF", "#58B075", "leaf"),
    theme("好奇心", "Curiosity", "#FEF9E7", "#F9E79F", "#D4AC0D", "star"),
    theme("生活", "Life", "#FDEBD0", "#F5CBA7", "#CA8944", "apron"),
    theme("家庭", "Family", "#FDEDEC", "#F5B7B1", "#E74C5E", "heart"),
    theme("学习", "Learning", "#D4E6F1", "#A9CCE3", "#4A6FA5", "glasses"),
    theme("学术", "Academic", "#D4E6F1", "#A9CCE3", "#4A6FA5", "glasses"),
    theme("帮助", "Helping", "#F5CBA7", "#E8B480", "#D68040", "wings-glow"),
];

/// Theme for categories missing from the table.
pub const DEFAULT_THEME: ThemeDescriptor =
    theme("放松", "Default", "#D5F5E3", "#A9DFBF", "#58B075", "leaf");

/// Resolve the theme for a category.
pub fn resolve(category: &str) -> ThemeDescriptor {
    THEMES
        .iter()
        .find(|t| t.key == category)
        .copied()
        .unwrap_or(DEFAULT_THEME)
}

/// All categories with an explicit theme, in table order.
pub fn categories() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|t| t.key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_resolves_to_itself() {
        for entry in THEMES.iter() {
            assert_eq!(resolve(entry.key), *entry);
        }
        assert_eq!(categories().count(), 11);
    }

    #[test]
    fn unknown_categories_get_default() {
        assert_eq!(resolve(""), DEFAULT_THEME);
        assert_eq!(resolve("cooking"), DEFAULT_THEME);
        assert_eq!(resolve(" 音乐"), DEFAULT_THEME);
    }

    #[test]
    fn default_shares_relax_palette() {
        let relax = resolve("放松");
        assert_eq!(DEFAULT_THEME.egg_color, relax.egg_color);
        assert_eq!(DEFAULT_THEME.accessory, relax.accessory);
        assert_ne!(DEFAULT_THEME.label, relax.label);
    }

    #[test]
    fn academic_and_learning_share_palette() {
        let a = resolve("学习");
        let b = resolve("学术");
        assert_eq!(a.egg_color, b.egg_color);
        assert_eq!(a.accessory, "glasses");
        assert_ne!(a.label, b.label);
    }
}
