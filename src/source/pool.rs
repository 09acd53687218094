//! Local pool of pre-authored tasks.

use std::path::Path;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::TaskSourceError;
use crate::task::{next_task_id, Task};

/// A pool entry: a task without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub category: String,
    pub text: String,
    pub minutes: String,
    pub soft: String,
}

impl TaskTemplate {
    fn new(category: &str, text: &str, minutes: &str, soft: &str) -> Self {
        Self {
            category: category.to_string(),
            text: text.to_string(),
            minutes: minutes.to_string(),
            soft: soft.to_string(),
        }
    }

    fn instantiate(&self, id: u64) -> Task {
        Task {
            id,
            category: self.category.clone(),
            text: self.text.clone(),
            minutes: self.minutes.clone(),
            soft: self.soft.clone(),
        }
    }
}

/// Non-empty set of fallback tasks.
#[derive(Debug, Clone)]
pub struct LocalPool {
    templates: Vec<TaskTemplate>,
}

impl LocalPool {
    /// Build a pool. An empty pool is a configuration error.
    pub fn new(templates: Vec<TaskTemplate>) -> Result<Self, TaskSourceError> {
        let templates: Vec<_> = templates
            .into_iter()
            .filter(|t| !t.text.trim().is_empty())
            .collect();
        if templates.is_empty() {
            return Err(TaskSourceError::EmptyPool);
        }
        Ok(Self { templates })
    }

    /// Load a pool from a JSON array of templates.
    pub fn from_json_file(path: &Path) -> Result<Self, TaskSourceError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TaskSourceError::PoolIo {
            path: path.to_path_buf(),
            source,
        })?;
        let templates: Vec<TaskTemplate> =
            serde_json::from_str(&contents).map_err(|source| TaskSourceError::PoolFormat {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(templates)
    }

    /// Load from `path` when given, otherwise the built-in pool.
    pub fn load(path: Option<&Path>) -> Result<Self, TaskSourceError> {
        match path {
            Some(path) => {
                let pool = Self::from_json_file(path)?;
                tracing::info!("Loaded {} local tasks from {}", pool.len(), path.display());
                Ok(pool)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Draw one task uniformly at random, with a fresh id.
    pub fn draw(&self) -> Task {
        let template = self
            .templates
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.templates[0]);
        template.instantiate(next_task_id())
    }

    /// The pool shipped with the crate; covers every themed category.
    pub fn builtin() -> Self {
        let templates = vec![
            TaskTemplate::new("文学", "读一首短诗，慢慢读两遍。", "2–3", "文字会陪着你。"),
            TaskTemplate::new("文学", "翻开一本书，随便读一页。", "3–5", "一页也是一段旅程。"),
            TaskTemplate::new("艺术", "在纸上随手画一朵云。", "2–5", "画得像不像都没关系。"),
            TaskTemplate::new("艺术", "找一样颜色好看的东西，盯着看一会儿。", "1–2", "你发现了美。"),
            TaskTemplate::new("写作", "写下今天让你微笑的一件事。", "2–5", "记住它，就多了一点光。"),
            TaskTemplate::new("写作", "给未来的自己写一句话。", "2–3", "未来的你会收到的。"),
            TaskTemplate::new("音乐", "听一首你喜欢的歌，什么都不做。", "3–5", "耳朵也需要休息。"),
            TaskTemplate::new("音乐", "轻轻哼一段旋律。", "1–2", "你的声音很好听。"),
            TaskTemplate::new("放松", "闭上眼睛，做三次深呼吸。", "1–2", "慢一点也没关系。"),
            TaskTemplate::new("放松", "伸个懒腰，转转肩膀。", "1–2", "身体在谢谢你。"),
            TaskTemplate::new("放松", "喝一杯温水。", "1–2", "照顾自己从小事开始。"),
            TaskTemplate::new("好奇心", "查一个你一直好奇的小问题。", "3–5", "好奇心是很棒的礼物。"),
            TaskTemplate::new("好奇心", "看看窗外，找一样以前没注意到的东西。", "2–3", "世界一直在等你发现。"),
            TaskTemplate::new("生活", "把桌面上的一小块地方收拾干净。", "3–5", "整洁一点，心也轻一点。"),
            TaskTemplate::new("生活", "给房间里的植物浇浇水。", "1–2", "你们都在慢慢长大。"),
            TaskTemplate::new("家庭", "给家人发一条问候的消息。", "2–3", "被想念是很温暖的事。"),
            TaskTemplate::new("家庭", "翻一张旧照片，回忆那天。", "2–5", "那些日子一直都在。"),
            TaskTemplate::new("学习", "学一个新单词，并用它造个句子。", "3–5", "每天一点点就很好。"),
            TaskTemplate::new("学术", "读一篇论文的摘要。", "5", "不求读懂全部，开始就好。"),
            TaskTemplate::new("帮助", "对身边的人说一声谢谢。", "1–2", "善意会传下去。"),
            TaskTemplate::new("帮助", "帮别人做一件很小的事。", "2–5", "你让世界更柔软了。"),
        ];
        Self { templates }
    }
}
