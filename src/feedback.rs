//! Celebration messages shown after a task is marked done.

use rand::seq::SliceRandom;

pub const FEEDBACK_MESSAGES: [&str; 8] = [
    "做得很好。",
    "一点点也算前进。",
    "你已经在照顾自己了。",
    "世界在慢慢向你打开。",
    "今天的你很勇敢。",
    "这就够了。",
    "小肥鸟为你感到骄傲！",
    "每一件小事都有意义。",
];

/// Pick one message uniformly at random.
pub fn random_feedback() -> &'static str {
    FEEDBACK_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FEEDBACK_MESSAGES[0])
}
