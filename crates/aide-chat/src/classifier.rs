//! Task-creation-intent classifier
//!
//! Decides whether a free-text message should start a task-refinement
//! conversation or be treated as a general query. This is a best-effort
//! heuristic: a false positive degrades to a clarifying question, a false
//! negative degrades to a plain text reply.

use regex::Regex;
use std::sync::LazyLock;

/// Messages shorter than this are assumed to be task titles rather than
/// open-ended questions.
const SHORT_MESSAGE_CHARS: usize = 80;

/// Keyword patterns signalling task-creation intent (English and Japanese
/// task vocabulary).
static TASK_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\btask\b",
        r"(?i)\btodo\b",
        r"(?i)\b(create|add|make|plan|prepare|finish|organize)\b",
        r"(?i)\b(deadline|due)\b",
        r"タスク",
        r"作成",
        r"作り",
        r"準備",
        r"やること",
        r"予定",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Classify a message as task-creation intent.
pub fn is_task_intent(message: &str) -> bool {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return false;
    }
    if TASK_PATTERNS.iter().any(|re| re.is_match(trimmed)) {
        return true;
    }
    trimmed.chars().count() < SHORT_MESSAGE_CHARS
}
