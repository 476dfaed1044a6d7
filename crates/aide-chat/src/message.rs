//! Chat message model: an append-only sequence of rendered turns.
//!
//! Messages are never mutated after creation, with one exception: marking a
//! set of options as resolved once the user picks one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message sender roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Which interactive affordance, if any, is attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Options,
    SubtaskSelect,
}

/// One suggested answer attached to an `Options` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub description: String,
    #[serde(default)]
    pub selected: bool,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            selected: false,
        }
    }
}

/// One proposed subtask within a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskPlan {
    pub title: String,
    #[serde(default)]
    pub can_automate: bool,
}

/// The proposed plan surfaced for user confirmation, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub title: String,
    pub subtasks: Vec<SubtaskPlan>,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_estimate")]
    pub estimated_minutes: u32,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_estimate() -> u32 {
    30
}

/// A single rendered chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub kind: MessageKind,
    pub text: String,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_data: Option<TaskData>,
    pub timestamp: i64,
}

impl ChatMessage {
    fn new(role: Role, kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            kind,
            text: text.into(),
            options: vec![],
            task_data: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create a plain user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, MessageKind::Text, text)
    }

    /// Create a plain assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageKind::Text, text)
    }

    /// Create an assistant question with suggested answers.
    pub fn options(text: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        let mut msg = Self::new(Role::Assistant, MessageKind::Options, text);
        msg.options = options;
        msg
    }

    /// Create an assistant plan proposal.
    pub fn subtask_select(text: impl Into<String>, task_data: TaskData) -> Self {
        let mut msg = Self::new(Role::Assistant, MessageKind::SubtaskSelect, text);
        msg.task_data = Some(task_data);
        msg
    }

    /// Whether any option on this message has already been selected.
    pub fn is_resolved(&self) -> bool {
        self.options.iter().any(|o| o.selected)
    }

    /// Mark one option as selected, freezing the set.
    ///
    /// Returns `true` only on the first successful selection; later calls
    /// (any index) and out-of-range indices leave the message untouched.
    /// At most one option ever carries `selected = true`.
    pub fn resolve_option(&mut self, index: usize) -> bool {
        if self.is_resolved() || index >= self.options.len() {
            return false;
        }
        self.options[index].selected = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> ChatMessage {
        ChatMessage::options(
            "When is this due?",
            vec![
                ChoiceOption::new("Today", "Needs to be done today"),
                ChoiceOption::new("This week", "Some time this week"),
                ChoiceOption::new("No deadline", "Whenever"),
            ],
        )
    }

    #[test]
    fn test_resolve_option_first_selection_wins() {
        let mut msg = question();
        assert!(msg.resolve_option(1));
        assert!(msg.is_resolved());
        assert!(msg.options[1].selected);
    }

    #[test]
    fn test_resolve_option_idempotent_after_first() {
        let mut msg = question();
        assert!(msg.resolve_option(0));
        assert!(!msg.resolve_option(2));
        assert!(msg.options[0].selected);
        assert!(!msg.options[2].selected);
        assert_eq!(msg.options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn test_resolve_option_out_of_range() {
        let mut msg = question();
        assert!(!msg.resolve_option(10));
        assert!(!msg.is_resolved());
    }

    #[test]
    fn test_message_kind_wire_names() {
        let msg = ChatMessage::subtask_select(
            "Here is a plan",
            TaskData {
                title: "t".into(),
                subtasks: vec![SubtaskPlan { title: "s1".into(), can_automate: true }],
                priority: "high".into(),
                estimated_minutes: 60,
            },
        );
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["kind"], "subtask_select");
        assert_eq!(v["taskData"]["subtasks"][0]["canAutomate"], true);
        assert_eq!(v["taskData"]["estimatedMinutes"], 60);
    }

    #[test]
    fn test_task_data_defaults() {
        let data: TaskData =
            serde_json::from_str(r#"{"title":"x","subtasks":[{"title":"a"}]}"#).unwrap();
        assert_eq!(data.priority, "medium");
        assert_eq!(data.estimated_minutes, 30);
        assert!(!data.subtasks[0].can_automate);
    }
}
