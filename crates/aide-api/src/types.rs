//! Wire types for the completion and persistence collaborators
//!
//! Field names are camelCase on the wire; the decoder on the other side
//! depends on these shapes exactly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Completion mode sent with every refinement request.
pub const MODE_TASK_REFINE: &str = "task_refine";

/// One turn of trailing conversation history forwarded to the LLM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Snapshot of conversation state included in a completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSnapshot {
    pub phase: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_title: Option<String>,
    #[serde(default)]
    pub refined_data: BTreeMap<String, String>,
}

/// Request payload for the LLM completion collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub message: String,
    pub mode: String,
    pub conversation_state: ConversationSnapshot,
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// A persisted task record returned by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A persisted subtask record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub task_id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Payload for creating a parent task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub priority: String,
    pub estimated_minutes: u32,
    pub status: String,
    pub organization_id: String,
}

impl NewTask {
    /// Create a pending task payload.
    pub fn pending(
        title: impl Into<String>,
        priority: impl Into<String>,
        estimated_minutes: u32,
        organization_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            priority: priority.into(),
            estimated_minutes,
            status: "pending".to_string(),
            organization_id: organization_id.into(),
        }
    }
}

/// Payload for creating a subtask under an existing task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubtask {
    pub title: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape_is_camel_case() {
        let req = CompletionRequest {
            message: "make a task".into(),
            mode: MODE_TASK_REFINE.into(),
            conversation_state: ConversationSnapshot {
                phase: "refining".into(),
                task_title: Some("Prepare slides".into()),
                refined_data: BTreeMap::from([("deadline".into(), "Friday".into())]),
            },
            conversation_history: vec![HistoryEntry::new("user", "hello")],
            option_id: Some("opt-1".into()),
            context: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["mode"], "task_refine");
        assert_eq!(v["conversationState"]["taskTitle"], "Prepare slides");
        assert_eq!(v["conversationState"]["refinedData"]["deadline"], "Friday");
        assert_eq!(v["conversationHistory"][0]["role"], "user");
        assert_eq!(v["optionId"], "opt-1");
        assert!(v.get("context").is_none());
    }

    #[test]
    fn test_new_task_pending_status() {
        let t = NewTask::pending("Prepare slides", "high", 90, "org-1");
        assert_eq!(t.status, "pending");
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["estimatedMinutes"], 90);
        assert_eq!(v["organizationId"], "org-1");
    }

    #[test]
    fn test_task_decodes_with_missing_optionals() {
        let t: Task = serde_json::from_str(r#"{"id":"t1","title":"x"}"#).unwrap();
        assert_eq!(t.id, "t1");
        assert!(t.priority.is_none());
        assert!(t.created_at.is_none());
    }
}
