//! Conversation state: phase, task title, and accumulated refinement answers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One discrete stage of the refinement state machine.
///
/// Phases advance monotonically (`Idle -> Refining -> Subtasks -> Complete`)
/// except for the explicit reset back to `Idle` after completion or
/// cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Refining,
    Subtasks,
    Complete,
}

impl Phase {
    /// Wire name for this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Refining => "refining",
            Phase::Subtasks => "subtasks",
            Phase::Complete => "complete",
        }
    }
}

/// Ephemeral per-conversation state, held only for the duration of a chat
/// session. Losing it is acceptable; the real artifacts (task + subtasks)
/// are persisted separately once confirmed.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Current phase
    pub phase: Phase,
    /// Task title, set once from the first task-intent message and immutable
    /// for the remainder of the conversation
    pub task_title: Option<String>,
    /// Accumulated refinement answers, keyed per clarifying turn
    pub refined_data: BTreeMap<String, String>,
    /// Number of clarifying answers recorded. A dedicated counter, not the
    /// size of `refined_data`, so recording more than one field per turn can
    /// never skew the turn budget.
    pub clarify_turns: u32,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            task_title: None,
            refined_data: BTreeMap::new(),
            clarify_turns: 0,
        }
    }
}

impl ConversationState {
    /// Set the task title if not already set.
    pub fn set_task_title(&mut self, title: impl Into<String>) {
        if self.task_title.is_none() {
            self.task_title = Some(title.into());
        }
    }

    /// Record one clarifying answer and bump the turn counter.
    pub fn record_answer(&mut self, answer: impl Into<String>) {
        self.clarify_turns += 1;
        self.refined_data
            .insert(format!("q{}", self.clarify_turns), answer.into());
    }

    /// Reset to `Idle`, discarding everything accumulated this session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Wire snapshot of this state for completion requests.
    pub fn snapshot(&self) -> aide_api::ConversationSnapshot {
        aide_api::ConversationSnapshot {
            phase: self.phase.as_str().to_string(),
            task_title: self.task_title.clone(),
            refined_data: self.refined_data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = ConversationState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.task_title.is_none());
        assert_eq!(state.clarify_turns, 0);
    }

    #[test]
    fn test_task_title_set_once() {
        let mut state = ConversationState::default();
        state.set_task_title("first");
        state.set_task_title("second");
        assert_eq!(state.task_title.as_deref(), Some("first"));
    }

    #[test]
    fn test_record_answer_bumps_counter() {
        let mut state = ConversationState::default();
        state.record_answer("by Friday");
        state.record_answer("about an hour");
        assert_eq!(state.clarify_turns, 2);
        assert_eq!(state.refined_data.get("q1").map(String::as_str), Some("by Friday"));
        assert_eq!(state.refined_data.get("q2").map(String::as_str), Some("about an hour"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = ConversationState::default();
        state.phase = Phase::Subtasks;
        state.set_task_title("t");
        state.record_answer("a");
        state.reset();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.task_title.is_none());
        assert!(state.refined_data.is_empty());
        assert_eq!(state.clarify_turns, 0);
    }

    #[test]
    fn test_phase_wire_names() {
        assert_eq!(Phase::Idle.as_str(), "idle");
        assert_eq!(Phase::Subtasks.as_str(), "subtasks");
        assert_eq!(serde_json::to_value(Phase::Refining).unwrap(), "refining");
    }
}
