//! Chat event types emitted by the coordinator

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::state::Phase;

/// Events emitted during a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the conversation
    MessageAdded { message: ChatMessage },

    /// The conversation moved to a new phase
    PhaseChanged { from: Phase, to: Phase },

    /// Canned content was substituted for an unusable collaborator response
    Fallback { phase: Phase },

    /// A confirmed plan was persisted
    PlanApplied {
        task_id: String,
        created: usize,
        failed: usize,
    },
}
