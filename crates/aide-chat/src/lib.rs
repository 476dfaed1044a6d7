//! aide-chat: conversational task-refinement state machine
//!
//! This crate drives a bounded multi-turn exchange from a free-text task idea
//! to a concrete, editable subtask plan. The external LLM only supplies
//! content (question text, option labels, subtask titles); the coordinator
//! here enforces protocol: phase transitions, the clarifying-turn budget,
//! selection bookkeeping, and fallbacks when the model is unreachable or
//! returns unusable output.

pub mod applier;
pub mod classifier;
pub mod client;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod fallback;
pub mod message;
pub mod prompt;
pub mod state;
pub mod store;

pub use applier::{ApplyOutcome, PlanApplier};
pub use client::{Completion, HttpCompletion};
pub use coordinator::{ChatConfig, ConversationCoordinator};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use message::{ChatMessage, ChoiceOption, MessageKind, Role, SubtaskPlan, TaskData};
pub use state::{ConversationState, Phase};
pub use store::{HttpTaskStore, MemoryTaskStore, TaskStore};
