//! Conversation coordinator: the refinement state machine
//!
//! Owns conversation state, turn-taking, and phase transitions. The LLM
//! collaborator only ever supplies content; every structural decision (when
//! to ask, when to propose, what the selection set contains) is made here,
//! so a model that wanted to keep asking questions forever is structurally
//! prevented from doing so by the clarifying-turn budget.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::applier::{ApplyOutcome, PlanApplier};
use crate::classifier::is_task_intent;
use crate::client::Completion;
use crate::error::Result;
use crate::events::ChatEvent;
use crate::message::{ChatMessage, MessageKind, TaskData};
use crate::state::{ConversationState, Phase};
use crate::store::TaskStore;
use crate::{fallback, prompt};

/// Coordinator configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Organization the created records belong to
    pub organization_id: String,
    /// Optional project for created subtasks
    pub project_id: Option<String>,
    /// Number of clarifying answers collected before a plan is proposed.
    /// A hard cap, not negotiable by the model.
    pub turn_budget: u32,
}

impl ChatConfig {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            project_id: None,
            turn_budget: 2,
        }
    }
}

/// Drives one conversation from free-text task intent to a persisted plan.
///
/// One coordinator per conversation; state is never shared across sessions
/// and has no durability requirement.
pub struct ConversationCoordinator {
    config: ChatConfig,
    completion: Arc<dyn Completion>,
    store: Arc<dyn TaskStore>,
    state: ConversationState,
    messages: Vec<ChatMessage>,
    selection: BTreeSet<usize>,
    proposal: Option<TaskData>,
    in_flight: bool,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl ConversationCoordinator {
    /// Create a new coordinator with its collaborators.
    pub fn new(config: ChatConfig, completion: Arc<dyn Completion>, store: Arc<dyn TaskStore>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            config,
            completion,
            store,
            state: ConversationState::default(),
            messages: vec![],
            selection: BTreeSet::new(),
            proposal: None,
            in_flight: false,
            event_tx,
        }
    }

    /// Subscribe to conversation events.
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Current conversation state.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// All messages rendered so far.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Currently selected subtask indices.
    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    /// The pending proposal, if one is awaiting confirmation.
    pub fn proposal(&self) -> Option<&TaskData> {
        self.proposal.as_ref()
    }

    /// Whether a collaborator call is currently in flight.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Handle a free-text user message.
    ///
    /// Never surfaces a collaborator failure: unreachable or unparseable
    /// responses are replaced by canned content so the conversation always
    /// has a next assistant message.
    pub async fn submit_free_text(&mut self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return Ok(());
        }
        self.push_message(ChatMessage::user(text));
        self.advance(text, None).await
    }

    /// Handle the user clicking an option on a question message.
    ///
    /// A no-op if any option on that message is already selected (at most
    /// one unselected-to-selected transition per message); otherwise marks
    /// it, echoes the label as a synthetic user message, and proceeds as
    /// `submit_free_text` would with the label as content.
    pub async fn select_option(&mut self, message_id: uuid::Uuid, index: usize) -> Result<()> {
        if self.in_flight {
            return Ok(());
        }

        let label = {
            let Some(msg) = self.messages.iter_mut().find(|m| m.id == message_id) else {
                return Ok(());
            };
            if msg.kind != MessageKind::Options || !msg.resolve_option(index) {
                return Ok(());
            }
            msg.options[index].label.clone()
        };

        self.push_message(ChatMessage::user(label.clone()));
        self.advance(&label, Some(format!("option-{}", index + 1))).await
    }

    /// Toggle one subtask in the pending proposal. Purely local; never calls
    /// the collaborator.
    pub fn toggle_subtask(&mut self, index: usize) {
        if self.state.phase != Phase::Subtasks {
            return;
        }
        let len = self.proposal.as_ref().map_or(0, |p| p.subtasks.len());
        if index >= len {
            return;
        }
        if !self.selection.remove(&index) {
            self.selection.insert(index);
        }
    }

    /// Persist the pending proposal for the selected subtasks.
    ///
    /// Guarded: a no-op (`Ok(None)`) when there is no proposal, the selection
    /// is empty, or a submission is already in flight. On success the
    /// conversation resets to `Idle` so it can continue.
    pub async fn confirm_selection(&mut self) -> Result<Option<ApplyOutcome>> {
        if self.in_flight || self.state.phase != Phase::Subtasks || self.selection.is_empty() {
            return Ok(None);
        }
        let Some(proposal) = self.proposal.clone() else {
            return Ok(None);
        };

        self.in_flight = true;
        let result = {
            let applier = PlanApplier::new(
                self.store.as_ref(),
                &self.config.organization_id,
                self.config.project_id.as_deref(),
            );
            applier.apply(&proposal, &self.selection).await
        };
        self.in_flight = false;

        match result {
            Ok(outcome) => {
                self.set_phase(Phase::Complete);
                self.push_message(ChatMessage::assistant(fallback::applied_text(
                    &proposal.title,
                    outcome.created,
                )));
                let _ = self.event_tx.send(ChatEvent::PlanApplied {
                    task_id: outcome.task_id.clone(),
                    created: outcome.created,
                    failed: outcome.failed,
                });
                self.reset_conversation();
                Ok(Some(outcome))
            }
            Err(e) => {
                tracing::warn!(error = %e, "plan application failed");
                // State is left unchanged so the user can retry the confirm.
                self.push_message(ChatMessage::assistant(fallback::canned_text()));
                Ok(None)
            }
        }
    }

    /// Abandon the conversation: discard any proposal, persist nothing, and
    /// return to `Idle`.
    pub fn cancel(&mut self) {
        if self.state.phase == Phase::Idle {
            return;
        }
        self.push_message(ChatMessage::assistant(fallback::cancelled_text()));
        self.reset_conversation();
    }

    // ---- Internal turn logic ----

    async fn advance(&mut self, text: &str, option_id: Option<String>) -> Result<()> {
        match self.state.phase {
            Phase::Idle | Phase::Complete => {
                if is_task_intent(text) {
                    self.state.set_task_title(text);
                    self.set_phase(Phase::Refining);
                    self.ask_clarifying(text, option_id).await;
                } else {
                    self.general_reply(text).await;
                }
            }
            Phase::Refining => {
                self.state.record_answer(text);
                if self.state.clarify_turns < self.config.turn_budget {
                    self.ask_clarifying(text, option_id).await;
                } else {
                    self.generate_plan(text).await;
                }
            }
            Phase::Subtasks => {
                self.push_message(ChatMessage::assistant(
                    "There's a plan waiting for you above. Confirm the selected subtasks or cancel it first.",
                ));
            }
        }
        Ok(())
    }

    /// Ask one clarifying question, falling back to canned content.
    async fn ask_clarifying(&mut self, latest: &str, option_id: Option<String>) {
        let request = prompt::build_question_request(&self.state, &self.messages, latest, option_id);

        self.in_flight = true;
        let raw = self.completion.complete(&request).await;
        self.in_flight = false;

        let decoded = match raw {
            Ok(body) => prompt::decode_question(&body),
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                None
            }
        };

        let question = decoded.unwrap_or_else(|| {
            let _ = self.event_tx.send(ChatEvent::Fallback { phase: self.state.phase });
            fallback::canned_question(self.state.clarify_turns)
        });

        self.push_message(ChatMessage::options(question.response, question.options));
    }

    /// Generate the subtask proposal and enter the `Subtasks` phase with all
    /// indices pre-selected.
    async fn generate_plan(&mut self, latest: &str) {
        let request = prompt::build_plan_request(&self.state, &self.messages, latest);

        self.in_flight = true;
        let raw = self.completion.complete(&request).await;
        self.in_flight = false;

        let decoded = match raw {
            Ok(body) => prompt::decode_plan(&body),
            Err(e) => {
                tracing::warn!(error = %e, "completion failed");
                None
            }
        };

        let plan = decoded.unwrap_or_else(|| {
            let _ = self.event_tx.send(ChatEvent::Fallback { phase: self.state.phase });
            fallback::canned_plan(self.state.task_title.as_deref().unwrap_or(latest))
        });

        self.set_phase(Phase::Subtasks);
        self.selection = (0..plan.subtasks.len()).collect();
        self.proposal = Some(plan.clone());
        self.push_message(ChatMessage::subtask_select(
            "Here's a suggested breakdown. Deselect anything you don't need, then confirm.",
            plan,
        ));
    }

    /// Reply to a non-task message with plain text.
    async fn general_reply(&mut self, latest: &str) {
        let request = prompt::build_text_request(&self.state, &self.messages, latest);

        self.in_flight = true;
        let raw = self.completion.complete(&request).await;
        self.in_flight = false;

        let text = raw.ok().and_then(|body| prompt::decode_text(&body)).unwrap_or_else(|| {
            let _ = self.event_tx.send(ChatEvent::Fallback { phase: self.state.phase });
            fallback::canned_text()
        });

        self.push_message(ChatMessage::assistant(text));
    }

    fn push_message(&mut self, message: ChatMessage) {
        let _ = self.event_tx.send(ChatEvent::MessageAdded {
            message: message.clone(),
        });
        self.messages.push(message);
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        self.state.phase = to;
        let _ = self.event_tx.send(ChatEvent::PhaseChanged { from, to });
    }

    fn reset_conversation(&mut self) {
        self.set_phase(Phase::Idle);
        self.state.reset();
        self.selection.clear();
        self.proposal = None;
    }
}
