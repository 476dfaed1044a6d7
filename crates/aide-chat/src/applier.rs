//! Plan applier: turns a confirmed proposal into persisted records
//!
//! Best-effort semantics: one parent task, then one subtask per selected
//! index in proposal order. An individual subtask failure is logged and
//! skipped; the parent is never rolled back.

use std::collections::BTreeSet;

use aide_api::{NewSubtask, NewTask};

use crate::error::Result;
use crate::message::TaskData;
use crate::store::TaskStore;

/// Title prefix marking subtasks the model flagged as automatable.
/// A naming convention, not a separate field.
const AUTO_PREFIX: &str = "[auto] ";

/// Report of what a plan application actually created.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// Id of the created parent task
    pub task_id: String,
    /// Number of subtasks created
    pub created: usize,
    /// Number of selected subtasks whose creation failed
    pub failed: usize,
}

/// Applies a confirmed, user-filtered plan via the persistence collaborator.
pub struct PlanApplier<'a> {
    store: &'a dyn TaskStore,
    organization_id: &'a str,
    project_id: Option<&'a str>,
}

impl<'a> PlanApplier<'a> {
    pub fn new(
        store: &'a dyn TaskStore,
        organization_id: &'a str,
        project_id: Option<&'a str>,
    ) -> Self {
        Self {
            store,
            organization_id,
            project_id,
        }
    }

    /// Persist the proposal for the selected subtask indices.
    ///
    /// The selection set is authoritative over the proposal: deselected
    /// indices are never created. Returns `Err` only when the parent task
    /// itself cannot be created.
    pub async fn apply(&self, proposal: &TaskData, selection: &BTreeSet<usize>) -> Result<ApplyOutcome> {
        let task = self
            .store
            .create_task(&NewTask::pending(
                &proposal.title,
                &proposal.priority,
                proposal.estimated_minutes,
                self.organization_id,
            ))
            .await?;

        let mut created = 0;
        let mut failed = 0;

        for (index, subtask) in selection
            .iter()
            .filter_map(|&i| proposal.subtasks.get(i).map(|s| (i, s)))
        {
            let title = if subtask.can_automate {
                format!("{}{}", AUTO_PREFIX, subtask.title)
            } else {
                subtask.title.clone()
            };

            let payload = NewSubtask {
                title,
                organization_id: self.organization_id.to_string(),
                project_id: self.project_id.map(str::to_string),
            };

            match self.store.create_subtask(&task.id, &payload).await {
                Ok(_) => created += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        index,
                        subtask = %subtask.title,
                        error = %e,
                        "subtask creation failed, continuing"
                    );
                }
            }
        }

        Ok(ApplyOutcome {
            task_id: task.id,
            created,
            failed,
        })
    }
}
