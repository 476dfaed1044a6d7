//! Canned fallback content
//!
//! Fixed, non-generative responses substituted whenever the LLM collaborator
//! is unreachable or its output decodes to nothing usable. The conversation
//! must never dead-end on an external failure, so every phase has a
//! deterministic next message.

use crate::message::{ChoiceOption, SubtaskPlan, TaskData};
use crate::prompt::QuestionReply;

/// Canned clarifying question for the given clarifying turn (0-indexed).
/// Rotates through fixed topics so consecutive fallbacks do not repeat.
pub fn canned_question(turn: u32) -> QuestionReply {
    match turn % 2 {
        0 => QuestionReply {
            response: "When does this need to be done?".to_string(),
            options: vec![
                ChoiceOption::new("Today", "It has to be finished today"),
                ChoiceOption::new("This week", "Some time in the next few days"),
                ChoiceOption::new("This month", "There is no near-term pressure"),
                ChoiceOption::new("No deadline", "Whenever there is time"),
            ],
        },
        _ => QuestionReply {
            response: "How much effort do you expect this to take?".to_string(),
            options: vec![
                ChoiceOption::new("Under an hour", "A quick item"),
                ChoiceOption::new("A few hours", "Most of a morning or afternoon"),
                ChoiceOption::new("A full day", "Roughly one working day"),
                ChoiceOption::new("Several days", "A larger piece of work"),
            ],
        },
    }
}

/// Canned plan derived from the task title. Always non-empty so confirmation
/// still works during a collaborator outage.
pub fn canned_plan(task_title: &str) -> TaskData {
    let title = if task_title.trim().is_empty() {
        "New task".to_string()
    } else {
        task_title.trim().to_string()
    };

    TaskData {
        subtasks: vec![
            SubtaskPlan {
                title: format!("Clarify the goal of \"{}\"", title),
                can_automate: false,
            },
            SubtaskPlan {
                title: "Collect the material you need".to_string(),
                can_automate: false,
            },
            SubtaskPlan {
                title: "Produce a first draft".to_string(),
                can_automate: false,
            },
            SubtaskPlan {
                title: "Review and finalize".to_string(),
                can_automate: false,
            },
        ],
        title,
        priority: "medium".to_string(),
        estimated_minutes: 60,
    }
}

/// Canned plain reply for the non-task path.
pub fn canned_text() -> String {
    "Sorry, something went wrong on my side. Please try again.".to_string()
}

/// Success message rendered after a confirmed plan is persisted.
pub fn applied_text(task_title: &str, created: usize) -> String {
    format!(
        "Created \"{}\" with {} subtask{}. Anything else?",
        task_title,
        created,
        if created == 1 { "" } else { "s" }
    )
}

/// Message rendered when the user cancels a proposal.
pub fn cancelled_text() -> String {
    "Okay, I discarded that plan. Tell me about another task whenever you're ready.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_questions_rotate() {
        let first = canned_question(0);
        let second = canned_question(1);
        assert_ne!(first.response, second.response);
        assert_eq!(first.options.len(), 4);
        assert_eq!(second.options.len(), 4);
        assert_eq!(canned_question(2).response, first.response);
    }

    #[test]
    fn test_canned_plan_is_never_empty() {
        let plan = canned_plan("資料作成");
        assert_eq!(plan.title, "資料作成");
        assert!(!plan.subtasks.is_empty());

        let blank = canned_plan("   ");
        assert_eq!(blank.title, "New task");
        assert!(!blank.subtasks.is_empty());
    }

    #[test]
    fn test_applied_text_pluralizes() {
        assert!(applied_text("T", 1).contains("1 subtask."));
        assert!(applied_text("T", 5).contains("5 subtasks."));
    }
}
