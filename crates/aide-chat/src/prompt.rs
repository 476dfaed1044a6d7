//! Refinement prompt construction and tolerant response decoding
//!
//! Pure translation layer: builds the exact completion request for the
//! current phase and decodes the raw response text back into a question or a
//! plan. Decoders return `None` instead of erroring so callers can apply
//! deterministic fallbacks; model output is treated as unreliable input, not
//! a typed API.

use std::fmt::Write;

use aide_api::{CompletionRequest, HistoryEntry, MODE_TASK_REFINE};

use crate::message::{ChatMessage, ChoiceOption, Role, TaskData};
use crate::state::ConversationState;

/// Maximum number of trailing history turns forwarded with a request.
pub const HISTORY_WINDOW: usize = 10;

/// Bounds on the suggested-answer list of a clarifying question. The model
/// is asked for 3-4 options; decoded lists outside these bounds are clamped
/// or rejected rather than rendered as-is.
const MIN_OPTIONS: usize = 2;
const MAX_OPTIONS: usize = 4;

/// A decoded clarifying question.
#[derive(Debug, Clone)]
pub struct QuestionReply {
    pub response: String,
    pub options: Vec<ChoiceOption>,
}

/// Build the request asking for one clarifying question with 3-4 options.
pub fn build_question_request(
    state: &ConversationState,
    history: &[ChatMessage],
    latest_message: &str,
    option_id: Option<String>,
) -> CompletionRequest {
    let mut message = String::new();
    let _ = writeln!(
        message,
        "The user wants to create a task: {:?}.",
        state.task_title.as_deref().unwrap_or(latest_message)
    );
    if !state.refined_data.is_empty() {
        let _ = writeln!(message, "Answers so far:");
        for (key, answer) in &state.refined_data {
            let _ = writeln!(message, "- {}: {}", key, answer);
        }
    }
    let _ = writeln!(message, "Latest user input: {}", latest_message);
    let _ = writeln!(
        message,
        "Ask exactly one short clarifying question about a detail still missing \
         (deadline, scope, priority, or effort). Answer with exactly one JSON object \
         of the shape {{\"response\":\"...\",\"options\":[{{\"label\":\"...\",\"description\":\"...\"}}]}} \
         with 3 or 4 options. No other text."
    );

    CompletionRequest {
        message,
        mode: MODE_TASK_REFINE.to_string(),
        conversation_state: state.snapshot(),
        conversation_history: history_tail(history),
        option_id,
        context: None,
    }
}

/// Build the request asking for a full subtask plan.
pub fn build_plan_request(
    state: &ConversationState,
    history: &[ChatMessage],
    latest_message: &str,
) -> CompletionRequest {
    let mut message = String::new();
    let _ = writeln!(
        message,
        "Break the task {:?} into concrete subtasks.",
        state.task_title.as_deref().unwrap_or(latest_message)
    );
    for (key, answer) in &state.refined_data {
        let _ = writeln!(message, "- {}: {}", key, answer);
    }
    let _ = writeln!(
        message,
        "Answer with exactly one JSON object of the shape \
         {{\"title\":\"...\",\"subtasks\":[{{\"title\":\"...\",\"canAutomate\":false}}],\
         \"priority\":\"low|medium|high\",\"estimatedMinutes\":0}}. \
         4 to 7 subtasks, ordered. No other text."
    );

    CompletionRequest {
        message,
        mode: MODE_TASK_REFINE.to_string(),
        conversation_state: state.snapshot(),
        conversation_history: history_tail(history),
        option_id: None,
        context: None,
    }
}

/// Build the request for a plain (non-task) reply.
pub fn build_text_request(
    state: &ConversationState,
    history: &[ChatMessage],
    latest_message: &str,
) -> CompletionRequest {
    let message = format!(
        "Reply briefly and helpfully to the user. Answer with exactly one JSON \
         object of the shape {{\"response\":\"...\"}}. No other text.\n\
         User input: {}",
        latest_message
    );

    CompletionRequest {
        message,
        mode: MODE_TASK_REFINE.to_string(),
        conversation_state: state.snapshot(),
        conversation_history: history_tail(history),
        option_id: None,
        context: None,
    }
}

/// Bounded trailing window of history; unbounded history is never forwarded.
fn history_tail(history: &[ChatMessage]) -> Vec<HistoryEntry> {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|m| {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            HistoryEntry::new(role, m.text.clone())
        })
        .collect()
}

/// Locate the first `{` through the last `}` of a raw model response,
/// preferring the inside of a ```json fence when one is present.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + "```json".len()..];
        if let Some(end) = rest.find("```") {
            return Some(rest[..end].trim());
        }
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(text[start..=end].trim())
}

/// Decode a clarifying question from raw response text.
///
/// Accepts the `{response, options}` shape directly or wrapped in a
/// collaborator envelope. The option list is a structural invariant owned
/// here, not by the model: fewer than `MIN_OPTIONS` usable options rejects
/// the decode, and anything beyond `MAX_OPTIONS` is dropped.
pub fn decode_question(raw: &str) -> Option<QuestionReply> {
    let value: serde_json::Value = serde_json::from_str(extract_json(raw)?).ok()?;

    let response = value.get("response")?.as_str()?.to_string();
    let options = value.get("options")?.as_array()?;

    let mut options: Vec<ChoiceOption> = options
        .iter()
        .filter_map(|o| {
            let label = o.get("label")?.as_str()?;
            let description = o.get("description").and_then(|d| d.as_str()).unwrap_or("");
            Some(ChoiceOption::new(label, description))
        })
        .collect();

    if options.len() < MIN_OPTIONS {
        tracing::debug!(count = options.len(), "question decode rejected: too few options");
        return None;
    }
    options.truncate(MAX_OPTIONS);
    Some(QuestionReply { response, options })
}

/// Decode a subtask plan from raw response text.
///
/// Accepts the plan shape at the top level or nested under a `taskData`
/// envelope key; requires a non-empty title and subtask list.
pub fn decode_plan(raw: &str) -> Option<TaskData> {
    let value: serde_json::Value = serde_json::from_str(extract_json(raw)?).ok()?;
    let candidate = value.get("taskData").unwrap_or(&value);

    let data: TaskData = serde_json::from_value(candidate.clone()).ok()?;
    if data.title.trim().is_empty() || data.subtasks.is_empty() {
        tracing::debug!("plan decode rejected: empty title or subtasks");
        return None;
    }
    Some(data)
}

/// Decode a plain text reply from raw response text.
pub fn decode_text(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(extract_json(raw)?).ok()?;
    let response = value.get("response")?.as_str()?.trim();
    if response.is_empty() {
        return None;
    }
    Some(response.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    fn refining_state() -> ConversationState {
        let mut state = ConversationState::default();
        state.phase = Phase::Refining;
        state.set_task_title("Prepare slides");
        state
    }

    #[test]
    fn test_history_is_truncated_to_window() {
        let history: Vec<ChatMessage> =
            (0..25).map(|i| ChatMessage::user(format!("m{}", i))).collect();
        let req = build_question_request(&refining_state(), &history, "latest", None);
        assert_eq!(req.conversation_history.len(), HISTORY_WINDOW);
        assert_eq!(req.conversation_history[0].content, "m15");
        assert_eq!(req.conversation_history[9].content, "m24");
    }

    #[test]
    fn test_question_request_carries_state_and_mode() {
        let mut state = refining_state();
        state.record_answer("by Friday");
        let req = build_question_request(&state, &[], "by Friday", Some("option-1".into()));
        assert_eq!(req.mode, "task_refine");
        assert_eq!(req.conversation_state.phase, "refining");
        assert_eq!(req.conversation_state.task_title.as_deref(), Some("Prepare slides"));
        assert_eq!(req.option_id.as_deref(), Some("option-1"));
        assert!(req.message.contains("by Friday"));
        assert!(req.message.contains("\"options\""));
    }

    #[test]
    fn test_plan_request_instructs_plan_shape() {
        let req = build_plan_request(&refining_state(), &[], "go");
        assert!(req.message.contains("\"subtasks\""));
        assert!(req.message.contains("canAutomate"));
    }

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_extract_json_with_prose() {
        let raw = r#"Sure, here you go: {"a": 1} hope that helps!"#;
        assert_eq!(extract_json(raw), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_extract_json_fenced() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_none_on_garbage() {
        assert_eq!(extract_json("not json"), None);
        assert_eq!(extract_json("} backwards {"), None);
    }

    #[test]
    fn test_decode_question_success() {
        let raw = r#"{"response":"When is this due?","options":[
            {"label":"Today","description":"By end of day"},
            {"label":"This week","description":""}]}"#;
        let q = decode_question(raw).unwrap();
        assert_eq!(q.response, "When is this due?");
        assert_eq!(q.options.len(), 2);
        assert_eq!(q.options[0].label, "Today");
        assert!(!q.options[0].selected);
    }

    #[test]
    fn test_decode_question_rejects_empty_options() {
        assert!(decode_question(r#"{"response":"q","options":[]}"#).is_none());
        assert!(decode_question(r#"{"response":"q"}"#).is_none());
        assert!(decode_question("not json").is_none());
    }

    #[test]
    fn test_decode_question_rejects_single_option() {
        let raw = r#"{"response":"q","options":[{"label":"Only choice","description":""}]}"#;
        assert!(decode_question(raw).is_none());
    }

    #[test]
    fn test_decode_question_truncates_rambling_option_list() {
        let options: Vec<String> = (0..20)
            .map(|i| format!(r#"{{"label":"choice {}","description":""}}"#, i))
            .collect();
        let raw = format!(r#"{{"response":"q","options":[{}]}}"#, options.join(","));

        let q = decode_question(&raw).unwrap();
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.options[0].label, "choice 0");
        assert_eq!(q.options[3].label, "choice 3");
    }

    #[test]
    fn test_decode_question_counts_only_usable_options() {
        // Malformed entries don't count toward the minimum.
        let raw = r#"{"response":"q","options":[
            {"label":"Valid","description":""},
            {"description":"no label"},
            {"label":42}]}"#;
        assert!(decode_question(raw).is_none());
    }

    #[test]
    fn test_decode_plan_top_level() {
        let raw = r#"Here is the plan:
            {"title":"Prepare slides","subtasks":[{"title":"Draft outline"},
            {"title":"Collect data","canAutomate":true}],"priority":"high","estimatedMinutes":120}"#;
        let plan = decode_plan(raw).unwrap();
        assert_eq!(plan.title, "Prepare slides");
        assert_eq!(plan.subtasks.len(), 2);
        assert!(plan.subtasks[1].can_automate);
        assert_eq!(plan.estimated_minutes, 120);
    }

    #[test]
    fn test_decode_plan_enveloped() {
        let raw = r#"{"response":"done","type":"subtask_select",
            "taskData":{"title":"T","subtasks":[{"title":"s1"}]}}"#;
        let plan = decode_plan(raw).unwrap();
        assert_eq!(plan.title, "T");
        assert_eq!(plan.priority, "medium");
    }

    #[test]
    fn test_decode_plan_rejects_empty_subtasks() {
        assert!(decode_plan(r#"{"title":"T","subtasks":[]}"#).is_none());
        assert!(decode_plan(r#"{"title":"  ","subtasks":[{"title":"s"}]}"#).is_none());
        assert!(decode_plan("garbage").is_none());
    }

    #[test]
    fn test_decode_text() {
        assert_eq!(decode_text(r#"{"response":"hi there"}"#).as_deref(), Some("hi there"));
        assert!(decode_text(r#"{"response":"  "}"#).is_none());
        assert!(decode_text("plain prose").is_none());
    }
}
