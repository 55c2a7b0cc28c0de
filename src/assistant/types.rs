//! Wire types for the assistant API (threads, messages, runs).

use crate::error::TrsuError;
use serde::{Deserialize, Serialize};

/// Parameters of the assistant persona created for a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantSpec {
    pub model: String,
    pub name: String,
    pub instructions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Thread {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Text of the first content block, if that block is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first()? {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        }
    }
}

/// One block of message content. Only text blocks are read; images and
/// other block kinds are kept as [`MessageContent::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// Body of a message creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

/// Body of a run creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewRun<'a> {
    pub assistant_id: &'a str,
}

/// Lifecycle state of a run.
///
/// `Queued`, `InProgress` and `Cancelling` are transient; everything else is
/// final for this client. `RequiresAction` counts as final because no tools
/// are ever registered, so nothing could satisfy the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// A status this client does not know yet; polled like `InProgress`.
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling | RunStatus::Unknown
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

impl Run {
    /// Error describing why a terminal, non-completed run ended.
    pub fn failure(&self) -> TrsuError {
        let run_id = self.id.clone();
        match self.status {
            RunStatus::Failed => TrsuError::RunFailed {
                run_id,
                message: self
                    .last_error
                    .as_ref()
                    .map(|e| match (e.code.is_empty(), e.message.is_empty()) {
                        (false, false) => format!("{}: {}", e.code, e.message),
                        (true, false) => e.message.clone(),
                        (false, true) => e.code.clone(),
                        (true, true) => "unknown error".to_string(),
                    })
                    .unwrap_or_else(|| "unknown error".to_string()),
            },
            RunStatus::Cancelled => TrsuError::RunCancelled { run_id },
            RunStatus::Expired => TrsuError::RunExpired { run_id },
            RunStatus::Incomplete => TrsuError::RunIncomplete {
                run_id,
                reason: self
                    .incomplete_details
                    .as_ref()
                    .and_then(|d| d.reason.clone())
                    .unwrap_or_else(|| "no reason given".to_string()),
            },
            RunStatus::RequiresAction => TrsuError::RunRequiresAction { run_id },
            status => TrsuError::Other(format!("Run {run_id} has not failed (status {status})")),
        }
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_status_terminal_states() {
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::Cancelling.is_terminal());
        assert!(!RunStatus::Unknown.is_terminal());

        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(RunStatus::Incomplete.is_terminal());
        assert!(RunStatus::RequiresAction.is_terminal());
    }

    #[test]
    fn run_status_deserializes_snake_case() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);
        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::RequiresAction);
    }

    #[test]
    fn unknown_run_status_is_tolerated() {
        let status: RunStatus = serde_json::from_str("\"warming_up\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);
    }

    #[test]
    fn run_status_display_matches_wire_name() {
        assert_eq!(RunStatus::InProgress.to_string(), "in_progress");
        assert_eq!(RunStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn run_deserializes_with_failure_details() {
        let json = r#"{
            "id": "run_1",
            "object": "thread.run",
            "status": "failed",
            "last_error": {"code": "rate_limit_exceeded", "message": "Slow down"}
        }"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        match run.failure() {
            TrsuError::RunFailed { run_id, message } => {
                assert_eq!(run_id, "run_1");
                assert_eq!(message, "rate_limit_exceeded: Slow down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn incomplete_run_reports_reason() {
        let json = r#"{"id": "run_2", "status": "incomplete",
                       "incomplete_details": {"reason": "max_completion_tokens"}}"#;
        let run: Run = serde_json::from_str(json).unwrap();
        assert!(matches!(
            run.failure(),
            TrsuError::RunIncomplete { ref reason, .. } if reason == "max_completion_tokens"
        ));
    }

    #[test]
    fn expired_and_cancelled_runs_map_to_distinct_errors() {
        let expired: Run = serde_json::from_str(r#"{"id": "r", "status": "expired"}"#).unwrap();
        assert!(matches!(expired.failure(), TrsuError::RunExpired { .. }));

        let cancelled: Run = serde_json::from_str(r#"{"id": "r", "status": "cancelled"}"#).unwrap();
        assert!(matches!(cancelled.failure(), TrsuError::RunCancelled { .. }));
    }

    #[test]
    fn message_first_text_reads_text_block() {
        let json = r#"{
            "id": "msg_1",
            "role": "assistant",
            "content": [
                {"type": "text", "text": {"value": "The summary.", "annotations": []}},
                {"type": "text", "text": {"value": "ignored", "annotations": []}}
            ]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.first_text(), Some("The summary."));
    }

    #[test]
    fn message_first_text_skips_non_text_block() {
        let json = r#"{
            "id": "msg_2",
            "role": "assistant",
            "content": [{"type": "image_file", "image_file": {"file_id": "file_1"}}]
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.content, vec![MessageContent::Other]);
        assert_eq!(message.first_text(), None);
    }

    #[test]
    fn new_message_serializes_role_lowercase() {
        let body = serde_json::to_value(NewMessage {
            role: Role::User,
            content: "hello",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"role": "user", "content": "hello"}));
    }

    #[test]
    fn assistant_spec_serializes_all_fields() {
        let body = serde_json::to_value(AssistantSpec {
            model: "gpt-3.5-turbo".to_string(),
            name: "transcript-summarizer".to_string(),
            instructions: "Summarize".to_string(),
        })
        .unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["name"], "transcript-summarizer");
        assert_eq!(body["instructions"], "Summarize");
    }
}
