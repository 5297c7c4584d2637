//! Wire types for the remote assistant API
//!
//! Only the fields the orchestrator and the proxy surface rely on are
//! modeled; everything else the provider sends is ignored on parse.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A server-side conversation container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// Remote run status.
///
/// `Queued` and `InProgress` are the only active statuses; everything else
/// settles the poll loop. Statuses the provider adds later parse as
/// `Unknown` and are treated as settled so a turn can still fail cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Whether the poll loop should stop on this status.
    pub fn is_settled(self) -> bool {
        !matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
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

/// One execution attempt of the assistant against a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Missing on provider error bodies; callers must check before use.
    #[serde(default)]
    pub id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<RunError>,
}

impl Run {
    /// The tool calls this run is blocked on (empty unless `requires_action`).
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.required_action
            .as_ref()
            .map(|a| a.submit_tool_outputs.tool_calls.as_slice())
            .unwrap_or_default()
    }
}

/// Structured payload attached to a `requires_action` run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredAction {
    pub submit_tool_outputs: SubmitToolOutputs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    pub tool_calls: Vec<ToolCall>,
}

/// Error detail the provider attaches to failed runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A function call the assistant wants answered before the run can continue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    /// The argument payload. The wire carries arguments as a JSON-encoded
    /// string; malformed payloads parse as `Null` so the handler can reject
    /// them with an error output instead of aborting the batch.
    pub fn parsed_arguments(&self) -> Value {
        serde_json::from_str(&self.function.arguments).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// The client-submitted result satisfying one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// Function definition attached to run creation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Message role. Anything besides user/assistant parses as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    #[serde(other)]
    Other,
}

/// One content block of a thread message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// A message in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl Message {
    /// Concatenated text content.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Unsupported => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Message listing, newest first (provider ordering).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<Message>,
}

impl MessageList {
    /// The most recent assistant message's text, i.e. the turn's reply.
    pub fn latest_assistant_text(&self) -> Option<String> {
        self.data
            .iter()
            .find(|m| m.role == MessageRole::Assistant)
            .map(Message::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_requires_action_run() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_abc",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "generate_image",
                            "arguments": "{\"prompt\":\"sunset\"}"
                        }
                    }]
                }
            }
        }))
        .unwrap();

        assert_eq!(run.status, RunStatus::RequiresAction);
        let calls = run.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name(), "generate_image");
        assert_eq!(calls[0].parsed_arguments()["prompt"], "sunset");
    }

    #[test]
    fn error_body_without_id_parses_as_empty() {
        let run: Run = serde_json::from_value(json!({ "status": "failed" })).unwrap();
        assert!(run.id.is_empty());
        assert!(run.tool_calls().is_empty());
    }

    #[test]
    fn unknown_status_is_settled() {
        let run: Run =
            serde_json::from_value(json!({ "id": "r", "status": "incomplete" })).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(run.status.is_settled());
    }

    #[test]
    fn malformed_arguments_parse_as_null() {
        let call = ToolCall {
            id: "call_1".into(),
            function: FunctionCall {
                name: "generate_image".into(),
                arguments: "{not json".into(),
            },
        };
        assert!(call.parsed_arguments().is_null());
    }

    #[test]
    fn latest_assistant_text_skips_newer_user_message() {
        let list: MessageList = serde_json::from_value(json!({
            "data": [
                { "id": "m3", "role": "user",
                  "content": [{ "type": "text", "text": { "value": "and then?" } }] },
                { "id": "m2", "role": "assistant",
                  "content": [{ "type": "text", "text": { "value": "Hello there" } }] },
                { "id": "m1", "role": "assistant",
                  "content": [{ "type": "text", "text": { "value": "older reply" } }] }
            ]
        }))
        .unwrap();

        assert_eq!(list.latest_assistant_text().as_deref(), Some("Hello there"));
    }

    #[test]
    fn unsupported_content_blocks_are_ignored() {
        let message: Message = serde_json::from_value(json!({
            "id": "m1",
            "role": "assistant",
            "content": [
                { "type": "image_file", "image_file": { "file_id": "f_1" } },
                { "type": "text", "text": { "value": "caption" } }
            ]
        }))
        .unwrap();
        assert_eq!(message.text(), "caption");
    }
}
