//! Scripted doubles for engine and tool tests

use crate::assistant::{
    AssistantApi, FunctionCall, Message, MessageContent, MessageList, MessageRole, RequiredAction,
    Run, RunStatus, SubmitToolOutputs, TextContent, Thread, ToolCall, ToolDefinition, ToolOutput,
    TransportError,
};
use crate::images::{GeneratedImage, ImageError, ImageModel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Build a run snapshot with the given status.
pub fn run(status: RunStatus) -> Run {
    Run {
        id: "run_test".to_string(),
        status,
        required_action: None,
        last_error: None,
    }
}

/// Build a `requires_action` snapshot blocked on the given `(id, name,
/// arguments)` calls.
pub fn action_run(calls: Vec<(&str, &str, &str)>) -> Run {
    let tool_calls = calls
        .into_iter()
        .map(|(id, name, arguments)| ToolCall {
            id: id.to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        })
        .collect();

    Run {
        id: "run_test".to_string(),
        status: RunStatus::RequiresAction,
        required_action: Some(RequiredAction {
            submit_tool_outputs: SubmitToolOutputs { tool_calls },
        }),
        last_error: None,
    }
}

/// Assistant double that replays a scripted status sequence. When the
/// script runs out, the last status repeats (a run that stays
/// `in_progress` forever is one `run(RunStatus::InProgress)` entry).
pub struct ScriptedAssistant {
    statuses: Mutex<VecDeque<Run>>,
    last: Mutex<Option<Run>>,
    reply: String,
    missing_run_id: bool,
    fail_submission: bool,
    pub status_checks: Arc<AtomicU32>,
    pub threads_created: Arc<AtomicU32>,
    pub submitted: Arc<Mutex<Vec<Vec<ToolOutput>>>>,
    pub added_messages: Arc<Mutex<Vec<String>>>,
}

impl ScriptedAssistant {
    pub fn new(statuses: Vec<Run>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            last: Mutex::new(None),
            reply: "scripted reply".to_string(),
            missing_run_id: false,
            fail_submission: false,
            status_checks: Arc::new(AtomicU32::new(0)),
            threads_created: Arc::new(AtomicU32::new(0)),
            submitted: Arc::new(Mutex::new(Vec::new())),
            added_messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the assistant reply returned by `list_messages`.
    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    /// Make run creation answer without a run identifier.
    pub fn with_missing_run_id(mut self) -> Self {
        self.missing_run_id = true;
        self
    }

    /// Make tool-output submission fail at the transport level.
    pub fn with_failing_submission(mut self) -> Self {
        self.fail_submission = true;
        self
    }

    fn next_status(&self) -> Run {
        let mut queue = self.statuses.lock().unwrap();
        match queue.pop_front() {
            Some(run) => {
                *self.last.lock().unwrap() = Some(run.clone());
                run
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .expect("status script is empty"),
        }
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn create_thread(&self) -> Result<Thread, TransportError> {
        self.threads_created.fetch_add(1, Ordering::SeqCst);
        Ok(Thread {
            id: "thread_test".to_string(),
        })
    }

    async fn add_message(&self, _thread_id: &str, content: &str) -> Result<Message, TransportError> {
        self.added_messages.lock().unwrap().push(content.to_string());
        Ok(Message {
            id: "msg_user".to_string(),
            role: MessageRole::User,
            content: vec![MessageContent::Text {
                text: TextContent {
                    value: content.to_string(),
                },
            }],
        })
    }

    async fn create_run(
        &self,
        _thread_id: &str,
        _functions: &[ToolDefinition],
    ) -> Result<Run, TransportError> {
        Ok(Run {
            id: if self.missing_run_id {
                String::new()
            } else {
                "run_test".to_string()
            },
            status: RunStatus::Queued,
            required_action: None,
            last_error: None,
        })
    }

    async fn run_status(&self, _thread_id: &str, _run_id: &str) -> Result<Run, TransportError> {
        self.status_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.next_status())
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, TransportError> {
        if self.fail_submission {
            return Err(TransportError::Status {
                path: "/threads/thread_test/runs/run_test/submit_tool_outputs".to_string(),
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "scripted submission failure".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(outputs.to_vec());
        Ok(run(RunStatus::InProgress))
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<MessageList, TransportError> {
        Ok(MessageList {
            data: vec![Message {
                id: "msg_reply".to_string(),
                role: MessageRole::Assistant,
                content: vec![MessageContent::Text {
                    text: TextContent {
                        value: self.reply.clone(),
                    },
                }],
            }],
        })
    }
}

/// Image model double that counts upstream calls.
pub struct CountingImageModel {
    pub calls: AtomicU32,
    fail: bool,
    last_prompt: Mutex<String>,
}

impl CountingImageModel {
    pub const URL: &'static str = "data:image/png;base64,dGVzdA==";

    /// Double whose every generation fails upstream.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last_prompt(&self) -> String {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl Default for CountingImageModel {
    fn default() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: false,
            last_prompt: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl ImageModel for CountingImageModel {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = prompt.to_string();
        if self.fail {
            return Err(ImageError::MissingPayload { provider: "test" });
        }
        Ok(GeneratedImage {
            url: Self::URL.to_string(),
        })
    }
}
