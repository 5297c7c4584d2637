//! Conversation orchestrator
//!
//! The turn state machine. A turn moves through: run started → polling →
//! (tools required ⇄ polling) → completed | failed. The orchestrator owns
//! the conversation identifier, the run, and the per-turn tool cache; no
//! other component mutates them.

use super::error::EngineError;
use super::poller::{poll_until_settled, PollConfig};
use crate::assistant::{AssistantApi, RunStatus, ToolDefinition};
use crate::tools::{ToolDispatcher, TurnToolCache};
use std::sync::Arc;

/// Tool-call rounds allowed per turn before completion is forced or the
/// turn fails. Guards against an assistant that keeps re-requesting work.
pub const DEFAULT_MAX_TOOL_ITERATIONS: u32 = 3;

/// Per-browser-session conversation handle. Created without an identifier;
/// the first turn creates the remote conversation and pins it here.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub conversation_id: Option<String>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resume(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: Some(conversation_id.into()),
        }
    }
}

/// The finished turn: the conversation it belongs to and the reply text.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub conversation_id: String,
    pub text: String,
}

pub struct Orchestrator {
    api: Arc<dyn AssistantApi>,
    tools: Arc<ToolDispatcher>,
    poll: PollConfig,
    max_tool_iterations: u32,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn AssistantApi>, tools: Arc<ToolDispatcher>) -> Self {
        Self {
            api,
            tools,
            poll: PollConfig::default(),
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
        }
    }

    /// Override the poll and iteration budgets.
    #[allow(dead_code)]
    pub fn with_limits(mut self, poll: PollConfig, max_tool_iterations: u32) -> Self {
        self.poll = poll;
        self.max_tool_iterations = max_tool_iterations;
        self
    }

    /// Function definitions to attach when a run is created out-of-band
    /// (the proxy surface creates runs on the Presentation layer's behalf).
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.definitions()
    }

    /// Run one full conversation turn: ensure the conversation exists,
    /// append the user message, start a run, and drive it to a reply.
    pub async fn send_turn(
        &self,
        session: &mut ChatSession,
        text: &str,
    ) -> Result<TurnReply, EngineError> {
        let conversation_id = self.ensure_conversation(session).await?;

        self.api.add_message(&conversation_id, text).await?;

        let run = self
            .api
            .create_run(&conversation_id, &self.tools.definitions())
            .await?;
        if run.id.is_empty() {
            return Err(EngineError::RunCreation);
        }
        let run_id = run.id;
        tracing::info!(conversation_id = %conversation_id, run_id = %run_id, "run started");

        // Per-turn state: the tool completion map and the iteration count.
        // Both die with the turn.
        let mut cache = TurnToolCache::default();
        let mut iteration = 0u32;

        loop {
            let snapshot =
                poll_until_settled(self.api.as_ref(), &conversation_id, &run_id, self.poll).await?;

            match snapshot.status {
                // Blocked on tool outputs: answer every listed call in one
                // batch, then resume polling.
                RunStatus::RequiresAction => {
                    if iteration >= self.max_tool_iterations {
                        // Still asking for work after the budget. If some
                        // tool already succeeded this turn, synthesize the
                        // reply from its result instead of looping forever.
                        if let Some(result) = cache.first_success() {
                            tracing::warn!(
                                conversation_id = %conversation_id,
                                run_id = %run_id,
                                iteration,
                                "iteration ceiling reached; forcing completion from cached result"
                            );
                            return Ok(TurnReply {
                                conversation_id,
                                text: forced_reply(result),
                            });
                        }
                        return Err(EngineError::RunFailed {
                            status: snapshot.status,
                            detail: Some(format!(
                                "tool-call iteration budget ({}) exhausted",
                                self.max_tool_iterations
                            )),
                        });
                    }
                    iteration += 1;

                    let calls = snapshot.tool_calls();
                    tracing::info!(
                        conversation_id = %conversation_id,
                        run_id = %run_id,
                        iteration,
                        tool_calls = calls.len(),
                        "run requires tool outputs"
                    );

                    let outputs = self.tools.dispatch_batch(calls, &mut cache).await;
                    debug_assert_eq!(outputs.len(), calls.len());

                    self.api
                        .submit_tool_outputs(&conversation_id, &run_id, &outputs)
                        .await
                        .map_err(|source| EngineError::ToolSubmission { source })?;
                }

                // Terminal success: the newest assistant message is the reply.
                RunStatus::Completed => {
                    let messages = self.api.list_messages(&conversation_id).await?;
                    let text = messages.latest_assistant_text().unwrap_or_default();
                    tracing::info!(
                        conversation_id = %conversation_id,
                        run_id = %run_id,
                        reply_chars = text.len(),
                        "turn completed"
                    );
                    return Ok(TurnReply { conversation_id, text });
                }

                // failed | cancelled | expired | unknown
                status => {
                    let detail = snapshot
                        .last_error
                        .as_ref()
                        .and_then(|e| e.message.clone().or_else(|| e.code.clone()));
                    tracing::error!(
                        conversation_id = %conversation_id,
                        run_id = %run_id,
                        status = %status,
                        detail = detail.as_deref().unwrap_or(""),
                        "run ended unsuccessfully"
                    );
                    return Err(EngineError::RunFailed { status, detail });
                }
            }
        }
    }

    async fn ensure_conversation(&self, session: &mut ChatSession) -> Result<String, EngineError> {
        if let Some(id) = &session.conversation_id {
            return Ok(id.clone());
        }
        let thread = self.api.create_thread().await?;
        tracing::info!(conversation_id = %thread.id, "conversation created");
        session.conversation_id = Some(thread.id.clone());
        Ok(thread.id)
    }
}

fn forced_reply(result: &str) -> String {
    format!("Here is the result: ![Generated image]({result})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{action_run, run, CountingImageModel, ScriptedAssistant};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn fast_poll() -> PollConfig {
        PollConfig {
            interval: Duration::from_millis(10),
            max_attempts: 120,
        }
    }

    fn orchestrator(
        api: ScriptedAssistant,
        model: Arc<CountingImageModel>,
        max_tool_iterations: u32,
    ) -> Orchestrator {
        Orchestrator::new(Arc::new(api), Arc::new(ToolDispatcher::standard(model)))
            .with_limits(fast_poll(), max_tool_iterations)
    }

    #[tokio::test(start_paused = true)]
    async fn plain_turn_completes_with_latest_assistant_message() {
        let api = ScriptedAssistant::new(vec![run(RunStatus::InProgress), run(RunStatus::Completed)])
            .with_reply("Hi! How can I help with your study choice?");
        let checks = api.status_checks.clone();
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        let mut session = ChatSession::new();
        let reply = orchestrator.send_turn(&mut session, "hello").await.unwrap();

        assert_eq!(reply.text, "Hi! How can I help with your study choice?");
        assert_eq!(reply.conversation_id, "thread_test");
        assert_eq!(session.conversation_id.as_deref(), Some("thread_test"));
        assert_eq!(checks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn tool_round_answers_every_call_then_completes() {
        let reply = format!("Your image: ![Generated image]({})", CountingImageModel::URL);
        let api = ScriptedAssistant::new(vec![
            action_run(vec![("call_1", "generate_image", r#"{"prompt":"sunset"}"#)]),
            run(RunStatus::Completed),
        ])
        .with_reply(&reply);
        let submitted = api.submitted.clone();
        let model = Arc::new(CountingImageModel::default());
        let orchestrator = orchestrator(api, model.clone(), 3);

        let mut session = ChatSession::new();
        let turn = orchestrator
            .send_turn(&mut session, "show me a sunset")
            .await
            .unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(model.last_prompt(), "sunset");
        assert!(turn.text.contains(CountingImageModel::URL));

        let batches = submitted.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].tool_call_id, "call_1");
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_function_request_hits_upstream_once() {
        let api = ScriptedAssistant::new(vec![
            action_run(vec![("call_1", "generate_image", r#"{"prompt":"sunset"}"#)]),
            action_run(vec![("call_2", "generate_image", r#"{"prompt":"sunset"}"#)]),
            run(RunStatus::Completed),
        ])
        .with_reply("done");
        let submitted = api.submitted.clone();
        let model = Arc::new(CountingImageModel::default());
        let orchestrator = orchestrator(api, model.clone(), 3);

        let mut session = ChatSession::new();
        orchestrator.send_turn(&mut session, "sunset please").await.unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        let batches = submitted.lock().unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches[1][0].output.contains("Reuse this result"));
    }

    #[tokio::test(start_paused = true)]
    async fn no_tool_call_is_left_unanswered() {
        let api = ScriptedAssistant::new(vec![
            action_run(vec![
                ("call_1", "generate_image", r#"{"prompt":"sunset"}"#),
                ("call_2", "unheard_of", "{}"),
                ("call_3", "generate_career_visualization", r#"{"career_field":"sport"}"#),
            ]),
            run(RunStatus::Completed),
        ])
        .with_reply("done");
        let submitted = api.submitted.clone();
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        orchestrator
            .send_turn(&mut ChatSession::new(), "go")
            .await
            .unwrap();

        let batches = submitted.lock().unwrap();
        let ids: Vec<&str> = batches[0].iter().map(|o| o.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["call_1", "call_2", "call_3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_with_cached_success_forces_a_reply() {
        let api = ScriptedAssistant::new(vec![
            action_run(vec![("call_1", "generate_image", r#"{"prompt":"sunset"}"#)]),
            action_run(vec![("call_2", "generate_image", r#"{"prompt":"sunset"}"#)]),
        ]);
        let model = Arc::new(CountingImageModel::default());
        let orchestrator = orchestrator(api, model.clone(), 1);

        let turn = orchestrator
            .send_turn(&mut ChatSession::new(), "sunset please")
            .await
            .unwrap();

        assert_eq!(model.calls.load(Ordering::SeqCst), 1);
        assert!(turn.text.contains(CountingImageModel::URL));
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_without_success_fails_the_turn() {
        let api = ScriptedAssistant::new(vec![
            action_run(vec![("call_1", "unheard_of", "{}")]),
            action_run(vec![("call_2", "unheard_of", "{}")]),
        ]);
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 1);

        let err = orchestrator
            .send_turn(&mut ChatSession::new(), "go")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::RunFailed { status: RunStatus::RequiresAction, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_run_identifier_fails_fast() {
        let api = ScriptedAssistant::new(vec![]).with_missing_run_id();
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        let err = orchestrator
            .send_turn(&mut ChatSession::new(), "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::RunCreation));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_submission_surfaces_as_tool_submission_error() {
        let api = ScriptedAssistant::new(vec![action_run(vec![(
            "call_1",
            "generate_image",
            r#"{"prompt":"sunset"}"#,
        )])])
        .with_failing_submission();
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        let err = orchestrator
            .send_turn(&mut ChatSession::new(), "go")
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::ToolSubmission { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn remote_failure_carries_status_and_detail() {
        let mut failed = run(RunStatus::Failed);
        failed.last_error = Some(crate::assistant::RunError {
            code: Some("rate_limit_exceeded".into()),
            message: Some("too many requests".into()),
        });
        let api = ScriptedAssistant::new(vec![failed]);
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        let err = orchestrator
            .send_turn(&mut ChatSession::new(), "go")
            .await
            .unwrap_err();

        match err {
            EngineError::RunFailed { status, detail } => {
                assert_eq!(status, RunStatus::Failed);
                assert_eq!(detail.as_deref(), Some("too many requests"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn existing_session_is_reused() {
        let api = ScriptedAssistant::new(vec![run(RunStatus::Completed)]).with_reply("again");
        let threads = api.threads_created.clone();
        let orchestrator = orchestrator(api, Arc::new(CountingImageModel::default()), 3);

        let mut session = ChatSession::resume("thread_existing");
        let reply = orchestrator.send_turn(&mut session, "hello again").await.unwrap();

        assert_eq!(reply.conversation_id, "thread_existing");
        assert_eq!(threads.load(Ordering::SeqCst), 0);
    }
}
