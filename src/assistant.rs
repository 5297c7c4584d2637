//! Remote assistant API access
//!
//! Transport client and wire types for the thread/message/run lifecycle.
//! The [`AssistantApi`] trait is the seam between the orchestration engine
//! and the network, so the engine's tests can run against a scripted double.

mod client;
mod error;
mod types;

pub use client::{AssistantClient, AssistantConfig};
pub use error::TransportError;
pub use types::*;

use async_trait::async_trait;

/// Operations the orchestration engine needs from the remote assistant.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create a new conversation container.
    async fn create_thread(&self) -> Result<Thread, TransportError>;

    /// Append a user message to a thread.
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<Message, TransportError>;

    /// Start a run, attaching the registered function definitions.
    async fn create_run(
        &self,
        thread_id: &str,
        functions: &[ToolDefinition],
    ) -> Result<Run, TransportError>;

    /// Observe a run's current status.
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<Run, TransportError>;

    /// Answer every pending tool call of a blocked run in one batch.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, TransportError>;

    /// List a thread's messages, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<MessageList, TransportError>;
}
