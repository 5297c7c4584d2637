//! Function-call dispatch
//!
//! The assistant pauses a run to ask for local work ("generate an image").
//! Handlers registered here perform the side effect and produce the textual
//! output submitted back. Every tool call gets exactly one output: unknown
//! names and handler failures become error-content outputs, never aborted
//! batches, because the remote run cannot resume while any call is
//! unanswered.

mod career_visualization;
mod generate_image;
#[cfg(test)]
mod proptests;

pub use career_visualization::CareerVisualizationTool;
pub use generate_image::GenerateImageTool;

use crate::assistant::{ToolCall, ToolDefinition, ToolOutput};
use crate::images::{ImageError, ImageModel};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Handler-internal failure. Converted to an error-content [`ToolOutput`]
/// by the dispatcher; never propagated past it.
#[derive(Debug, Error)]
pub enum ToolExecutionError {
    #[error("missing required argument `{0}`")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Successful handler result.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// Text submitted back to the assistant.
    pub output: String,
    /// Image reference produced along the way, kept for reply synthesis.
    pub image_url: Option<String>,
}

/// One local function the assistant may call mid-run.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Description attached to the function definition at run creation.
    fn description(&self) -> String;

    /// JSON schema for the function's arguments.
    fn parameters(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolExecutionError>;
}

/// Outcome of the single execution a function name gets per turn.
#[derive(Debug, Clone)]
pub struct ToolOutcome {
    pub success: bool,
    /// Image reference on success, error text on failure.
    pub content: String,
}

/// Per-turn completion map: each function name runs at most once per turn;
/// repeats are answered from the recorded outcome. Discarded at turn end.
#[derive(Debug, Default)]
pub struct TurnToolCache {
    completed: HashMap<String, ToolOutcome>,
}

impl TurnToolCache {
    pub fn get(&self, name: &str) -> Option<&ToolOutcome> {
        self.completed.get(name)
    }

    fn record(&mut self, name: &str, outcome: ToolOutcome) {
        self.completed.insert(name.to_string(), outcome);
    }

    /// First successful result recorded this turn, for reply synthesis when
    /// the iteration ceiling forces completion.
    pub fn first_success(&self) -> Option<&str> {
        self.completed
            .values()
            .find(|o| o.success)
            .map(|o| o.content.as_str())
    }
}

/// Registered handler map, keyed by function name.
pub struct ToolDispatcher {
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl ToolDispatcher {
    pub fn new(handlers: Vec<Arc<dyn ToolHandler>>) -> Self {
        Self {
            handlers: handlers.into_iter().map(|h| (h.name(), h)).collect(),
        }
    }

    /// The standard handler set backed by one text-to-image model.
    pub fn standard(model: Arc<dyn ImageModel>) -> Self {
        Self::new(vec![
            Arc::new(GenerateImageTool::new(model.clone())),
            Arc::new(CareerVisualizationTool::new(model)),
        ])
    }

    /// Function definitions for run creation.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .handlers
            .values()
            .map(|h| ToolDefinition {
                name: h.name().to_string(),
                description: h.description(),
                parameters: h.parameters(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Produce exactly one output per call, in input order.
    pub async fn dispatch_batch(
        &self,
        calls: &[ToolCall],
        cache: &mut TurnToolCache,
    ) -> Vec<ToolOutput> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            outputs.push(self.dispatch(call, cache).await);
        }
        outputs
    }

    async fn dispatch(&self, call: &ToolCall, cache: &mut TurnToolCache) -> ToolOutput {
        let name = call.name();

        let Some(handler) = self.handlers.get(name) else {
            tracing::warn!(tool = name, tool_call_id = %call.id, "unknown function requested");
            return ToolOutput {
                tool_call_id: call.id.clone(),
                output: format!("Unknown function: {name}"),
            };
        };

        if let Some(prior) = cache.get(name) {
            let output = if prior.success {
                format!(
                    "TASK COMPLETED: {name} already ran successfully this turn. \
                     Reuse this result instead of calling again: {}",
                    prior.content
                )
            } else {
                format!(
                    "{name} already failed this turn ({}). Do not retry; \
                     explain the problem to the user instead.",
                    prior.content
                )
            };
            tracing::info!(tool = name, tool_call_id = %call.id, "repeat call answered from cache");
            return ToolOutput { tool_call_id: call.id.clone(), output };
        }

        match handler.execute(call.parsed_arguments()).await {
            Ok(result) => {
                cache.record(
                    name,
                    ToolOutcome {
                        success: true,
                        content: result.image_url.clone().unwrap_or_else(|| result.output.clone()),
                    },
                );
                ToolOutput { tool_call_id: call.id.clone(), output: result.output }
            }
            Err(e) => {
                tracing::warn!(tool = name, tool_call_id = %call.id, error = %e, "tool execution failed");
                cache.record(name, ToolOutcome { success: false, content: e.to_string() });
                ToolOutput {
                    tool_call_id: call.id.clone(),
                    output: format!("{name} failed: {e} - please try a different approach"),
                }
            }
        }
    }
}
