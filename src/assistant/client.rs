//! HTTP client for the remote assistant API
//!
//! A thin JSON transport: one request/response core plus typed wrappers per
//! endpoint. Non-2xx statuses and network failures surface as
//! [`TransportError`]; there are no retries at this layer.

use super::error::TransportError;
use super::types::{Message, MessageList, Run, Thread, ToolDefinition, ToolOutput};
use super::AssistantApi;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

const PROTOCOL_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Configuration for the assistant transport.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
}

impl AssistantConfig {
    pub fn new(api_key: String, assistant_id: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            assistant_id,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }
}

/// Client for the thread/message/run lifecycle.
pub struct AssistantClient {
    client: Client,
    config: AssistantConfig,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build HTTP client");
        Self { client, config }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, TransportError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.api_key)
            .header(PROTOCOL_HEADER.0, PROTOCOL_HEADER.1);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| TransportError::Network {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|source| TransportError::Network {
            path: path.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                path: path.to_string(),
                status,
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|source| TransportError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// The run-creation tool list: the assistant's built-in retrieval tools
    /// plus every registered function definition.
    fn run_tools(functions: &[ToolDefinition]) -> Vec<Value> {
        let mut tools = vec![json!({ "type": "file_search" }), json!({ "type": "code_interpreter" })];
        tools.extend(functions.iter().map(|def| {
            json!({
                "type": "function",
                "function": {
                    "name": def.name,
                    "description": def.description,
                    "parameters": def.parameters,
                }
            })
        }));
        tools
    }
}

#[async_trait]
impl AssistantApi for AssistantClient {
    async fn create_thread(&self) -> Result<Thread, TransportError> {
        self.send(Method::POST, "/threads", Some(json!({}))).await
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<Message, TransportError> {
        self.send(
            Method::POST,
            &format!("/threads/{thread_id}/messages"),
            Some(json!({ "role": "user", "content": content })),
        )
        .await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        functions: &[ToolDefinition],
    ) -> Result<Run, TransportError> {
        self.send(
            Method::POST,
            &format!("/threads/{thread_id}/runs"),
            Some(json!({
                "assistant_id": self.config.assistant_id,
                "tools": Self::run_tools(functions),
            })),
        )
        .await
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<Run, TransportError> {
        self.send(Method::GET, &format!("/threads/{thread_id}/runs/{run_id}"), None)
            .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, TransportError> {
        self.send(
            Method::POST,
            &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            Some(json!({ "tool_outputs": outputs })),
        )
        .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<MessageList, TransportError> {
        self.send(Method::GET, &format!("/threads/{thread_id}/messages"), None)
            .await
    }
}
