//! HTTP surface
//!
//! The proxy endpoints the Presentation layer drives, plus the one-shot
//! chat endpoint that runs a whole orchestrated turn server-side. Upstream
//! secrets live only behind this layer.

mod assets;
mod handlers;
mod types;

pub use handlers::create_router;

use crate::assistant::{AssistantApi, AssistantClient, AssistantConfig};
use crate::config::AppConfig;
use crate::engine::Orchestrator;
use crate::images::{ImageModel, OpenAiImages, ReplicateFaces};
use crate::tools::ToolDispatcher;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<AssistantClient>,
    pub images: Arc<OpenAiImages>,
    pub faces: Option<Arc<ReplicateFaces>>,
    pub orchestrator: Arc<Orchestrator>,
    /// Conversations with a turn in flight; a second concurrent turn for
    /// the same conversation is rejected.
    pub active_turns: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let assistant = Arc::new(AssistantClient::new(AssistantConfig::new(
            config.openai_api_key.clone(),
            config.assistant_id.clone(),
            config.openai_base_url.clone(),
        )));
        let images = Arc::new(OpenAiImages::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
        ));
        let faces = config
            .replicate_token
            .clone()
            .map(|token| Arc::new(ReplicateFaces::new(token, None)));

        let tools = Arc::new(ToolDispatcher::standard(
            images.clone() as Arc<dyn ImageModel>
        ));
        let orchestrator = Arc::new(Orchestrator::new(
            assistant.clone() as Arc<dyn AssistantApi>,
            tools,
        ));

        Self {
            assistant,
            images,
            faces,
            orchestrator,
            active_turns: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}
