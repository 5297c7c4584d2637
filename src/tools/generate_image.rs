//! Text-to-image tool

use super::{ToolExecutionError, ToolHandler, ToolResult};
use crate::images::ImageModel;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

/// Generates an image from a prompt via the configured image model.
pub struct GenerateImageTool {
    model: Arc<dyn ImageModel>,
}

impl GenerateImageTool {
    pub fn new(model: Arc<dyn ImageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ToolHandler for GenerateImageTool {
    fn name(&self) -> &'static str {
        "generate_image"
    }

    fn description(&self) -> String {
        "Generate an image based on a detailed text prompt".to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "required": ["prompt"],
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": "Detailed description of the image to generate"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolExecutionError> {
        let prompt = args
            .get("prompt")
            .and_then(Value::as_str)
            .filter(|p| !p.trim().is_empty())
            .ok_or(ToolExecutionError::MissingArgument("prompt"))?;

        let image = self.model.generate(prompt).await?;

        Ok(ToolResult {
            output: format!(
                "TASK COMPLETED: image generated successfully. Show it to the user as \
                 ![Generated image]({}) and do not generate another one.",
                image.url
            ),
            image_url: Some(image.url),
        })
    }
}
