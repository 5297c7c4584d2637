//! Career-visualization tool
//!
//! Renders a portrait of the user's "future career self" for a named study
//! or career field, using the field prompt table.

use super::{ToolExecutionError, ToolHandler, ToolResult};
use crate::images::{prompts, ImageModel};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct CareerVisualizationTool {
    model: Arc<dyn ImageModel>,
}

impl CareerVisualizationTool {
    pub fn new(model: Arc<dyn ImageModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl ToolHandler for CareerVisualizationTool {
    fn name(&self) -> &'static str {
        "generate_career_visualization"
    }

    fn description(&self) -> String {
        "Generate a portrait visualizing the user as a successful professional \
         in a given career field"
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "required": ["career_field"],
            "properties": {
                "career_field": {
                    "type": "string",
                    "description": "The career or study field, e.g. 'zorg', 'techniek', 'business'"
                },
                "specific_role": {
                    "type": "string",
                    "description": "Optional specific role within the field, e.g. 'verpleegkunde'"
                }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolResult, ToolExecutionError> {
        let field = args
            .get("career_field")
            .and_then(Value::as_str)
            .filter(|f| !f.trim().is_empty())
            .ok_or(ToolExecutionError::MissingArgument("career_field"))?;
        let role = args.get("specific_role").and_then(Value::as_str);

        let prompt = prompts::portrait_prompt(field, role);
        let image = self.model.generate(&prompt).await?;

        Ok(ToolResult {
            output: format!(
                "TASK COMPLETED: career visualization for '{field}' generated. Show it to \
                 the user as ![Your future career self]({}) and relate it to their study choice.",
                image.url
            ),
            image_url: Some(image.url),
        })
    }
}
