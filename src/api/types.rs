//! API request and response types

use crate::assistant::ToolOutput;
use serde::{Deserialize, Serialize};

/// Response for conversation creation
#[derive(Debug, Serialize)]
pub struct ConversationCreated {
    pub id: String,
}

/// Request to append a user message
#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub content: String,
}

/// Request to answer a blocked run's tool calls
#[derive(Debug, Deserialize)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutput>,
}

/// Request for text-to-image generation
#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
}

/// Response for text-to-image generation
#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    /// "base64" for inline data URLs, "url" for hosted images
    pub r#type: &'static str,
    pub data: String,
}

/// Request to edit an uploaded photo toward a career field
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageRequest {
    pub image_data: String,
    pub target_field: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Response for the photo edit
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImageResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

/// Request to age the person in an uploaded photo
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeFaceRequest {
    pub image_data: String,
    #[serde(default)]
    pub target_age: Option<u32>,
}

/// Response for the face aging
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeFaceResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
}

/// Request for one orchestrated conversation turn
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub text: String,
}

/// Response for a completed turn
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub conversation_id: String,
    pub reply: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            conversation_id: None,
        }
    }
}
