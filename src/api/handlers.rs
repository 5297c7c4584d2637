//! HTTP request handlers

use super::assets::{serve_index, serve_static};
use super::types::{
    AddMessageRequest, AgeFaceRequest, AgeFaceResponse, ChatRequest, ChatResponse,
    ConversationCreated, EditImageRequest, EditImageResponse, ErrorResponse,
    GenerateImageRequest, GenerateImageResponse, SubmitToolOutputsRequest,
};
use super::AppState;
use crate::assistant::{AssistantApi, Message, MessageList, Run, TransportError};
use crate::engine::{ChatSession, EngineError};
use crate::images::{prompts, ImageError, ImageModel};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

const DEFAULT_TARGET_AGE: u32 = 50;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Chat page
        .route("/", get(serve_index))
        .route("/assets/*path", get(serve_static))
        // Conversation lifecycle proxy
        .route("/api/conversations", post(create_conversation))
        .route(
            "/api/conversations/:id/messages",
            post(add_message).get(list_messages),
        )
        .route("/api/conversations/:id/runs", post(create_run))
        .route("/api/conversations/:id/runs/:run_id", get(run_status))
        .route(
            "/api/conversations/:id/runs/:run_id/tool-outputs",
            post(submit_tool_outputs),
        )
        // Image providers
        .route("/api/images/generate", post(generate_image))
        .route("/api/images/edit", post(edit_image))
        .route("/api/images/age", post(age_face))
        // Orchestrated turn
        .route("/api/chat", post(chat))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation Lifecycle Proxy
// ============================================================

async fn create_conversation(
    State(state): State<AppState>,
) -> Result<Json<ConversationCreated>, AppError> {
    let thread = state.assistant.create_thread().await?;
    Ok(Json(ConversationCreated { id: thread.id }))
}

async fn add_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddMessageRequest>,
) -> Result<Json<Message>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("content must not be empty".to_string()));
    }
    let message = state.assistant.add_message(&id, &req.content).await?;
    Ok(Json(message))
}

async fn create_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Run>, AppError> {
    let run = state
        .assistant
        .create_run(&id, &state.orchestrator.tool_definitions())
        .await?;
    Ok(Json(run))
}

async fn run_status(
    State(state): State<AppState>,
    Path((id, run_id)): Path<(String, String)>,
) -> Result<Json<Run>, AppError> {
    let run = state.assistant.run_status(&id, &run_id).await?;
    Ok(Json(run))
}

async fn submit_tool_outputs(
    State(state): State<AppState>,
    Path((id, run_id)): Path<(String, String)>,
    Json(req): Json<SubmitToolOutputsRequest>,
) -> Result<Json<Run>, AppError> {
    let run = state
        .assistant
        .submit_tool_outputs(&id, &run_id, &req.tool_outputs)
        .await?;
    Ok(Json(run))
}

async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageList>, AppError> {
    let messages = state.assistant.list_messages(&id).await?;
    Ok(Json(messages))
}

// ============================================================
// Image Providers
// ============================================================

async fn generate_image(
    State(state): State<AppState>,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }

    let image = state.images.generate(&req.prompt).await?;
    Ok(Json(GenerateImageResponse {
        r#type: if image.url.starts_with("data:") { "base64" } else { "url" },
        data: image.url,
    }))
}

async fn edit_image(
    State(state): State<AppState>,
    Json(req): Json<EditImageRequest>,
) -> Response {
    if req.image_data.trim().is_empty() {
        return edit_failure(StatusCode::BAD_REQUEST, "No image data provided");
    }
    if req.target_field.trim().is_empty() {
        return edit_failure(StatusCode::BAD_REQUEST, "No career field provided");
    }

    let prompt = prompts::transform_prompt(&req.target_field, req.role.as_deref());
    match state.images.edit(&req.image_data, &prompt).await {
        Ok(image) => Json(EditImageResponse {
            success: true,
            image_url: Some(image.url),
            error: None,
            message: "Career image edited successfully".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, field = %req.target_field, "image edit failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EditImageResponse {
                    success: false,
                    image_url: None,
                    error: Some(e.to_string()),
                    message: image_failure_copy(&e).to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn edit_failure(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(EditImageResponse {
            success: false,
            image_url: None,
            error: Some(error.to_string()),
            message: error.to_string(),
        }),
    )
        .into_response()
}

async fn age_face(State(state): State<AppState>, Json(req): Json<AgeFaceRequest>) -> Response {
    let Some(faces) = &state.faces else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(AgeFaceResponse {
                success: false,
                image_url: None,
                target_age: None,
                error: Some("face aging provider not configured".to_string()),
                message: "Face aging is currently unavailable.".to_string(),
            }),
        )
            .into_response();
    };

    if req.image_data.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(AgeFaceResponse {
                success: false,
                image_url: None,
                target_age: None,
                error: Some("No image data provided".to_string()),
                message: "No image data provided".to_string(),
            }),
        )
            .into_response();
    }

    let target_age = req.target_age.unwrap_or(DEFAULT_TARGET_AGE);
    match faces.age(&req.image_data, target_age).await {
        Ok(image) => Json(AgeFaceResponse {
            success: true,
            image_url: Some(image.url),
            target_age: Some(target_age),
            error: None,
            message: format!("Aged to {target_age} years old - your future career self!"),
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "face aging failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(AgeFaceResponse {
                    success: false,
                    image_url: None,
                    target_age: None,
                    error: Some(e.to_string()),
                    message: "The face aging model is currently unavailable. Please try \
                              again later or use a different photo."
                        .to_string(),
                }),
            )
                .into_response()
        }
    }
}

// ============================================================
// Orchestrated Turn
// ============================================================

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Response {
    if req.text.trim().is_empty() {
        return AppError::BadRequest("text must not be empty".to_string()).into_response();
    }

    // At most one turn in flight per conversation. New conversations cannot
    // collide: their identifier does not exist until the turn creates it.
    if let Some(id) = &req.conversation_id {
        let mut active = state.active_turns.lock().expect("active turn set poisoned");
        if !active.insert(id.clone()) {
            return AppError::Busy.into_response();
        }
    }

    let mut session = match &req.conversation_id {
        Some(id) => ChatSession::resume(id.clone()),
        None => ChatSession::new(),
    };
    let result = state.orchestrator.send_turn(&mut session, &req.text).await;

    if let Some(id) = &req.conversation_id {
        state
            .active_turns
            .lock()
            .expect("active turn set poisoned")
            .remove(id);
    }

    match result {
        Ok(turn) => Json(ChatResponse {
            conversation_id: turn.conversation_id,
            reply: turn.text,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, conversation_id = session.conversation_id.as_deref().unwrap_or(""), "turn failed");
            // The conversation identifier survives the failure so the user
            // can retry into the same thread.
            let body = ErrorResponse {
                error: turn_failure_copy(&e).to_string(),
                conversation_id: session.conversation_id,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("compass-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// User-Facing Failure Copy
// ============================================================

/// Map an engine error kind to user copy. The kind decides the wording;
/// message contents are never inspected.
fn turn_failure_copy(error: &EngineError) -> &'static str {
    match error {
        EngineError::PollTimeout { .. } => {
            "The assistant took too long to respond. Please try again."
        }
        EngineError::Transport(_) | EngineError::RunCreation | EngineError::ToolSubmission { .. } => {
            "Sorry, I couldn't reach the assistant. Please try again."
        }
        EngineError::RunFailed { .. } => {
            "The assistant couldn't finish that request. Please try again."
        }
    }
}

fn image_failure_copy(error: &ImageError) -> &'static str {
    match error {
        ImageError::InvalidInput(_) => {
            "Invalid image format. Please use a clear photo with a person facing the camera."
        }
        ImageError::Upstream { status, .. } if status.as_u16() == 429 => {
            "Too many requests. Please wait a moment and try again."
        }
        _ => "The image service is currently unavailable. Please try again later.",
    }
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Busy,
    Upstream(TransportError),
    Image(ImageError),
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Upstream(e)
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        AppError::Image(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Busy => (
                StatusCode::CONFLICT,
                "A turn for this conversation is already in flight".to_string(),
            ),
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "upstream call failed");
                (e.status().unwrap_or(StatusCode::BAD_GATEWAY), e.to_string())
            }
            AppError::Image(e) => {
                tracing::error!(error = %e, "image generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    image_failure_copy(&e).to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::RunStatus;

    #[test]
    fn failure_copy_is_chosen_by_kind() {
        let timeout = EngineError::PollTimeout { attempts: 120 };
        assert!(turn_failure_copy(&timeout).contains("took too long"));

        let failed = EngineError::RunFailed {
            status: RunStatus::Expired,
            detail: Some("took too long".to_string()),
        };
        // Detail text never steers the copy; the variant does.
        assert!(turn_failure_copy(&failed).contains("couldn't finish"));
    }

    #[test]
    fn rate_limited_image_gets_specific_copy() {
        let err = ImageError::Upstream {
            provider: "image api",
            status: StatusCode::TOO_MANY_REQUESTS,
            body: String::new(),
        };
        assert!(image_failure_copy(&err).contains("Too many requests"));
    }
}
