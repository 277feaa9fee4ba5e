use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    // A present-but-empty message is answered with the default reply
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct AssistantInfo {
    name: &'static str,
    greeting: &'static str,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai-assistant/", get(assistant_info))
        .route("/ai-response/", post(ai_response))
}

/// GET /ai-assistant/ — metadata for the chat widget
async fn assistant_info() -> Json<AssistantInfo> {
    Json(AssistantInfo {
        name: "Wayline Assistant",
        greeting: "I'm here to help with your travel booking needs. How can I assist you today?",
    })
}

/// POST /ai-response/ — run the reply engine over the message. A body that
/// does not parse is surfaced as a structured 400, not a bare rejection.
async fn ai_response(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = body.map_err(|_| AppError::ValidationError("Invalid JSON".to_string()))?;

    Ok(Json(ChatResponse {
        response: state.assistant.respond(&req.message),
    }))
}
