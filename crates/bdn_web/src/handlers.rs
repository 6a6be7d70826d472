use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use bdn_core::ConversationTurn;
use bdn_inference::{Answer, AssistantStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub status: String,
}

pub enum ApiError {
    BadRequest(String),
    Internal(bdn_core::Error),
}

impl From<bdn_core::Error> for ApiError {
    fn from(e: bdn_core::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(e) => {
                error!("❌ Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>, ApiError> {
    let status = state.assistant.refresh().await?;
    Ok(Json(RefreshResponse { status }))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, ApiError> {
    state
        .assistant
        .converse(&request.question)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::BadRequest("question must not be empty".to_string()))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Result<Json<AssistantStatus>, ApiError> {
    Ok(Json(state.assistant.status().await?))
}

pub async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<ConversationTurn>> {
    Json(state.assistant.history().await)
}

pub async fn clear_history(State(state): State<Arc<AppState>>) -> Json<Vec<ConversationTurn>> {
    state.assistant.clear_history().await;
    Json(state.assistant.history().await)
}
