// Chat advisor HTTP routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use advisor_core::{Advisor, AdvisorError, SessionHistory, StartReply, TurnReply};

/// Request to send a message in an existing conversation
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Session returned by POST /chat/start
    pub session_id: Uuid,
    /// The user's message
    #[schema(example = "urgent: 50 bags of cement")]
    pub message: String,
}

/// Response to a session deletion
#[derive(Debug, Clone, serde::Serialize, ToSchema)]
pub struct DeleteResponse {
    /// Always "deleted"
    pub status: &'static str,
    pub session_id: Uuid,
}

/// App state for chat routes
///
/// `advisor` is None when the provider is not configured; every chat route
/// then answers 503.
#[derive(Clone, Default)]
pub struct AppState {
    pub advisor: Option<Arc<Advisor>>,
}

impl AppState {
    pub fn new(advisor: Arc<Advisor>) -> Self {
        Self {
            advisor: Some(advisor),
        }
    }
}

/// Create chat routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat/start", post(start_chat))
        .route("/chat/message", post(send_message))
        .route("/chat/history/:session_id", get(get_history))
        .route("/chat/:session_id", axum::routing::delete(delete_session))
        .with_state(state)
}

fn advisor(state: &AppState) -> Result<&Arc<Advisor>, StatusCode> {
    state.advisor.as_ref().ok_or_else(|| {
        let err = AdvisorError::NotInitialized;
        tracing::warn!("chat request rejected: {}", err);
        error_status(&err)
    })
}

fn error_status(err: &AdvisorError) -> StatusCode {
    match err {
        AdvisorError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
        AdvisorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /chat/start - Start a new advisor conversation
#[utoipa::path(
    post,
    path = "/chat/start",
    responses(
        (status = 200, description = "Session created, greeting returned", body = StartReply),
        (status = 503, description = "Advisor not initialized"),
        (status = 500, description = "Provider failure")
    ),
    tag = "chat"
)]
pub async fn start_chat(State(state): State<AppState>) -> Result<Json<StartReply>, StatusCode> {
    let advisor = advisor(&state)?;
    let reply = advisor.start_session().await.map_err(|e| {
        tracing::error!("Failed to start chat: {}", e);
        error_status(&e)
    })?;
    Ok(Json(reply))
}

/// POST /chat/message - Send a message in an existing conversation
///
/// The response status is `active` while the advisor is still gathering
/// context, and `completed` once it returned product recommendations.
#[utoipa::path(
    post,
    path = "/chat/message",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Advisor reply", body = TurnReply),
        (status = 400, description = "Blank message"),
        (status = 404, description = "Session missing or expired"),
        (status = 503, description = "Advisor not initialized"),
        (status = 500, description = "Provider failure")
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<TurnReply>, StatusCode> {
    let advisor = advisor(&state)?;
    if req.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let reply = advisor
        .send_message(req.session_id, &req.message)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %req.session_id, "Chat message failed: {}", e);
            error_status(&e)
        })?;
    Ok(Json(reply))
}

/// GET /chat/history/{session_id} - Get conversation history
#[utoipa::path(
    get,
    path = "/chat/history/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Transcript and status", body = SessionHistory),
        (status = 404, description = "Session missing or expired"),
        (status = 503, description = "Advisor not initialized")
    ),
    tag = "chat"
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionHistory>, StatusCode> {
    let advisor = advisor(&state)?;
    let history = advisor.history(session_id).await.map_err(|e| {
        tracing::error!(session_id = %session_id, "Failed to get history: {}", e);
        error_status(&e)
    })?;
    Ok(Json(history))
}

/// DELETE /chat/{session_id} - Delete a conversation session
#[utoipa::path(
    delete,
    path = "/chat/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session deleted", body = DeleteResponse),
        (status = 404, description = "Session not found"),
        (status = 503, description = "Advisor not initialized")
    ),
    tag = "chat"
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, StatusCode> {
    let advisor = advisor(&state)?;
    advisor.delete_session(session_id).await.map_err(|e| {
        tracing::error!(session_id = %session_id, "Failed to delete session: {}", e);
        error_status(&e)
    })?;
    Ok(Json(DeleteResponse {
        status: "deleted",
        session_id,
    }))
}
