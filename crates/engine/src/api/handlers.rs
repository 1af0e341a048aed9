use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use log::error;
use serde_json::json;
use wello_shared::{ChatRequest, ChatResponse, Role};

use super::AppState;

/// Answer sent when the run ends without a usable specialist answer.
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't find an answer.";

pub async fn invoke_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<serde_json::Value>)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message must not be empty" })),
        ));
    }
    if message.chars().count() > state.input_max_chars {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Message exceeds {} characters", state.input_max_chars)
            })),
        ));
    }

    state.db.touch_thread(&req.thread_id).map_err(storage_error)?;
    state
        .db
        .append_message(&req.thread_id, Role::User, message)
        .map_err(storage_error)?;

    let history = state.db.history(&req.thread_id).map_err(storage_error)?;
    let answer = match state.graph.run(&history).await {
        Ok(Some(answer)) if !answer.trim().is_empty() => answer,
        Ok(_) => FALLBACK_ANSWER.to_string(),
        Err(e) => {
            error!("Agent run failed for {}: {:#}", req.thread_id, e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("Agent run failed: {}", e) })),
            ));
        }
    };

    state
        .db
        .append_message(&req.thread_id, Role::Assistant, &answer)
        .map_err(storage_error)?;

    Ok(Json(ChatResponse {
        response: answer,
        thread_id: Some(req.thread_id),
    }))
}

fn storage_error(e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    error!("Database error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("Database error: {}", e) })),
    )
}

pub async fn health_check() -> &'static str {
    "Wello engine is running"
}
