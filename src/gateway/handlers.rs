use super::{AppState, SendMessageBody};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;

const MISSING_PROMPT: &str = "Missing 'prompt' in request body";

/// GET /health
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// POST /bot/send-message
pub async fn handle_send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageBody>, JsonRejection>,
) -> impl IntoResponse {
    let prompt = match body {
        Ok(Json(SendMessageBody {
            prompt: Some(prompt),
        })) if !prompt.trim().is_empty() => prompt,
        Ok(_) => {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": MISSING_PROMPT})));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection, "rejected send-message body");
            return (StatusCode::BAD_REQUEST, Json(json!({"error": MISSING_PROMPT})));
        }
    };

    // Detached so a dropped request cannot stop a batch midway.
    let orchestrator = Arc::clone(&state.orchestrator);
    let turn = tokio::spawn(async move {
        let orchestrator = orchestrator.lock().await;
        orchestrator.handle(&prompt).await
    });

    match turn.await {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(json!({"success": true, "data": outcome.reply})),
        ),
        Ok(Err(err)) => {
            tracing::error!(error = %err, "turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": err.to_string()})),
            )
        }
        Err(err) => {
            tracing::error!(error = %err, "turn task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "turn task failed"})),
            )
        }
    }
}
