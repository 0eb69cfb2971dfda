use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde_json::{Value, json};

use conscia::bot::APOLOGY_REPLY;
use conscia::gateway::{AppState, SendMessageBody, handle_health, handle_send_message};
use conscia::memory::{MemorySnapshot, MemoryStore};

use super::bot_harness::{FailingStore, HarnessBuilder};

async fn send(state: AppState, prompt: Option<&str>) -> (StatusCode, Value) {
    let body = SendMessageBody {
        prompt: prompt.map(str::to_string),
    };
    let response = handle_send_message(State(state), Ok(Json(body)))
        .await
        .into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_is_ok() {
    let response = handle_health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({"status": "ok"}));
}

#[tokio::test]
async fn missing_or_blank_prompt_is_rejected() {
    for prompt in [None, Some("   ")] {
        let h = HarnessBuilder::new([r#"{"user_reply": "unused"}"#]).build();
        let provider = h.provider.clone();
        let (status, body) = send(AppState::new(h.orchestrator), prompt).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Missing 'prompt' in request body"}));
        assert_eq!(provider.invocations(), 0);
    }
}

#[tokio::test]
async fn completed_turn_returns_reply_envelope() {
    let h = HarnessBuilder::new([json!({
        "commands": [{"command": "email.send", "params": {"to": "a@example.com", "subject": "Hi", "body": "Hello"}}],
        "user_reply": "Email sent."
    })
    .to_string()])
    .build();
    let email = h.email.clone();

    let (status, body) = send(AppState::new(h.orchestrator), Some("email a")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_reply"], "Email sent.");
    assert_eq!(body["data"]["updated_memory"], Value::Null);
    assert_eq!(body["data"]["commands"][0]["command"], "email.send");
    assert_eq!(email.sent().len(), 1);
}

#[tokio::test]
async fn apologised_turn_is_still_a_success_envelope() {
    let h = HarnessBuilder::new(["not json at all"]).build();

    let (status, body) = send(AppState::new(h.orchestrator), Some("hi")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user_reply"], APOLOGY_REPLY);
    assert_eq!(body["data"]["commands"], json!([]));
}

#[tokio::test]
async fn persistence_failure_is_a_server_error() {
    let store = std::sync::Arc::new(FailingStore {
        snapshot: MemorySnapshot::empty(),
    });
    let h = HarnessBuilder::new([json!({
        "updated_memory": {"immutable": {}, "mutable": {"x": 1}, "archive": {}},
        "user_reply": "Noted."
    })
    .to_string()])
    .store(store)
    .build();

    let (status, body) = send(AppState::new(h.orchestrator), Some("remember x")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("persist failed"));
}

#[tokio::test(start_paused = true)]
async fn dropped_request_does_not_cut_the_command_batch() {
    let h = HarnessBuilder::new([json!({
        "updated_memory": {"immutable": {}, "mutable": {"x": 1}, "archive": {}},
        "commands": [
            {"command": "email.send", "params": {"to": "a@example.com", "subject": "1", "body": "first"}},
            {"command": "email.send", "params": {"to": "b@example.com", "subject": "2", "body": "second"}}
        ],
        "user_reply": "Both sent."
    })
    .to_string()])
    .email_delay(Duration::from_secs(4))
    .build();
    let email = h.email.clone();
    let store = h.store.clone();
    let state = AppState::new(h.orchestrator);
    let orchestrator = Arc::clone(&state.orchestrator);

    // The request gives up after the first email, in the middle of the batch.
    let request = tokio::time::timeout(Duration::from_secs(6), send(state, Some("email both")));
    assert!(request.await.is_err());

    // The detached turn still owns the lock; wait for it to finish.
    drop(orchestrator.lock().await);

    let subjects: Vec<String> = email.sent().into_iter().map(|e| e.subject).collect();
    assert_eq!(subjects, ["1", "2"]);
    let stored = store.load().await.unwrap();
    assert_eq!(stored.mutable, json!({"x": 1}));
}
