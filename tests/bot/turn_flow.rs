use serde_json::json;

use conscia::bot::APOLOGY_REPLY;
use conscia::error::{ConsciaError, ErrorKind, MemoryError};
use conscia::memory::MemorySnapshot;

use super::bot_harness::{
    FailingStore, HarnessBuilder, additional_data, event, memory_block, sample_memory,
};

fn reply(value: &serde_json::Value) -> String {
    value.to_string()
}

#[tokio::test]
async fn reply_without_fetch_commands_takes_one_round() {
    let h = HarnessBuilder::new([reply(&json!({"user_reply": "Hi Rafi!"}))])
        .memory(sample_memory())
        .build();

    let outcome = h.orchestrator.handle("hello").await.unwrap();

    assert_eq!(h.provider.invocations(), 1);
    assert_eq!(outcome.rounds, 1);
    assert!(!outcome.is_failed());
    assert_eq!(outcome.reply.user_reply, "Hi Rafi!");
    assert!(outcome.reply.commands.is_empty());
    assert!(outcome.reply.updated_memory.is_none());
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
}

#[tokio::test]
async fn request_carries_current_memory_and_no_additional_data() {
    let h = HarnessBuilder::new([reply(&json!({"user_reply": "ok"}))])
        .memory(sample_memory())
        .build();

    h.orchestrator.handle("what am I focused on?").await.unwrap();

    let requests = h.provider.requests();
    assert_eq!(memory_block(&requests[0]), Some(sample_memory().to_value()));
    assert_eq!(additional_data(&requests[0]), None);
    assert!(requests[0].contains("what am I focused on?"));
}

#[tokio::test]
async fn schedule_walk_end_to_end() {
    let updated = json!({
        "immutable": sample_memory().immutable,
        "mutable": {"current_focus": "exam prep", "habits": ["morning walk"]},
        "archive": {}
    });
    let model_reply = json!({
        "updated_memory": updated,
        "commands": [{
            "command": "calendar.add_event",
            "params": {
                "summary": "Walk",
                "start": "2025-12-22T08:00:00+06:00",
                "end": "2025-12-22T08:30:00+06:00"
            }
        }],
        "user_reply": "Done! Your walk is on the calendar for 8:00 tomorrow."
    });
    let h = HarnessBuilder::new([format!("```json\n{model_reply}\n```")])
        .memory(sample_memory())
        .build();

    let outcome = h
        .orchestrator
        .handle("schedule a walk tomorrow 8am for 30 minutes")
        .await
        .unwrap();

    assert_eq!(
        outcome.reply.user_reply,
        "Done! Your walk is on the calendar for 8:00 tomorrow."
    );
    assert_eq!(h.provider.invocations(), 1);

    let inserted = h.calendar.inserted();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].summary, "Walk");
    assert_eq!(inserted[0].end, "2025-12-22T08:30:00+06:00");

    assert_eq!(outcome.outcomes.len(), 1);
    assert!(outcome.outcomes[0].success);
    assert_eq!(outcome.outcomes[0].produced_data.as_ref().unwrap()["id"], "evt-1");

    let stored = h.store.load().await.unwrap();
    assert_eq!(stored.to_value(), updated);
    assert_eq!(outcome.reply.updated_memory, Some(stored));
    assert_eq!(outcome.reply.commands.len(), 1);
}

#[tokio::test]
async fn fetch_round_feeds_results_into_next_request() {
    let events = vec![
        event("e1", "Standup", "2025-12-22T09:00:00+06:00"),
        event("e2", "Gym", "2025-12-22T18:00:00+06:00"),
    ];
    let h = HarnessBuilder::new([
        reply(&json!({
            "commands": [
                {"command": "calendar.fetch", "params": {"from": "2025-12-22T00:00:00+06:00", "to": "2025-12-23T00:00:00+06:00"}},
                {"command": "email.send", "params": {"to": "boss@example.com", "subject": "Tomorrow", "body": "draft"}}
            ],
            "user_reply": "Let me check your calendar."
        })),
        reply(&json!({
            "commands": [
                {"command": "email.send", "params": {"to": "boss@example.com", "subject": "Tomorrow", "body": "Busy 9 and 18."}}
            ],
            "user_reply": "Sent your boss tomorrow's schedule."
        })),
    ])
    .calendar_events(events.clone())
    .build();

    let outcome = h.orchestrator.handle("email my boss tomorrow's plan").await.unwrap();

    assert_eq!(h.provider.invocations(), 2);
    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.reply.user_reply, "Sent your boss tomorrow's schedule.");

    let requests = h.provider.requests();
    assert_eq!(additional_data(&requests[0]), None);
    assert_eq!(
        additional_data(&requests[1]),
        Some(json!({"calendar_events": serde_json::to_value(&events).unwrap()}))
    );

    // the email from the fetch round was discarded, only the final one went out
    let sent = h.email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, "Busy 9 and 18.");

    let executed: Vec<&str> = outcome.outcomes.iter().map(|o| o.command.as_str()).collect();
    assert_eq!(executed, ["calendar.fetch", "email.send"]);
}

#[tokio::test]
async fn additional_data_is_only_the_previous_round() {
    let h = HarnessBuilder::new([
        reply(&json!({
            "commands": [{"command": "calendar.fetch", "params": {"from": "a", "to": "b"}}],
            "user_reply": ""
        })),
        reply(&json!({
            "commands": [
                {"command": "docs.read", "params": {"documentId": "d1"}},
                {"command": "docs.read", "params": {"documentId": "d2"}}
            ],
            "user_reply": ""
        })),
        reply(&json!({"user_reply": "Both notes mention the walk."})),
    ])
    .calendar_events(vec![event("e1", "Walk", "2025-12-22T08:00:00+06:00")])
    .build();

    let outcome = h.orchestrator.handle("compare my notes").await.unwrap();

    assert_eq!(outcome.rounds, 3);
    let requests = h.provider.requests();
    let third = additional_data(&requests[2]).unwrap();
    assert_eq!(third.as_object().unwrap().len(), 1);
    let documents = third["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["documentId"], "d1");
    assert_eq!(documents[1]["content"], "contents of d2");
}

#[tokio::test]
async fn failed_fetch_is_reported_in_additional_data() {
    let h = HarnessBuilder::new([
        reply(&json!({
            "commands": [{"command": "calendar.fetch", "params": {"from": "2025-12-22"}}],
            "user_reply": ""
        })),
        reply(&json!({"user_reply": "I couldn't read your calendar."})),
    ])
    .build();

    let outcome = h.orchestrator.handle("what's tomorrow?").await.unwrap();

    let data = additional_data(&h.provider.requests()[1]).unwrap();
    assert_eq!(data["calendar_events"], json!([]));
    assert_eq!(data["errors"][0]["command"], "calendar.fetch");
    assert_eq!(data["errors"][0]["kind"], "command_error");
    assert!(h.calendar.list_calls().is_empty());
    assert_eq!(outcome.outcomes[0].error_kind(), Some(ErrorKind::CommandError));
}

#[tokio::test]
async fn round_limit_abandons_turn_without_touching_memory() {
    let fetch_forever = reply(&json!({
        "updated_memory": {"immutable": {}, "mutable": {"looping": true}, "archive": {}},
        "commands": [{"command": "docs.list"}],
        "user_reply": "Looking..."
    }));
    let h = HarnessBuilder::new(vec![fetch_forever; 10])
        .memory(sample_memory())
        .max_rounds(3)
        .build();

    let outcome = h.orchestrator.handle("find my notes").await.unwrap();

    assert_eq!(h.provider.invocations(), 3);
    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.failure_kind(), Some(ErrorKind::RoundLimitExceeded));
    assert_eq!(outcome.reply.user_reply, APOLOGY_REPLY);
    assert!(outcome.reply.commands.is_empty());
    assert!(outcome.reply.updated_memory.is_none());
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
    // the first two rounds ran their fetches, the third was cut off
    assert_eq!(h.docs.calls(), ["list 10", "list 10"]);
}

#[tokio::test]
async fn single_round_bound_still_allows_a_direct_answer() {
    let h = HarnessBuilder::new([reply(&json!({"user_reply": "Hello"}))])
        .max_rounds(1)
        .build();

    let outcome = h.orchestrator.handle("hi").await.unwrap();
    assert!(!outcome.is_failed());
    assert_eq!(outcome.reply.user_reply, "Hello");
}

#[tokio::test]
async fn malformed_reply_returns_apology_and_applies_nothing() {
    let h = HarnessBuilder::new(["Sure! I'll add that walk for you."])
        .memory(sample_memory())
        .build();

    let outcome = h.orchestrator.handle("schedule a walk").await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(ErrorKind::ParseError));
    assert_eq!(outcome.reply.user_reply, APOLOGY_REPLY);
    assert!(outcome.reply.commands.is_empty());
    assert!(outcome.outcomes.is_empty());
    assert!(h.calendar.inserted().is_empty());
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
}

#[tokio::test]
async fn reply_with_extra_memory_tier_is_a_parse_error() {
    let h = HarnessBuilder::new([reply(&json!({
        "updated_memory": {"immutable": {}, "mutable": {}, "archive": {}, "transcript": ["hi"]},
        "commands": [{"command": "email.send", "params": {"to": "a@b.c", "subject": "s", "body": "b"}}],
        "user_reply": "ok"
    }))])
    .memory(sample_memory())
    .build();

    let outcome = h.orchestrator.handle("hi").await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(ErrorKind::ParseError));
    assert!(h.email.sent().is_empty());
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
}

#[tokio::test]
async fn parse_failure_after_fetch_round_keeps_memory() {
    let h = HarnessBuilder::new([
        reply(&json!({
            "updated_memory": {"immutable": {}, "mutable": {"partial": true}, "archive": {}},
            "commands": [{"command": "docs.list"}],
            "user_reply": ""
        })),
        "{\"user_reply\": ".to_string(),
    ])
    .memory(sample_memory())
    .build();

    let outcome = h.orchestrator.handle("list my docs").await.unwrap();

    assert_eq!(outcome.rounds, 2);
    assert_eq!(outcome.failure_kind(), Some(ErrorKind::ParseError));
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
}

#[tokio::test]
async fn model_transport_failure_returns_apology() {
    let h = HarnessBuilder::with_results(vec![Err(anyhow::anyhow!("Gemini API error (503)"))])
        .build();

    let outcome = h.orchestrator.handle("hi").await.unwrap();

    assert_eq!(outcome.failure_kind(), Some(ErrorKind::UpstreamError));
    assert_eq!(outcome.reply.user_reply, APOLOGY_REPLY);
    assert!(outcome.failure.unwrap().message.contains("503"));
}

#[tokio::test]
async fn immutable_tier_survives_model_rewrite() {
    let h = HarnessBuilder::new([reply(&json!({
        "updated_memory": {
            "immutable": {"name": "Someone Else"},
            "mutable": {"current_focus": "holidays"},
            "archive": {"2025-12": "finished exams"}
        },
        "user_reply": "Enjoy the break!"
    }))])
    .memory(sample_memory())
    .build();

    let outcome = h.orchestrator.handle("exams are over").await.unwrap();

    let stored = h.store.load().await.unwrap();
    assert_eq!(stored.immutable, sample_memory().immutable);
    assert_eq!(stored.mutable, json!({"current_focus": "holidays"}));
    assert_eq!(stored.archive, json!({"2025-12": "finished exams"}));
    assert_eq!(outcome.reply.updated_memory.unwrap().immutable, sample_memory().immutable);

    let persisted = stored.to_value();
    let keys: Vec<&String> = persisted.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 3);
}

#[tokio::test]
async fn memory_from_fetch_round_is_ignored() {
    let h = HarnessBuilder::new([
        reply(&json!({
            "updated_memory": {"immutable": {}, "mutable": {"stale": true}, "archive": {}},
            "commands": [{"command": "docs.list"}],
            "user_reply": ""
        })),
        reply(&json!({"user_reply": "You have one document."})),
    ])
    .memory(sample_memory())
    .build();

    let outcome = h.orchestrator.handle("how many docs?").await.unwrap();

    assert!(!outcome.is_failed());
    assert!(outcome.reply.updated_memory.is_none());
    assert_eq!(h.store.load().await.unwrap(), sample_memory());
}

#[tokio::test]
async fn persistence_failure_is_an_error() {
    let store = std::sync::Arc::new(FailingStore {
        snapshot: MemorySnapshot::empty(),
    });
    let h = HarnessBuilder::new([reply(&json!({
        "updated_memory": {"immutable": {}, "mutable": {"x": 1}, "archive": {}},
        "commands": [{"command": "calendar.delete_event", "params": {"eventId": "e1"}}],
        "user_reply": "Deleted."
    }))])
    .store(store)
    .build();

    let err = h.orchestrator.handle("delete it").await.unwrap_err();

    assert!(matches!(err, ConsciaError::Memory(MemoryError::Persist(_))));
    assert!(err.to_string().contains("database is locked"));
    assert!(h.calendar.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failing_commands_do_not_abort_the_batch() {
    let h = HarnessBuilder::new([reply(&json!({
        "commands": [
            {"command": "calendar.teleport", "params": {}},
            {"command": "calendar.add_event", "params": {"summary": "Walk", "start": "2025-12-22T08:00:00+06:00"}},
            {"command": "email.send", "params": {"to": "a@example.com", "subject": "Hi", "body": "Hello"}}
        ],
        "user_reply": "Done."
    }))])
    .build();

    let outcome = h.orchestrator.handle("do things").await.unwrap();

    let kinds: Vec<Option<ErrorKind>> = outcome.outcomes.iter().map(|o| o.error_kind()).collect();
    assert_eq!(
        kinds,
        [Some(ErrorKind::UnknownCommand), Some(ErrorKind::CommandError), None]
    );
    assert_eq!(h.email.sent().len(), 1);
    assert!(h.calendar.inserted().is_empty());
    // the reply reflects what was attempted, not what succeeded
    assert_eq!(outcome.reply.commands.len(), 3);
    assert_eq!(outcome.reply.user_reply, "Done.");
}
