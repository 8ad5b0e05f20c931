// Integration tests for the conversation orchestrator
//
// These drive the full turn state machine against scripted collaborators:
// bootstrap greeting, follow-up questions, the tool-call protocol with
// enrichment, degraded search, expiry, and completed-state idempotency.

use std::collections::HashMap;
use std::sync::Arc;

use advisor_core::memory::{
    FailingSearchEngine, MockChatProvider, MockReply, StaticProductStore, StaticSearchEngine,
};
use advisor_core::{
    Advisor, AdvisorError, ChatRole, SearchEngine, SearchHit, Session, SessionStatus,
    SessionStore, ToolCall, SEARCH_TOOL_NAME,
};
use chrono::Utc;
use serde_json::json;

fn cement_records() -> HashMap<String, serde_json::Value> {
    let mut records = HashMap::new();
    records.insert(
        "prod-1".to_string(),
        json!({
            "_id": "prod-1",
            "title": "Portland Cement 50kg",
            "description": "High strength OPC 53 grade cement for structural work",
            "category": "Cement",
            "price": 420,
            "embedding": [0.1, 0.2],
            "embedding_model": "text-embedding-004",
            "embedding_generated_at": "2024-01-01T00:00:00Z"
        }),
    );
    records.insert(
        "prod-2".to_string(),
        json!({
            "_id": "prod-2",
            "title": "White Cement 25kg",
            "description": "Fine white cement for finishing",
            "category": "Cement",
            "price": 610,
            "embedding": [0.3, 0.4]
        }),
    );
    records
}

fn cement_tool_call() -> ToolCall {
    ToolCall {
        name: SEARCH_TOOL_NAME.to_string(),
        arguments: json!({
            "query": "cement bags structural",
            "reasoning": "user urgently needs 50 bags of cement"
        }),
    }
}

fn advisor_with(
    provider: Arc<MockChatProvider>,
    search: Arc<dyn SearchEngine>,
    records: HashMap<String, serde_json::Value>,
) -> (Advisor, Arc<SessionStore>) {
    let store = Arc::new(SessionStore::new());
    let advisor = Advisor::new(
        provider,
        search,
        Arc::new(StaticProductStore::new(records)),
        store.clone(),
    );
    (advisor, store)
}

#[tokio::test]
async fn test_start_session_returns_greeting() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![MockReply::text(
            "Hi! What construction materials do you need?",
        )])
        .await;
    let (advisor, _) = advisor_with(
        provider.clone(),
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    let reply = advisor.start_session().await.unwrap();
    assert_eq!(reply.status, SessionStatus::Active);
    assert_eq!(reply.message, "Hi! What construction materials do you need?");
    assert_eq!(provider.call_count(), 1);

    // Transcript holds only the greeting, not the internal prompt
    let history = advisor.history(reply.session_id).await.unwrap();
    assert_eq!(history.messages.len(), 1);
    assert_eq!(history.messages[0].role, ChatRole::Assistant);
}

#[tokio::test]
async fn test_start_session_empty_reply_uses_fallback_greeting() {
    let provider = Arc::new(MockChatProvider::new());
    provider.set_replies(vec![MockReply::text("")]).await;
    let (advisor, _) = advisor_with(
        provider,
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    let reply = advisor.start_session().await.unwrap();
    assert!(!reply.message.is_empty());
}

#[tokio::test]
async fn test_free_text_reply_keeps_session_active() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::text("What grade of cement do you need?"),
        ])
        .await;
    let (advisor, _) = advisor_with(
        provider.clone(),
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    let start = advisor.start_session().await.unwrap();
    let reply = advisor
        .send_message(start.session_id, "I need cement")
        .await
        .unwrap();

    assert_eq!(reply.status, SessionStatus::Active);
    assert_eq!(reply.message, "What grade of cement do you need?");
    assert!(reply.products.is_none());
    assert!(reply.query_used.is_none());

    let history = advisor.history(start.session_id).await.unwrap();
    assert_eq!(history.status, SessionStatus::Active);
    assert_eq!(history.messages.len(), 3); // greeting, user, follow-up
    assert!(history.products.is_none());
}

#[tokio::test]
async fn test_urgent_message_runs_tool_protocol_to_completion() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::text("I found 2 great cement options for you."),
        ])
        .await;
    let search = Arc::new(StaticSearchEngine::new(vec![
        SearchHit {
            id: "prod-1".to_string(),
            combined_score: 0.9234567,
        },
        SearchHit {
            id: "prod-2".to_string(),
            combined_score: 0.81,
        },
    ]));
    let (advisor, _) = advisor_with(provider.clone(), search, cement_records());

    let start = advisor.start_session().await.unwrap();
    let reply = advisor
        .send_message(start.session_id, "urgent: 50 bags of cement")
        .await
        .unwrap();

    assert_eq!(reply.status, SessionStatus::Completed);
    assert_eq!(reply.message, "I found 2 great cement options for you.");
    assert!(reply.query_used.as_deref().unwrap().contains("cement"));
    assert_eq!(
        reply.reasoning.as_deref(),
        Some("user urgently needs 50 bags of cement")
    );

    let products = reply.products.unwrap();
    assert_eq!(products.len(), 2);
    // Best candidate first, score rounded to 4 decimal places
    assert_eq!(products[0].relevance_score(), 0.9235);

    // No embedding-related fields survive enrichment, values are scalar
    for product in &products {
        let value = serde_json::to_value(product).unwrap();
        let fields = value.as_object().unwrap();
        assert!(!fields.keys().any(|k| k.starts_with("embedding")));
        for field in fields.values() {
            assert!(field.is_string() || field.is_number() || field.is_boolean());
        }
    }

    // Greeting + tool turn + summary turn
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_completed_session_replays_without_provider_calls() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::text("Here are your cement options."),
        ])
        .await;
    let search = Arc::new(StaticSearchEngine::new(vec![SearchHit {
        id: "prod-1".to_string(),
        combined_score: 0.9,
    }]));
    let (advisor, _) = advisor_with(provider.clone(), search, cement_records());

    let start = advisor.start_session().await.unwrap();
    let completed = advisor
        .send_message(start.session_id, "urgent cement")
        .await
        .unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    let calls_after_completion = provider.call_count();

    // Any further message is answered from stored state, idempotently
    for text in ["thanks", "more please", ""] {
        let replay = advisor.send_message(start.session_id, text).await.unwrap();
        assert_eq!(replay.status, SessionStatus::Completed);
        assert_eq!(replay.message, completed.message);
        assert_eq!(replay.query_used, completed.query_used);
        assert_eq!(
            replay.products.as_ref().map(|p| p.len()),
            completed.products.as_ref().map(|p| p.len())
        );
    }
    assert_eq!(provider.call_count(), calls_after_completion);
}

#[tokio::test]
async fn test_unreachable_search_still_completes_with_empty_products() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::text("Sorry, I could not find matching products."),
        ])
        .await;
    let (advisor, _) = advisor_with(
        provider,
        Arc::new(FailingSearchEngine),
        HashMap::new(),
    );

    let start = advisor.start_session().await.unwrap();
    let reply = advisor
        .send_message(start.session_id, "urgent cement")
        .await
        .unwrap();

    assert_eq!(reply.status, SessionStatus::Completed);
    assert!(!reply.message.is_empty());
    assert_eq!(reply.products.as_deref(), Some(&[][..]));
}

#[tokio::test]
async fn test_unresolvable_candidates_are_dropped_silently() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::text("Found one option."),
        ])
        .await;
    let search = Arc::new(StaticSearchEngine::new(vec![
        SearchHit {
            id: "prod-1".to_string(),
            combined_score: 0.9,
        },
        SearchHit {
            id: "missing".to_string(),
            combined_score: 0.8,
        },
        SearchHit {
            id: "broken".to_string(),
            combined_score: 0.7,
        },
    ]));
    let store = Arc::new(SessionStore::new());
    let advisor = Advisor::new(
        provider,
        search,
        Arc::new(StaticProductStore::new(cement_records()).with_failing_id("broken")),
        store,
    );

    let start = advisor.start_session().await.unwrap();
    let reply = advisor
        .send_message(start.session_id, "urgent cement")
        .await
        .unwrap();

    assert_eq!(reply.status, SessionStatus::Completed);
    assert_eq!(reply.products.unwrap().len(), 1);
}

#[tokio::test]
async fn test_provider_error_leaves_session_retryable() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::error("rate limited"),
            MockReply::text("What cement grade do you need?"),
        ])
        .await;
    let (advisor, _) = advisor_with(
        provider,
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    let start = advisor.start_session().await.unwrap();
    let err = advisor
        .send_message(start.session_id, "I need cement")
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisorError::Provider(_)));

    // The failed turn must not have touched the transcript
    let history = advisor.history(start.session_id).await.unwrap();
    assert_eq!(history.messages.len(), 1);
    assert_eq!(history.status, SessionStatus::Active);

    // Retrying the same message succeeds
    let reply = advisor
        .send_message(start.session_id, "I need cement")
        .await
        .unwrap();
    assert_eq!(reply.message, "What cement grade do you need?");
}

#[tokio::test]
async fn test_summary_call_failure_keeps_session_active_and_retryable() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::error("rate limited"),
            MockReply::tool_call(cement_tool_call()),
            MockReply::text("Here are your cement options."),
        ])
        .await;
    let search = Arc::new(StaticSearchEngine::new(vec![SearchHit {
        id: "prod-1".to_string(),
        combined_score: 0.9,
    }]));
    let (advisor, _) = advisor_with(provider.clone(), search, cement_records());

    let start = advisor.start_session().await.unwrap();
    let err = advisor
        .send_message(start.session_id, "urgent cement")
        .await
        .unwrap_err();
    assert!(matches!(err, AdvisorError::Provider(_)));

    // The aborted turn left the session Active with no outcome and the
    // transcript untouched (greeting only).
    let history = advisor.history(start.session_id).await.unwrap();
    assert_eq!(history.status, SessionStatus::Active);
    assert!(history.products.is_none());
    assert_eq!(history.messages.len(), 1);

    // Retrying the same message completes the session...
    let reply = advisor
        .send_message(start.session_id, "urgent cement")
        .await
        .unwrap();
    assert_eq!(reply.status, SessionStatus::Completed);
    assert_eq!(reply.products.unwrap().len(), 1);

    // ...and the user message appears in the transcript exactly once
    let history = advisor.history(start.session_id).await.unwrap();
    let user_count = history
        .messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .count();
    assert_eq!(user_count, 1);
}

#[tokio::test]
async fn test_expired_session_is_not_found_for_all_operations() {
    let provider = Arc::new(MockChatProvider::new());
    let (advisor, store) = advisor_with(
        provider,
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    // Seed a session created 61 minutes ago, past the 1-hour TTL
    let mut session = Session::new();
    session.created_at = Utc::now() - chrono::Duration::minutes(61);
    let id = session.id;
    store.insert(session).await;

    assert!(matches!(
        advisor.send_message(id, "hello").await.unwrap_err(),
        AdvisorError::SessionNotFound(_)
    ));
    assert!(matches!(
        advisor.history(id).await.unwrap_err(),
        AdvisorError::SessionNotFound(_)
    ));
    assert!(matches!(
        advisor.delete_session(id).await.unwrap_err(),
        AdvisorError::SessionNotFound(_)
    ));

    // Purged from the registry by the access attempt
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_delete_nonexistent_and_double_delete() {
    let provider = Arc::new(MockChatProvider::new());
    provider.set_replies(vec![MockReply::text("Hello!")]).await;
    let (advisor, _) = advisor_with(
        provider,
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );

    assert!(matches!(
        advisor.delete_session(uuid::Uuid::now_v7()).await.unwrap_err(),
        AdvisorError::SessionNotFound(_)
    ));

    let start = advisor.start_session().await.unwrap();
    advisor.delete_session(start.session_id).await.unwrap();
    assert!(matches!(
        advisor.delete_session(start.session_id).await.unwrap_err(),
        AdvisorError::SessionNotFound(_)
    ));
}

#[tokio::test]
async fn test_concurrent_messages_on_one_session_serialize() {
    let provider = Arc::new(MockChatProvider::new());
    provider
        .set_replies(vec![
            MockReply::text("Hello!"),
            MockReply::text("Tell me more about the wall."),
            MockReply::text("And the surface area?"),
        ])
        .await;
    let (advisor, _) = advisor_with(
        provider,
        Arc::new(StaticSearchEngine::default()),
        HashMap::new(),
    );
    let advisor = Arc::new(advisor);

    let start = advisor.start_session().await.unwrap();
    let id = start.session_id;

    let a = {
        let advisor = advisor.clone();
        tokio::spawn(async move { advisor.send_message(id, "building a wall").await })
    };
    let b = {
        let advisor = advisor.clone();
        tokio::spawn(async move { advisor.send_message(id, "need bricks too").await })
    };

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    // Both turns landed, FIFO on the per-session lock: greeting plus two
    // user/assistant pairs, no interleaved or lost appends.
    let history = advisor.history(id).await.unwrap();
    assert_eq!(history.messages.len(), 5);
    let user_count = history
        .messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .count();
    assert_eq!(user_count, 2);
}
