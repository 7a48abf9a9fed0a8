//! Tests for the engine pipeline

use super::*;
use crate::orchestrator::RetryPolicy;
use crate::persona::test_persona;
use augury_llm::{MockReply, MockService};
use serde_json::json;

const FIVE_SENTENCES: &str = "The Tower speaks of sudden change. It clears what no longer serves you. \
    Do not fear the fall! A new foundation waits below. Build it with care.";

fn engine(mock: &Arc<MockService>) -> OracleEngine {
    let personas = PersonaRegistry::from_configs([
        test_persona("tarot", &["m1", "m2"]),
        test_persona("zodiac", &["z1", "z2", "z3"]),
    ])
    .unwrap();
    let orchestrator = Orchestrator::new(mock.clone()).with_policy(RetryPolicy::immediate());
    OracleEngine::new(personas, orchestrator)
}

fn request(message: &str) -> ChatRequest {
    ChatRequest::new(message).with_persona_payload(json!({"name": "Madame Luna"}))
}

#[tokio::test]
async fn test_full_answer_within_free_limit() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(FIVE_SENTENCES)));
    let outcome = engine(&mock)
        .chat("tarot", &request("What does the Tower mean?").with_message_count(2))
        .await;

    assert_eq!(outcome.status, 200);
    let response = outcome.response;
    assert!(response.success);
    assert_eq!(response.response.as_deref(), Some(FIVE_SENTENCES));
    assert_eq!(response.free_messages_remaining, Some(1));
    assert_eq!(response.show_paywall, Some(false));
    assert_eq!(response.is_complete_response, Some(true));
    assert!(response.paywall_message.is_none());
}

#[tokio::test]
async fn test_partial_answer_over_limit() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(FIVE_SENTENCES)));
    let outcome = engine(&mock)
        .chat("tarot", &request("And then?").with_message_count(4))
        .await;

    assert_eq!(outcome.status, 200);
    let response = outcome.response;
    assert!(response.success);
    assert_eq!(response.show_paywall, Some(true));
    assert_eq!(response.free_messages_remaining, Some(0));
    assert_eq!(response.is_complete_response, Some(false));
    assert!(!response.paywall_message.unwrap_or_default().is_empty());

    let text = response.response.unwrap();
    assert!(text.starts_with(
        "The Tower speaks of sudden change. It clears what no longer serves you. Do not fear the fall..."
    ));
    assert!(text.ends_with("🔒 Unlock the rest of your reading."));
    assert!(!text.contains("foundation"));

    // partial profile budget
    assert_eq!(mock.calls()[0].max_output_tokens, 300);
}

#[tokio::test]
async fn test_bonus_credit_unlocks_full_answer() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(FIVE_SENTENCES)));
    let outcome = engine(&mock)
        .chat(
            "tarot",
            &request("One more").with_message_count(9).with_bonus_credits(1),
        )
        .await;

    assert_eq!(outcome.response.is_complete_response, Some(true));
    assert_eq!(outcome.response.show_paywall, Some(false));
}

#[tokio::test]
async fn test_truncated_answer_is_repaired() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(
        "Your energy is rising this week and the stars favor new beginnings. Keep an eye on the",
    )));
    let outcome = engine(&mock).chat("zodiac", &request("Leo")).await;

    assert_eq!(
        outcome.response.response.as_deref(),
        Some("Your energy is rising this week and the stars favor new beginnings.")
    );
}

#[tokio::test]
async fn test_validation_errors() {
    let mock = Arc::new(MockService::new());
    let engine = engine(&mock);

    let outcome = engine.chat("tarot", &ChatRequest::new("hello")).await;
    assert_eq!(outcome.status, 400);
    assert_eq!(outcome.response.code.as_deref(), Some("MISSING_PERSONA_DATA"));

    let outcome = engine.chat("tarot", &request("  ")).await;
    assert_eq!(outcome.response.code.as_deref(), Some("MISSING_USER_MESSAGE"));

    let outcome = engine.chat("tarot", &request(&"x".repeat(1501))).await;
    assert_eq!(outcome.status, 400);
    assert_eq!(outcome.response.code.as_deref(), Some("MESSAGE_TOO_LONG"));

    // no generation attempted for rejected input
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_persona() {
    let mock = Arc::new(MockService::new());
    let outcome = engine(&mock).chat("palmistry", &request("hi")).await;

    assert_eq!(outcome.status, 404);
    assert!(!outcome.is_success());
    assert_eq!(outcome.response.code.as_deref(), Some("PERSONA_NOT_FOUND"));
}

#[tokio::test]
async fn test_cascade_exhausted_lists_models() {
    let mock = Arc::new(MockService::failing(augury_llm::Error::Api(
        "internal".to_string(),
    )));
    let outcome = engine(&mock).chat("zodiac", &request("Aries")).await;

    assert_eq!(outcome.status, 503);
    let response = outcome.response;
    assert!(!response.success);
    assert_eq!(response.code.as_deref(), Some("ALL_MODELS_UNAVAILABLE"));
    let error = response.error.unwrap();
    for model in ["z1", "z2", "z3"] {
        assert!(error.contains(model), "{model} missing from {error}");
    }
    assert_eq!(mock.calls().len(), 9);
}

#[tokio::test]
async fn test_upstream_signals_classified() {
    let cases = [
        (augury_llm::Error::Safety("blocked".into()), 400, "SAFETY_FILTER"),
        (augury_llm::Error::Auth("bad key".into()), 401, "AUTH_ERROR"),
    ];
    for (error, status, code) in cases {
        let mock = Arc::new(MockService::failing(error));
        let outcome = engine(&mock).chat("tarot", &request("hi")).await;
        assert_eq!(outcome.status, status);
        assert_eq!(outcome.response.code.as_deref(), Some(code));
        assert_eq!(mock.calls().len(), 1);
    }
}

#[tokio::test]
async fn test_code_only_answer_is_empty_response() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(
        "```\nprint('the stars are bright tonight')\n```",
    )));
    let outcome = engine(&mock).chat("tarot", &request("hi")).await;

    assert_eq!(outcome.status, 503);
    assert_eq!(outcome.response.code.as_deref(), Some("EMPTY_RESPONSE"));
}

#[tokio::test]
async fn test_prompt_carries_history_and_message() {
    let mock = Arc::new(MockService::with_fallback(MockReply::text(FIVE_SENTENCES)));
    let history = vec![crate::chat::ConversationTurn {
        role: "user".to_string(),
        message: "I drew the Tower yesterday".to_string(),
    }];
    engine(&mock)
        .chat("TAROT", &request("What now?").with_history(history))
        .await;

    let prompt = &mock.calls()[0].prompt;
    assert!(prompt.starts_with("You are the tarot advisor."));
    assert!(prompt.contains("User: I drew the Tower yesterday"));
    assert!(prompt.contains("User: What now?"));
}

#[test]
fn test_settings_default() {
    let settings = EngineSettings::default();
    assert_eq!(settings.max_message_chars, 1500);
    assert_eq!(settings.history_turns, 10);
}
