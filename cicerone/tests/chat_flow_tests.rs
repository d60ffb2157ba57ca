use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cicerone::config::{Config, RecsConfig, RewriteConfig, RewriteProviderKind, WeatherConfig};
use cicerone::entities::SlotRegistry;
use cicerone::flow::ChatFlow;
use cicerone::models::{LocationFix, Role};
use cicerone::store::{FsTokenStore, TokenStore};
use cicerone::telemetry::RecordingSink;

/// Config pointing the recommendation client at a mock server, with no
/// weather or rewrite credentials: weather is skipped, replies fall back to
/// the persona template (which keeps the raw text for mention filtering).
fn test_config(recs_base: String, state_dir: &std::path::Path, max_retries: u32) -> Config {
    Config {
        recs: RecsConfig {
            api_key: Some("test-key".to_string()),
            chat_base_url: recs_base.clone(),
            search_base_url: recs_base,
            max_retries,
            backoff_ms: 1,
        },
        rewrite: RewriteConfig {
            model: "openai/gpt-4o-mini".to_string(),
            api_key: None,
            base_url: None,
            provider: RewriteProviderKind::OpenAi,
            local_base_url: "http://localhost:11434/v1".to_string(),
            timeout_ms: 100,
            max_tokens: 120,
        },
        weather: WeatherConfig {
            api_key: None,
            base_url: "http://localhost:9/weather".to_string(),
        },
        state_dir: state_dir.to_string_lossy().into_owned(),
    }
}

async fn flow_for(persona: &str, config: &Config) -> (ChatFlow, RecordingSink) {
    let sink = RecordingSink::new();
    let store = Arc::new(FsTokenStore::new(config.state_dir.clone()));
    let flow = ChatFlow::new(
        persona,
        config,
        SlotRegistry::new(),
        store,
        Arc::new(sink.clone()),
    )
    .await;
    (flow, sink)
}

fn success_body() -> serde_json::Value {
    json!({
        "chat_id": "conv-1",
        "response": { "text": "Start with Starlight Bar, great cocktails." },
        "entities": [
            {
                "id": "b1",
                "name": "Starlight Bar",
                "rating": 4.5,
                "reservation_url": "https://book.example.com/b1"
            },
            { "id": "b2", "name": "Moonrise Cafe", "rating": 4.0 }
        ]
    })
}

#[tokio::test]
async fn test_successful_turn_builds_full_transcript() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 2);
    let (mut flow, _) = flow_for("ava", &config).await;

    flow.send_turn("surprise me", &LocationFix::default())
        .await
        .unwrap();

    assert!(!flow.is_loading());
    assert!(flow.error().is_none());
    assert_eq!(flow.chat_id(), Some("conv-1"));

    let messages = flow.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].text, "surprise me");
    assert_eq!(messages[1].role, Role::Assistant);

    // No rewrite credentials: persona-template fallback carries the raw text
    assert!(messages[1].text.starts_with("Artsy Ava take: "));
    assert!(messages[1].text.contains("Starlight Bar"));

    // Mention filter keeps only the referenced entity, slots attached
    assert_eq!(messages[1].entities.len(), 1);
    let starlight = &messages[1].entities[0];
    assert_eq!(starlight.name.as_deref(), Some("Starlight Bar"));
    assert!(!starlight.mock_slots.as_deref().unwrap().is_empty());
}

#[tokio::test]
async fn test_outbound_query_combines_context_preface_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 2);
    let (mut flow, _) = flow_for("ava", &config).await;

    let location = LocationFix {
        coords: None,
        city: Some("SoHo".to_string()),
        radius_miles: Some(2.0),
    };
    flow.send_turn("surprise me", &location).await.unwrap();

    let request = &server.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    let query = body["query"].as_str().unwrap();

    let parts: Vec<&str> = query.split("\n\n").collect();
    assert_eq!(parts.len(), 3);
    assert!(parts[0].starts_with("Current context:"));
    assert!(parts[0].contains("SoHo (40.7128, -74.0060)"));
    assert!(parts[0].contains("Strictly limit results to within 2 miles"));
    assert!(parts[1].contains("Art/design curator"));
    assert_eq!(parts[2], "surprise me");

    // Default fix when the caller has no coordinates
    assert_eq!(body["user_context"]["latitude"], 40.7128);
    assert_eq!(body["user_context"]["longitude"], -74.0060);
}

#[tokio::test]
async fn test_session_token_persists_across_flows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 2);

    let (mut flow, _) = flow_for("ava", &config).await;
    flow.send_turn("surprise me", &LocationFix::default())
        .await
        .unwrap();

    let store = FsTokenStore::new(dir.path());
    assert_eq!(store.load("ava").await.unwrap(), Some("conv-1".to_string()));

    // A new flow for the same persona restores the token and sends it
    let (mut restored, _) = flow_for("ava", &config).await;
    restored
        .send_turn("another", &LocationFix::default())
        .await
        .unwrap();

    let bodies = server.received_requests().await.unwrap();
    let second: serde_json::Value = serde_json::from_slice(&bodies[1].body).unwrap();
    assert_eq!(second["chat_id"], "conv-1");
}

#[tokio::test]
async fn test_failed_turn_sets_collapsed_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {
                "code": "internal_error",
                "description": "Something went wrong internally"
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 0);
    let (mut flow, sink) = flow_for("pete", &config).await;

    let result = flow.send_turn("surprise me", &LocationFix::default()).await;
    assert!(result.is_err());

    assert_eq!(flow.error(), Some("recommendation service internal error"));
    assert!(!flow.is_loading());
    // The user message stays; no assistant message is appended
    assert_eq!(flow.messages().len(), 1);
    assert_eq!(flow.messages()[0].role, Role::User);
    assert!(sink.api_error_count() >= 1);
}

#[tokio::test]
async fn test_failed_turn_keeps_literal_message_for_other_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 0);
    let (mut flow, _) = flow_for("pete", &config).await;

    let result = flow.send_turn("surprise me", &LocationFix::default()).await;
    assert!(result.is_err());
    assert_eq!(flow.error(), Some("Unauthorized: check recs API key"));
}

#[tokio::test]
async fn test_reset_clears_transcript_token_and_persisted_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 2);
    let (mut flow, _) = flow_for("ava", &config).await;

    flow.send_turn("surprise me", &LocationFix::default())
        .await
        .unwrap();
    assert_eq!(flow.messages().len(), 2);

    flow.reset().await;

    assert!(flow.messages().is_empty());
    assert!(flow.error().is_none());
    assert_eq!(flow.chat_id(), None);

    let store = FsTokenStore::new(dir.path());
    assert_eq!(store.load("ava").await.unwrap(), None);

    // The next turn starts a fresh conversation
    flow.send_turn("again", &LocationFix::default())
        .await
        .unwrap();
    let bodies = server.received_requests().await.unwrap();
    let last: serde_json::Value = serde_json::from_slice(&bodies.last().unwrap().body).unwrap();
    assert!(last.get("chat_id").is_none());
}

#[tokio::test]
async fn test_empty_response_text_skips_rewrite() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chat_id": "conv-2",
            "response": { "text": "" },
            "entities": []
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.uri(), dir.path(), 2);
    let (mut flow, _) = flow_for("ava", &config).await;

    flow.send_turn("surprise me", &LocationFix::default())
        .await
        .unwrap();

    let assistant = &flow.messages()[1];
    assert_eq!(assistant.text, "No response text returned.");
    assert!(assistant.entities.is_empty());
}
