//! Shared test utilities and fixtures
//!
//! Mock Responses API server helpers and clients wired to it.

#![allow(dead_code)]

use std::time::Duration;

use glutenscan_providers::retry::RetryConfig;
use glutenscan_providers::{ApiConfig, OpenAIClient};
use glutenscan_types::ApiKey;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const RESPONSES_PATH: &str = "/v1/responses";

/// Responses API body whose single message carries `text`.
pub fn responses_body(text: &str) -> Value {
    json!({
        "id": "resp_test",
        "object": "response",
        "created_at": 1_234_567_890,
        "status": "completed",
        "model": "gpt-4o-mini",
        "output": [{
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "output_text",
                "text": text,
                "annotations": []
            }]
        }],
        "usage": {
            "input_tokens": 10,
            "output_tokens": 20,
            "total_tokens": 30
        }
    })
}

/// Mount a successful structured response with `text` as the output.
pub async fn mount_structured_response(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path(RESPONSES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body(text)))
        .mount(server)
        .await;
}

/// Mount a fixed error status.
pub async fn mount_error(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(RESPONSES_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Mount a success that arrives after `delay`.
pub async fn mount_delayed_response(server: &MockServer, text: &str, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(RESPONSES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(responses_body(text))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

/// OpenAI client pointed at `server` over plain HTTP with near-instant retries.
pub fn client_for(server: &MockServer) -> OpenAIClient {
    let config = ApiConfig::new(ApiKey::new("sk-test").expect("non-blank key"))
        .with_endpoint(format!("{}{RESPONSES_PATH}", server.uri()))
        .with_timeout(Duration::from_secs(5));
    OpenAIClient::with_http_client(config, reqwest::Client::new()).with_retry_config(RetryConfig {
        max_retries: 1,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        jitter_factor: 0.0,
    })
}

/// A schema-conforming refinement payload.
pub const REFINED_PAYLOAD: &str = r#"{
    "verdict": "warning",
    "confidence": 0.66,
    "reasoning": "Oats are listed; cross-contamination is possible despite the claim.",
    "terms": [
        { "term": "oats", "matched": true, "rationale": "Oats are often processed with wheat." },
        { "term": "gluten-free", "matched": false }
    ]
}"#;
