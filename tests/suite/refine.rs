//! Refinement fallback contract against a mock Responses API

use std::time::Duration;

use glutenscan_core::analyze;
use glutenscan_engine::{OpenAIClient, PromptContext, RefineError, Refiner};
use glutenscan_types::Verdict;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    REFINED_PAYLOAD, RESPONSES_PATH, client_for, mount_delayed_response, mount_error,
    mount_structured_response, responses_body,
};

const TEXT: &str = "Oat flakes, certified gluten-free";

#[tokio::test]
async fn without_credentials_output_equals_heuristics() {
    let refiner = Refiner::<OpenAIClient>::without_client();
    let result = refiner.refine(TEXT, &PromptContext::default()).await;
    assert_eq!(result, analyze(TEXT));
}

#[tokio::test]
async fn valid_payload_is_returned_verbatim() {
    let server = MockServer::start().await;
    mount_structured_response(&server, REFINED_PAYLOAD).await;

    let refiner = Refiner::new(client_for(&server));
    let result = refiner.refine(TEXT, &PromptContext::default()).await;

    let expected: glutenscan_types::AnalysisResult = serde_json::from_str(REFINED_PAYLOAD).unwrap();
    assert_eq!(result, expected);
    assert_ne!(result, analyze(TEXT));
}

#[tokio::test]
async fn request_carries_schema_and_grounding() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RESPONSES_PATH))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "stream": false,
            "text": { "format": {
                "type": "json_schema",
                "name": "gluten_analysis",
                "schema": { "additionalProperties": false }
            } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(responses_body(REFINED_PAYLOAD)))
        .expect(1)
        .mount(&server)
        .await;

    let refiner = Refiner::new(client_for(&server));
    let context = PromptContext::default().with_locale("fr-FR");
    let result = refiner.refine(TEXT, &context).await;
    assert_eq!(result.verdict, Verdict::Warning);

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["input"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("fr-FR"));
    assert!(prompt.contains(r#""term":"gluten-free","matched":false"#));
    assert!(prompt.contains(TEXT));
    assert!(body["instructions"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn http_failure_falls_back_to_heuristics() {
    let server = MockServer::start().await;
    mount_error(&server, 500, "upstream exploded").await;

    let refiner = Refiner::new(client_for(&server));
    let result = refiner.refine(TEXT, &PromptContext::default()).await;
    assert_eq!(result, analyze(TEXT));

    let err = refiner
        .try_refine(TEXT, &analyze(TEXT), &PromptContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RefineError::Provider(_)));
}

#[tokio::test]
async fn invalid_json_falls_back_to_heuristics() {
    for payload in [
        "I think this is probably fine.",
        r#"{"verdict":"safe","confidence":0.9}"#,
        r#"{"verdict":"safe","confidence":0.9,"reasoning":"ok","terms":[],"extra":1}"#,
    ] {
        let server = MockServer::start().await;
        mount_structured_response(&server, payload).await;

        let refiner = Refiner::new(client_for(&server));
        let result = refiner.refine(TEXT, &PromptContext::default()).await;
        assert_eq!(result, analyze(TEXT), "{payload}");
    }
}

#[tokio::test]
async fn refusal_falls_back_to_heuristics() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "completed",
            "output": [{
                "type": "message",
                "content": [{ "type": "refusal", "refusal": "No." }]
            }]
        })))
        .mount(&server)
        .await;

    let refiner = Refiner::new(client_for(&server));
    assert_eq!(
        refiner.refine(TEXT, &PromptContext::default()).await,
        analyze(TEXT)
    );
}

#[tokio::test]
async fn timeout_falls_back_to_heuristics() {
    let server = MockServer::start().await;
    mount_delayed_response(&server, REFINED_PAYLOAD, Duration::from_secs(2)).await;

    let refiner = Refiner::new(client_for(&server)).with_timeout(Duration::from_millis(100));
    let err = refiner
        .try_refine(TEXT, &analyze(TEXT), &PromptContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RefineError::Timeout(_)));

    let result = refiner.refine(TEXT, &PromptContext::default()).await;
    assert_eq!(result, analyze(TEXT));
}
