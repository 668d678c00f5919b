//! Text and photo entry points end to end

use glutenscan_engine::{
    AnalysisService, AnalyzeTextRequest, OcrEngine, OcrError, OcrOutput, OpenAIClient, Refiner,
    ServiceError,
};
use glutenscan_types::Verdict;
use wiremock::MockServer;

use crate::common::{REFINED_PAYLOAD, client_for, mount_error, mount_structured_response};

struct FixedOcr(&'static str);

impl OcrEngine for FixedOcr {
    async fn recognize(&self, _image: &[u8], _languages: &str) -> Result<OcrOutput, OcrError> {
        Ok(OcrOutput {
            text: self.0.to_string(),
            provider: "fixed".to_string(),
        })
    }
}

#[tokio::test]
async fn text_endpoint_uses_refinement_when_available() {
    let server = MockServer::start().await;
    mount_structured_response(&server, REFINED_PAYLOAD).await;

    let service = AnalysisService::new(Refiner::new(client_for(&server)), FixedOcr(""));
    let response = service
        .analyze_text(AnalyzeTextRequest {
            text: "Oat flakes, certified gluten-free".to_string(),
            locale: Some("en-GB".to_string()),
            product_name: Some("Morning Oats".to_string()),
        })
        .await
        .unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["source"], "text");
    assert_eq!(json["rawText"], "Oat flakes, certified gluten-free");
    assert_eq!(json["result"]["confidence"], 0.66);
    assert_eq!(json["result"]["terms"][0]["term"], "oats");
}

#[tokio::test]
async fn text_endpoint_degrades_to_heuristics() {
    let server = MockServer::start().await;
    mount_error(&server, 503, "overloaded").await;

    let service = AnalysisService::new(Refiner::new(client_for(&server)), FixedOcr(""));
    let response = service
        .analyze_text(AnalyzeTextRequest {
            text: "Rice crackers, gluten-free".to_string(),
            ..AnalyzeTextRequest::default()
        })
        .await
        .unwrap();

    assert_eq!(response.result, glutenscan_core::analyze("Rice crackers, gluten-free"));
    assert_eq!(response.result.verdict, Verdict::Safe);
}

#[tokio::test]
async fn empty_text_is_rejected_before_classification() {
    let server = MockServer::start().await;
    let service = AnalysisService::new(Refiner::new(client_for(&server)), FixedOcr(""));

    let err = service
        .analyze_text(AnalyzeTextRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::EmptyText));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn photo_endpoint_reports_ocr_metadata() {
    let service = AnalysisService::new(
        Refiner::<OpenAIClient>::without_client(),
        FixedOcr("INGREDIENTS: WHEAT FLOUR, SUGAR."),
    );
    let response = service.analyze_photo(b"jpeg bytes").await.unwrap();

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["source"], "photo");
    assert_eq!(json["rawText"], "INGREDIENTS: WHEAT FLOUR, SUGAR.");
    assert_eq!(json["ocrProvider"], "fixed");
    assert_eq!(json["result"]["verdict"], "unsafe");
    assert!(json.get("durationMs").is_some());
}

#[tokio::test]
async fn photo_endpoint_rejects_inconclusive_ocr() {
    let service = AnalysisService::new(Refiner::<OpenAIClient>::without_client(), FixedOcr(""));
    let err = service.analyze_photo(b"jpeg bytes").await.unwrap_err();
    assert!(matches!(err, ServiceError::OcrInconclusive));
    assert_eq!(err.status_code(), 422);
}
