//! Transport-free handlers for the text and photo analysis endpoints.

use std::time::Instant;

use glutenscan_providers::{OpenAIClient, StructuredCompletion};
use glutenscan_types::AnalysisResult;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_OCR_LANGUAGES, Settings};
use crate::ocr::{OcrEngine, OcrError, TesseractOcr};
use crate::prompt::{DEFAULT_LOCALE, PromptContext};
use crate::refine::Refiner;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    pub text: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Text,
    Photo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextResponse {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePhotoResponse {
    pub result: AnalysisResult,
    pub source: AnalysisSource,
    pub raw_text: String,
    pub ocr_provider: String,
    /// Time spent in OCR.
    pub duration_ms: u64,
}

/// Caller-visible failures. Refinement problems never appear here.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("text to analyze is required")]
    EmptyText,
    #[error("no image provided")]
    NoImage,
    #[error("image is too large ({size} bytes, limit {limit})")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("OCR found no text in the image")]
    OcrInconclusive,
    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),
}

impl ServiceError {
    /// HTTP status a transport layer should answer with.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EmptyText | Self::NoImage => 400,
            Self::ImageTooLarge { .. } => 413,
            Self::OcrInconclusive => 422,
            Self::Ocr(_) => 502,
        }
    }
}

pub struct AnalysisService<C = OpenAIClient, O = TesseractOcr> {
    refiner: Refiner<C>,
    ocr: O,
    default_locale: String,
    max_upload_bytes: usize,
    ocr_languages: String,
}

impl AnalysisService {
    /// Production wiring: OpenAI refinement (when keyed) and local Tesseract.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        AnalysisService::new(Refiner::from_settings(&settings.refinement), TesseractOcr::new())
            .with_default_locale(settings.default_locale.clone())
            .with_max_upload_bytes(settings.max_upload_bytes)
            .with_ocr_languages(settings.ocr_languages.clone())
    }
}

impl<C: StructuredCompletion, O: OcrEngine> AnalysisService<C, O> {
    #[must_use]
    pub fn new(refiner: Refiner<C>, ocr: O) -> Self {
        Self {
            refiner,
            ocr,
            default_locale: DEFAULT_LOCALE.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            ocr_languages: DEFAULT_OCR_LANGUAGES.to_string(),
        }
    }

    /// Locale used when a request does not name one.
    #[must_use]
    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, limit: usize) -> Self {
        self.max_upload_bytes = limit;
        self
    }

    #[must_use]
    pub fn with_ocr_languages(mut self, languages: impl Into<String>) -> Self {
        self.ocr_languages = languages.into();
        self
    }

    #[must_use]
    pub fn refiner(&self) -> &Refiner<C> {
        &self.refiner
    }

    fn context(&self, locale: Option<String>, product_name: Option<String>) -> PromptContext {
        let locale = locale
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.default_locale.clone());
        PromptContext {
            locale: Some(locale),
            product_name,
        }
    }

    pub async fn analyze_text(
        &self,
        request: AnalyzeTextRequest,
    ) -> Result<AnalyzeTextResponse, ServiceError> {
        if request.text.trim().is_empty() {
            return Err(ServiceError::EmptyText);
        }

        let context = self.context(request.locale, request.product_name);
        let result = self.refiner.refine(&request.text, &context).await;

        Ok(AnalyzeTextResponse {
            result,
            source: AnalysisSource::Text,
            raw_text: request.text,
        })
    }

    pub async fn analyze_photo(&self, image: &[u8]) -> Result<AnalyzePhotoResponse, ServiceError> {
        if image.is_empty() {
            return Err(ServiceError::NoImage);
        }
        if image.len() > self.max_upload_bytes {
            return Err(ServiceError::ImageTooLarge {
                size: image.len(),
                limit: self.max_upload_bytes,
            });
        }

        let started = Instant::now();
        let ocr = self.ocr.recognize(image, &self.ocr_languages).await?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let text = ocr.text.trim();
        if text.is_empty() {
            tracing::info!(provider = %ocr.provider, duration_ms, "OCR returned no text");
            return Err(ServiceError::OcrInconclusive);
        }

        let context = self.context(None, None);
        let result = self.refiner.refine(text, &context).await;

        Ok(AnalyzePhotoResponse {
            result,
            source: AnalysisSource::Photo,
            raw_text: text.to_string(),
            ocr_provider: ocr.provider,
            duration_ms,
        })
    }
}
