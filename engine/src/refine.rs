use std::fmt::Write as _;
use std::time::Duration;

use glutenscan_providers::{OpenAIClient, ProviderError, StructuredCompletion, StructuredRequest};
use glutenscan_types::AnalysisResult;
use sha2::{Digest, Sha256};

use crate::config::{DEFAULT_REFINEMENT_TIMEOUT, RefinementSettings};
use crate::prompt::{PromptContext, SYSTEM_PROMPT, build_analysis_prompt};
use crate::schema::{RESPONSE_FORMAT_NAME, analysis_schema, parse_analysis};

/// Why a refinement attempt did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum RefineError {
    #[error("no refinement client configured")]
    Unconfigured,
    #[error("refinement service failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("refinement timed out after {0:?}")]
    Timeout(Duration),
    #[error("refinement service returned an empty response")]
    EmptyResponse,
    #[error("refinement response is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("refinement response does not match the analysis schema: {0}")]
    Schema(String),
}

/// Heuristic classification, optionally superseded by the refinement service.
///
/// The client is injected at construction. Without one every call returns the
/// heuristic result.
#[derive(Debug, Clone)]
pub struct Refiner<C = OpenAIClient> {
    client: Option<C>,
    timeout: Duration,
}

impl<C: StructuredCompletion> Refiner<C> {
    #[must_use]
    pub fn new(client: C) -> Self {
        Self {
            client: Some(client),
            timeout: DEFAULT_REFINEMENT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn without_client() -> Self {
        Self {
            client: None,
            timeout: DEFAULT_REFINEMENT_TIMEOUT,
        }
    }

    /// Upper bound on one refinement call, retries included.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    #[must_use]
    pub fn client(&self) -> Option<&C> {
        self.client.as_ref()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Classify `text`. Never fails: any refinement failure yields the
    /// heuristic result unchanged.
    pub async fn refine(&self, text: &str, context: &PromptContext) -> AnalysisResult {
        let heuristics = glutenscan_core::analyze(text);

        if self.client.is_none() {
            tracing::warn!(
                text_sha256 = %fingerprint(text),
                "No refinement credentials configured; using heuristic result"
            );
            return heuristics;
        }

        match self.try_refine(text, &heuristics, context).await {
            Ok(refined) => {
                tracing::debug!(
                    text_sha256 = %fingerprint(text),
                    heuristic = %heuristics.verdict,
                    refined = %refined.verdict,
                    "Refinement succeeded"
                );
                refined
            }
            Err(error) => {
                tracing::warn!(
                    %error,
                    text_sha256 = %fingerprint(text),
                    "Refinement failed; falling back to heuristic result"
                );
                heuristics
            }
        }
    }

    /// One refinement attempt grounded on `heuristics`.
    pub async fn try_refine(
        &self,
        text: &str,
        heuristics: &AnalysisResult,
        context: &PromptContext,
    ) -> Result<AnalysisResult, RefineError> {
        let Some(client) = &self.client else {
            return Err(RefineError::Unconfigured);
        };

        let user = build_analysis_prompt(text, heuristics, context);
        let request = StructuredRequest {
            system: SYSTEM_PROMPT,
            user: &user,
            schema_name: RESPONSE_FORMAT_NAME,
            schema: analysis_schema(),
        };

        let raw = tokio::time::timeout(self.timeout, client.complete(&request))
            .await
            .map_err(|_| RefineError::Timeout(self.timeout))??;

        parse_analysis(&raw)
    }
}

impl Refiner<OpenAIClient> {
    /// OpenAI-backed refiner when a credential resolved, client-less otherwise.
    #[must_use]
    pub fn from_settings(settings: &RefinementSettings) -> Self {
        let Some(config) = settings.api_config() else {
            return Self::without_client().with_timeout(settings.timeout);
        };

        match OpenAIClient::new(config) {
            Ok(client) => Self::new(client).with_timeout(settings.timeout),
            Err(error) => {
                tracing::warn!(%error, "Failed to build refinement client; using heuristics only");
                Self::without_client().with_timeout(settings.timeout)
            }
        }
    }
}

/// Short SHA-256 prefix identifying a text in logs without recording it.
fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..8].iter().fold(String::with_capacity(16), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
