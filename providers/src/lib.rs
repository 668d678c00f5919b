//! Client for the external refinement service.
//!
//! # Architecture
//!
//! - [`StructuredCompletion`] - the seam the orchestrator depends on: one system
//!   instruction plus one user prompt in, one JSON document (as text) out
//! - [`openai`] - implementation against the OpenAI Responses API with a
//!   `json_schema` response format
//! - [`retry`] - retry policy for transient HTTP failures
//! - [`response_types`] - typed Responses API payloads
//!
//! # Error Handling
//!
//! Every failure is a [`ProviderError`]. Nothing here decides what to do about a
//! failure; the caller owns the fallback policy.

pub mod openai;
pub mod response_types;
pub mod retry;

use std::future::Future;
use std::time::Duration;

use glutenscan_types::ApiKey;

pub use glutenscan_types;
pub use openai::OpenAIClient;

/// Canonical OpenAI Responses API endpoint.
pub const OPENAI_RESPONSES_API_URL: &str = "https://api.openai.com/v1/responses";
/// Default model for refinement. Small and fast is enough for ingredient lists.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 16;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// One structured-output request.
#[derive(Debug, Clone)]
pub struct StructuredRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    /// Name the provider attaches to the response format.
    pub schema_name: &'a str,
    /// JSON Schema the response must match.
    pub schema: &'a serde_json::Value,
}

/// A service that answers a [`StructuredRequest`] with a JSON document.
///
/// Implementations return the raw document text; validating it is the
/// caller's job.
pub trait StructuredCompletion: Send + Sync {
    fn complete(
        &self,
        request: &StructuredRequest<'_>,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },
    #[error("API error {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("model refused: {0}")]
    Refused(String),
    #[error("response incomplete: {0}")]
    Incomplete(String),
    #[error("response contained no output text")]
    EmptyOutput,
}

/// Credentials, model and endpoint for the refinement service.
///
/// ```rust
/// use glutenscan_providers::ApiConfig;
/// use glutenscan_types::ApiKey;
///
/// let config = ApiConfig::new(ApiKey::new("sk-test").unwrap())
///     .with_model("gpt-4o");
/// assert_eq!(config.model(), "gpt-4o");
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    api_key: ApiKey,
    model: String,
    endpoint: String,
    timeout: Duration,
}

impl ApiConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: OPENAI_RESPONSES_API_URL.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn base_client_builder() -> reqwest::ClientBuilder {
    use reqwest::header::{HeaderMap, HeaderValue};

    let mut default_headers = HeaderMap::new();
    default_headers.insert("X-Stainless-Lang", HeaderValue::from_static("rust"));
    default_headers.insert(
        "X-Stainless-OS",
        HeaderValue::from_static(std::env::consts::OS),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .https_only(true)
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

/// Hardened HTTPS-only client with a total per-request timeout.
pub fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    base_client_builder()
        .timeout(timeout)
        .build()
        .map_err(ProviderError::ClientBuild)
}

/// Read at most 32 KiB of an error body; larger bodies are cut and marked.
pub async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
