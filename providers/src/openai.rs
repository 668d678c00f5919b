use serde_json::{Value, json};

use crate::{
    ApiConfig, ProviderError, StructuredCompletion, StructuredRequest, http_client_with_timeout,
    read_capped_error_body,
    response_types::Response,
    retry::{RetryConfig, RetryOutcome, send_with_retry},
};

/// OpenAI Responses API client for structured (`json_schema`) completions.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    config: ApiConfig,
    http: reqwest::Client,
    retry: RetryConfig,
}

impl OpenAIClient {
    /// Client over a hardened HTTPS-only connection pool.
    pub fn new(config: ApiConfig) -> Result<Self, ProviderError> {
        let http = http_client_with_timeout(config.timeout())?;
        Ok(Self::with_http_client(config, http))
    }

    /// Client over a caller-supplied connection pool.
    #[must_use]
    pub fn with_http_client(config: ApiConfig, http: reqwest::Client) -> Self {
        Self {
            config,
            http,
            retry: RetryConfig::default(),
        }
    }

    #[must_use]
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

fn build_request_body(config: &ApiConfig, request: &StructuredRequest<'_>) -> Value {
    json!({
        "model": config.model(),
        "instructions": request.system,
        "input": [{ "role": "user", "content": request.user }],
        "text": {
            "format": {
                "type": "json_schema",
                "name": request.schema_name,
                "schema": request.schema,
                "strict": false,
            }
        },
        "stream": false,
    })
}

impl StructuredCompletion for OpenAIClient {
    async fn complete(&self, request: &StructuredRequest<'_>) -> Result<String, ProviderError> {
        let body = build_request_body(&self.config, request);
        let auth_header = format!("Bearer {}", self.config.api_key());
        let endpoint = self.config.endpoint();

        let outcome = send_with_retry(
            || {
                self.http
                    .post(endpoint)
                    .header("Authorization", &auth_header)
                    .header("content-type", "application/json")
                    .json(&body)
            },
            Some(self.config.timeout()),
            &self.retry,
        )
        .await;

        let response = match outcome {
            RetryOutcome::Success(response) => response,
            RetryOutcome::HttpError(response) => {
                let status = response.status();
                let body = read_capped_error_body(response).await;
                return Err(ProviderError::Http { status, body });
            }
            RetryOutcome::Transport { attempts, source } => {
                return Err(ProviderError::Transport { attempts, source });
            }
        };

        let parsed: Response = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        parsed.output_text().map(str::to_string)
    }
}
