//! Typed OpenAI Responses API payloads (non-streaming).
//!
//! Only the fields needed to pull the output text are modelled. Unknown output
//! items and content parts deserialize to `Unknown` so new API additions do not
//! break decoding.

use serde::Deserialize;

use crate::ProviderError;

#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub error: Option<ErrorInfo>,
    #[serde(default)]
    pub incomplete_details: Option<IncompleteDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<ContentPart>,
    },
    /// Reasoning items, tool calls, and anything newer.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        text: String,
    },
    Refusal {
        refusal: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct ErrorInfo {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncompleteDetails {
    #[serde(default)]
    pub reason: Option<String>,
}

impl Response {
    /// The first non-empty output text, or the reason there is none.
    pub fn output_text(&self) -> Result<&str, ProviderError> {
        match self.status.as_deref() {
            Some("failed") => {
                let message = self
                    .error
                    .as_ref()
                    .and_then(|e| e.message.clone())
                    .unwrap_or_else(|| "Response failed".to_string());
                return Err(ProviderError::Incomplete(message));
            }
            Some("incomplete") => {
                let reason = self
                    .incomplete_details
                    .as_ref()
                    .and_then(|d| d.reason.clone())
                    .unwrap_or_else(|| "Response incomplete".to_string());
                return Err(ProviderError::Incomplete(reason));
            }
            _ => {}
        }

        for item in &self.output {
            let OutputItem::Message { content } = item else {
                continue;
            };
            for part in content {
                match part {
                    ContentPart::OutputText { text } if !text.trim().is_empty() => {
                        return Ok(text);
                    }
                    ContentPart::Refusal { refusal } => {
                        return Err(ProviderError::Refused(refusal.clone()));
                    }
                    _ => {}
                }
            }
        }

        Err(ProviderError::EmptyOutput)
    }
}
