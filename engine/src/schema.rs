//! The refinement response contract.
//!
//! One JSON Schema serves both as the structured-output format sent to the
//! refinement service and as the local validator for whatever comes back.

use std::sync::OnceLock;

use glutenscan_types::AnalysisResult;
use serde_json::{Value, json};

use crate::RefineError;

/// Name attached to the `json_schema` response format.
pub const RESPONSE_FORMAT_NAME: &str = "gluten_analysis";

/// JSON Schema for [`AnalysisResult`]. No additional properties anywhere.
pub fn analysis_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "object",
            "properties": {
                "verdict": { "type": "string", "enum": ["safe", "warning", "unsafe", "unknown"] },
                "confidence": { "type": "number" },
                "reasoning": { "type": "string" },
                "terms": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "term": { "type": "string" },
                            "matched": { "type": "boolean" },
                            "rationale": { "type": "string" }
                        },
                        "required": ["term", "matched"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["verdict", "confidence", "reasoning", "terms"],
            "additionalProperties": false
        })
    })
}

/// Compiled validator for [`analysis_schema`], built on first use.
fn analysis_validator() -> Result<&'static jsonschema::Validator, RefineError> {
    static VALIDATOR: OnceLock<Result<jsonschema::Validator, String>> = OnceLock::new();
    VALIDATOR
        .get_or_init(|| jsonschema::validator_for(analysis_schema()).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| RefineError::Schema(format!("invalid analysis schema: {e}")))
}

/// Parse and validate a raw refinement response.
///
/// Schema validation runs first; decoding into [`AnalysisResult`] then adds the
/// checks JSON Schema leaves out here (confidence range, non-blank strings).
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, RefineError> {
    if raw.trim().is_empty() {
        return Err(RefineError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(raw).map_err(RefineError::InvalidJson)?;

    analysis_validator()?
        .validate(&value)
        .map_err(|e| RefineError::Schema(e.to_string()))?;

    serde_json::from_value(value).map_err(|e| RefineError::Schema(e.to_string()))
}
