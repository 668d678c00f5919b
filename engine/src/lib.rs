//! Refinement orchestration and service entry points for GlutenScan.
//!
//! ```text
//! text -> glutenscan_core::analyze -> heuristics
//!                                      |
//!          no client ------------------+--> heuristics
//!          Refiner -> StructuredCompletion
//!              schema-valid response -----> refined result
//!              any failure ---------------> heuristics
//! ```
//!
//! - [`Refiner`] - heuristic baseline plus optional refinement, never fails
//! - [`schema`] - the response contract shared by request and validation
//! - [`AnalysisService`] - text and photo handlers with request validation
//! - [`config`] - `~/.glutenscan/config.toml` and environment resolution

pub mod config;
mod ocr;
mod prompt;
mod refine;
pub mod schema;
mod service;

pub use config::{ConfigError, GlutenscanConfig, RefinementSettings, Settings};
pub use ocr::{OcrEngine, OcrError, OcrOutput, TesseractOcr};
pub use prompt::{DEFAULT_LOCALE, PromptContext, SYSTEM_PROMPT, build_analysis_prompt};
pub use refine::{RefineError, Refiner};
pub use service::{
    AnalysisService, AnalysisSource, AnalyzePhotoResponse, AnalyzeTextRequest,
    AnalyzeTextResponse, DEFAULT_MAX_UPLOAD_BYTES, ServiceError,
};

pub use glutenscan_core;
pub use glutenscan_providers::{self, ApiConfig, OpenAIClient, StructuredCompletion};
pub use glutenscan_types::{self, AnalysisResult, AnalysisTerm, Verdict};
