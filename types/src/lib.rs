//! Core domain types for GlutenScan.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod analysis;
mod proofs;

pub use analysis::{AnalysisResult, AnalysisTerm, Verdict};
pub use proofs::{
    Confidence, ConfidenceError, EmptyStringError, NonEmptyStaticStr, NonEmptyString,
};

// ============================================================================
// Credentials
// ============================================================================

/// API key for the refinement service.
///
/// The `Debug` impl never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

impl ApiKey {
    /// Returns `None` for blank keys so an empty env var counts as "not configured".
    #[must_use]
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}
