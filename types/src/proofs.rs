//! Core proof types for validated content.
//!
//! These types enforce invariants at construction time. Once you hold a value,
//! you know it satisfies all required constraints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// This type enforces the invariant that the contained string is never empty
/// (or whitespace-only) after trimming. Validation occurs at construction time,
/// so all operations on an existing `NonEmptyString` can assume the content is valid.
///
/// # Serde
///
/// Serializes as a plain JSON string. Deserialization validates non-emptiness
/// and fails with an error if the string is empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("string content must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    /// Join non-empty parts with `separator`.
    ///
    /// The first part guarantees the result is non-empty regardless of the rest.
    #[must_use]
    pub fn join(first: NonEmptyStaticStr, rest: &[NonEmptyStaticStr], separator: &str) -> Self {
        let mut value = String::from(first.as_str());
        for part in rest {
            value.push_str(separator);
            value.push_str(part.as_str());
        }
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyStaticStr> for NonEmptyString {
    fn from(value: NonEmptyStaticStr) -> Self {
        Self(value.0.to_string())
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A compile-time checked non-empty static string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NonEmptyStaticStr(&'static str);

impl NonEmptyStaticStr {
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        assert!(!value.is_empty(), "NonEmptyStaticStr must not be empty");
        Self(value)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

/// A certainty score in the closed interval `[0.0, 1.0]`.
///
/// NaN and out-of-range values are unrepresentable. Deserialization goes
/// through [`Confidence::new`], so payloads from outside the process are held
/// to the same bound.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Confidence(f64);

#[derive(Debug, Error, PartialEq)]
#[error("confidence {0} is outside [0, 1]")]
pub struct ConfidenceError(pub f64);

impl Confidence {
    pub fn new(value: f64) -> Result<Self, ConfidenceError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfidenceError(value))
        }
    }

    /// Build a confidence from a literal; out-of-range literals fail const evaluation.
    #[must_use]
    pub const fn from_static(value: f64) -> Self {
        assert!(value >= 0.0 && value <= 1.0, "confidence literal out of range");
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.0 > self.0 { other } else { self }
    }
}

impl TryFrom<f64> for Confidence {
    type Error = ConfidenceError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for f64 {
    fn from(value: Confidence) -> Self {
        value.0
    }
}
