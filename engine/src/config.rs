//! `~/.glutenscan/config.toml` loading and settings resolution.
//!
//! ```toml
//! [refinement]
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o-mini"
//! endpoint = "https://api.openai.com/v1/responses"
//! timeout_secs = 20
//!
//! [analysis]
//! default_locale = "en-US"
//!
//! [upload]
//! max_size_mb = 10
//!
//! [ocr]
//! languages = "eng+fra"
//! ```
//!
//! Every section and key is optional. [`GlutenscanConfig::settings`] folds the
//! file together with the environment into concrete [`Settings`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use glutenscan_providers::{ApiConfig, DEFAULT_MODEL, OPENAI_RESPONSES_API_URL};
use glutenscan_types::ApiKey;
use serde::Deserialize;

use crate::prompt::DEFAULT_LOCALE;
use crate::service::DEFAULT_MAX_UPLOAD_BYTES;

pub const CONFIG_PATH_ENV: &str = "GLUTENSCAN_CONFIG";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const MODEL_ENV: &str = "LLM_MODEL";

pub const DEFAULT_REFINEMENT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_OCR_LANGUAGES: &str = "eng+fra";

#[derive(Debug, Default, Deserialize)]
pub struct GlutenscanConfig {
    pub refinement: Option<RefinementConfig>,
    pub analysis: Option<AnalysisConfig>,
    pub upload: Option<UploadConfig>,
    pub ocr: Option<OcrConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct RefinementConfig {
    /// Supports `${VAR}` references.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for RefinementConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("RefinementConfig")
            .field("api_key", &key)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    /// Locale the refinement service writes its explanation in.
    pub default_locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UploadConfig {
    pub max_size_mb: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OcrConfig {
    /// Tesseract language spec, e.g. `eng+fra`.
    pub languages: Option<String>,
}

/// Resolved settings with every default applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub refinement: RefinementSettings,
    pub default_locale: String,
    pub max_upload_bytes: usize,
    pub ocr_languages: String,
}

impl Default for Settings {
    fn default() -> Self {
        GlutenscanConfig::default().settings_with(|_| None)
    }
}

#[derive(Debug, Clone)]
pub struct RefinementSettings {
    /// `None` puts the refiner in heuristic-only mode.
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl RefinementSettings {
    /// Client configuration, when a credential is available.
    #[must_use]
    pub fn api_config(&self) -> Option<ApiConfig> {
        let key = self.api_key.clone()?;
        Some(
            ApiConfig::new(key)
                .with_model(self.model.clone())
                .with_endpoint(self.endpoint.clone())
                .with_timeout(self.timeout),
        )
    }
}

/// Expand `${VAR}` references through `lookup`.
///
/// Unset variables expand to nothing; an unclosed `${` is kept literally.
fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after_open[..end];
        if !name.is_empty()
            && let Some(replacement) = lookup(name)
        {
            out.push_str(&replacement);
        }
        rest = &after_open[end + 1..];
    }

    out.push_str(rest);
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `$GLUTENSCAN_CONFIG`, else `~/.glutenscan/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = non_blank(std::env::var(CONFIG_PATH_ENV).ok()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".glutenscan").join("config.toml"))
}

impl GlutenscanConfig {
    /// Load from [`config_path`]. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Resolve against the process environment.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings_with(|name| std::env::var(name).ok())
    }

    /// Resolve against `lookup` instead of the process environment.
    ///
    /// Key: config file (after `${VAR}` expansion), then `OPENAI_API_KEY`.
    /// Model: `LLM_MODEL`, then config file, then [`DEFAULT_MODEL`].
    pub fn settings_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Settings {
        let refinement = self.refinement.as_ref();

        let api_key = refinement
            .and_then(|r| r.api_key.as_deref())
            .map(|raw| expand_with(raw, &lookup))
            .and_then(ApiKey::new)
            .or_else(|| lookup(API_KEY_ENV).and_then(ApiKey::new));

        let model = non_blank(lookup(MODEL_ENV))
            .or_else(|| non_blank(refinement.and_then(|r| r.model.clone())))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = non_blank(refinement.and_then(|r| r.endpoint.clone()))
            .unwrap_or_else(|| OPENAI_RESPONSES_API_URL.to_string());

        let timeout = refinement
            .and_then(|r| r.timeout_secs)
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_REFINEMENT_TIMEOUT, Duration::from_secs);

        let default_locale =
            non_blank(self.analysis.as_ref().and_then(|a| a.default_locale.clone()))
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string());

        let max_upload_bytes = self
            .upload
            .as_ref()
            .and_then(|u| u.max_size_mb)
            .filter(|mb| *mb > 0)
            .and_then(|mb| usize::try_from(mb.saturating_mul(1024 * 1024)).ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let ocr_languages = non_blank(self.ocr.as_ref().and_then(|o| o.languages.clone()))
            .unwrap_or_else(|| DEFAULT_OCR_LANGUAGES.to_string());

        Settings {
            refinement: RefinementSettings {
                api_key,
                model,
                endpoint,
                timeout,
            },
            default_locale,
            max_upload_bytes,
            ocr_languages,
        }
    }
}
