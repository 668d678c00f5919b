use std::future::Future;
use std::io::Write as _;
use std::path::PathBuf;

/// Text recognized from an image, tagged with the engine that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOutput {
    pub text: String,
    pub provider: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("failed to stage image for OCR: {0}")]
    Stage(#[source] std::io::Error),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("OCR exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Image-to-text collaborator used by the photo entry point.
pub trait OcrEngine: Send + Sync {
    /// `languages` uses Tesseract syntax (`eng+fra`).
    fn recognize(
        &self,
        image: &[u8],
        languages: &str,
    ) -> impl Future<Output = Result<OcrOutput, OcrError>> + Send;
}

/// Local OCR through the `tesseract` executable.
///
/// The image is staged in a temp file and read back from stdout in
/// single-block page segmentation mode.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: PathBuf,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractOcr {
    pub const PROVIDER: &'static str = "local";
    /// Assume a single uniform block of text.
    const PAGE_SEGMENTATION_MODE: &'static str = "6";

    #[must_use]
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("tesseract"),
        }
    }

    /// Use a specific binary instead of `tesseract` from `PATH`.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: &[u8], languages: &str) -> Result<OcrOutput, OcrError> {
        let bytes = image.len();
        let image = image.to_vec();
        let staged = tokio::task::spawn_blocking(move || stage_image(&image))
            .await
            .map_err(|e| OcrError::Stage(std::io::Error::other(e)))?
            .map_err(OcrError::Stage)?;

        tracing::debug!(bytes, languages, "Running tesseract");

        let output = tokio::process::Command::new(&self.program)
            .arg(staged.path())
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .arg("--psm")
            .arg(Self::PAGE_SEGMENTATION_MODE)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(OcrOutput {
            text: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            provider: Self::PROVIDER.to_string(),
        })
    }
}

fn stage_image(image: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
    let mut staged = tempfile::NamedTempFile::new()?;
    staged.write_all(image)?;
    staged.flush()?;
    Ok(staged)
}
