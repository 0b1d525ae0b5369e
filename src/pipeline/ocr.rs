//! OCR invocation.
//!
//! [`OcrEngine`] is the seam between the pipeline and whatever recognises
//! characters. The production implementation, [`TesseractCli`], writes the
//! preprocessed bitmap to a temporary PNG and runs the `tesseract` binary
//! on it, reading the text from stdout.
//!
//! Engines are synchronous; [`run_ocr`] moves each call onto the blocking
//! thread pool so request handlers stay responsive while Tesseract works.
//! It takes an already preprocessed bitmap, so every pass over a page
//! shares one [`GrayImage`].

use crate::config::{ExtractionConfig, OcrProfile};
use crate::error::OcrError;
use image::{GrayImage, ImageFormat};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Something that turns a grayscale bitmap into text.
pub trait OcrEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Recognise `image` with `profile`. The returned text is untrimmed.
    fn recognize(&self, image: &GrayImage, profile: OcrProfile) -> Result<String, OcrError>;
}

/// Tesseract via its command-line interface.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.tesseract_path.clone(), config.language.clone())
    }

    /// Arguments after the binary name: `<image> stdout --oem N --psm N -l LANG`.
    pub fn build_args(&self, image_path: &Path, profile: OcrProfile) -> Vec<OsString> {
        vec![
            image_path.as_os_str().to_owned(),
            "stdout".into(),
            "--oem".into(),
            profile.oem.to_string().into(),
            "--psm".into(),
            profile.psm.value().to_string().into(),
            "-l".into(),
            self.language.clone().into(),
        ]
    }

    /// Whether the binary can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &GrayImage, profile: OcrProfile) -> Result<String, OcrError> {
        let mut file = tempfile::Builder::new()
            .prefix("docfields-")
            .suffix(".png")
            .tempfile()?;
        image.write_to(file.as_file_mut(), ImageFormat::Png)?;

        let output = Command::new(&self.binary)
            .args(self.build_args(file.path(), profile))
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(OcrError::Failed(format!(
                    "tesseract exited with {}: {}",
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::EngineNotAvailable(format!(
                    "'{}' not found (install tesseract-ocr or set TESSERACT_PATH)",
                    self.binary.display()
                )))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

/// Recognise a preprocessed bitmap with `profile` on the blocking pool.
///
/// Returns the trimmed text.
pub async fn run_ocr(
    engine: &Arc<dyn OcrEngine>,
    image: Arc<GrayImage>,
    profile: OcrProfile,
) -> Result<String, OcrError> {
    let engine = Arc::clone(engine);

    tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let text = engine.recognize(&image, profile)?;
        let text = text.trim().to_string();
        debug!(
            "{} psm={} → {} chars in {}ms",
            engine.name(),
            profile.psm,
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    })
    .await
    .map_err(|e| OcrError::Failed(format!("OCR task panicked: {}", e)))?
}
