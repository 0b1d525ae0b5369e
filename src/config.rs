//! Configuration types for document extraction and the HTTP server.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. The server-only knobs (bind address,
//! upload limit, CORS) live in [`ServerConfig`] so the library can be used
//! without the HTTP layer.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for text and field extraction.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use docfields::{ExtractionConfig, PageSegMode};
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .field_passes(vec![PageSegMode::SINGLE_COLUMN, PageSegMode::SPARSE_TEXT])
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising a scanned PDF page. Range: 72–600. Default: 200.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    ///
    /// A letter page at 200 DPI is 1700 × 2200 px. Oversized pages (posters,
    /// drawings) are scaled down so the longest edge stays under this cap.
    pub max_rendered_pixels: u32,

    /// Minimum trimmed characters for a PDF page to count as text-bearing. Default: 20.
    ///
    /// Pages below the threshold are treated as scans and sent through OCR.
    pub text_threshold: usize,

    /// Contrast enhancement factor applied to the grayscale bitmap. Default: 2.0.
    ///
    /// `1.0` leaves the image unchanged; `2.0` doubles each pixel's distance
    /// from the mean luminance.
    pub contrast_factor: f32,

    /// Apply an unsharp mask after contrast enhancement. Default: false.
    pub sharpen: bool,

    /// Tesseract language code(s), e.g. `eng` or `eng+deu`. Default: `eng`.
    pub language: String,

    /// Tesseract OCR engine mode (`--oem`). Default: 3 (default engine).
    pub oem: u8,

    /// Segmentation mode for full pages and uploaded images. Default: 4.
    pub page_psm: PageSegMode,

    /// Segmentation mode for cropped snippets. Default: 6.
    pub snippet_psm: PageSegMode,

    /// Segmentation modes run on every raster page for field voting.
    /// Default: 4, 6, 11.
    pub field_passes: Vec<PageSegMode>,

    /// Number of OCR passes allowed to run at once. Default: 4.
    pub ocr_concurrency: usize,

    /// Path or name of the tesseract binary. Default: `tesseract` (from `PATH`).
    pub tesseract_path: PathBuf,

    /// Directory containing libpdfium. If None, `./` and then the system
    /// library search path are tried.
    pub pdfium_lib_path: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            text_threshold: 20,
            contrast_factor: 2.0,
            sharpen: false,
            language: "eng".to_string(),
            oem: 3,
            page_psm: PageSegMode::SINGLE_COLUMN,
            snippet_psm: PageSegMode::UNIFORM_BLOCK,
            field_passes: vec![
                PageSegMode::SINGLE_COLUMN,
                PageSegMode::UNIFORM_BLOCK,
                PageSegMode::SPARSE_TEXT,
            ],
            ocr_concurrency: 4,
            tesseract_path: PathBuf::from("tesseract"),
            pdfium_lib_path: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("text_threshold", &self.text_threshold)
            .field("contrast_factor", &self.contrast_factor)
            .field("sharpen", &self.sharpen)
            .field("language", &self.language)
            .field("oem", &self.oem)
            .field("page_psm", &self.page_psm.value())
            .field("snippet_psm", &self.snippet_psm.value())
            .field(
                "field_passes",
                &self.field_passes.iter().map(|p| p.value()).collect::<Vec<_>>(),
            )
            .field("ocr_concurrency", &self.ocr_concurrency)
            .field("tesseract_path", &self.tesseract_path)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Profile used for full pages and uploaded images.
    pub fn page_profile(&self) -> OcrProfile {
        OcrProfile {
            oem: self.oem,
            psm: self.page_psm,
        }
    }

    /// Profile used for cropped snippets.
    pub fn snippet_profile(&self) -> OcrProfile {
        OcrProfile {
            oem: self.oem,
            psm: self.snippet_psm,
        }
    }

    /// Passes to run on a raster page when voting on fields.
    ///
    /// The page profile always comes first (its output doubles as the page
    /// text); the configured field passes follow in order, without repeats.
    pub fn pass_plan(&self) -> Vec<OcrProfile> {
        let mut plan = vec![self.page_profile()];
        for &psm in &self.field_passes {
            if plan.iter().all(|p| p.psm != psm) {
                plan.push(OcrProfile { oem: self.oem, psm });
            }
        }
        plan
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn text_threshold(mut self, chars: usize) -> Self {
        self.config.text_threshold = chars;
        self
    }

    pub fn contrast_factor(mut self, factor: f32) -> Self {
        self.config.contrast_factor = factor;
        self
    }

    pub fn sharpen(mut self, v: bool) -> Self {
        self.config.sharpen = v;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn oem(mut self, oem: u8) -> Self {
        self.config.oem = oem;
        self
    }

    pub fn page_psm(mut self, psm: PageSegMode) -> Self {
        self.config.page_psm = psm;
        self
    }

    pub fn snippet_psm(mut self, psm: PageSegMode) -> Self {
        self.config.snippet_psm = psm;
        self
    }

    pub fn field_passes(mut self, passes: Vec<PageSegMode>) -> Self {
        self.config.field_passes = passes;
        self
    }

    pub fn ocr_concurrency(mut self, n: usize) -> Self {
        self.config.ocr_concurrency = n;
        self
    }

    pub fn tesseract_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tesseract_path = path.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ExtractError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if !(c.contrast_factor.is_finite() && c.contrast_factor > 0.0) {
            return Err(ExtractError::InvalidConfig(format!(
                "Contrast factor must be > 0, got {}",
                c.contrast_factor
            )));
        }
        if c.oem > 3 {
            return Err(ExtractError::InvalidConfig(format!(
                "OCR engine mode must be 0–3, got {}",
                c.oem
            )));
        }
        if c.language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig("Language must not be empty".into()));
        }
        if c.field_passes.is_empty() {
            return Err(ExtractError::InvalidConfig(
                "At least one field pass is required".into(),
            ));
        }
        if c.ocr_concurrency == 0 {
            return Err(ExtractError::InvalidConfig(
                "OCR concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── OCR profile types ────────────────────────────────────────────────────

/// Tesseract page-segmentation mode (`--psm`), 0–13.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PageSegMode(u8);

impl PageSegMode {
    /// Fully automatic page segmentation, no OSD.
    pub const AUTO: Self = Self(3);
    /// Single column of text of variable sizes.
    pub const SINGLE_COLUMN: Self = Self(4);
    /// Single uniform block of text.
    pub const UNIFORM_BLOCK: Self = Self(6);
    /// Single text line.
    pub const SINGLE_LINE: Self = Self(7);
    /// Sparse text in no particular order.
    pub const SPARSE_TEXT: Self = Self(11);

    pub fn new(value: u8) -> Result<Self, ExtractError> {
        if value > 13 {
            return Err(ExtractError::InvalidConfig(format!(
                "Page segmentation mode must be 0–13, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for PageSegMode {
    type Error = ExtractError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageSegMode> for u8 {
    fn from(p: PageSegMode) -> Self {
        p.0
    }
}

impl fmt::Display for PageSegMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One OCR configuration: engine mode plus segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrProfile {
    pub oem: u8,
    pub psm: PageSegMode,
}

// ── Server configuration ─────────────────────────────────────────────────

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body in bytes. Default: 50 MB.
    pub max_upload_bytes: usize,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            max_upload_bytes: 50 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}
