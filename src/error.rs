//! Error types for the docfields library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] - **Fatal**: the request cannot be answered at all
//!   (unsupported upload, corrupt PDF, OCR engine missing). Returned as
//!   `Err(ExtractError)` from the top-level `extract_*` functions and turned
//!   into an HTTP status by [`crate::server::ApiError`].
//!
//! * [`PassError`] - **Non-fatal**: one extra OCR pass used only for field
//!   voting failed. Stored inside [`crate::output::FieldsOutput`] so callers
//!   can see which passes were lost without losing the whole document.
//!
//! [`OcrError`] is the engine-level error; it becomes an [`ExtractError`]
//! when it hits a primary pass and a [`PassError`] otherwise.

use thiserror::Error;

/// All fatal errors returned by the docfields library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded file name has no extension we know how to handle.
    #[error("Unsupported file type: '{filename}'")]
    UnsupportedFileType { filename: String },

    /// Upload was empty.
    #[error("Uploaded file '{filename}' is empty")]
    EmptyUpload { filename: String },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password; uploads never carry one.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// Reading the text layer of a page failed.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextLayerFailed { page: usize, detail: String },

    /// pdfium-render returned an error while rasterising a page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium."
    )]
    PdfiumBindingFailed(String),

    // ── Image / DOCX errors ───────────────────────────────────────────────
    /// Uploaded image could not be decoded.
    #[error("Image decoding failed: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// DOCX container or body XML could not be read.
    #[error("DOCX parsing failed: {0}")]
    Docx(String),

    // ── OCR errors ────────────────────────────────────────────────────────
    /// The primary OCR pass of a page failed.
    #[error("OCR failed on page {page}: {source}")]
    Ocr {
        page: usize,
        #[source]
        source: OcrError,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Whether this error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::UnsupportedFileType { .. } | ExtractError::EmptyUpload { .. }
        )
    }
}

/// Errors raised by an [`crate::pipeline::ocr::OcrEngine`].
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine binary or library is not installed.
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    /// The engine ran but reported failure.
    #[error("OCR failed: {0}")]
    Failed(String),

    /// Writing the bitmap handed to the engine failed.
    #[error("Failed to encode bitmap for OCR: {0}")]
    Encode(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A non-fatal error for a single field-voting pass.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Page {page}: pass psm={psm} failed: {detail}")]
pub struct PassError {
    pub page: usize,
    pub psm: u8,
    pub detail: String,
}
