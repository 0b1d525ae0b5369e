//! # docfields
//!
//! Extract text and part-identification fields from uploaded documents.
//!
//! ## Why this crate?
//!
//! Inspection paperwork arrives in every shape: born-digital PDFs, scanned
//! PDFs, Word documents and phone photos of nameplates. This crate reads
//! whatever text layer exists and falls back to Tesseract OCR for the pages
//! that have none. On top of the text it finds the vendor number, serial
//! number and part name, running OCR several times with different
//! page-segmentation modes and keeping the value most passes agree on.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (file name + bytes)
//!  │
//!  ├─ 1. Input      classify by extension: pdf / docx / png, jpg, jpeg
//!  ├─ 2. Load       pdfium text layer per page; thin pages rasterised
//!  │                (spawn_blocking) · docx paragraphs · image decode
//!  ├─ 3. OCR        grayscale + contrast → tesseract, bounded concurrency
//!  ├─ 4. Fields     label-anchored regexes over every pass's text
//!  ├─ 5. Vote       most frequent normalised candidate per field
//!  └─ 6. Output     joined text + per-page info + voted fields
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docfields::{extract_fields, ExtractionConfig, Field, OcrEngine, TesseractCli, Upload};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let engine: Arc<dyn OcrEngine> = Arc::new(TesseractCli::from_config(&config));
//!     let upload = Upload::new("nameplate.pdf", std::fs::read("nameplate.pdf")?);
//!     let output = extract_fields(upload, &config, &engine).await?;
//!     println!("serial: {:?}", output.value(Field::SerialNumber));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docfields-server` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Runtime collaborators
//!
//! PDF support binds to a libpdfium shared library at runtime
//! (`PDFIUM_LIB_PATH`, `./`, then the system search path). OCR shells out to
//! the `tesseract` binary (`TESSERACT_PATH` or `PATH`).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod output;
pub mod pipeline;
pub mod server;
pub mod vote;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, OcrProfile, PageSegMode, ServerConfig,
};
pub use error::{ExtractError, OcrError, PassError};
pub use extract::{extract_fields, extract_text, ocr_snippet};
pub use fields::{CandidatePool, Field};
pub use output::{FieldReport, FieldsOutput, PageInfo, PageSource, TextOutput};
pub use pipeline::input::{DocumentKind, Upload};
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use server::{create_router, serve, ApiError, AppState};
pub use vote::{majority_vote, Vote};
