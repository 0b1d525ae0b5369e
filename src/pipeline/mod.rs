//! Pipeline stages for document text extraction.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested on its own and the OCR backend can be swapped without touching the
//! rest.
//!
//! ## Data Flow
//!
//! ```text
//!            ┌─ pdf ──▶ render ──┬─ text layer ───────────────┐
//! input ─────┤                   └─ scanned ──▶ preprocess ──▶ ocr ──▶ text
//! (dispatch) ├─ docx ─▶ docx ────────────────────────────────────────▶ text
//!            └─ image ─▶ render::decode_image ─▶ preprocess ──▶ ocr ──▶ text
//! ```
//!
//! 1. [`input`]  - classify the upload by extension
//! 2. [`render`] - read each PDF page's text layer and rasterise the thin
//!    ones; runs in `spawn_blocking` because pdfium is not async-safe
//! 3. [`docx`]   - collect body paragraph text with `docx-rs`
//! 4. [`preprocess`] - grayscale and contrast-stretch bitmaps, once per page
//! 5. [`ocr`]    - hand bitmaps to the OCR engine with a page-segmentation
//!    profile

pub mod docx;
pub mod input;
pub mod ocr;
pub mod preprocess;
pub mod render;
