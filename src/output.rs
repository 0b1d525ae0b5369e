//! Result types returned by the extraction entry points.

use crate::error::PassError;
use crate::fields::Field;
use serde::{Deserialize, Serialize};

/// Where a page's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    /// Embedded text layer (PDF) or document body (DOCX).
    Text,
    /// OCR of a rasterised page or an uploaded image.
    Ocr,
}

/// Per-page summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-indexed page number. DOCX bodies and images are a single page.
    pub page_num: usize,
    pub source: PageSource,
    /// Characters in the page text (Unicode scalar values).
    pub chars: usize,
}

/// Plain text extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOutput {
    pub extracted_text: String,
    pub pages: Vec<PageInfo>,
}

/// Outcome of voting on one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: Field,
    /// Winning value, if any candidate was found.
    pub value: Option<String>,
    /// Votes the winning value received.
    pub votes: usize,
    /// All normalised candidates, in collection order.
    pub candidates: Vec<String>,
}

/// Text plus voted fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldsOutput {
    pub extracted_text: String,
    pub pages: Vec<PageInfo>,
    pub fields: Vec<FieldReport>,
    /// Non-primary OCR passes that failed and were skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_passes: Vec<PassError>,
}

impl FieldsOutput {
    /// The voted value for `field`, if any.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.fields
            .iter()
            .find(|r| r.field == field)
            .and_then(|r| r.value.as_deref())
    }
}
