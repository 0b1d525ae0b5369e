//! Shared state and JSON bodies for the HTTP layer.

use crate::config::ExtractionConfig;
use crate::pipeline::ocr::OcrEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ExtractionConfig>,
    pub engine: Arc<dyn OcrEngine>,
}

impl AppState {
    pub fn new(config: ExtractionConfig, engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            config: Arc::new(config),
            engine,
        }
    }
}

/// Body of `/api/extract-text` and `/api/ocr-image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    pub extracted_text: String,
}

/// Body of `/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
