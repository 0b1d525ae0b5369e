//! Request handlers.

use super::error::{ApiError, EndpointMessages, EXTRACT_MESSAGES, SNIPPET_MESSAGES};
use super::types::{AppState, ExtractTextResponse, HealthResponse};
use crate::extract::{extract_fields, extract_text, ocr_snippet};
use crate::output::FieldsOutput;
use crate::pipeline::input::Upload;
use axum::extract::multipart::Multipart;
use axum::extract::State;
use axum::Json;
use tracing::debug;

/// POST /api/extract-text
///
/// Multipart part `file`: a `.pdf`, `.docx`, `.png`, `.jpg` or `.jpeg`
/// upload. Responds with `{"extracted_text": "..."}`.
pub async fn extract_text_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let upload = read_upload(multipart, "file", &EXTRACT_MESSAGES).await?;
    let output = extract_text(upload, &state.config, &state.engine)
        .await
        .map_err(|e| ApiError::from_extract(e, &EXTRACT_MESSAGES))?;
    Ok(Json(ExtractTextResponse {
        extracted_text: output.extracted_text,
    }))
}

/// POST /api/extract-fields
///
/// Same upload contract as `/api/extract-text`; additionally returns the
/// voted vendor number, serial number and part name.
pub async fn extract_fields_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<FieldsOutput>, ApiError> {
    let upload = read_upload(multipart, "file", &EXTRACT_MESSAGES).await?;
    let output = extract_fields(upload, &state.config, &state.engine)
        .await
        .map_err(|e| ApiError::from_extract(e, &EXTRACT_MESSAGES))?;
    Ok(Json(output))
}

/// POST /api/ocr-image
///
/// Multipart part `cropped_image`: an image snippet cropped client-side,
/// OCR'd as a single uniform block of text.
pub async fn ocr_image_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, ApiError> {
    let upload = read_upload(multipart, "cropped_image", &SNIPPET_MESSAGES).await?;
    let extracted_text = ocr_snippet(upload.bytes, &state.config, &state.engine)
        .await
        .map_err(|e| ApiError::from_extract(e, &SNIPPET_MESSAGES))?;
    Ok(Json(ExtractTextResponse { extracted_text }))
}

/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Pull the file part named `part` out of a multipart body.
///
/// Parts without a file name are form fields, not files, and are ignored
/// like any other part.
async fn read_upload(
    mut multipart: Multipart,
    part: &str,
    messages: &EndpointMessages,
) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(part) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            return Err(ApiError::bad_request(messages.no_file_selected));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        debug!("Received '{}' ({} bytes) in part '{}'", filename, bytes.len(), part);
        return Ok(Upload::new(filename, bytes.to_vec()));
    }
    Err(ApiError::bad_request(messages.missing_part))
}
