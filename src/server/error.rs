//! HTTP error responses.
//!
//! Clients only ever see a short, fixed message per endpoint. The library
//! error behind a 500 is logged in full and never echoed back, since it can
//! carry file system paths and collaborator output.

use super::types::ErrorResponse;
use crate::error::ExtractError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// The fixed client-facing messages of one upload endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointMessages {
    /// The expected multipart part is absent.
    pub missing_part: &'static str,
    /// The part is present but its file name is empty.
    pub no_file_selected: &'static str,
    /// Anything went wrong after the upload was accepted.
    pub failure: &'static str,
}

pub const EXTRACT_MESSAGES: EndpointMessages = EndpointMessages {
    missing_part: "No file part in the request",
    no_file_selected: "No file selected",
    failure: "Failed to process the file. Check server logs for details.",
};

pub const SNIPPET_MESSAGES: EndpointMessages = EndpointMessages {
    missing_part: "No cropped_image part in the request",
    no_file_selected: "No file selected for cropping",
    failure: "Failed to perform OCR on the cropped image.",
};

const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";
const EMPTY_UPLOAD: &str = "Uploaded file is empty";

/// An HTTP status plus the `{"error": ...}` message sent with it.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Map a library error for an endpoint, logging server-side failures.
    pub fn from_extract(err: ExtractError, messages: &EndpointMessages) -> Self {
        match err {
            ExtractError::UnsupportedFileType { .. } => Self::bad_request(UNSUPPORTED_FILE_TYPE),
            ExtractError::EmptyUpload { .. } => Self::bad_request(EMPTY_UPLOAD),
            other => {
                tracing::error!("{}: {}", messages.failure, other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, messages.failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
