//! Input dispatch: decide which pipeline an upload goes through.
//!
//! The decision is made on the uploaded file name's extension alone,
//! case-insensitively. Content sniffing is left to the collaborators: a
//! `.pdf` that is not a PDF fails inside pdfium and surfaces as
//! [`ExtractError::CorruptPdf`].

use crate::error::ExtractError;
use std::path::Path;
use tracing::debug;

/// The document families the service understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    /// PNG or JPEG.
    Image,
}

impl DocumentKind {
    /// Classify an uploaded file by its name.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let ext = Path::new(filename.trim())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let kind = match ext.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            Some("png") | Some("jpg") | Some("jpeg") => DocumentKind::Image,
            _ => {
                return Err(ExtractError::UnsupportedFileType {
                    filename: filename.to_string(),
                })
            }
        };
        debug!("Classified '{}' as {:?}", filename, kind);
        Ok(kind)
    }

    /// Separator placed between page or paragraph texts.
    pub fn joiner(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "\n\n",
            DocumentKind::Docx => "\n",
            DocumentKind::Image => "",
        }
    }
}

/// An uploaded file: its client-supplied name and raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Classify the upload, rejecting empty bodies.
    pub fn kind(&self) -> Result<DocumentKind, ExtractError> {
        let kind = DocumentKind::from_filename(&self.filename)?;
        if self.bytes.is_empty() {
            return Err(ExtractError::EmptyUpload {
                filename: self.filename.clone(),
            });
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(DocumentKind::from_filename("a.pdf").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("Report.DOCX").unwrap(), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_filename("scan.PNG").unwrap(), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("photo.jpeg").unwrap(), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("photo.JPG").unwrap(), DocumentKind::Image);
    }

    #[test]
    fn rejects_unknown_extensions() {
        for name in ["notes.txt", "archive.pdf.zip", "legacy.doc", "noext", ""] {
            assert!(
                matches!(
                    DocumentKind::from_filename(name),
                    Err(ExtractError::UnsupportedFileType { .. })
                ),
                "{name} should be unsupported"
            );
        }
    }

    #[test]
    fn joiners_match_format() {
        assert_eq!(DocumentKind::Pdf.joiner(), "\n\n");
        assert_eq!(DocumentKind::Docx.joiner(), "\n");
    }

    #[test]
    fn empty_upload_is_rejected() {
        let upload = Upload::new("scan.png", Vec::new());
        assert!(matches!(upload.kind(), Err(ExtractError::EmptyUpload { .. })));
    }
}
