//! End-to-end tests against the real collaborators.
//!
//! These tests bind to a libpdfium shared library and run the `tesseract`
//! binary. They are gated behind the `E2E_ENABLED` environment variable so
//! they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/opt/pdfium/lib cargo test --test e2e -- --nocapture

use docfields::pipeline::render::{bind_pdfium, classify_pages, PageContent};
use docfields::{
    extract_fields, extract_text, ExtractError, ExtractionConfig, Field, OcrEngine, PageSource,
    TesseractCli, Upload,
};
use std::path::PathBuf;
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP - set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn config() -> ExtractionConfig {
    let mut builder = ExtractionConfig::builder();
    if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        builder = builder.pdfium_lib_path(PathBuf::from(dir));
    }
    if let Ok(bin) = std::env::var("TESSERACT_PATH") {
        builder = builder.tesseract_path(PathBuf::from(bin));
    }
    builder.build().expect("valid config")
}

fn engine(config: &ExtractionConfig) -> Arc<dyn OcrEngine> {
    Arc::new(TesseractCli::from_config(config))
}

/// A single-page PDF whose text layer holds `lines` (Helvetica, 12pt).
/// With no lines the page is blank.
fn pdf_with_lines(lines: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    if !lines.is_empty() {
        content.push_str("BT /F1 12 Tf 72 720 Td 16 TL\n");
        for line in lines {
            let escaped = line
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            content.push_str(&format!("({escaped}) Tj T*\n"));
        }
        content.push_str("ET\n");
    }

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }
    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    pdf
}

// ── Collaborators ────────────────────────────────────────────────────────────

#[test]
fn test_tesseract_available() {
    e2e_skip_unless_enabled!();
    let config = config();
    assert!(
        TesseractCli::from_config(&config).is_available(),
        "tesseract not runnable at {}",
        config.tesseract_path.display()
    );
}

#[test]
fn test_pdfium_binds() {
    e2e_skip_unless_enabled!();
    let config = config();
    bind_pdfium(config.pdfium_lib_path.as_deref()).expect("pdfium should bind");
}

// ── Renderer ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_text_layer_page_is_not_rendered() {
    e2e_skip_unless_enabled!();
    let pdf = pdf_with_lines(&["Serial Number: SN-20931", "Part Name: Hydraulic Pump"]);
    let pages = classify_pages(pdf, &config()).await.expect("classify");
    assert_eq!(pages.len(), 1);
    match &pages[0].content {
        PageContent::Text(text) => assert!(text.contains("SN-20931"), "got {text:?}"),
        PageContent::Scanned(_) => panic!("text-bearing page was rasterised"),
    }
}

#[tokio::test]
async fn test_blank_page_is_rendered_at_200_dpi() {
    e2e_skip_unless_enabled!();
    let pages = classify_pages(pdf_with_lines(&[]), &config())
        .await
        .expect("classify");
    match &pages[0].content {
        PageContent::Scanned(img) => {
            assert_eq!((img.width(), img.height()), (1700, 2200));
        }
        PageContent::Text(text) => panic!("blank page kept as text: {text:?}"),
    }
}

#[tokio::test]
async fn test_short_text_layer_falls_back_to_ocr() {
    e2e_skip_unless_enabled!();
    // 7 characters, below the 20-character threshold.
    let pages = classify_pages(pdf_with_lines(&["Page 12"]), &config())
        .await
        .expect("classify");
    assert!(matches!(pages[0].content, PageContent::Scanned(_)));
}

#[tokio::test]
async fn test_corrupt_pdf_is_rejected() {
    e2e_skip_unless_enabled!();
    let err = classify_pages(b"%PDF-1.4\ngarbage".to_vec(), &config())
        .await
        .err()
        .expect("corrupt PDF must fail");
    assert!(matches!(err, ExtractError::CorruptPdf { .. }), "got {err:?}");
}

// ── Full pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_extract_text_from_text_pdf() {
    e2e_skip_unless_enabled!();
    let config = config();
    let pdf = pdf_with_lines(&["Vendor No: V-88120", "Serial Number: SN-20931"]);
    let out = extract_text(Upload::new("form.pdf", pdf), &config, &engine(&config))
        .await
        .expect("extract");
    assert!(out.extracted_text.contains("V-88120"));
    assert_eq!(out.pages[0].source, PageSource::Text);
}

#[tokio::test]
async fn test_extract_fields_from_text_pdf() {
    e2e_skip_unless_enabled!();
    let config = config();
    let pdf = pdf_with_lines(&[
        "Part Name: Hydraulic Pump",
        "Serial Number: SN-20931",
        "Vendor No: V-88120",
    ]);
    let out = extract_fields(Upload::new("form.pdf", pdf), &config, &engine(&config))
        .await
        .expect("extract");
    println!("{}", serde_json::to_string_pretty(&out).unwrap());
    assert_eq!(out.value(Field::SerialNumber), Some("SN-20931"));
    assert_eq!(out.value(Field::VendorNumber), Some("V-88120"));
    assert_eq!(out.value(Field::PartName), Some("Hydraulic Pump"));
}

#[tokio::test]
async fn test_blank_scan_goes_through_tesseract() {
    e2e_skip_unless_enabled!();
    let config = config();
    let out = extract_fields(
        Upload::new("scan.pdf", pdf_with_lines(&[])),
        &config,
        &engine(&config),
    )
    .await
    .expect("extract");
    assert_eq!(out.pages[0].source, PageSource::Ocr);
    assert!(out.failed_passes.is_empty(), "{:?}", out.failed_passes);
    assert!(out.fields.iter().all(|f| f.value.is_none()));
}
