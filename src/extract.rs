//! Extraction entry points.
//!
//! ## Why two passes over the same bitmap?
//!
//! [`extract_text`] OCRs each raster page once, with the page profile. That
//! is the best single reading of a page but a poor way to read short codes:
//! one misrecognised character and the serial number is wrong.
//! [`extract_fields`] therefore OCRs each raster page with every profile in
//! the pass plan, pools the field candidates from all of them and lets
//! [`crate::vote::majority_vote`] pick the value most passes agree on. The
//! page profile's reading still supplies the page text, so both entry points
//! return identical `extracted_text` for the same upload.
//!
//! Raster pages are preprocessed once when they are loaded; all passes over
//! a page share that bitmap.

use crate::config::{ExtractionConfig, OcrProfile};
use crate::error::{ExtractError, PassError};
use crate::fields::CandidatePool;
use crate::output::{FieldsOutput, PageInfo, PageSource, TextOutput};
use crate::pipeline::docx;
use crate::pipeline::input::{DocumentKind, Upload};
use crate::pipeline::ocr::{run_ocr, OcrEngine};
use crate::pipeline::preprocess::prepare_for_ocr;
use crate::pipeline::render::{self, PageContent};
use futures::stream::{self, StreamExt, TryStreamExt};
use image::{DynamicImage, GrayImage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A page before OCR.
enum SourcePage {
    Text(String),
    /// Grayscale, contrast-enhanced bitmap.
    Raster(Arc<GrayImage>),
}

struct LoadedPage {
    page_num: usize,
    source: SourcePage,
}

/// Extract the text of an uploaded PDF, DOCX or image.
///
/// PDF pages with a usable text layer are read directly; the rest are OCR'd
/// with the page profile. Pages are joined with a blank line, DOCX
/// paragraphs with a newline.
///
/// # Errors
/// Any failure is fatal: an unsupported or empty upload, a document the
/// collaborators cannot open, or an OCR failure on any page.
pub async fn extract_text(
    upload: Upload,
    config: &ExtractionConfig,
    engine: &Arc<dyn OcrEngine>,
) -> Result<TextOutput, ExtractError> {
    let start = Instant::now();
    let kind = upload.kind()?;
    info!("Extracting text from '{}' ({:?})", upload.filename, kind);

    let pages = load_pages(upload, kind, config).await?;
    let output = read_pages(pages, kind.joiner(), config, engine).await?;

    info!(
        "Extracted {} chars from {} pages in {}ms",
        output.extracted_text.chars().count(),
        output.pages.len(),
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// Extract the text of an upload and vote on its domain fields.
///
/// Text-layer pages contribute their text once. Raster pages are OCR'd with
/// every profile of [`ExtractionConfig::pass_plan`]; the first (page) pass
/// supplies the page text and must succeed, the others are best-effort and
/// recorded in [`FieldsOutput::failed_passes`] when they fail.
pub async fn extract_fields(
    upload: Upload,
    config: &ExtractionConfig,
    engine: &Arc<dyn OcrEngine>,
) -> Result<FieldsOutput, ExtractError> {
    let start = Instant::now();
    let kind = upload.kind()?;
    info!("Extracting fields from '{}' ({:?})", upload.filename, kind);

    let pages = load_pages(upload, kind, config).await?;
    let output = vote_pages(pages, kind.joiner(), config, engine).await?;

    for report in &output.fields {
        debug!(
            "{}: {:?} ({} of {} candidates)",
            report.field.key(),
            report.value,
            report.votes,
            report.candidates.len()
        );
    }
    info!(
        "Field extraction complete: {} pages, {} failed passes, {}ms",
        output.pages.len(),
        output.failed_passes.len(),
        start.elapsed().as_millis()
    );
    Ok(output)
}

/// OCR a cropped image snippet with the snippet profile.
///
/// Unlike [`extract_text`] the upload's file name is not consulted; any
/// image the decoder understands is accepted.
pub async fn ocr_snippet(
    bytes: Vec<u8>,
    config: &ExtractionConfig,
    engine: &Arc<dyn OcrEngine>,
) -> Result<String, ExtractError> {
    let image = decode_image(bytes).await?;
    let bitmap = prepare_bitmap(image, config).await?;
    let text = run_ocr(engine, bitmap, config.snippet_profile())
        .await
        .map_err(|source| ExtractError::Ocr { page: 1, source })?;
    info!("Snippet OCR: {} chars", text.chars().count());
    Ok(text)
}

// ── Collation ────────────────────────────────────────────────────────────────

/// OCR every raster page with the page profile and join all pages in order.
async fn read_pages(
    pages: Vec<LoadedPage>,
    joiner: &str,
    config: &ExtractionConfig,
    engine: &Arc<dyn OcrEngine>,
) -> Result<TextOutput, ExtractError> {
    let profile = config.page_profile();

    let jobs: Vec<(usize, Arc<GrayImage>)> = pages
        .iter()
        .filter_map(|p| match &p.source {
            SourcePage::Raster(img) => Some((p.page_num, Arc::clone(img))),
            SourcePage::Text(_) => None,
        })
        .collect();

    let mut ocr_texts = stream::iter(jobs.into_iter().map(|(page_num, img)| async move {
        let result = run_ocr(engine, img, profile).await;
        (page_num, result)
    }))
    .buffer_unordered(config.ocr_concurrency)
    .collect::<Vec<_>>()
    .await;
    ocr_texts.sort_by_key(|(page_num, _)| *page_num);

    let mut ocr_iter = ocr_texts.into_iter();
    let mut texts = Vec::with_capacity(pages.len());
    let mut infos = Vec::with_capacity(pages.len());

    for page in pages {
        let (text, source) = match page.source {
            SourcePage::Text(text) => (text, PageSource::Text),
            SourcePage::Raster(_) => {
                let text = match ocr_iter.next() {
                    Some((_, Ok(text))) => text,
                    Some((page, Err(source))) => return Err(ExtractError::Ocr { page, source }),
                    None => {
                        return Err(ExtractError::Internal(format!(
                            "missing OCR result for page {}",
                            page.page_num
                        )))
                    }
                };
                (text, PageSource::Ocr)
            }
        };
        infos.push(PageInfo {
            page_num: page.page_num,
            source,
            chars: text.chars().count(),
        });
        texts.push(text);
    }

    Ok(TextOutput {
        extracted_text: texts.join(joiner),
        pages: infos,
    })
}

/// OCR every raster page with the whole pass plan, pool the field
/// candidates in page-then-pass order and vote.
async fn vote_pages(
    pages: Vec<LoadedPage>,
    joiner: &str,
    config: &ExtractionConfig,
    engine: &Arc<dyn OcrEngine>,
) -> Result<FieldsOutput, ExtractError> {
    let plan = config.pass_plan();

    // One job per (raster page, pass).
    let mut jobs: Vec<(usize, usize, OcrProfile, Arc<GrayImage>)> = Vec::new();
    for page in &pages {
        if let SourcePage::Raster(img) = &page.source {
            for (pass_idx, &profile) in plan.iter().enumerate() {
                jobs.push((page.page_num, pass_idx, profile, Arc::clone(img)));
            }
        }
    }
    debug!("Running {} OCR passes ({} per raster page)", jobs.len(), plan.len());

    let mut results = stream::iter(jobs.into_iter().map(
        |(page_num, pass_idx, profile, img)| async move {
            let result = run_ocr(engine, img, profile).await;
            (page_num, pass_idx, profile, result)
        },
    ))
    .buffer_unordered(config.ocr_concurrency)
    .collect::<Vec<_>>()
    .await;
    results.sort_by_key(|(page_num, pass_idx, _, _)| (*page_num, *pass_idx));

    let mut results = results.into_iter().peekable();
    let mut pool = CandidatePool::new();
    let mut failed_passes = Vec::new();
    let mut texts = Vec::with_capacity(pages.len());
    let mut infos = Vec::with_capacity(pages.len());

    for page in pages {
        let (text, source) = match page.source {
            SourcePage::Text(text) => {
                pool.add_text(&text);
                (text, PageSource::Text)
            }
            SourcePage::Raster(_) => {
                let mut page_text = None;
                while let Some((_, pass_idx, profile, result)) =
                    results.next_if(|(n, ..)| *n == page.page_num)
                {
                    match result {
                        Ok(text) => {
                            pool.add_text(&text);
                            if pass_idx == 0 {
                                page_text = Some(text);
                            }
                        }
                        Err(source) if pass_idx == 0 => {
                            return Err(ExtractError::Ocr {
                                page: page.page_num,
                                source,
                            });
                        }
                        Err(e) => {
                            warn!(
                                "Page {}: pass psm={} failed, skipping: {}",
                                page.page_num, profile.psm, e
                            );
                            failed_passes.push(PassError {
                                page: page.page_num,
                                psm: profile.psm.value(),
                                detail: e.to_string(),
                            });
                        }
                    }
                }
                let text = page_text.ok_or_else(|| {
                    ExtractError::Internal(format!(
                        "missing OCR result for page {}",
                        page.page_num
                    ))
                })?;
                (text, PageSource::Ocr)
            }
        };
        infos.push(PageInfo {
            page_num: page.page_num,
            source,
            chars: text.chars().count(),
        });
        texts.push(text);
    }

    Ok(FieldsOutput {
        extracted_text: texts.join(joiner),
        pages: infos,
        fields: pool.into_reports(),
        failed_passes,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn load_pages(
    upload: Upload,
    kind: DocumentKind,
    config: &ExtractionConfig,
) -> Result<Vec<LoadedPage>, ExtractError> {
    match kind {
        DocumentKind::Pdf => {
            let classified = render::classify_pages(upload.bytes, config).await?;
            stream::iter(classified.into_iter().map(|page| async move {
                let source = match page.content {
                    PageContent::Text(text) => SourcePage::Text(text),
                    PageContent::Scanned(img) => {
                        SourcePage::Raster(prepare_bitmap(img, config).await?)
                    }
                };
                Ok::<_, ExtractError>(LoadedPage {
                    page_num: page.page_num,
                    source,
                })
            }))
            .buffered(config.ocr_concurrency)
            .try_collect()
            .await
        }
        DocumentKind::Docx => {
            let paragraphs = docx::extract_paragraphs(&upload.bytes)?;
            Ok(vec![LoadedPage {
                page_num: 1,
                source: SourcePage::Text(paragraphs.join(kind.joiner())),
            }])
        }
        DocumentKind::Image => {
            let image = decode_image(upload.bytes).await?;
            debug!("Image: {}x{} px", image.width(), image.height());
            Ok(vec![LoadedPage {
                page_num: 1,
                source: SourcePage::Raster(prepare_bitmap(image, config).await?),
            }])
        }
    }
}

async fn decode_image(bytes: Vec<u8>) -> Result<DynamicImage, ExtractError> {
    tokio::task::spawn_blocking(move || render::decode_image(&bytes))
        .await
        .map_err(|e| ExtractError::Internal(format!("Decode task panicked: {}", e)))?
}

async fn prepare_bitmap(
    image: DynamicImage,
    config: &ExtractionConfig,
) -> Result<Arc<GrayImage>, ExtractError> {
    let contrast = config.contrast_factor;
    let sharpen = config.sharpen;
    tokio::task::spawn_blocking(move || Arc::new(prepare_for_ocr(&image, contrast, sharpen)))
        .await
        .map_err(|e| ExtractError::Internal(format!("Preprocess task panicked: {}", e)))
}
