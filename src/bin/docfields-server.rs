//! HTTP server binary for docfields.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` + `ServerConfig` and runs the router.

use anyhow::{Context, Result};
use clap::Parser;
use docfields::{serve, ExtractionConfig, OcrEngine, PageSegMode, ServerConfig, TesseractCli};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve on localhost:5000
  docfields-server

  # Listen on all interfaces, allow one front-end origin
  docfields-server --host 0.0.0.0 --cors-origins https://inspect.example.com

  # Higher-resolution OCR with an extra single-line pass for voting
  docfields-server --dpi 300 --field-passes 4,6,7,11

ENDPOINTS:
  POST /api/extract-text     multipart part "file" (.pdf .docx .png .jpg .jpeg)
  POST /api/ocr-image        multipart part "cropped_image"
  POST /api/extract-fields   multipart part "file"; adds voted fields
  GET  /health

ENVIRONMENT VARIABLES:
  TESSERACT_PATH          tesseract binary (default: looked up on PATH)
  PDFIUM_LIB_PATH         Directory containing libpdfium
  RUST_LOG                Overrides -v / -q (e.g. docfields=debug,tower_http=info)
"#;

/// Extract text and part fields from uploaded documents over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "docfields-server",
    version,
    about = "Extract text and part fields from PDF, DOCX and image uploads over HTTP",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Address to bind.
    #[arg(long, env = "DOCFIELDS_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind.
    #[arg(short, long, env = "DOCFIELDS_PORT", default_value_t = 5000)]
    port: u16,

    /// Maximum request body in bytes.
    #[arg(long, env = "DOCFIELDS_MAX_UPLOAD_BYTES", default_value_t = 50 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Comma-separated CORS allow-list. Empty allows any origin.
    #[arg(long, env = "DOCFIELDS_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Rendering DPI for scanned PDF pages (72–600).
    #[arg(long, env = "DOCFIELDS_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Longest edge of a rendered page, in pixels.
    #[arg(long, env = "DOCFIELDS_MAX_PIXELS", default_value_t = 4000)]
    max_pixels: u32,

    /// Pages with fewer text-layer characters than this are OCR'd.
    #[arg(long, env = "DOCFIELDS_TEXT_THRESHOLD", default_value_t = 20)]
    text_threshold: usize,

    /// Contrast enhancement factor applied before OCR.
    #[arg(long, env = "DOCFIELDS_CONTRAST", default_value_t = 2.0)]
    contrast: f32,

    /// Apply an unsharp mask before OCR.
    #[arg(long, env = "DOCFIELDS_SHARPEN")]
    sharpen: bool,

    /// Tesseract language(s), e.g. eng or eng+deu.
    #[arg(short, long, env = "DOCFIELDS_LANG", default_value = "eng")]
    lang: String,

    /// Tesseract OCR engine mode (0–3).
    #[arg(long, env = "DOCFIELDS_OEM", default_value_t = 3,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    oem: u8,

    /// Page-segmentation mode for full pages and images.
    #[arg(long, env = "DOCFIELDS_PAGE_PSM", default_value_t = 4,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    page_psm: u8,

    /// Page-segmentation mode for cropped snippets.
    #[arg(long, env = "DOCFIELDS_SNIPPET_PSM", default_value_t = 6,
          value_parser = clap::value_parser!(u8).range(0..=13))]
    snippet_psm: u8,

    /// Comma-separated page-segmentation modes voted over by /api/extract-fields.
    #[arg(long, env = "DOCFIELDS_FIELD_PASSES", value_delimiter = ',',
          default_value = "4,6,11",
          value_parser = clap::value_parser!(u8).range(0..=13))]
    field_passes: Vec<u8>,

    /// OCR passes allowed to run at once.
    #[arg(short = 'j', long, env = "DOCFIELDS_OCR_CONCURRENCY", default_value_t = 4)]
    ocr_concurrency: usize,

    /// tesseract binary.
    #[arg(long, env = "TESSERACT_PATH", default_value = "tesseract")]
    tesseract_path: PathBuf,

    /// Directory containing libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCFIELDS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCFIELDS_QUIET")]
    quiet: bool,
}

impl Cli {
    fn extraction_config(&self) -> Result<ExtractionConfig> {
        let field_passes = self
            .field_passes
            .iter()
            .map(|&p| PageSegMode::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ExtractionConfig::builder()
            .dpi(self.dpi)
            .max_rendered_pixels(self.max_pixels)
            .text_threshold(self.text_threshold)
            .contrast_factor(self.contrast)
            .sharpen(self.sharpen)
            .language(self.lang.clone())
            .oem(self.oem)
            .page_psm(PageSegMode::new(self.page_psm)?)
            .snippet_psm(PageSegMode::new(self.snippet_psm)?)
            .field_passes(field_passes)
            .ocr_concurrency(self.ocr_concurrency)
            .tesseract_path(self.tesseract_path.clone());
        if let Some(ref dir) = self.pdfium_lib_path {
            builder = builder.pdfium_lib_path(dir.clone());
        }
        Ok(builder.build()?)
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            max_upload_bytes: self.max_upload_bytes,
            cors_origins: self.cors_origins.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Configuration ────────────────────────────────────────────────────
    let config = cli
        .extraction_config()
        .context("Invalid extraction settings")?;
    let server = cli.server_config();
    tracing::debug!("{:?}", config);

    let tesseract = TesseractCli::from_config(&config);
    if !tesseract.is_available() {
        tracing::warn!(
            "'{}' could not be started; OCR requests will fail until it is installed",
            config.tesseract_path.display()
        );
    }
    let engine: Arc<dyn OcrEngine> = Arc::new(tesseract);

    serve(config, server, engine)
        .await
        .with_context(|| format!("Server on {}:{} failed", cli.host, cli.port))
}
