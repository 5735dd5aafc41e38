//! Conversion entry points and the fail-soft pipeline driver.
//!
//! ## Fail-soft contract
//!
//! Once the input has been opened, nothing that goes wrong is allowed to
//! reach the caller as an error. Raster, assembly and serialisation failures
//! (and panics from inside the engine) are caught once, here, recorded in
//! the injected [`FailureLog`], and the caller receives
//! [`ConversionOutcome::FellBack`] carrying its own bytes back unchanged.
//! Only "the input could not be opened" is a hard error, because there is no
//! document to fall back to that the caller does not already have.
//!
//! ```text
//! Opened ─▶ Selecting ─▶ ProcessingPage(i)* ─▶ Serializing ─▶ Done
//!    │          │               │                   │
//!    └──────────┴───────────────┴───────────────────┴──▶ Failed (original bytes)
//! ```

use crate::backend::pdfium::PdfiumBackend;
use crate::backend::{OutputDocument, RenderBackend, SourceDocument};
use crate::config::ConversionConfig;
use crate::error::{DarkPdfError, PipelineError, SelectionError};
use crate::failure_log::{FailureLog, FailureRecord, TracingFailureLog};
use crate::output::{ConversionOutcome, ConversionStats, DocumentInfo};
use crate::pipeline::assemble::DocumentAssembler;
use crate::pipeline::overlay::EyeCareOverlay;
use crate::pipeline::{pages, render, theme};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives one conversion per [`run`](Self::run) call against a rendering
/// backend.
///
/// The failure log and progress callback are process-scoped ports supplied
/// at construction; every call to `run` opens and releases its own documents.
pub struct ConversionPipeline<B: RenderBackend> {
    backend: B,
    failure_log: Arc<dyn FailureLog>,
    progress: ProgressCallback,
}

impl<B: RenderBackend> ConversionPipeline<B> {
    /// A pipeline that reports failures through `tracing` and ignores
    /// progress.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            failure_log: Arc::new(TracingFailureLog),
            progress: Arc::new(NoopProgressCallback),
        }
    }

    pub fn with_failure_log(mut self, log: Arc<dyn FailureLog>) -> Self {
        self.failure_log = log;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = callback;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Convert `input` according to `config`.
    ///
    /// # Returns
    /// * `Ok(Converted)` — the dark-mode document
    /// * `Ok(FellBack)`  — something failed after open; `input` returned as-is
    ///
    /// # Errors
    /// Only open-family errors ([`DarkPdfError::is_open_failure`]) and an
    /// invalid `config`.
    pub fn run(
        &self,
        input: &[u8],
        config: &ConversionConfig,
    ) -> Result<ConversionOutcome, DarkPdfError> {
        config.validate()?;
        let started = Instant::now();
        info!(
            "Starting conversion: {} bytes, theme={}, eye_care={}, pages={:?}",
            input.len(),
            config.theme,
            config.eye_care,
            config.pages
        );

        // ── Opened ───────────────────────────────────────────────────────
        let source = self.backend.open(input, config.password.as_deref())?;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.process(&source, input.len(), config, started)
        }))
        .unwrap_or_else(|payload| {
            Err(PipelineError::Panicked {
                detail: panic_message(payload.as_ref()),
            })
        });
        drop(source);

        match result {
            Ok((bytes, stats)) => {
                info!(
                    "Conversion complete: {}/{} pages, {} → {} bytes, {}ms total",
                    stats.converted_pages,
                    stats.selected_pages,
                    stats.input_bytes,
                    stats.output_bytes,
                    stats.total_duration_ms
                );
                Ok(ConversionOutcome::Converted { bytes, stats })
            }
            Err(error) => {
                let context = format!(
                    "input={} bytes, theme={}, eye_care={}, pages={:?}",
                    input.len(),
                    config.theme,
                    config.eye_care,
                    config.pages
                );
                self.failure_log
                    .record(&FailureRecord::new(&error, context));
                Ok(ConversionOutcome::FellBack {
                    bytes: input.to_vec(),
                    error,
                })
            }
        }
    }

    /// Everything between a successful open and serialised bytes.
    fn process<S: SourceDocument>(
        &self,
        source: &S,
        input_len: usize,
        config: &ConversionConfig,
        started: Instant,
    ) -> Result<(Vec<u8>, ConversionStats), PipelineError> {
        let page_count = source.page_count();

        // ── Selecting ────────────────────────────────────────────────────
        let (selection, selection_fell_back) = match pages::try_parse(&config.pages, page_count) {
            Ok(selection) => (selection, false),
            Err(notice) => {
                warn!("{}", notice);
                self.progress.on_page_skipped(&notice);
                (pages::all_pages(page_count), true)
            }
        };
        let total = selection.len();
        debug!("Selected {} of {} pages", total, page_count);
        self.progress.on_conversion_start(total);

        // ── ProcessingPage(i) ────────────────────────────────────────────
        let overlay = EyeCareOverlay::new(config.eye_care);
        let mut assembler = DocumentAssembler::new(self.backend.new_document()?);
        let mut skipped = 0;
        let render_start = Instant::now();

        for (position, &raw) in selection.iter().enumerate() {
            let Some(index) = pages::checked_index(raw, page_count) else {
                let notice = SelectionError::PageIndexOutOfRange {
                    index: raw,
                    total: page_count,
                };
                warn!("Skipping: {}", notice);
                self.progress.on_page_skipped(&notice);
                skipped += 1;
                continue;
            };

            self.progress.on_page_start(index + 1, position + 1, total);
            process_page(source, &mut assembler, index, &overlay, config)?;
            self.progress.on_page_complete(index + 1, position + 1, total);
        }

        let render_duration_ms = render_start.elapsed().as_millis() as u64;
        let converted = assembler.page_count();
        if converted == 0 {
            return Err(PipelineError::Assembly {
                page: None,
                detail: format!(
                    "no selected page lies inside the document ({} pages, spec {:?})",
                    page_count, config.pages
                ),
            });
        }

        // ── Serializing ──────────────────────────────────────────────────
        let bytes = assembler.serialize(config.compact)?;

        let stats = ConversionStats {
            source_pages: page_count,
            selected_pages: total,
            converted_pages: converted,
            skipped_pages: skipped,
            selection_fell_back,
            input_bytes: input_len,
            output_bytes: bytes.len(),
            render_duration_ms,
            total_duration_ms: started.elapsed().as_millis() as u64,
        };
        self.progress.on_conversion_complete(total, converted);

        Ok((bytes, stats))
    }
}

/// Rasterise → theme → append → tint, for one in-range page.
fn process_page<S: SourceDocument, O: OutputDocument>(
    source: &S,
    assembler: &mut DocumentAssembler<O>,
    index: usize,
    overlay: &EyeCareOverlay,
    config: &ConversionConfig,
) -> Result<(), PipelineError> {
    let size = source.page_size(index)?;
    let mut buffer = render::rasterize(source, index, config.scale)?;
    theme::apply(&mut buffer, &config.theme);

    let page = assembler.append_page(size, buffer)?;
    overlay.apply(&mut assembler.canvas(page), size.rect())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Page count and sizes of `bytes`, without converting anything.
pub fn inspect_with<B: RenderBackend>(
    backend: &B,
    bytes: &[u8],
    password: Option<&str>,
) -> Result<DocumentInfo, DarkPdfError> {
    let source = backend.open(bytes, password)?;
    let page_count = source.page_count();
    let page_sizes = (0..page_count)
        .map(|i| source.page_size(i))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DarkPdfError::Internal(e.to_string()))?;

    Ok(DocumentInfo {
        page_count,
        page_sizes,
    })
}

// ── pdfium-backed convenience API ────────────────────────────────────────

/// Convert PDF bytes to dark mode with pdfium.
///
/// This is the primary entry point for the library. The work runs inside
/// `spawn_blocking` since pdfium is CPU-bound and not async-safe.
///
/// # Example
/// ```rust,no_run
/// use darkpdf::{convert, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("paper.pdf")?;
/// let outcome = convert(bytes, &ConversionConfig::default()).await?;
/// if !outcome.is_converted() {
///     eprintln!("conversion failed, got the original back");
/// }
/// std::fs::write("dark_paper.pdf", outcome.bytes())?;
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    bytes: Vec<u8>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, DarkPdfError> {
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_sync(&bytes, &config))
        .await
        .map_err(|e| DarkPdfError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Blocking version of [`convert`].
pub fn convert_sync(
    bytes: &[u8],
    config: &ConversionConfig,
) -> Result<ConversionOutcome, DarkPdfError> {
    let backend = PdfiumBackend::bind()?;
    ConversionPipeline::new(backend).run(bytes, config)
}

/// Convert a PDF file and write the result next to it (or anywhere).
///
/// Uses atomic write (temp file + rename) so a crash never leaves a partial
/// output file. A fallback still writes the (original) document.
pub async fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, DarkPdfError> {
    let bytes = read_input(input_path.as_ref()).await?;
    let outcome = convert(bytes, config).await?;
    write_output(output_path.as_ref(), outcome.bytes()).await?;
    Ok(outcome)
}

/// Page count and sizes of a PDF, via pdfium.
pub async fn inspect(
    bytes: Vec<u8>,
    password: Option<String>,
) -> Result<DocumentInfo, DarkPdfError> {
    tokio::task::spawn_blocking(move || {
        let backend = PdfiumBackend::bind()?;
        inspect_with(&backend, &bytes, password.as_deref())
    })
    .await
    .map_err(|e| DarkPdfError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Read an input PDF from disk.
pub async fn read_input(path: &Path) -> Result<Vec<u8>, DarkPdfError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| DarkPdfError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Write `bytes` to `path` atomically (temp file + rename).
pub async fn write_output(path: &Path, bytes: &[u8]) -> Result<(), DarkPdfError> {
    let write_err = |e| DarkPdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    Ok(())
}
