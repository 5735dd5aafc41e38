//! Error types for the darkpdf library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`DarkPdfError`] — **Fatal**: the conversion cannot start at all (the
//!   input cannot be opened, pdfium cannot be bound, the config is invalid).
//!   Returned as `Err(DarkPdfError)` from the top-level `convert*` functions.
//!
//! * [`PipelineError`] — **Absorbed**: something broke after the document was
//!   opened (rasterisation, assembly, serialisation). The pipeline logs it and
//!   hands back the original input bytes inside
//!   [`crate::output::ConversionOutcome::FellBack`].
//!
//! * [`SelectionError`] — **Notice**: the page spec could not be parsed, or a
//!   selected index is outside the document. Processing continues; these are
//!   only reported to logs and progress callbacks.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the darkpdf library.
///
/// Failures after a successful open use [`PipelineError`] and never surface
/// here; the caller gets the original bytes back instead.
#[derive(Debug, Error)]
pub enum DarkPdfError {
    // ── Open errors ───────────────────────────────────────────────────────
    /// The input bytes are not a document the renderer can open.
    #[error("Input is not an openable PDF: {detail}")]
    OpenFailure { detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the binary or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input PDF from disk.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DarkPdfError {
    /// `true` for every variant that means "the input could not be opened".
    ///
    /// Callers that only care about the open/not-open distinction can match
    /// on this instead of on the three individual variants.
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            DarkPdfError::OpenFailure { .. }
                | DarkPdfError::PasswordRequired
                | DarkPdfError::WrongPassword
        )
    }
}

/// A failure after the source document was opened.
///
/// Never returned as `Err` from the public API; stored in
/// [`crate::output::ConversionOutcome::FellBack`] next to the original bytes.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PipelineError {
    /// Page rasterisation failed (1-indexed page number).
    #[error("Page {page}: rasterisation failed: {detail}")]
    Raster { page: usize, detail: String },

    /// Creating the output document or inserting a page into it failed.
    ///
    /// `page` is `None` when the output document itself could not be created.
    #[error("{}assembly failed: {detail}", page.map(|p| format!("Page {p}: ")).unwrap_or_default())]
    Assembly { page: Option<usize>, detail: String },

    /// Writing the output document to bytes failed.
    #[error("Serialisation failed: {detail}")]
    Serialize { detail: String },

    /// The rendering engine panicked mid-conversion.
    #[error("Conversion panicked: {detail}")]
    Panicked { detail: String },
}

/// A non-fatal problem with the page selection.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SelectionError {
    /// The page spec could not be parsed; every page is selected instead.
    #[error("Unparsable page spec '{spec}': {reason} (falling back to all pages)")]
    RangeSpecUnparsable { spec: String, reason: String },

    /// A selected zero-based index lies outside the document; it is skipped.
    #[error("Page {} is out of range (document has {total} pages)", index + 1)]
    PageIndexOutOfRange { index: i64, total: usize },
}
