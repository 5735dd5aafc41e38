//! # darkpdf
//!
//! Convert PDF documents to a dark-mode reading variant.
//!
//! Every selected page is rasterised, colour-inverted ("pure black"
//! background, light foreground), optionally warmed with a translucent
//! eye-care tint, and placed as a full-page image in a new PDF whose page
//! sizes match the source.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Open     pdfium load (the only hard failure)
//!  ├─ 2. Select   page spec → ordered 0-based indices
//!  ├─ 3. Render   rasterise page at `scale` px/pt
//!  ├─ 4. Theme    invert RGB for `pure-black`
//!  ├─ 5. Assemble new page of the source size, full-bleed image
//!  ├─ 6. Overlay  optional warm amber rect at 8% opacity
//!  └─ 7. Save     pdfium save + lopdf compaction
//! ```
//!
//! Any failure after step 1 is fail-soft: the caller gets
//! [`ConversionOutcome::FellBack`] with its original bytes, and the failure
//! is reported to the configured [`FailureLog`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use darkpdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .eye_care(true)
//!         .pages("1-5")
//!         .build()?;
//!     let input = std::fs::read("paper.pdf")?;
//!     let outcome = convert(input, &config).await?;
//!     std::fs::write("dark_paper.pdf", outcome.bytes())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `darkpdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Pdfium
//!
//! The pdfium shared library is bound at runtime: `PDFIUM_LIB_PATH` first,
//! then the working directory, then the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod error;
pub mod failure_log;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod raster;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::pdfium::PdfiumBackend;
pub use backend::{OutputDocument, PageHandle, PageSize, Rect, RenderBackend, SourceDocument};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_file, convert_sync, inspect, inspect_with, ConversionPipeline};
pub use error::{DarkPdfError, PipelineError, SelectionError};
pub use failure_log::{FailureLog, FailureRecord, FileFailureLog, TracingFailureLog};
pub use output::{ConversionOutcome, ConversionStats, DocumentInfo};
pub use pipeline::theme::Theme;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use raster::RasterBuffer;
