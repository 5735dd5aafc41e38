//! Result types returned by the conversion entry points.

use crate::backend::PageSize;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// What a conversion produced.
///
/// Both variants carry a valid PDF byte stream. `FellBack` means the
/// dark-mode version could not be produced and the bytes are the caller's
/// original input, untouched.
#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    /// The document was converted.
    Converted {
        bytes: Vec<u8>,
        stats: ConversionStats,
    },
    /// Conversion failed after the document was opened; `bytes` is the input.
    FellBack {
        bytes: Vec<u8>,
        error: PipelineError,
    },
}

impl ConversionOutcome {
    /// The output PDF, converted or original.
    pub fn bytes(&self) -> &[u8] {
        match self {
            ConversionOutcome::Converted { bytes, .. } | ConversionOutcome::FellBack { bytes, .. } => {
                bytes
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ConversionOutcome::Converted { bytes, .. } | ConversionOutcome::FellBack { bytes, .. } => {
                bytes
            }
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, ConversionOutcome::Converted { .. })
    }

    /// Statistics, present only for a successful conversion.
    pub fn stats(&self) -> Option<&ConversionStats> {
        match self {
            ConversionOutcome::Converted { stats, .. } => Some(stats),
            ConversionOutcome::FellBack { .. } => None,
        }
    }

    /// The absorbed failure, present only after a fallback.
    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            ConversionOutcome::Converted { .. } => None,
            ConversionOutcome::FellBack { error, .. } => Some(error),
        }
    }
}

/// Counters and timings for a successful conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub source_pages: usize,
    /// Indices produced by the page spec (after any fallback).
    pub selected_pages: usize,
    /// Pages written to the output.
    pub converted_pages: usize,
    /// Selected indices skipped as out of range.
    pub skipped_pages: usize,
    /// `true` when the page spec was unparsable and every page was used.
    pub selection_fell_back: bool,
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Time spent rasterising and transforming pages.
    pub render_duration_ms: u64,
    /// Wall-clock time from open to serialised bytes.
    pub total_duration_ms: u64,
}

/// Page count and sizes of a document, without converting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    /// Physical size of each page, in points.
    pub page_sizes: Vec<PageSize>,
}
