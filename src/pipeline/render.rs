//! PDF rasterisation: render one source page to an RGB [`RasterBuffer`].
//!
//! ## Why a fixed scale, not DPI?
//!
//! The raster only ever goes back into a PDF page of the same physical size,
//! so what matters is pixels per point, not pixels per inch. 1.5× (108 DPI
//! equivalent) keeps body text crisp on phone screens while a 300-page book
//! still fits comfortably in memory one page at a time.

use crate::backend::SourceDocument;
use crate::error::PipelineError;
use crate::raster::RasterBuffer;
use tracing::debug;

/// Default zoom factor applied to both axes.
pub const DEFAULT_SCALE: f32 = 1.5;

/// Smallest and largest accepted zoom factors.
pub const SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

/// Rasterise page `page_index` (zero-based) of `document` at `scale`.
///
/// Callers bounds-check first; an invalid index here is an error, not a skip.
pub fn rasterize<S: SourceDocument + ?Sized>(
    document: &S,
    page_index: usize,
    scale: f32,
) -> Result<RasterBuffer, PipelineError> {
    let total = document.page_count();
    if page_index >= total {
        return Err(PipelineError::Raster {
            page: page_index + 1,
            detail: format!("page index out of range (document has {} pages)", total),
        });
    }

    let buffer = document.rasterize(page_index, scale)?;
    if buffer.is_empty() {
        return Err(PipelineError::Raster {
            page: page_index + 1,
            detail: "renderer returned an empty bitmap".into(),
        });
    }

    debug!(
        "Rendered page {} → {}x{} px at {}x",
        page_index + 1,
        buffer.width(),
        buffer.height(),
        scale
    );
    Ok(buffer)
}
