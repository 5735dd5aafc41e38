//! Output document assembly.
//!
//! Each output page is created with the *physical* size of its source page
//! and the raster is stretched to fill it, so a 1.5× render of a Letter page
//! (918×1188 px) still lands on a 612×792 pt page. Pages are appended in the
//! order they are processed; the assembler never reorders.

use super::overlay::Canvas;
use crate::backend::{OutputDocument, PageHandle, PageSize, Rect};
use crate::error::PipelineError;
use crate::raster::RasterBuffer;
use image::Rgb;
use tracing::debug;

/// Owns an [`OutputDocument`] from creation to serialisation.
#[derive(Debug)]
pub struct DocumentAssembler<O: OutputDocument> {
    output: O,
}

impl<O: OutputDocument> DocumentAssembler<O> {
    pub fn new(output: O) -> Self {
        Self { output }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.output.page_count()
    }

    /// Append a `size` page and fill it with `buffer`.
    ///
    /// The buffer is consumed: once it is on the page nothing else needs it.
    pub fn append_page(
        &mut self,
        size: PageSize,
        buffer: RasterBuffer,
    ) -> Result<PageHandle, PipelineError> {
        if buffer.is_empty() {
            return Err(PipelineError::Assembly {
                page: Some(self.output.page_count() + 1),
                detail: "raster buffer has no pixels".into(),
            });
        }

        let handle = self.output.append_page(size)?;
        self.output.place_image(handle, size.rect(), buffer)?;
        debug!(
            "Appended output page {} ({}x{} pt)",
            handle.0 + 1,
            size.width,
            size.height
        );
        Ok(handle)
    }

    /// A canvas for drawing on top of an already appended page.
    pub fn canvas(&mut self, page: PageHandle) -> PageCanvas<'_, O> {
        PageCanvas {
            output: &mut self.output,
            page,
        }
    }

    /// Serialise the document, consuming the assembler.
    pub fn serialize(self, compact: bool) -> Result<Vec<u8>, PipelineError> {
        self.output.serialize(compact)
    }
}

/// One page of an output document, seen as a [`Canvas`].
#[derive(Debug)]
pub struct PageCanvas<'d, O: OutputDocument> {
    output: &'d mut O,
    page: PageHandle,
}

impl<O: OutputDocument> Canvas for PageCanvas<'_, O> {
    fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>, opacity: f32) -> Result<(), PipelineError> {
        self.output.draw_filled_rect(self.page, rect, color, opacity)
    }
}
