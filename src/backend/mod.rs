//! The rendering collaborator: everything the pipeline needs from a PDF engine.
//!
//! The pipeline never touches pdfium directly. It talks to three small traits
//! and a handful of plain geometry types, so the engine can be swapped (or
//! faked in tests) without touching any stage logic.
//!
//! ```text
//! RenderBackend ──open──▶ SourceDocument   page_count / page_size / rasterize
//!       │
//!       └──new_document──▶ OutputDocument  append_page / place_image /
//!                                          draw_filled_rect / serialize
//! ```
//!
//! "Closing" a handle is `Drop`: source and output documents release their
//! engine resources when they go out of scope, on every exit path.

pub mod compact;
pub mod pdfium;

use crate::error::{DarkPdfError, PipelineError};
use crate::raster::RasterBuffer;
use image::Rgb;
use serde::{Deserialize, Serialize};

/// Physical page dimensions in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The full page area, anchored at the origin.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// An axis-aligned rectangle in the units of whatever canvas it is drawn on
/// (points for output pages, pixels for raster buffers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Position of a page inside an [`OutputDocument`], in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

/// A PDF engine able to open documents and create new ones.
pub trait RenderBackend {
    /// An opened input document, borrowing the engine and the input bytes.
    type Source<'a>: SourceDocument
    where
        Self: 'a;

    /// A blank document under construction.
    type Output<'a>: OutputDocument
    where
        Self: 'a;

    /// Open `bytes` as a document.
    ///
    /// This is the only collaborator call whose failure is fatal to the
    /// caller, so it reports [`DarkPdfError`] rather than [`PipelineError`].
    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&str>,
    ) -> Result<Self::Source<'a>, DarkPdfError>;

    /// Create an empty output document.
    fn new_document(&self) -> Result<Self::Output<'_>, PipelineError>;
}

/// Read-only view of an opened input document.
pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Physical size of the page at zero-based `index`.
    fn page_size(&self, index: usize) -> Result<PageSize, PipelineError>;

    /// Render the page at zero-based `index` with a uniform `scale` applied
    /// to both axes (1.0 = one pixel per point).
    fn rasterize(&self, index: usize, scale: f32) -> Result<RasterBuffer, PipelineError>;
}

/// A document being assembled page by page. Single writer.
pub trait OutputDocument {
    /// Number of pages appended so far.
    fn page_count(&self) -> usize;

    /// Append a blank page of the given physical size.
    fn append_page(&mut self, size: PageSize) -> Result<PageHandle, PipelineError>;

    /// Place `image` on `page`, stretched to fill `rect`.
    fn place_image(
        &mut self,
        page: PageHandle,
        rect: Rect,
        image: RasterBuffer,
    ) -> Result<(), PipelineError>;

    /// Paint a solid `color` rectangle at `opacity` (0.0–1.0) over whatever is
    /// already on `page`.
    fn draw_filled_rect(
        &mut self,
        page: PageHandle,
        rect: Rect,
        color: Rgb<u8>,
        opacity: f32,
    ) -> Result<(), PipelineError>;

    /// Write the document out. With `compact`, unreferenced objects are
    /// dropped and streams compressed.
    fn serialize(self, compact: bool) -> Result<Vec<u8>, PipelineError>;
}
