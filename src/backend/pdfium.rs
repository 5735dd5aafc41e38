//! pdfium-render implementation of the rendering collaborator.
//!
//! ## Library discovery
//!
//! pdfium is a C++ library loaded at runtime. [`PdfiumBackend::bind`] tries,
//! in order: the file named by `PDFIUM_LIB_PATH`, the platform library name in
//! the working directory, then whatever the system loader finds.
//!
//! ## Thread affinity
//!
//! pdfium keeps global state and is not safe to drive from async worker
//! threads. The async entry points in [`crate::convert`] move the whole
//! conversion onto a `spawn_blocking` thread and bind pdfium there.

use super::{OutputDocument, PageHandle, PageSize, Rect, RenderBackend, SourceDocument};
use crate::error::{DarkPdfError, PipelineError};
use crate::raster::RasterBuffer;
use image::Rgb;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Environment variable pointing at an existing pdfium shared library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// A bound pdfium library.
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl std::fmt::Debug for PdfiumBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumBackend").finish_non_exhaustive()
    }
}

impl PdfiumBackend {
    /// Bind to pdfium using the discovery order described in the module docs.
    pub fn bind() -> Result<Self, DarkPdfError> {
        let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
            Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
            _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| DarkPdfError::PdfiumBindingFailed(e.to_string()))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl RenderBackend for PdfiumBackend {
    type Source<'a> = PdfiumSource<'a>;
    type Output<'a> = PdfiumOutput<'a>;

    fn open<'a>(
        &'a self,
        bytes: &'a [u8],
        password: Option<&str>,
    ) -> Result<PdfiumSource<'a>, DarkPdfError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| classify_open_error(e, password.is_some()))?;

        info!(
            "PDF loaded: {} pages, {} bytes",
            document.pages().len(),
            bytes.len()
        );
        Ok(PdfiumSource { document })
    }

    fn new_document(&self) -> Result<PdfiumOutput<'_>, PipelineError> {
        let document = self
            .pdfium
            .create_new_pdf()
            .map_err(|e| PipelineError::Assembly {
                page: None,
                detail: format!("{:?}", e),
            })?;
        Ok(PdfiumOutput { document })
    }
}

/// pdfium reports every open failure through one error type; split out the
/// password cases so the caller can act on them.
fn classify_open_error(e: PdfiumError, had_password: bool) -> DarkPdfError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            DarkPdfError::WrongPassword
        } else {
            DarkPdfError::PasswordRequired
        }
    } else {
        DarkPdfError::OpenFailure { detail: err_str }
    }
}

/// An input document opened by pdfium.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumSource<'_> {
    fn page(&self, index: usize) -> Result<PdfPage<'_>, PdfiumError> {
        self.document.pages().get(index as u16)
    }
}

impl SourceDocument for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, PipelineError> {
        let page = self.page(index).map_err(|e| PipelineError::Raster {
            page: index + 1,
            detail: format!("{:?}", e),
        })?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn rasterize(&self, index: usize, scale: f32) -> Result<RasterBuffer, PipelineError> {
        let raster_err = |e: PdfiumError| PipelineError::Raster {
            page: index + 1,
            detail: format!("{:?}", e),
        };

        let page = self.page(index).map_err(raster_err)?;
        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page.render_with_config(&render_config).map_err(raster_err)?;

        Ok(RasterBuffer::from_dynamic(bitmap.as_image()))
    }
}

/// A new document being assembled by pdfium.
pub struct PdfiumOutput<'a> {
    document: PdfDocument<'a>,
}

impl PdfiumOutput<'_> {
    fn page(&self, handle: PageHandle) -> Result<PdfPage<'_>, PipelineError> {
        self.document
            .pages()
            .get(handle.0 as u16)
            .map_err(|e| PipelineError::Assembly {
                page: Some(handle.0 + 1),
                detail: format!("{:?}", e),
            })
    }
}

impl OutputDocument for PdfiumOutput<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn append_page(&mut self, size: PageSize) -> Result<PageHandle, PipelineError> {
        let handle = PageHandle(self.page_count());
        self.document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::new(size.width),
                PdfPoints::new(size.height),
            ))
            .map_err(|e| PipelineError::Assembly {
                page: Some(handle.0 + 1),
                detail: format!("{:?}", e),
            })?;
        Ok(handle)
    }

    fn place_image(
        &mut self,
        handle: PageHandle,
        rect: Rect,
        image: RasterBuffer,
    ) -> Result<(), PipelineError> {
        let (px_width, px_height) = (image.width(), image.height());
        let mut page = self.page(handle)?;
        page.objects_mut()
            .create_image_object(
                PdfPoints::new(rect.x),
                PdfPoints::new(rect.y),
                &image.into_dynamic(),
                Some(PdfPoints::new(rect.width)),
                Some(PdfPoints::new(rect.height)),
            )
            .map_err(|e| PipelineError::Assembly {
                page: Some(handle.0 + 1),
                detail: format!("{:?}", e),
            })?;

        debug!(
            "Placed {}x{} px image on output page {} ({}x{} pt)",
            px_width,
            px_height,
            handle.0 + 1,
            rect.width,
            rect.height
        );
        Ok(())
    }

    fn draw_filled_rect(
        &mut self,
        handle: PageHandle,
        rect: Rect,
        color: Rgb<u8>,
        opacity: f32,
    ) -> Result<(), PipelineError> {
        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let fill = PdfColor::new(color[0], color[1], color[2], alpha);

        let mut page = self.page(handle)?;
        page.objects_mut()
            .create_path_object_rect(
                PdfRect::new_from_values(rect.y, rect.x, rect.top(), rect.right()),
                None,
                None,
                Some(fill),
            )
            .map_err(|e| PipelineError::Assembly {
                page: Some(handle.0 + 1),
                detail: format!("{:?}", e),
            })?;
        Ok(())
    }

    fn serialize(self, compact: bool) -> Result<Vec<u8>, PipelineError> {
        let bytes = self
            .document
            .save_to_bytes()
            .map_err(|e| PipelineError::Serialize {
                detail: format!("{:?}", e),
            })?;

        Ok(if compact {
            super::compact::compact_or_keep(bytes)
        } else {
            bytes
        })
    }
}
