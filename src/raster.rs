//! The pixel buffer that flows between pipeline stages.
//!
//! A [`RasterBuffer`] is produced fresh for every page by the rasteriser,
//! mutated in place by the theme transform, and consumed by the assembler
//! when it is placed on the output page. Ownership moves along the pipeline,
//! so no buffer is ever shared between pages.

use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Pixel layout of a [`RasterBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorModel {
    /// Three interleaved 8-bit channels, no alpha.
    #[default]
    Rgb8,
}

impl ColorModel {
    /// Number of channels per pixel.
    pub const fn channels(self) -> usize {
        match self {
            ColorModel::Rgb8 => 3,
        }
    }
}

/// An RGB, 8-bit-per-channel page raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    image: RgbImage,
}

impl RasterBuffer {
    /// Wrap an already-decoded RGB image.
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    /// Convert any decoded image to RGB8, dropping alpha if present.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.into_rgb8())
    }

    /// A buffer of `width × height` pixels, all set to `rgb`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(width, height, Rgb(rgb)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn color_model(&self) -> ColorModel {
        ColorModel::Rgb8
    }

    /// `true` when the buffer has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    /// Hand the pixels to APIs that want a `DynamicImage` without copying.
    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgb8(self.image)
    }

    /// Raw interleaved channel bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn filled_buffer_reports_dimensions() {
        let buf = RasterBuffer::filled(4, 3, [10, 20, 30]);
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 3);
        assert_eq!(buf.color_model(), ColorModel::Rgb8);
        assert_eq!(buf.as_raw().len(), 4 * 3 * ColorModel::Rgb8.channels());
        assert!(!buf.is_empty());
    }

    #[test]
    fn rgba_input_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 128]));
        let buf = RasterBuffer::from_dynamic(DynamicImage::ImageRgba8(rgba));
        assert_eq!(buf.as_image().get_pixel(1, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn zero_sized_buffer_is_empty() {
        assert!(RasterBuffer::filled(0, 10, [0, 0, 0]).is_empty());
    }
}
