//! Eye-care tint: a faint warm-amber wash over the whole page.
//!
//! Pure white-on-black text is harsh at night. Compositing a low-opacity
//! amber layer on top of the finished page shifts the white glyphs toward
//! a warm off-white while leaving black areas almost untouched
//! (8% of 255 × 0.4 is only ~8 levels on the blue channel).
//!
//! The overlay paints through the [`Canvas`] trait so the same code can tint
//! an output PDF page (a translucent vector rectangle drawn after the image)
//! or a [`RasterBuffer`] directly (standard alpha-over per pixel).

use crate::backend::Rect;
use crate::error::PipelineError;
use crate::raster::RasterBuffer;
use image::Rgb;

/// Tint colour, (1.0, 0.8, 0.4) in normalised RGB.
pub const WARM_AMBER: Rgb<u8> = Rgb([255, 204, 102]);

/// Opacity of the tint layer.
pub const EYE_CARE_OPACITY: f32 = 0.08;

/// Anything a translucent rectangle can be painted on.
pub trait Canvas {
    /// Composite `color` at `opacity` over the area `rect`.
    fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>, opacity: f32) -> Result<(), PipelineError>;
}

/// The eye-care overlay, enabled or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCareOverlay {
    enabled: bool,
    color: Rgb<u8>,
    opacity: f32,
}

impl EyeCareOverlay {
    /// The standard warm tint, active only when `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            color: WARM_AMBER,
            opacity: EYE_CARE_OPACITY,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn color(&self) -> Rgb<u8> {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Tint `rect` on `canvas`. No-op when the overlay is disabled.
    pub fn apply<C: Canvas + ?Sized>(&self, canvas: &mut C, rect: Rect) -> Result<(), PipelineError> {
        if !self.enabled {
            return Ok(());
        }
        canvas.fill_rect(rect, self.color, self.opacity)
    }
}

/// Alpha-over for one channel: `overlay·α + base·(1−α)`, rounded.
pub fn blend_channel(base: u8, overlay: u8, alpha: f32) -> u8 {
    let alpha = alpha.clamp(0.0, 1.0);
    let mixed = f32::from(overlay) * alpha + f32::from(base) * (1.0 - alpha);
    mixed.round().clamp(0.0, 255.0) as u8
}

impl Canvas for RasterBuffer {
    /// `rect` is in pixels, origin at the top-left corner; it is clipped to
    /// the buffer.
    fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>, opacity: f32) -> Result<(), PipelineError> {
        let (width, height) = (self.width(), self.height());
        let clip = |v: f32, max: u32| v.max(0.0).min(max as f32).round() as u32;
        let (x0, x1) = (clip(rect.x, width), clip(rect.right(), width));
        let (y0, y1) = (clip(rect.y, height), clip(rect.top(), height));

        let image = self.as_image_mut();
        for y in y0..y1 {
            for x in x0..x1 {
                let px = image.get_pixel_mut(x, y);
                for c in 0..3 {
                    px[c] = blend_channel(px[c], color[c], opacity);
                }
            }
        }
        Ok(())
    }
}
