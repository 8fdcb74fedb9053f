// Bilinear RGBA resampling built on fast_image_resize (SIMD-accelerated).
// RGBA8 in -> RGBA8 out, direct write into a caller-provided destination.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::RgbaImage;

use crate::error::CartoonError;

/// Owns the resizer so its internal buffers are reused from frame to frame.
pub struct Resampler {
    resizer: Resizer,
    options: ResizeOptions,
}

impl Resampler {
    pub fn bilinear() -> Self {
        Self {
            resizer: Resizer::new(),
            // Plain 2x2-tap interpolation at any scale; convolution would widen the
            // support on downscale. Frames are opaque, so no alpha premultiplication.
            options: ResizeOptions::new()
                .resize_alg(ResizeAlg::Interpolation(FilterType::Bilinear))
                .use_alpha(false),
        }
    }

    /// Resample `src` to exactly the size of `dst`.
    pub fn resize_rgba(&mut self, src: &RgbaImage, dst: &mut RgbaImage) -> Result<(), CartoonError> {
        let src_view = TypedImageRef::<U8x4>::from_buffer(src.width(), src.height(), src.as_raw())?;
        let (w, h) = dst.dimensions();
        let dst_buf: &mut [u8] = dst;
        let mut dst_view = TypedImage::<U8x4>::from_buffer(w, h, dst_buf)?;
        self.resizer.resize_typed::<U8x4>(&src_view, &mut dst_view, &self.options)?;
        Ok(())
    }
}

impl Default for Resampler {
    fn default() -> Self {
        Self::bilinear()
    }
}
