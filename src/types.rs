// Core types shared by the cartoon pipeline and the window glue.

use image::RgbaImage;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both axes, rounding down (a 641 px wide camera at 0.75 gives 480).
    pub fn scaled(self, scale: f64) -> Self {
        Self {
            width: (self.width as f64 * scale).floor() as u32,
            height: (self.height as f64 * scale).floor() as u32,
        }
    }

    pub fn pixels(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Screen buffer for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Pack an RGBA frame into 0x00RRGGBB (alpha dropped). Sizes must match.
    /// Visual: the window shows exactly the colors of `src`.
    pub fn copy_from_rgba(&mut self, src: &RgbaImage) {
        debug_assert_eq!(
            (src.width() as usize, src.height() as usize),
            (self.width, self.height)
        );
        for (dst, px) in self.pixels.iter_mut().zip(src.pixels()) {
            let [r, g, b, _] = px.0;
            *dst = ((r as u32) << 16) | ((g as u32) << 8) | b as u32;
        }
    }
}
