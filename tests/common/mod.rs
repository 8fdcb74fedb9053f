//! Synthetic camera frames for the integration tests.

#![allow(dead_code)]

use image::{Rgba, RgbaImage};

/// Xorshift32 so "noisy" frames are the same on every run.
pub struct Rng32 {
    state: u32,
}

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    pub fn next_u8(&mut self) -> u8 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        (x >> 24) as u8
    }
}

/// Opaque frame of random colors.
pub fn noise_frame(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut rng = Rng32::from_seed(seed);
    RgbaImage::from_fn(width, height, |_, _| {
        Rgba([rng.next_u8(), rng.next_u8(), rng.next_u8(), 255])
    })
}

pub const BACKGROUND: [u8; 4] = [40, 120, 200, 255];
pub const PATCH: [u8; 4] = [230, 200, 40, 255];

/// Flat blue background with a yellow rectangle covering the middle half.
pub fn patch_frame(width: u32, height: u32) -> RgbaImage {
    let (x0, x1) = (width / 4, width * 3 / 4);
    let (y0, y1) = (height / 4, height * 3 / 4);
    RgbaImage::from_fn(width, height, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            Rgba(PATCH)
        } else {
            Rgba(BACKGROUND)
        }
    })
}

/// Gentle gradient plus a few hard shapes: something a camera might see.
pub fn scene_frame(width: u32, height: u32) -> RgbaImage {
    let mut rng = Rng32::from_seed(0xC0FFEE);
    RgbaImage::from_fn(width, height, |x, y| {
        let jitter = (rng.next_u8() % 7) as i32 - 3;
        let base = [
            (x * 255 / width.max(1)) as i32,
            (y * 255 / height.max(1)) as i32,
            128,
        ];
        let inside_disc = {
            let (cx, cy) = (width as i32 / 3, height as i32 / 2);
            let (dx, dy) = (x as i32 - cx, y as i32 - cy);
            dx * dx + dy * dy < (height as i32 / 4).pow(2)
        };
        let px = if inside_disc { [20, 20, 30] } else { base };
        Rgba([
            (px[0] + jitter).clamp(0, 255) as u8,
            (px[1] + jitter).clamp(0, 255) as u8,
            (px[2] + jitter).clamp(0, 255) as u8,
            255,
        ])
    })
}

pub fn close_to(px: &Rgba<u8>, want: [u8; 4], tolerance: u8) -> bool {
    px.0.iter().zip(want).all(|(&a, b)| a.abs_diff(b) <= tolerance)
}
