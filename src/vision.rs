// Pixel kernels for the cartoon pipeline.
// Every kernel writes into a caller-owned buffer; nothing here allocates per frame.
// Visual expectation per stage:
//   split_rgba              -> plain color copy + grayscale copy of the frame
//   median_blur             -> grayscale with sensor speckle removed, edges still crisp
//   adaptive_threshold_mean -> white field with thin black lines where contrast is high
//   bilateral_filter        -> colors flattened inside regions, boundaries kept
//   compose_edges           -> flat colors with the black lines stamped on top

use crate::error::{check_dims, CartoonError};
use image::{GrayImage, RgbImage, RgbaImage};

/// Largest median window we keep on the stack (15x15).
pub const MAX_MEDIAN_KSIZE: u32 = 15;
const MAX_MEDIAN_WINDOW: usize = (MAX_MEDIAN_KSIZE * MAX_MEDIAN_KSIZE) as usize;

/// Largest adaptive-threshold block; keeps the block sum well inside `u32`.
pub const MAX_BLOCK_SIZE: u32 = 255;

// Fixed-point luma weights (0.299, 0.587, 0.114) scaled by 2^14.
const LUMA_SHIFT: u32 = 14;
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

/// Drop alpha into `rgb` and compute luma into `gray`, one pass over `src`.
pub fn split_rgba(
    src: &RgbaImage,
    rgb: &mut RgbImage,
    gray: &mut GrayImage,
) -> Result<(), CartoonError> {
    check_dims("split_rgba(rgb)", src.dimensions(), rgb.dimensions())?;
    check_dims("split_rgba(gray)", src.dimensions(), gray.dimensions())?;

    let rgb_px: &mut [u8] = rgb;
    let gray_px: &mut [u8] = gray;
    for ((s, c), g) in src
        .as_raw()
        .chunks_exact(4)
        .zip(rgb_px.chunks_exact_mut(3))
        .zip(gray_px.iter_mut())
    {
        let (r, gr, b) = (s[0], s[1], s[2]);
        c[0] = r;
        c[1] = gr;
        c[2] = b;
        let y = LUMA_R * r as u32 + LUMA_G * gr as u32 + LUMA_B * b as u32 + (1 << (LUMA_SHIFT - 1));
        *g = (y >> LUMA_SHIFT) as u8;
    }
    Ok(())
}

/// Median of the `ksize` x `ksize` neighbourhood; borders replicate the edge pixel.
pub fn median_blur(src: &GrayImage, dst: &mut GrayImage, ksize: u32) -> Result<(), CartoonError> {
    check_dims("median_blur", src.dimensions(), dst.dimensions())?;
    if ksize % 2 == 0 || ksize > MAX_MEDIAN_KSIZE {
        return Err(CartoonError::InvalidParams(format!(
            "median ksize must be odd and <= {MAX_MEDIAN_KSIZE}, got {ksize}"
        )));
    }

    let w = src.width() as i64;
    let h = src.height() as i64;
    let r = (ksize / 2) as i64;
    let n = (ksize * ksize) as usize;
    let mid = n / 2;
    let mut window = [0u8; MAX_MEDIAN_WINDOW];

    let s: &[u8] = src;
    let d: &mut [u8] = dst;
    for y in 0..h {
        for x in 0..w {
            let mut i = 0;
            for dy in -r..=r {
                let row = (y + dy).clamp(0, h - 1) as usize * w as usize;
                for dx in -r..=r {
                    window[i] = s[row + (x + dx).clamp(0, w - 1) as usize];
                    i += 1;
                }
            }
            let (_, median, _) = window[..n].select_nth_unstable(mid);
            d[(y * w + x) as usize] = *median;
        }
    }
    Ok(())
}

/// Binarize against the local mean: 255 where `px > mean(block) - ceil(c)`, else 0.
///
/// The block mean uses a two-pass sliding box sum with replicated borders, rounded to
/// 8 bits before comparing. `row_sums` is scratch of at least `width * height` entries.
pub fn adaptive_threshold_mean(
    src: &GrayImage,
    dst: &mut GrayImage,
    row_sums: &mut [u32],
    block_size: u32,
    c: f64,
) -> Result<(), CartoonError> {
    check_dims("adaptive_threshold", src.dimensions(), dst.dimensions())?;
    if block_size % 2 == 0 || block_size > MAX_BLOCK_SIZE {
        return Err(CartoonError::InvalidParams(format!(
            "block size must be odd and <= {MAX_BLOCK_SIZE}, got {block_size}"
        )));
    }
    let w = src.width() as i32;
    let h = src.height() as i32;
    let wu = w as usize;
    if row_sums.len() < wu * h as usize {
        return Err(CartoonError::InvalidParams(format!(
            "row_sums scratch holds {} entries, need {}",
            row_sums.len(),
            wu * h as usize
        )));
    }

    let r = (block_size / 2) as i32;
    let area = block_size * block_size;
    let half = area / 2;
    let delta = c.ceil() as i32;
    let s: &[u8] = src;
    let d: &mut [u8] = dst;

    /* ---- Pass 1: horizontal window sums per row ---- */
    for y in 0..h {
        let row_ofs = y as usize * wu;

        // Edge pixel at x=0 stands in for everything left of the row
        let mut sum = s[row_ofs] as u32 * (r as u32 + 1);
        for x in 1..=r {
            sum += s[row_ofs + x.min(w - 1) as usize] as u32;
        }

        for x in 0..w {
            row_sums[row_ofs + x as usize] = sum;

            let left_x = (x - r).max(0) as usize;
            let right_x = (x + r + 1).min(w - 1) as usize;
            sum = sum + s[row_ofs + right_x] as u32 - s[row_ofs + left_x] as u32;
        }
    }

    /* ---- Pass 2: vertical window over the row sums, then threshold ---- */
    for x in 0..w {
        let col = x as usize;
        let mut sum = row_sums[col] * (r as u32 + 1);
        for y in 1..=r {
            sum += row_sums[y.min(h - 1) as usize * wu + col];
        }

        for y in 0..h {
            let idx = y as usize * wu + col;
            let mean = ((sum + half) / area) as i32;
            d[idx] = if s[idx] as i32 - mean > -delta { 255 } else { 0 };

            let top_y = (y - r).max(0) as usize;
            let bottom_y = (y + r + 1).min(h - 1) as usize;
            sum = sum + row_sums[bottom_y * wu + col] - row_sums[top_y * wu + col];
        }
    }

    Ok(())
}

/// Precomputed weights for [`bilateral_filter`]. Built once per session.
pub struct BilateralKernel {
    radius: i32,
    // (dx, dy) of every tap inside the circular support
    offsets: Vec<(i32, i32)>,
    space_weights: Vec<f32>,
    // indexed by the L1 color distance summed over 3 channels (0..=765)
    color_weights: Vec<f32>,
}

impl BilateralKernel {
    pub fn new(diameter: u32, sigma_color: f64, sigma_space: f64) -> Self {
        let radius = ((diameter / 2) as i32).max(1);
        let color_coeff = -0.5 / (sigma_color * sigma_color);
        let space_coeff = -0.5 / (sigma_space * sigma_space);

        let color_weights = (0..256 * 3)
            .map(|i| ((i * i) as f64 * color_coeff).exp() as f32)
            .collect();

        let mut offsets = Vec::new();
        let mut space_weights = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let rr = ((dx * dx + dy * dy) as f64).sqrt();
                if rr > radius as f64 {
                    continue;
                }
                offsets.push((dx, dy));
                space_weights.push((rr * rr * space_coeff).exp() as f32);
            }
        }

        Self { radius, offsets, space_weights, color_weights }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn taps(&self) -> usize {
        self.offsets.len()
    }
}

// Mirror without repeating the edge pixel: -1 -> 1, n -> n-2.
#[inline]
fn reflect101(mut i: i32, n: i32) -> i32 {
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i;
        }
    }
}

/// Edge-preserving smoothing of a 3-channel image.
/// Each output pixel is the average of its neighbours weighted by distance and by
/// color similarity; borders mirror (reflect-101).
pub fn bilateral_filter(
    src: &RgbImage,
    dst: &mut RgbImage,
    kernel: &BilateralKernel,
) -> Result<(), CartoonError> {
    check_dims("bilateral_filter", src.dimensions(), dst.dimensions())?;

    let w = src.width() as i32;
    let h = src.height() as i32;
    let r = kernel.radius;
    let s: &[u8] = src;
    let d: &mut [u8] = dst;

    for y in 0..h {
        let inner_y = y >= r && y < h - r;
        for x in 0..w {
            let inner = inner_y && x >= r && x < w - r;
            let c0 = ((y * w + x) * 3) as usize;
            let (r0, g0, b0) = (s[c0] as i32, s[c0 + 1] as i32, s[c0 + 2] as i32);

            let (mut sum_r, mut sum_g, mut sum_b, mut wsum) = (0f32, 0f32, 0f32, 0f32);
            for (&(dx, dy), &sw) in kernel.offsets.iter().zip(&kernel.space_weights) {
                let (nx, ny) = if inner {
                    (x + dx, y + dy)
                } else {
                    (reflect101(x + dx, w), reflect101(y + dy, h))
                };
                let ci = ((ny * w + nx) * 3) as usize;
                let (rn, gn, bn) = (s[ci] as i32, s[ci + 1] as i32, s[ci + 2] as i32);
                let dist = ((rn - r0).abs() + (gn - g0).abs() + (bn - b0).abs()) as usize;
                let wt = sw * kernel.color_weights[dist];
                sum_r += rn as f32 * wt;
                sum_g += gn as f32 * wt;
                sum_b += bn as f32 * wt;
                wsum += wt;
            }

            // The center tap always has weight 1, so wsum > 0
            let inv = 1.0 / wsum;
            d[c0] = (sum_r * inv).round().clamp(0.0, 255.0) as u8;
            d[c0 + 1] = (sum_g * inv).round().clamp(0.0, 255.0) as u8;
            d[c0 + 2] = (sum_b * inv).round().clamp(0.0, 255.0) as u8;
        }
    }
    Ok(())
}

/// Stamp the edge mask onto the smoothed colors: per-channel AND of
/// `(m, m, m, 255)` with `(r, g, b, 255)`. Mask 0 gives pure black, 255 keeps the color.
pub fn compose_edges(
    smoothed: &RgbImage,
    edges: &GrayImage,
    dst: &mut RgbaImage,
) -> Result<(), CartoonError> {
    check_dims("compose_edges(edges)", smoothed.dimensions(), edges.dimensions())?;
    check_dims("compose_edges(dst)", smoothed.dimensions(), dst.dimensions())?;

    let out: &mut [u8] = dst;
    for ((c, &m), o) in smoothed
        .as_raw()
        .chunks_exact(3)
        .zip(edges.as_raw())
        .zip(out.chunks_exact_mut(4))
    {
        o[0] = c[0] & m;
        o[1] = c[1] & m;
        o[2] = c[2] & m;
        o[3] = 0xFF;
    }
    Ok(())
}
