// Session configuration and filter tunables.

use crate::error::CartoonError;
use crate::types::Size;
use crate::vision::{MAX_BLOCK_SIZE, MAX_MEDIAN_KSIZE};

/// Default processing scale: expensive stages run at 75% resolution.
pub const DEFAULT_PROCESSING_SCALE: f64 = 0.75;

/// What the frame source negotiates at session start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub camera_width: u32,
    pub camera_height: u32,
    pub processing_scale: f64,
}

impl SessionConfig {
    pub fn new(camera_width: u32, camera_height: u32, processing_scale: f64) -> Self {
        Self { camera_width, camera_height, processing_scale }
    }

    pub fn camera_size(&self) -> Size {
        Size::new(self.camera_width, self.camera_height)
    }

    /// Check the session preconditions and derive the working resolution.
    pub fn working_size(&self) -> Result<Size, CartoonError> {
        let (width, height) = (self.camera_width, self.camera_height);
        if width == 0 || height == 0 {
            return Err(CartoonError::InvalidDimensions { width, height });
        }
        let scale = self.processing_scale;
        if !(scale > 0.0 && scale <= 1.0) {
            return Err(CartoonError::InvalidScale(scale));
        }
        let working = self.camera_size().scaled(scale);
        if working.width == 0 || working.height == 0 {
            return Err(CartoonError::EmptyWorkingSize { width, height, scale });
        }
        Ok(working)
    }

    /// True when the expensive stages run below camera resolution.
    pub fn downscales(&self) -> bool {
        self.processing_scale < 1.0
    }
}

/// Filter constants. The defaults trade a little quality for frame rate
/// (median 5 instead of 7, block 7 instead of 9, bilateral 7/50/50 instead of 9/75/75).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartoonParams {
    /// Median blur kernel size (odd, 3..=15).
    pub median_ksize: u32,
    /// Adaptive threshold neighbourhood (odd, 3..=255).
    pub block_size: u32,
    /// Subtracted from the local mean before comparing.
    pub threshold_c: f64,
    /// Bilateral neighbourhood diameter.
    pub bilateral_d: u32,
    pub sigma_color: f64,
    pub sigma_space: f64,
}

impl Default for CartoonParams {
    fn default() -> Self {
        Self {
            median_ksize: 5,
            block_size: 7,
            threshold_c: 2.0,
            bilateral_d: 7,
            sigma_color: 50.0,
            sigma_space: 50.0,
        }
    }
}

impl CartoonParams {
    pub fn validate(&self) -> Result<(), CartoonError> {
        if !(3..=MAX_MEDIAN_KSIZE).contains(&self.median_ksize) || self.median_ksize % 2 == 0 {
            return Err(CartoonError::InvalidParams(format!(
                "median_ksize must be odd and in 3..={MAX_MEDIAN_KSIZE}, got {}",
                self.median_ksize
            )));
        }
        if !(3..=MAX_BLOCK_SIZE).contains(&self.block_size) || self.block_size % 2 == 0 {
            return Err(CartoonError::InvalidParams(format!(
                "block_size must be odd and in 3..={MAX_BLOCK_SIZE}, got {}",
                self.block_size
            )));
        }
        if !self.threshold_c.is_finite() {
            return Err(CartoonError::InvalidParams("threshold_c must be finite".into()));
        }
        if self.bilateral_d == 0 {
            return Err(CartoonError::InvalidParams("bilateral_d must be >= 1".into()));
        }
        if !(self.sigma_color > 0.0 && self.sigma_space > 0.0) {
            return Err(CartoonError::InvalidParams(format!(
                "sigmas must be > 0, got color {} space {}",
                self.sigma_color, self.sigma_space
            )));
        }
        Ok(())
    }
}
