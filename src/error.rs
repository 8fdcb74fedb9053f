// Error types for the cartoon core and the camera/window glue.
// Every variant states *where* things went wrong.

use fast_image_resize as fir;

/// Failures of the cartoon core: session setup, lifecycle misuse and buffer contracts.
#[derive(Debug, thiserror::Error)]
pub enum CartoonError {
    #[error("invalid camera dimensions {width}x{height}: both must be > 0")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid processing scale {0}: must be in (0, 1]")]
    InvalidScale(f64),

    #[error("processing scale {scale} turns {width}x{height} into an empty working buffer")]
    EmptyWorkingSize { width: u32, height: u32, scale: f64 },

    #[error("invalid filter parameters: {0}")]
    InvalidParams(String),

    #[error("cartoonifier already initialized; call teardown() first")]
    AlreadyInitialized,

    #[error("cartoonifier not initialized; call initialize() first")]
    NotInitialized,

    #[error("{stage}: dimension mismatch, expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        stage: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("resample error: {0}")]
    Resize(#[from] fir::ResizeError),

    #[error("resample buffer error: {0}")]
    ResizeBuffer(#[from] fir::ImageBufferError),
}

/// Failures of the desktop app around the core.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("window init error: {0}")]
    WindowInit(String),

    #[error("window update error: {0}")]
    WindowUpdate(String),

    #[error("camera init error: {0}")]
    CameraInit(String),

    #[error("camera frame error: {0}")]
    CameraFrame(String),

    #[error(transparent)]
    Cartoon(#[from] CartoonError),
}

pub(crate) fn check_dims(
    stage: &'static str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), CartoonError> {
    if expected != actual {
        return Err(CartoonError::DimensionMismatch { stage, expected, actual });
    }
    Ok(())
}
