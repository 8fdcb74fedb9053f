// Opens the default camera and converts frames into the RGBA layout the cartoon core eats.
// Visual expectation: when main.rs calls `next_frame()`, you get an RgbaImage at the
// negotiated camera resolution, fully opaque, ready to stylize or show as-is.

use crate::error::AppError;

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use image::RgbaImage;
use tracing::info;

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
    // Reused for every frame; the core borrows it for the duration of one call.
    frame: RgbaImage,
}

impl CameraCapture {
    /// Try to open camera `index` at a target resolution (falls back if not exact).
    /// On success, nothing is shown on screen yet — we just hold an open stream.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, AppError> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames, prioritizing the format closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req)
            .map_err(|e| AppError::CameraInit(format!("Create camera: {e}")))?;

        cam.open_stream()
            .map_err(|e| AppError::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        info!(
            requested = ?(width, height),
            negotiated = ?(actual.width(), actual.height()),
            "camera stream open"
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
            frame: RgbaImage::new(actual.width(), actual.height()),
        })
    }

    /// Grab one frame (blocks until the camera has one) and expand it to opaque RGBA.
    pub fn next_frame(&mut self) -> Result<&RgbaImage, AppError> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| AppError::CameraFrame(format!("Fetch frame: {e}")))?;

        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| AppError::CameraFrame(format!("Decode RGB: {e}")))?;

        if rgb_img.dimensions() != (self.width, self.height) {
            return Err(AppError::CameraFrame(format!(
                "frame is {:?}, stream negotiated {:?}",
                rgb_img.dimensions(),
                (self.width, self.height)
            )));
        }

        let dst: &mut [u8] = &mut self.frame;
        for (px, out) in rgb_img.as_raw().chunks_exact(3).zip(dst.chunks_exact_mut(4)) {
            out[..3].copy_from_slice(px);
            out[3] = 0xFF;
        }
        Ok(&self.frame)
    }

    /// Report the actual resolution the camera is delivering.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
