// The cartoon core: one live camera frame in, one stylized frame out.
// Visual expectation: flat color patches with black outlines wherever the scene
// has strong local contrast. With the style off, the camera frame shows as-is.

use std::ops::{Deref, DerefMut};

use image::{GrayImage, RgbImage, RgbaImage};
use tracing::{debug, info, trace, warn};

use crate::config::{CartoonParams, SessionConfig};
use crate::error::{check_dims, CartoonError};
use crate::resize::Resampler;
use crate::toggle::StyleToggle;
use crate::types::Size;
use crate::vision::{self, BilateralKernel};

/// Buffers the stages read and write at working resolution.
struct StageBuffers {
    gray: GrayImage,
    edges: GrayImage,
    rgb: RgbImage,
    smoothed: RgbImage,
    // scratch: median output (swapped with `gray`) and box-filter row sums
    median: GrayImage,
    row_sums: Vec<u32>,
    bilateral: BilateralKernel,
}

/// Only present when the working resolution is below camera resolution.
struct ResampleBuffers {
    resampler: Resampler,
    scaled_input: RgbaImage,
    composed: RgbaImage,
}

/// Everything allocated at session start and reused for every frame of the session.
struct WorkingSet {
    camera: Size,
    working: Size,
    scale: f64,
    stages: StageBuffers,
    resample: Option<ResampleBuffers>,
    output: RgbaImage,
}

impl WorkingSet {
    fn allocate(config: &SessionConfig, params: &CartoonParams) -> Result<Self, CartoonError> {
        let working = config.working_size()?;
        let camera = config.camera_size();
        let (ww, wh) = working.as_tuple();

        let stages = StageBuffers {
            gray: GrayImage::new(ww, wh),
            edges: GrayImage::new(ww, wh),
            rgb: RgbImage::new(ww, wh),
            smoothed: RgbImage::new(ww, wh),
            median: GrayImage::new(ww, wh),
            row_sums: vec![0u32; working.pixels()],
            bilateral: BilateralKernel::new(
                params.bilateral_d,
                params.sigma_color,
                params.sigma_space,
            ),
        };
        let resample = config.downscales().then(|| ResampleBuffers {
            resampler: Resampler::bilinear(),
            scaled_input: RgbaImage::new(ww, wh),
            composed: RgbaImage::new(ww, wh),
        });
        let output = RgbaImage::new(camera.width, camera.height);

        let working_bytes = working.pixels() * (1 + 1 + 3 + 3 + 1 + 4)
            + if resample.is_some() { working.pixels() * 8 } else { 0 };
        debug!(
            working_bytes,
            output_bytes = camera.pixels() * 4,
            bilateral_taps = stages.bilateral.taps(),
            "allocated working set"
        );

        Ok(Self {
            camera,
            working,
            scale: config.processing_scale,
            stages,
            resample,
            output,
        })
    }

    fn run(&mut self, input: &RgbaImage, params: &CartoonParams) -> Result<(), CartoonError> {
        match self.resample.as_mut() {
            Some(ResampleBuffers { resampler, scaled_input, composed }) => {
                // 1) Downscale
                resampler.resize_rgba(input, scaled_input)?;
                // 2-5) at working resolution
                self.stages.stylize(scaled_input, params, composed)?;
                // 6) Upscale into the output
                resampler.resize_rgba(composed, &mut self.output)?;
            }
            // Full resolution: no resampling, compose straight into the output.
            None => self.stages.stylize(input, params, &mut self.output)?,
        }
        Ok(())
    }
}

impl StageBuffers {
    fn stylize(
        &mut self,
        src: &RgbaImage,
        params: &CartoonParams,
        dst: &mut RgbaImage,
    ) -> Result<(), CartoonError> {
        // 2) Color + gray
        vision::split_rgba(src, &mut self.rgb, &mut self.gray)?;

        // 3) Edges: denoise, then binarize against the local mean
        vision::median_blur(&self.gray, &mut self.median, params.median_ksize)?;
        std::mem::swap(&mut self.gray, &mut self.median);
        vision::adaptive_threshold_mean(
            &self.gray,
            &mut self.edges,
            &mut self.row_sums,
            params.block_size,
            params.threshold_c,
        )?;

        // 4) Flatten colors
        vision::bilateral_filter(&self.rgb, &mut self.smoothed, &self.bilateral)?;

        // 5) Black outlines over flat colors
        vision::compose_edges(&self.smoothed, &self.edges, dst)
    }
}

/// Turns camera frames into cartoon frames using buffers allocated once per session.
///
/// Lifecycle: [`initialize`](Self::initialize) when the camera session starts,
/// [`process`](Self::process) once per frame, [`teardown`](Self::teardown) when it stops.
/// [`session`](Self::session) pairs the first and last automatically.
pub struct Cartoonifier {
    params: CartoonParams,
    working: Option<WorkingSet>,
}

impl Default for Cartoonifier {
    fn default() -> Self {
        Self::new(CartoonParams::default())
    }
}

impl Cartoonifier {
    pub fn new(params: CartoonParams) -> Self {
        Self { params, working: None }
    }

    pub fn params(&self) -> &CartoonParams {
        &self.params
    }

    /// Allocate the working set for a `width` x `height` camera processed at `scale`.
    pub fn initialize(&mut self, width: u32, height: u32, scale: f64) -> Result<(), CartoonError> {
        self.initialize_with(&SessionConfig::new(width, height, scale))
    }

    pub fn initialize_with(&mut self, config: &SessionConfig) -> Result<(), CartoonError> {
        if self.working.is_some() {
            return Err(CartoonError::AlreadyInitialized);
        }
        self.params.validate()?;
        let ws = WorkingSet::allocate(config, &self.params)?;
        info!(
            camera = ?ws.camera.as_tuple(),
            working = ?ws.working.as_tuple(),
            scale = ws.scale,
            "cartoon session started"
        );
        self.working = Some(ws);
        Ok(())
    }

    /// Release the working set. Errors (and changes nothing) if none is held.
    pub fn teardown(&mut self) -> Result<(), CartoonError> {
        match self.working.take() {
            Some(ws) => {
                info!(camera = ?ws.camera.as_tuple(), "cartoon session stopped");
                Ok(())
            }
            None => Err(CartoonError::NotInitialized),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.working.is_some()
    }

    pub fn camera_size(&self) -> Option<Size> {
        self.working.as_ref().map(|ws| ws.camera)
    }

    pub fn working_size(&self) -> Option<Size> {
        self.working.as_ref().map(|ws| ws.working)
    }

    /// Binary edge mask of the last stylized frame (working resolution, values 0 or 255).
    pub fn edge_mask(&self) -> Option<&GrayImage> {
        self.working.as_ref().map(|ws| &ws.stages.edges)
    }

    /// Process one frame.
    ///
    /// With `style_enabled == false` the input itself is returned. Otherwise the result is
    /// the cartoonifier's own output buffer, valid until the next call.
    ///
    /// # Panics
    ///
    /// If the cartoonifier is not initialized or `input` is not camera-sized. Both are
    /// caller bugs; use [`try_process`](Self::try_process) to get them as errors instead.
    pub fn process<'a>(&'a mut self, input: &'a RgbaImage, style_enabled: bool) -> &'a RgbaImage {
        match self.try_process(input, style_enabled) {
            Ok(out) => out,
            Err(e) => panic!("cartoonifier misuse: {e}"),
        }
    }

    /// Like [`process`](Self::process), reading the mode from `toggle` exactly once.
    pub fn process_toggled<'a>(&'a mut self, input: &'a RgbaImage, toggle: &StyleToggle) -> &'a RgbaImage {
        let style_enabled = toggle.is_enabled();
        self.process(input, style_enabled)
    }

    pub fn try_process<'a>(
        &'a mut self,
        input: &'a RgbaImage,
        style_enabled: bool,
    ) -> Result<&'a RgbaImage, CartoonError> {
        let params = self.params;
        let ws = self.working.as_mut().ok_or(CartoonError::NotInitialized)?;
        check_dims("process", ws.camera.as_tuple(), input.dimensions())?;

        if !style_enabled {
            return Ok(input);
        }
        trace!(camera = ?ws.camera.as_tuple(), working = ?ws.working.as_tuple(), "stylizing frame");
        ws.run(input, &params)?;
        Ok(&ws.output)
    }

    /// Start a session whose working set is released when the guard drops,
    /// including early returns and unwinding out of the frame loop.
    pub fn session(&mut self, config: &SessionConfig) -> Result<CartoonSession<'_>, CartoonError> {
        self.initialize_with(config)?;
        Ok(CartoonSession { cartoonifier: self })
    }
}

/// Scoped camera session; see [`Cartoonifier::session`].
pub struct CartoonSession<'c> {
    cartoonifier: &'c mut Cartoonifier,
}

impl Deref for CartoonSession<'_> {
    type Target = Cartoonifier;

    fn deref(&self) -> &Cartoonifier {
        self.cartoonifier
    }
}

impl DerefMut for CartoonSession<'_> {
    fn deref_mut(&mut self) -> &mut Cartoonifier {
        self.cartoonifier
    }
}

impl Drop for CartoonSession<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cartoonifier.teardown() {
            warn!("session end: {e}");
        }
    }
}
