// What you SEE:
// • Live camera in a window.
// • T (or Space) toggles the cartoon look: flat colors + black outlines.
// • ESC quits.

use anyhow::{Context, Result};
use cartoon_cam::camera::CameraCapture;
use cartoon_cam::config::DEFAULT_PROCESSING_SCALE;
use cartoon_cam::draw::Viewer;
use cartoon_cam::{CartoonParams, Cartoonifier, SessionConfig, StyleToggle};
use clap::Parser;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Live camera cartoonifier
#[derive(Parser, Debug)]
#[command(name = "cartoon-cam")]
#[command(about = "Show the webcam as a cartoon: flat colors with black outlines")]
struct Args {
    /// Camera device index (0 = default webcam)
    #[arg(long, default_value_t = 0)]
    camera_index: u32,

    /// Requested capture width; the camera may pick the closest it supports
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Fraction of camera resolution the filters run at, in (0, 1]
    #[arg(short, long, default_value_t = DEFAULT_PROCESSING_SCALE)]
    scale: f64,

    /// Start with the cartoon look on
    #[arg(long)]
    cartoon: bool,

    /// Median blur kernel size (odd)
    #[arg(long, default_value_t = 5)]
    median_ksize: u32,

    /// Adaptive threshold block size (odd)
    #[arg(long, default_value_t = 7)]
    block_size: u32,

    /// Adaptive threshold offset subtracted from the local mean
    #[arg(long, default_value_t = 2.0)]
    threshold_c: f64,

    /// Bilateral filter diameter
    #[arg(long, default_value_t = 7)]
    bilateral_d: u32,

    #[arg(long, default_value_t = 50.0)]
    sigma_color: f64,

    #[arg(long, default_value_t = 50.0)]
    sigma_space: f64,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn params(&self) -> CartoonParams {
        CartoonParams {
            median_ksize: self.median_ksize,
            block_size: self.block_size,
            threshold_c: self.threshold_c,
            bilateral_d: self.bilateral_d,
            sigma_color: self.sigma_color,
            sigma_space: self.sigma_space,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let params = args.params();
    params.validate().context("invalid filter parameters")?;

    /* --- Camera + window setup ---
       Visual: window opens with live camera feed. */
    let mut cam = CameraCapture::new(args.camera_index, args.width, args.height)
        .context("opening camera")?;
    let (w, h) = cam.resolution();
    let mut viewer = Viewer::open("Cartoonify Me — T: toggle", w, h)?;

    // Shared with the key handler; the pipeline samples it once per frame.
    let toggle = StyleToggle::new(args.cartoon);

    /* --- Cartoon session ---
       Buffers live exactly as long as this guard, whichever way the loop exits. */
    let mut cartoonifier = Cartoonifier::new(params);
    let mut session = cartoonifier
        .session(&SessionConfig::new(w, h, args.scale))
        .context("starting cartoon session")?;

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while viewer.keep_running() {
        let now = Instant::now();

        if viewer.toggle_requested() {
            let on = toggle.toggle();
            info!(cartoon = on, "style toggled");
        }

        /* 1) Grab a fresh live frame. */
        let live = cam.next_frame()?;

        /* 2) Stylize (or pass through). */
        let cartoon_on = toggle.is_enabled();
        let shown = session.process(live, cartoon_on);

        /* 3) Pack, stamp the HUD and present. */
        let hud = if cartoon_on {
            format!("CARTOON | T: LIVE | {hud_fps_text}")
        } else {
            format!("LIVE | T: CARTOON | {hud_fps_text}")
        };
        viewer.show(shown, &hud)?;

        /* 4) FPS counter (logged + HUD once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            debug!(fps, cartoon = cartoon_on, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    drop(session);
    info!("bye");
    Ok(())
}
