//! End-to-end behaviour of the cartoon pipeline on synthetic frames.

mod common;

use cartoon_cam::resize::Resampler;
use cartoon_cam::vision::{self, BilateralKernel};
use cartoon_cam::{CartoonParams, Cartoonifier, SessionConfig, StyleToggle};
use common::{close_to, noise_frame, patch_frame, scene_frame, BACKGROUND, PATCH};
use image::{GrayImage, RgbImage, RgbaImage};

fn cartoonifier(width: u32, height: u32, scale: f64) -> Cartoonifier {
    let mut c = Cartoonifier::default();
    c.initialize(width, height, scale).unwrap();
    c
}

#[test]
fn style_off_returns_the_input_itself() {
    let frame = noise_frame(48, 32, 7);
    let copy = frame.clone();
    let mut c = cartoonifier(48, 32, 0.75);

    let out = c.process(&frame, false);
    assert!(std::ptr::eq(out, &frame));
    assert_eq!(out, &copy);
}

#[test]
fn toggled_process_samples_the_flag() {
    let frame = scene_frame(40, 30);
    let toggle = StyleToggle::new(false);
    let mut c = cartoonifier(40, 30, 1.0);

    assert!(std::ptr::eq(c.process_toggled(&frame, &toggle), &frame));
    toggle.toggle();
    let out = c.process_toggled(&frame, &toggle);
    assert!(!std::ptr::eq(out, &frame));
    assert_ne!(out, &frame);
}

#[test]
fn output_keeps_camera_size_at_every_scale() {
    let frame = scene_frame(64, 48);
    for scale in [1.0, 0.9, 0.75, 0.5, 0.33, 0.1] {
        let mut c = cartoonifier(64, 48, scale);
        let out = c.process(&frame, true);
        assert_eq!(out.dimensions(), (64, 48), "scale {scale}");
        assert!(out.pixels().all(|p| p.0[3] == 255), "alpha not opaque at scale {scale}");
    }
}

#[test]
fn edge_mask_is_binary() {
    for (frame, scale) in [(noise_frame(50, 40, 3), 1.0), (scene_frame(80, 60), 0.75)] {
        let (w, h) = frame.dimensions();
        let mut c = cartoonifier(w, h, scale);
        c.process(&frame, true);
        let mask = c.edge_mask().unwrap();
        assert!(mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        // a noisy frame must produce some of each
        assert!(mask.pixels().any(|p| p.0[0] == 0));
        assert!(mask.pixels().any(|p| p.0[0] == 255));
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let frame = scene_frame(72, 54);
    let other = noise_frame(72, 54, 99);

    let mut a = cartoonifier(72, 54, 0.75);
    let first = a.process(&frame, true).clone();
    // a different frame in between must not leak into the next result
    a.process(&other, true);
    let again = a.process(&frame, true).clone();

    let mut b = cartoonifier(72, 54, 0.75);
    let fresh = b.process(&frame, true).clone();

    assert_eq!(first, again);
    assert_eq!(first, fresh);
}

#[test]
fn reinitialized_session_matches_first_session() {
    let frame = scene_frame(40, 40);
    let mut c = cartoonifier(40, 40, 0.5);
    let before = c.process(&frame, true).clone();
    c.teardown().unwrap();
    c.initialize(40, 40, 0.5).unwrap();
    assert_eq!(c.process(&frame, true), &before);
}

/// The stages run by hand at full resolution, with no resampling anywhere.
fn stages_by_hand(frame: &RgbaImage, params: &CartoonParams) -> RgbaImage {
    let (w, h) = frame.dimensions();
    let mut rgb = RgbImage::new(w, h);
    let mut gray = GrayImage::new(w, h);
    let mut blurred = GrayImage::new(w, h);
    let mut edges = GrayImage::new(w, h);
    let mut smoothed = RgbImage::new(w, h);
    let mut sums = vec![0u32; (w * h) as usize];
    let mut out = RgbaImage::new(w, h);

    vision::split_rgba(frame, &mut rgb, &mut gray).unwrap();
    vision::median_blur(&gray, &mut blurred, params.median_ksize).unwrap();
    vision::adaptive_threshold_mean(&blurred, &mut edges, &mut sums, params.block_size, params.threshold_c)
        .unwrap();
    let kernel = BilateralKernel::new(params.bilateral_d, params.sigma_color, params.sigma_space);
    vision::bilateral_filter(&rgb, &mut smoothed, &kernel).unwrap();
    vision::compose_edges(&smoothed, &edges, &mut out).unwrap();
    out
}

#[test]
fn full_scale_skips_resampling() {
    let frame = scene_frame(60, 45);
    let mut c = cartoonifier(60, 45, 1.0);
    let out = c.process(&frame, true).clone();

    assert_eq!(c.working_size().unwrap().as_tuple(), (60, 45));
    assert_eq!(out, stages_by_hand(&frame, &CartoonParams::default()));

    // a near-1.0 scale goes through down/up resampling and cannot match exactly
    let mut near = cartoonifier(60, 45, 0.99);
    assert_eq!(near.working_size().unwrap().as_tuple(), (59, 44));
    assert_ne!(near.process(&frame, true), &out);
}

#[test]
fn downscaled_run_is_resampled_full_scale_pipeline_of_the_small_frame() {
    let frame = scene_frame(64, 48);
    let mut c = cartoonifier(64, 48, 0.5);
    let out = c.process(&frame, true).clone();

    let mut rs = Resampler::bilinear();
    let mut small = RgbaImage::new(32, 24);
    rs.resize_rgba(&frame, &mut small).unwrap();
    let composed = stages_by_hand(&small, &CartoonParams::default());
    let mut expected = RgbaImage::new(64, 48);
    rs.resize_rgba(&composed, &mut expected).unwrap();

    assert_eq!(out, expected);
}

#[test]
fn hard_edge_turns_into_black_outline_over_flat_colors() {
    let frame = patch_frame(64, 48);
    let mut c = cartoonifier(64, 48, 1.0);
    let out = c.process(&frame, true);

    // Patch spans x 16..48, y 12..36. The darker background side of the boundary
    // goes black; both flat areas keep their color.
    for y in [18, 24, 30] {
        assert!(close_to(out.get_pixel(15, y), [0, 0, 0, 255], 0), "left outline y={y}");
        assert!(close_to(out.get_pixel(48, y), [0, 0, 0, 255], 0), "right outline y={y}");
        assert!(close_to(out.get_pixel(4, y), BACKGROUND, 2), "background y={y}");
        assert!(close_to(out.get_pixel(32, y), PATCH, 2), "patch y={y}");
    }
    for x in [24, 32, 40] {
        assert!(close_to(out.get_pixel(x, 11), [0, 0, 0, 255], 0), "top outline x={x}");
        assert!(close_to(out.get_pixel(x, 36), [0, 0, 0, 255], 0), "bottom outline x={x}");
    }
    assert!(close_to(out.get_pixel(2, 2), BACKGROUND, 2));
    assert!(close_to(out.get_pixel(61, 45), BACKGROUND, 2));
}

#[test]
fn hard_edge_survives_downscaling() {
    let frame = patch_frame(128, 96);
    let mut c = cartoonifier(128, 96, 0.5);
    let out = c.process(&frame, true);

    // Patch starts at x=32; the outline lands just left of it.
    let darkest = (20..32)
        .map(|x| {
            let p = out.get_pixel(x, 48).0;
            p[0] as u32 + p[1] as u32 + p[2] as u32
        })
        .min()
        .unwrap();
    assert!(darkest < 60, "no dark outline near the patch edge: {darkest}");
    assert!(close_to(out.get_pixel(4, 48), BACKGROUND, 3));
    assert!(close_to(out.get_pixel(64, 48), PATCH, 3));
}

#[test]
fn tuned_params_change_the_result() {
    let frame = scene_frame(48, 36);
    let mut default = cartoonifier(48, 36, 1.0);
    let base = default.process(&frame, true).clone();

    let params = CartoonParams { block_size: 9, bilateral_d: 5, ..Default::default() };
    let mut tuned = Cartoonifier::new(params);
    tuned.initialize_with(&SessionConfig::new(48, 36, 1.0)).unwrap();
    let out = tuned.process(&frame, true);

    assert_eq!(out, &stages_by_hand(&frame, &params));
    assert_ne!(out, &base);
}
