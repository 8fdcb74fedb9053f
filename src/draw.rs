// The preview window: packs each output frame for minifb, stamps the HUD line
// on top and presents it. Keys: T/Space flip the style, ESC or closing quits.

use crate::error::AppError;
use crate::types::FrameBuffer;
use image::RgbaImage;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

const HUD_ORIGIN: (i32, i32) = (8, 8);
const HUD_COLOR: u32 = 0x00_FF_FF_FF;

pub struct Viewer {
    window: Window,
    screen: FrameBuffer,
}

impl Viewer {
    /// Open a window matching the negotiated camera resolution.
    pub fn open(title: &str, width: u32, height: u32) -> Result<Self, AppError> {
        let (width, height) = (width as usize, height as usize);
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| AppError::WindowInit(e.to_string()))?;
        Ok(Self { window, screen: FrameBuffer::new(width, height) })
    }

    /// Show one output frame with `hud` drawn in the top-left corner.
    pub fn show(&mut self, frame: &RgbaImage, hud: &str) -> Result<(), AppError> {
        self.screen.copy_from_rgba(frame);
        draw_text_5x7(&mut self.screen, HUD_ORIGIN.0, HUD_ORIGIN.1, hud, HUD_COLOR);
        self.window
            .update_with_buffer(&self.screen.pixels, self.screen.width, self.screen.height)
            .map_err(|e| AppError::WindowUpdate(e.to_string()))
    }

    /// False once the window is closed or ESC is held.
    pub fn keep_running(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// T or Space, once per press.
    pub fn toggle_requested(&self) -> bool {
        [Key::T, Key::Space]
            .into_iter()
            .any(|key| self.window.is_key_pressed(key, KeyRepeat::No))
    }
}

/* ---------- HUD text: 5x7 bitmap font ---------- */

const GLYPH_W: i32 = 5;
const GLYPH_ADVANCE: i32 = GLYPH_W + 1;
const SHADOW: u32 = 0x00_00_00_00;

/// Rows top to bottom; bit 4 is the leftmost column. Covers the characters the HUD
/// prints ("CARTOON | T: LIVE | FPS: 29.5").
const HUD_FONT: [(char, [u8; 7]); 28] = [
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('C', [0x0F, 0x10, 0x10, 0x10, 0x10, 0x10, 0x0F]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('G', [0x0F, 0x10, 0x10, 0x17, 0x11, 0x11, 0x0F]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('N', [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    ('|', [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    (':', [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00]),
];

fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    HUD_FONT.iter().find(|(c, _)| *c == ch).map(|(_, rows)| rows)
}

/// Write one pixel, silently clipping anything off-screen.
#[inline]
fn plot(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 || x as usize >= fb.width || y as usize >= fb.height {
        return;
    }
    fb.pixels[y as usize * fb.width + x as usize] = color;
}

fn stamp_glyph(fb: &mut FrameBuffer, x: i32, y: i32, rows: &[u8; 7], color: u32) {
    for (row, bits) in (0..).zip(rows) {
        for col in (0..GLYPH_W).filter(|col| bits & (0x10u8 >> col) != 0) {
            plot(fb, x + col, y + row, color);
        }
    }
}

/// Draw `text` with its top-left at (x,y): a black drop shadow one pixel down-right,
/// then the glyphs in `color`. Characters outside the font leave a blank cell.
pub fn draw_text_5x7(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: u32) {
    for (i, ch) in (0..).zip(text.chars()) {
        if let Some(rows) = glyph(ch) {
            let gx = x + i * GLYPH_ADVANCE;
            stamp_glyph(fb, gx + 1, y + 1, rows, SHADOW);
            stamp_glyph(fb, gx, y, rows, color);
        }
    }
}
