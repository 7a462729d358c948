/// Software canvas: rasterizes a face frame onto a tiny-skia pixmap.
use anyhow::Result;
use std::path::Path;
use tiny_skia::{Color, Pixmap};
use tracing::debug;

use crate::error::FaceError;
use crate::face::placement::DisplayShape;
use crate::render::font::FaceFont;
use crate::render::{DrawCommand, Frame, TextStyle};

const WHITE: (u8, u8, u8) = (255, 255, 255);
const BLACK: (u8, u8, u8) = (0, 0, 0);

/// Glow radius (px) around ambient-mode text.
const GLOW_RADIUS: i32 = 2;

pub struct Canvas {
    pixmap: Pixmap,
    shape: DisplayShape,
}

impl Canvas {
    pub fn new(width: u32, height: u32, shape: DisplayShape) -> Result<Self, FaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(FaceError::Surface { width, height })?;
        Ok(Self { pixmap, shape })
    }

    pub fn render(&mut self, frame: &Frame, font: &FaceFont) -> &[u8] {
        for command in &frame.commands {
            match command {
                DrawCommand::Clear { r, g, b } => {
                    self.pixmap.fill(Color::from_rgba8(*r, *g, *b, 255));
                }
                DrawCommand::Text { text, x, y, style } => {
                    self.draw_text(font, text, *x, *y, *style);
                }
            }
        }

        if self.shape == DisplayShape::Round {
            self.mask_round();
        }

        self.pixmap.data()
    }

    fn draw_text(&mut self, font: &FaceFont, text: &str, x: i32, y: i32, style: TextStyle) {
        match style {
            TextStyle::Filled => self.blend_text(font, text, x, y, WHITE),
            TextStyle::Outlined => {
                for dy in -GLOW_RADIUS..=GLOW_RADIUS {
                    for dx in -GLOW_RADIUS..=GLOW_RADIUS {
                        if (dx, dy) != (0, 0) && dx * dx + dy * dy <= GLOW_RADIUS * GLOW_RADIUS {
                            self.blend_text(font, text, x + dx, y + dy, WHITE);
                        }
                    }
                }
                self.blend_text(font, text, x, y, BLACK);
            }
        }
        debug!("Drew '{}' at ({}, {}) {:?}", text, x, y, style);
    }

    fn blend_text(&mut self, font: &FaceFont, text: &str, x: i32, y: i32, rgb: (u8, u8, u8)) {
        // Get dimensions before mutable borrow
        let tw = self.pixmap.width() as i32;
        let th = self.pixmap.height() as i32;
        let data = self.pixmap.data_mut();

        for glyph in font.layout(text, x as f32, y as f32) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, v| {
                    let px = bb.min.x + gx as i32;
                    let py = bb.min.y + gy as i32;
                    if px >= 0 && px < tw && py >= 0 && py < th {
                        let idx = ((py * tw + px) * 4) as usize;
                        blend_pixel(&mut data[idx..idx + 4], rgb, v);
                    }
                });
            }
        }
    }

    /// Blank everything outside the inscribed circle.
    fn mask_round(&mut self) {
        let w = self.pixmap.width() as i64;
        let h = self.pixmap.height() as i64;
        let data = self.pixmap.data_mut();

        // doubled coordinates keep the center exact for even sizes
        let radius = w.min(h);
        for py in 0..h {
            for px in 0..w {
                let dx = 2 * px + 1 - w;
                let dy = 2 * py + 1 - h;
                if dx * dx + dy * dy > radius * radius {
                    let idx = ((py * w + px) * 4) as usize;
                    data[idx..idx + 4].copy_from_slice(&[0, 0, 0, 255]);
                }
            }
        }
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.pixmap
            .save_png(path)
            .map_err(|e| anyhow::anyhow!("Failed to save PNG: {}", e))
    }
}

/// Coverage-weighted blend of an opaque color onto an opaque RGBA pixel.
fn blend_pixel(pixel: &mut [u8], (r, g, b): (u8, u8, u8), coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
    pixel[0] = mix(r, pixel[0]);
    pixel[1] = mix(g, pixel[1]);
    pixel[2] = mix(b, pixel[2]);
    pixel[3] = 255;
}
