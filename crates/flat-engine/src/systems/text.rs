//! Bitmap font text rendering.
//!
//! Font atlases are images with glyphs laid out in ASCII order on a regular
//! grid, typically 16 columns × 6 rows for printable ASCII (32-127). Glyph
//! coverage is taken from the atlas alpha channel and tinted with the text color.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Pixel, Rgba, RgbaImage};

use crate::error::EngineError;

/// A glyph atlas used for sprite text layers.
#[derive(Debug, Clone)]
pub struct FontAtlas {
    image: RgbaImage,
    /// Number of columns in the atlas grid.
    pub cols: u32,
    /// Number of rows in the atlas grid.
    pub rows: u32,
    /// First ASCII code in the atlas (typically 32 = space).
    pub start_char: u8,
    /// Horizontal advance as a fraction of the glyph size (0.55 tight, 1.0 monospace).
    pub spacing: f32,
}

impl FontAtlas {
    pub fn new(image: RgbaImage, cols: u32, rows: u32) -> Self {
        Self {
            image,
            cols: cols.max(1),
            rows: rows.max(1),
            start_char: 32,
            spacing: 0.55,
        }
    }

    pub fn from_file(path: impl AsRef<Path>, cols: u32, rows: u32) -> Result<Self, EngineError> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::new(image, cols, rows))
    }

    /// Set the starting character (ASCII code).
    pub fn with_start_char(mut self, start_char: u8) -> Self {
        self.start_char = start_char;
        self
    }

    /// Set the character spacing.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Pixel size of one grid cell.
    pub fn cell_size(&self) -> (u32, u32) {
        (self.image.width() / self.cols, self.image.height() / self.rows)
    }

    /// Convert a character to grid coordinates (col, row).
    ///
    /// Returns `None` if the character is outside the atlas range.
    pub fn char_to_grid(&self, c: char) -> Option<(u32, u32)> {
        let index = (c as u32).checked_sub(self.start_char as u32)?;
        if index >= self.cols * self.rows {
            return None;
        }
        Some((index % self.cols, index / self.cols))
    }

    /// The glyph for `c` cropped out of the atlas.
    pub fn glyph(&self, c: char) -> Option<RgbaImage> {
        let (col, row) = self.char_to_grid(c)?;
        let (w, h) = self.cell_size();
        if w == 0 || h == 0 {
            return None;
        }
        Some(imageops::crop_imm(&self.image, col * w, row * h, w, h).to_image())
    }
}

/// Draw `text` onto `canvas` with square glyphs of `glyph_size` pixels, starting
/// at `origin` (top-left of the first glyph). Pixels outside the canvas are clipped.
pub fn draw_text(
    canvas: &mut RgbaImage,
    text: &str,
    font: &FontAtlas,
    color: Rgba<u8>,
    glyph_size: u32,
    origin: (i64, i64),
) {
    if glyph_size == 0 {
        return;
    }

    let advance = glyph_size as f32 * font.spacing;

    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = font.glyph(c) else {
            continue;
        };
        let glyph = imageops::resize(&glyph, glyph_size, glyph_size, FilterType::Nearest);
        let left = origin.0 + (i as f32 * advance) as i64;

        for (gx, gy, texel) in glyph.enumerate_pixels() {
            let coverage = texel[3] as u32;
            if coverage == 0 {
                continue;
            }
            let (x, y) = (left + gx as i64, origin.1 + gy as i64);
            if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
                continue;
            }
            let alpha = (color[3] as u32 * coverage / 255) as u8;
            let ink = Rgba([color[0], color[1], color[2], alpha]);
            canvas.get_pixel_mut(x as u32, y as u32).blend(&ink);
        }
    }
}
