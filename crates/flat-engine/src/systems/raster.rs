//! Time-gated sprite rasterization.
//!
//! Each sprite keeps a countdown; when it runs out (or the caller forces it) the
//! sprite's layers are drawn into a fresh square bitmap that replaces the cached
//! one wholesale.

use std::sync::Arc;

use glam::Vec2;
use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};

use crate::components::sprite::Sprite;
use crate::systems::text::draw_text;

/// Square raster size for a sprite: `quality` of the viewport diagonal, clamped
/// to `[1, diagonal]` pixels.
pub fn resolution(quality: f32, viewport: Vec2) -> u32 {
    let diagonal = viewport.length();
    let max = diagonal as u32;
    let wanted = (quality * diagonal) as u32;
    wanted.min(max).max(1)
}

/// Tick the sprite's countdown by `dt` and re-rasterize when it expired or when
/// `force` is set. Returns whether a new bitmap was produced.
pub fn rasterize(sprite: &mut Sprite, dt: f32, viewport: Vec2, force: bool) -> bool {
    sprite.countdown -= dt;

    if sprite.countdown > 0.0 && !force {
        return false;
    }

    sprite.countdown = sprite.delay;
    let bitmap = draw_layers(sprite, resolution(sprite.quality, viewport));
    sprite.rendered = Some(Arc::new(bitmap));
    true
}

/// Draw image, fill and text (in that order) into a `size`×`size` bitmap.
pub fn draw_layers(sprite: &Sprite, size: u32) -> RgbaImage {
    let mut canvas = match &sprite.image {
        Some(image) => imageops::resize(image.as_ref(), size, size, FilterType::Nearest),
        None => RgbaImage::new(size, size),
    };

    if let Some(fill) = sprite.fill {
        for pixel in canvas.pixels_mut() {
            pixel.blend(&fill);
        }
    }

    if let (Some(color), Some(font)) = (sprite.text_color, &sprite.font) {
        let len = sprite.text.chars().count() as u32;
        if len > 0 {
            // A lone character gets half the canvas instead of all of it.
            let glyph = if len == 1 { size / 2 } else { size / len };
            let margin = (size - size / len) as i64;
            draw_text(&mut canvas, &sprite.text, font, color, glyph, (margin / 4, margin / 2));
        }
    }

    if sprite.mirror {
        imageops::flip_horizontal_in_place(&mut canvas);
    }

    canvas
}
