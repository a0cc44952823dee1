//! Software compositor for frames.

use flat_engine::Frame;
use glam::{Affine2, Vec2};
use image::{Pixel, Rgba, RgbaImage};

/// Paint a frame into an image the size of its viewport. Items are drawn in
/// order with nearest-neighbour sampling and alpha blending.
pub fn paint_frame(frame: &Frame, background: Rgba<u8>) -> RgbaImage {
    let width = frame.viewport.x.max(0.0) as u32;
    let height = frame.viewport.y.max(0.0) as u32;
    let mut canvas = RgbaImage::from_pixel(width, height, background);

    for item in &frame.items {
        draw_bitmap(&mut canvas, frame.item_transform(item), &item.bitmap);
    }
    canvas
}

/// Draw `bitmap` so that its unit square lands where `transform` puts it.
fn draw_bitmap(canvas: &mut RgbaImage, transform: Affine2, bitmap: &RgbaImage) {
    let (bw, bh) = bitmap.dimensions();
    if bw == 0 || bh == 0 || transform.matrix2.determinant().abs() <= f32::EPSILON {
        return;
    }
    let inverse = transform.inverse();

    let corners = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE].map(|c| transform.transform_point2(c));
    let min = corners.iter().fold(Vec2::splat(f32::INFINITY), |acc, c| acc.min(*c));
    let max = corners.iter().fold(Vec2::splat(f32::NEG_INFINITY), |acc, c| acc.max(*c));

    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = max.x.ceil().min(canvas.width() as f32) as u32;
    let y1 = max.y.ceil().min(canvas.height() as f32) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            let uv = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
            if uv.x < 0.0 || uv.y < 0.0 || uv.x >= 1.0 || uv.y >= 1.0 {
                continue;
            }
            let sx = ((uv.x * bw as f32) as u32).min(bw - 1);
            let sy = ((uv.y * bh as f32) as u32).min(bh - 1);
            canvas.get_pixel_mut(x, y).blend(bitmap.get_pixel(sx, sy));
        }
    }
}
