//! World ↔ screen mapping.
//!
//! World space is Y-up. The presentation surface draws in a Y-down space where a
//! world point `(x, y)` sits at `(x, 1 - y)`; the view transform then maps the
//! camera rectangle onto the client area, rotated about its center.

use glam::{Affine2, Vec2};

use crate::components::shape::Shape;

/// World point in the surface's Y-down space.
pub fn flip(point: Vec2) -> Vec2 {
    Vec2::new(point.x, 1.0 - point.y)
}

/// Transform from flipped world space to client-area pixels.
///
/// `viewport` is the client size in pixels, `camera_angle` in degrees.
pub fn view_transform(viewport: Vec2, camera: &Shape, camera_angle: f32) -> Affine2 {
    let top_left = Vec2::new(
        camera.position.x - camera.size.x / 2.0,
        1.0 - (camera.position.y + camera.size.y / 2.0),
    );

    Affine2::from_scale(viewport)
        * Affine2::from_translation(Vec2::splat(0.5))
        * Affine2::from_angle(camera_angle.to_radians())
        * Affine2::from_translation(Vec2::splat(-0.5))
        * Affine2::from_scale(Vec2::ONE / camera.size)
        * Affine2::from_translation(-top_left)
}

/// Client-area pixel (origin top-left) to world units.
///
/// The viewport is treated as one world unit across, centered on the camera;
/// camera size and rotation are not applied.
pub fn screen_to_world(pixel: Vec2, viewport: Vec2, camera_center: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return camera_center;
    }
    Vec2::new(pixel.x, viewport.y - pixel.y) / viewport - 0.5 + camera_center
}
