use std::sync::{Arc, Mutex, PoisonError};

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};
use image::RgbaImage;

use crate::api::types::EntityId;

/// Per-entity placement of a cached sprite bitmap. 5 floats = 20 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawInstance {
    /// Center in world space (Y-up).
    pub x: f32,
    pub y: f32,
    /// World-space size the bitmap is stretched to.
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees, sign already flipped for mirrored sprites.
    pub rotation: f32,
}

impl DrawInstance {
    pub const FLOATS: usize = 5;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    /// Maps the bitmap's unit square into flipped world space: rotated about
    /// the entity center, then stretched over the entity's bounds.
    pub fn model(&self) -> Affine2 {
        let center = Vec2::new(self.x, 1.0 - self.y);
        let size = Vec2::new(self.width, self.height);

        Affine2::from_translation(center)
            * Affine2::from_angle(self.rotation.to_radians())
            * Affine2::from_translation(-size / 2.0)
            * Affine2::from_scale(size)
    }
}

/// One entity's contribution to a frame.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub entity: EntityId,
    pub instance: DrawInstance,
    pub bitmap: Arc<RgbaImage>,
}

/// Immutable snapshot of everything the surface needs to paint one frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Tick that produced this frame.
    pub tick: u64,
    /// Client-area size in pixels the frame was built for.
    pub viewport: Vec2,
    /// Flipped world space → client pixels.
    pub view: Affine2,
    /// Draw list in registry order (later items paint over earlier ones).
    pub items: Vec<DrawItem>,
}

impl Frame {
    pub fn empty() -> Self {
        Self {
            tick: 0,
            viewport: Vec2::ZERO,
            view: Affine2::IDENTITY,
            items: Vec::new(),
        }
    }

    /// Bitmap unit square → client pixels for one item.
    pub fn item_transform(&self, item: &DrawItem) -> Affine2 {
        self.view * item.instance.model()
    }

    /// Tightly packed instance data for upload.
    pub fn instances(&self) -> Vec<DrawInstance> {
        self.items.iter().map(|item| item.instance).collect()
    }
}

/// Latest-frame mailbox between the simulation and presentation threads.
/// The writer swaps in a whole `Arc<Frame>`; readers never see a partial frame.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Arc<Frame>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, frame: Arc<Frame>) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
    }

    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_instance_is_5_floats() {
        assert_eq!(std::mem::size_of::<DrawInstance>(), DrawInstance::STRIDE_BYTES);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&DrawInstance {
            x: 1.0,
            y: 2.0,
            width: 3.0,
            height: 4.0,
            rotation: 5.0,
        }));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn model_places_bitmap_over_bounds() {
        let inst = DrawInstance {
            x: 2.0,
            y: 1.0,
            width: 2.0,
            height: 1.0,
            rotation: 0.0,
        };
        let m = inst.model();
        // Bitmap top-left lands on the entity's top-left corner (flipped).
        let tl = m.transform_point2(Vec2::ZERO);
        assert!((tl - Vec2::new(1.0, -0.5)).length() < 1e-5, "{:?}", tl);
        let br = m.transform_point2(Vec2::ONE);
        assert!((br - Vec2::new(3.0, 0.5)).length() < 1e-5, "{:?}", br);
    }

    #[test]
    fn slot_keeps_latest_frame() {
        let slot = FrameSlot::new();
        assert!(slot.latest().is_none());
        slot.publish(Arc::new(Frame { tick: 1, ..Frame::empty() }));
        slot.publish(Arc::new(Frame { tick: 2, ..Frame::empty() }));
        assert_eq!(slot.latest().unwrap().tick, 2);
    }
}
