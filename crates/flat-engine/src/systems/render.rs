use glam::Vec2;

use crate::components::entity::Entity;
use crate::core::config::SceneConfig;
use crate::renderer::camera::view_transform;
use crate::renderer::instance::{DrawInstance, DrawItem, Frame};

/// Build the frame snapshot from a set of entities.
/// Entities whose sprite has never been rasterized are skipped.
pub fn build_frame<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    config: &SceneConfig,
    viewport: Vec2,
    tick: u64,
) -> Frame {
    let items = entities
        .filter_map(|entity| {
            let bitmap = entity.sprite.rendered()?.clone();
            let rotation = if entity.sprite.mirror {
                -entity.sprite.angle
            } else {
                entity.sprite.angle
            };
            Some(DrawItem {
                entity: entity.id,
                instance: DrawInstance {
                    x: entity.shape.position.x,
                    y: entity.shape.position.y,
                    width: entity.shape.size.x,
                    height: entity.shape.size.y,
                    rotation,
                },
                bitmap,
            })
        })
        .collect();

    Frame {
        tick,
        viewport,
        view: view_transform(viewport, &config.camera, config.camera_angle),
        items,
    }
}
