//! Demo scene: a ball bouncing on a floor next to a pushable crate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use flat_engine::{
    Body, Entity, EntityId, Script, ScriptCtx, ScriptKind, ScriptResult, Shape, Sound, SoundId,
    Sprite, World,
};
use glam::Vec2;
use image::Rgba;

const BOUNCER: ScriptKind = ScriptKind("bouncer");
const SPINNER: ScriptKind = ScriptKind("spinner");
const JUMPER: ScriptKind = ScriptKind("jumper");
const REAPER: ScriptKind = ScriptKind("reaper");

/// Space bar.
pub const JUMP_KEY: u8 = 0x20;

const BALL_COLORS: [Rgba<u8>; 2] = [Rgba([230, 80, 60, 255]), Rgba([250, 200, 40, 255])];

/// Handles to the interesting parts of the demo scene.
pub struct Demo {
    pub ball: EntityId,
    pub floor: EntityId,
    pub crate_box: EntityId,
    /// Played on every resolved collision of the ball.
    pub bounce_sound: SoundId,
    /// Resolved collisions seen by the ball.
    pub bounces: Arc<AtomicU32>,
}

impl Demo {
    pub fn bounces(&self) -> u32 {
        self.bounces.load(Ordering::Relaxed)
    }
}

/// Counts resolved collisions, plays the bounce sound and swaps the fill color
/// on each one. The new color shows up at the next re-rasterization.
struct Bouncer {
    bounces: Arc<AtomicU32>,
    sound: SoundId,
}

impl Script for Bouncer {
    fn kind(&self) -> ScriptKind {
        BOUNCER
    }

    fn on_intersection(
        &mut self,
        entity: &mut Entity,
        other: &Entity,
        _contact: Vec2,
        impulse: Option<Vec2>,
        ctx: &mut ScriptCtx,
    ) -> ScriptResult {
        if impulse.is_none() {
            return Ok(());
        }
        ctx.play_sound(self.sound);
        let n = self.bounces.fetch_add(1, Ordering::Relaxed) + 1;
        entity.sprite.fill = Some(BALL_COLORS[n as usize % BALL_COLORS.len()]);
        log::trace!("ball hit entity {}", other.id.0);
        Ok(())
    }
}

/// Rotates the sprite at a fixed rate.
struct Spinner {
    degrees_per_second: f32,
}

impl Script for Spinner {
    fn kind(&self) -> ScriptKind {
        SPINNER
    }

    fn on_update(&mut self, entity: &mut Entity, ctx: &mut ScriptCtx) -> ScriptResult {
        entity.sprite.angle = (entity.sprite.angle + self.degrees_per_second * ctx.delta()) % 360.0;
        Ok(())
    }
}

/// Jumps while the jump key is held and the body is not already rising.
struct Jumper {
    speed: f32,
}

impl Script for Jumper {
    fn kind(&self) -> ScriptKind {
        JUMPER
    }

    fn on_update(&mut self, entity: &mut Entity, ctx: &mut ScriptCtx) -> ScriptResult {
        if ctx.input.key(JUMP_KEY) && entity.body.velocity.y <= 0.0 {
            entity.body.velocity.y = self.speed;
        }
        Ok(())
    }
}

/// Unloads the entity once it falls out of the world.
struct Reaper {
    floor: f32,
}

impl Script for Reaper {
    fn kind(&self) -> ScriptKind {
        REAPER
    }

    fn on_update(&mut self, entity: &mut Entity, ctx: &mut ScriptCtx) -> ScriptResult {
        if entity.shape.position.y < self.floor {
            log::info!("entity {} fell out of the world", entity.id.0);
            ctx.despawn(entity.id);
        }
        Ok(())
    }
}

/// Load the demo entities into `world`.
pub fn populate(world: &mut World) -> Demo {
    world.config.gravity = Vec2::new(0.0, -2.0);
    world.config.window.title = "flat-headless demo".to_string();

    let bounces = Arc::new(AtomicU32::new(0));

    let bounce_sound = world.next_sound_id();
    world.load_sound(Sound::new(bounce_sound, "assets/bounce.wav").with_tag("sfx"));

    let floor = world.next_entity_id();
    world.load_entity(
        Entity::new(floor)
            .with_shape(Shape::new(Vec2::new(0.0, -0.45), Vec2::new(1.0, 0.1)))
            .with_body(Body::fixed())
            .with_sprite(Sprite::solid(Rgba([90, 90, 100, 255])).with_quality(0.5))
            .with_tag("floor"),
    );

    let ball = world.next_entity_id();
    world.load_entity(
        Entity::new(ball)
            .with_shape(Shape::new(Vec2::new(-0.2, 0.3), Vec2::splat(0.1)))
            .with_body(
                Body::dynamic()
                    .with_velocity(Vec2::new(0.15, 0.0))
                    .with_bounciness(0.8)
                    .with_friction(0.05),
            )
            .with_sprite(Sprite::solid(BALL_COLORS[0]).with_quality(0.1).with_delay(0.1))
            .with_tag("ball")
            .with_script(Bouncer {
                bounces: bounces.clone(),
                sound: bounce_sound,
            })
            .with_script(Spinner { degrees_per_second: 90.0 })
            .with_script(Jumper { speed: 1.5 })
            .with_script(Reaper { floor: -2.0 }),
    );

    let crate_box = world.next_entity_id();
    world.load_entity(
        Entity::new(crate_box)
            .with_shape(Shape::new(Vec2::new(0.25, -0.325), Vec2::splat(0.15)))
            .with_body(Body::dynamic().with_pushable(true).with_friction(0.5))
            .with_sprite(Sprite::solid(Rgba([150, 110, 60, 255])).with_quality(0.15))
            .with_tag("crate")
            .with_script(Reaper { floor: -2.0 }),
    );

    log::info!("Demo scene loaded with {} entities", world.entities().len());

    Demo {
        ball,
        floor,
        crate_box,
        bounce_sound,
        bounces,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use flat_engine::{InputEvent, SceneConfig};

    #[test]
    fn ball_bounces_off_the_floor() {
        let mut world = World::new(SceneConfig::default());
        let demo = populate(&mut world);
        for _ in 0..120 {
            assert!(world.step(1.0 / 60.0).is_empty());
        }
        assert!(demo.bounces() > 0);

        let ball = world.scene.get(demo.ball).unwrap();
        let floor = world.scene.get(demo.floor).unwrap();
        assert!(ball.shape.min().y >= floor.shape.max().y - 0.05);
        assert_eq!(floor.shape.position, Vec2::new(0.0, -0.45));
    }

    #[test]
    fn jump_key_launches_the_ball() {
        let mut world = World::new(SceneConfig::default());
        let demo = populate(&mut world);

        world.feed_input([InputEvent::KeyDown { key_code: JUMP_KEY }]);
        world.step(0.01);

        let ball = world.scene.get(demo.ball).unwrap();
        assert!(ball.body.velocity.y > 1.0);
    }

    #[test]
    fn bounces_play_the_bounce_sound() {
        let audio = Arc::new(NullAudio::new());
        let mut world = World::new(SceneConfig::default());
        world.set_audio(audio.clone());
        let demo = populate(&mut world);

        for _ in 0..120 {
            world.step(1.0 / 60.0);
        }
        assert!(demo.bounces() > 0);
        // Each bounce restarts the same sound, so only one playback is live.
        assert_eq!(audio.active().len(), 1);
        assert!(world.scene.sound(demo.bounce_sound).unwrap().is_playing());
    }

    #[test]
    fn fallen_entities_are_unloaded() {
        let mut world = World::new(SceneConfig::default());
        let demo = populate(&mut world);
        world.unload_entity(demo.floor);
        for _ in 0..200 {
            world.step(1.0 / 30.0);
        }
        assert!(world.scene.get(demo.ball).is_none());
        assert!(world.scene.get(demo.crate_box).is_none());
        assert!(world.entities().is_empty());
    }
}
