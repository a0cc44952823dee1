use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Physical attributes of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    /// World units per second.
    pub velocity: Vec2,
    /// Immovable: never integrated, never reverted.
    pub is_static: bool,
    /// Detected by overlap tests but never resolved.
    pub intangible: bool,
    /// Rebound coefficient applied along the collision axis.
    pub bounciness: f32,
    /// Damping coefficient applied to the cross axis on collision.
    pub friction: f32,
    /// Accumulates scene gravity every tick.
    pub gravity: bool,
    /// Takes the resolved impulse as its velocity when hit by a non-static collider.
    pub pushable: bool,
}

impl Body {
    /// A dynamic body affected by gravity.
    pub fn dynamic() -> Self {
        Self {
            gravity: true,
            ..Default::default()
        }
    }

    /// An immovable body.
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            ..Default::default()
        }
    }

    // -- Builder pattern --

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.bounciness = bounciness;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_intangible(mut self, intangible: bool) -> Self {
        self.intangible = intangible;
        self
    }

    pub fn with_pushable(mut self, pushable: bool) -> Self {
        self.pushable = pushable;
        self
    }
}
