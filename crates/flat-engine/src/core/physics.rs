//! Gravity accumulation and per-axis position integration.
//!
//! Integration is axis-sequential: a tick moves X, resolves X collisions, then
//! moves Y and resolves Y collisions. Horizontal interpenetration is therefore
//! resolved before vertical movement is applied.

use glam::Vec2;

use crate::components::body::Body;
use crate::components::shape::Shape;

/// One of the two world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// Component of `v` along this axis.
    pub fn of(self, v: Vec2) -> f32 {
        v[self.index()]
    }

    /// Mutable component of `v` along this axis.
    pub fn of_mut(self, v: &mut Vec2) -> &mut f32 {
        &mut v[self.index()]
    }

    /// `v` with the other axis zeroed.
    pub fn project(self, v: Vec2) -> Vec2 {
        match self {
            Axis::X => Vec2::new(v.x, 0.0),
            Axis::Y => Vec2::new(0.0, v.y),
        }
    }
}

/// `velocity += gravity * dt` for non-static bodies with gravity enabled.
pub fn apply_gravity(body: &mut Body, gravity: Vec2, dt: f32) {
    if !body.is_static && body.gravity {
        body.velocity += gravity * dt;
    }
}

/// Advance the shape along one axis by `velocity[axis] * dt`. Static bodies stay put.
pub fn advance(shape: &mut Shape, body: &Body, axis: Axis, dt: f32) {
    if !body.is_static {
        *axis.of_mut(&mut shape.position) += axis.of(body.velocity) * dt;
    }
}

/// Undo the displacement [`advance`] just applied.
pub fn revert(shape: &mut Shape, body: &Body, axis: Axis, dt: f32) {
    if !body.is_static {
        *axis.of_mut(&mut shape.position) -= axis.of(body.velocity) * dt;
    }
}
