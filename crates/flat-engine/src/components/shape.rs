use std::cmp::Ordering;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box described by its center and full size.
///
/// Equality is component-wise. "Bigger" and "smaller" are decided by the length
/// of `size` (see [`Shape::cmp_size`]), which is why `Shape` does not implement
/// `PartialOrd`: two unequal shapes can compare as the same size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shape {
    /// Center in world space.
    pub position: Vec2,
    /// Full width and height. Expected non-negative.
    pub size: Vec2,
}

impl Shape {
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Shape whose position and size share one vector (scalar promotion).
    pub fn splat(value: f32) -> Self {
        Self::new(Vec2::splat(value), Vec2::splat(value))
    }

    /// Bottom-left corner.
    pub fn min(&self) -> Vec2 {
        self.position - self.size / 2.0
    }

    /// Top-right corner.
    pub fn max(&self) -> Vec2 {
        self.position + self.size / 2.0
    }

    /// Inclusive AABB overlap test. Returns the midpoint of the two centers as the
    /// contact point, or `None` when the boxes are separated on either axis.
    ///
    /// Touching edges count as overlap. The midpoint is computed as `(a + b) / 2`
    /// so `a.intersect(b)` and `b.intersect(a)` yield bit-identical points.
    pub fn intersect(&self, other: &Shape) -> Option<Vec2> {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());

        let overlaps = a_max.x >= b_min.x
            && a_min.x <= b_max.x
            && a_max.y >= b_min.y
            && a_min.y <= b_max.y;

        overlaps.then(|| (self.position + other.position) / 2.0)
    }

    /// Whether a world-space point lies inside the box (edges included).
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Interpolate position and size independently.
    pub fn lerp(&self, other: &Shape, t: f32) -> Shape {
        Shape::new(
            self.position.lerp(other.position, t),
            self.size.lerp(other.size, t),
        )
    }

    /// Distance between the two centers.
    pub fn distance(&self, other: &Shape) -> f32 {
        self.position.distance(other.position)
    }

    /// Compare by the length of `size`.
    pub fn cmp_size(&self, other: &Shape) -> Option<Ordering> {
        self.size.length().partial_cmp(&other.size.length())
    }

    pub fn is_bigger_than(&self, other: &Shape) -> bool {
        self.size.length() > other.size.length()
    }

    pub fn is_smaller_than(&self, other: &Shape) -> bool {
        self.size.length() < other.size.length()
    }

    // -- Builder pattern --

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }
}

impl From<f32> for Shape {
    fn from(value: f32) -> Self {
        Shape::splat(value)
    }
}

impl From<Vec2> for Shape {
    fn from(value: Vec2) -> Self {
        Shape::new(value, value)
    }
}
