//! Center-based rectangle geometry.
//!
//! Every box in the combat core (hurtboxes, hitboxes, ground, platforms,
//! kill box) is described by its center and full extents. Overlap and
//! containment use open intervals, so boxes that only touch do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle described by center and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Center X coordinate
    pub x: f32,
    /// Center Y coordinate
    pub y: f32,
    /// Full width
    pub w: f32,
    /// Full height
    pub h: f32,
}

impl Rect {
    /// Creates a rectangle from center and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from center and size vectors.
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(center.x, center.y, size.x, size.y)
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Returns the full size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Left edge X coordinate.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.x - self.w / 2.0
    }

    /// Right edge X coordinate.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w / 2.0
    }

    /// Bottom edge Y coordinate.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y - self.h / 2.0
    }

    /// Top edge Y coordinate.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Checks if the two boxes intersect on both axes.
    ///
    /// Touching edges do not count as overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        other.right() > self.left()
            && other.left() < self.right()
            && other.top() > self.bottom()
            && other.bottom() < self.top()
    }

    /// Checks if `other` lies strictly inside this box.
    #[must_use]
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() > self.left()
            && other.right() < self.right()
            && other.bottom() > self.bottom()
            && other.top() < self.top()
    }

    /// Checks if a point lies strictly inside this box.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x > self.left() && point.x < self.right() && point.y > self.bottom() && point.y < self.top()
    }

    /// Returns the rectangle translated by an offset.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}
