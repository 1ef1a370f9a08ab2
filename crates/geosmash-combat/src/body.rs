//! Physical body shared by every arena entity.

use geosmash_common::{EntityId, Ownership, PlayerId, Rect, TeamId};
use glam::Vec2;

/// Position, velocity and ownership of an arena entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    /// Unique entity id
    pub id: EntityId,
    /// Owning player and team
    pub owner: Ownership,
    /// Center position
    pub pos: Vec2,
    /// Velocity in units per second
    pub vel: Vec2,
    /// Acceleration in units per second squared
    pub accel: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Body {
    /// Creates a resting body with a fresh id.
    #[must_use]
    pub fn new(owner: Ownership, pos: Vec2, size: Vec2) -> Self {
        Self {
            id: EntityId::new(),
            owner,
            pos,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            size,
        }
    }

    /// Advances velocity then position by `dt`.
    pub fn integrate(&mut self, dt: f32) {
        self.vel += self.accel * dt;
        self.pos += self.vel * dt;
    }

    /// Moves the body without touching its velocity.
    pub fn push(&mut self, offset: Vec2) {
        self.pos += offset;
    }

    /// Mirrors the horizontal velocity.
    pub fn reflect(&mut self) {
        self.vel.x = -self.vel.x;
    }

    /// Transfers the body to another player and team.
    pub fn reown(&mut self, player: PlayerId, team: TeamId) {
        self.owner = Ownership::new(player, team);
    }

    /// Stops all motion.
    pub fn halt(&mut self) {
        self.vel = Vec2::ZERO;
        self.accel = Vec2::ZERO;
    }

    /// Nominal bounding box.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, self.size)
    }
}
