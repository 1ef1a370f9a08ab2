//! Hitstun.

use geosmash_common::Rect;
use glam::Vec2;

use super::{air_drift, AirNormalState, FighterState, FrameCtx, GroundState};
use crate::controller::ControllerState;
use crate::fighter::FighterCore;
use crate::hit::{check_for_ledge_grab, collision_helper};

/// Launched and stunned.
///
/// An infinite `duration` is the helpless fall after a recovery move; only a
/// landing, a ledge or another hit ends it. `bounce` is the launch speed used
/// for a single ground bounce, cleared once spent.
#[derive(Debug, Clone, PartialEq)]
pub struct AirStunnedState {
    duration: f32,
    t: f32,
    bounce: Option<f32>,
}

impl AirStunnedState {
    /// Stuns for `duration` seconds. Being stunned refreshes air jumps.
    pub fn new(core: &mut FighterCore, duration: f32, bounce: Option<f32>) -> Self {
        core.air_jumps = 0;
        Self {
            duration,
            t: 0.0,
            bounce,
        }
    }

    /// Helpless fall.
    pub fn helpless(core: &mut FighterCore) -> Self {
        Self::new(core, f32::INFINITY, None)
    }

    /// Total stun.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Time spent stunned.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.t
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        core.body.accel = Vec2::new(0.0, core.config.movement.air_accel);
        air_drift(core, input, core.config.movement.air_di, dt);

        self.t += dt;
        if self.t > self.duration {
            return Some(FighterState::AirNormal(AirNormalState::new(false)));
        }
        if self.duration.is_infinite() {
            return check_for_ledge_grab(core, false, cx);
        }
        None
    }

    pub(crate) fn collision_with_ground(
        &mut self,
        core: &mut FighterCore,
        ground: Rect,
        collided: bool,
        platform: bool,
    ) -> Option<FighterState> {
        if !collided {
            return None;
        }
        collision_helper(&mut core.body, ground, platform);
        if !ground.overlaps(&core.body.rect()) {
            return None;
        }

        let rules = core.config.rules;
        match self.bounce {
            Some(speed) if core.body.vel.y < -rules.gb_thresh => {
                let vel = core.body.vel.normalize_or_zero() * speed;
                core.body.vel = Vec2::new(vel.x * rules.gb_vel_damping, -vel.y * rules.gb_vel_damping);
                self.t *= rules.gb_stun_damping;
                self.bounce = None;
                None
            }
            _ => {
                core.body.halt();
                Some(FighterState::Ground(GroundState::standing(core)))
            }
        }
    }
}
