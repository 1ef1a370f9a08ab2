//! Airborne movement.

use geosmash_common::Rect;
use glam::Vec2;

use super::{air_drift, perform_b_move, start_directional, FighterState, FrameCtx, GroundState};
use crate::controller::{facing_of, ControllerState};
use crate::fighter::FighterCore;
use crate::hit::{check_for_ledge_grab, collision_helper};
use crate::moves::MoveId;

/// Airborne and in control: drift, fast fall, air jumps, aerials and ledge
/// grabs.
#[derive(Debug, Clone, PartialEq)]
pub struct AirNormalState {
    jump_time: f32,
    fast_falling: bool,
    fall_through: bool,
    no_grab_time: f32,
    frame: &'static str,
}

impl AirNormalState {
    /// Enters the air; `short_hop` only changes the frame shown.
    #[must_use]
    pub fn new(short_hop: bool) -> Self {
        Self {
            jump_time: -1.0,
            fast_falling: false,
            fall_through: false,
            no_grab_time: 0.0,
            frame: if short_hop { "AirNormalHop" } else { "AirNormal" },
        }
    }

    /// Blocks ledge grabs for `t` seconds.
    #[must_use]
    pub fn with_no_grab_time(mut self, t: f32) -> Self {
        self.no_grab_time = t;
        self
    }

    /// Checks if the fighter is fast falling.
    #[must_use]
    pub fn is_fast_falling(&self) -> bool {
        self.fast_falling
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        let th = core.config.input;
        let mv = core.config.movement;
        core.body.accel = Vec2::new(0.0, mv.air_accel);
        self.fall_through = false;

        if self.jump_time >= 0.0 {
            self.jump_time += dt;
        }
        self.no_grab_time -= dt;
        if core.attack.is_some() {
            return None;
        }

        if air_drift(core, input, mv.air_force, dt) {
            core.dir = facing_of(input.joy_x);
        }

        let vel_y = core.body.vel.y;
        if vel_y < 0.0 && vel_y > mv.fast_fall_max_speed && input.joy_y < th.fall {
            if !self.fast_falling && vel_y > mv.fast_fall_max_initial_speed {
                core.body.vel.y += mv.fast_fall_initial_speed;
            } else {
                core.body.accel.y += mv.fast_fall_accel;
            }
            self.fast_falling = true;
            self.frame = "AirNormalFastFall";
        }
        if input.joy_y < th.fall {
            self.fall_through = true;
        }

        if input.press_a {
            start_directional(
                core,
                input,
                [MoveId::AirFront, MoveId::AirDown, MoveId::AirUp, MoveId::AirNeutral],
                cx.out,
            );
        } else if input.press_b {
            return Some(perform_b_move(core, input, false, cx));
        }
        if core.attack.is_some() {
            self.jump_time = -1.0;
            return None;
        }

        if input.press_y && self.jump_time < 0.0 && core.air_jumps < mv.max_air_jumps {
            self.jump_time = 0.0;
        }
        if self.jump_time > mv.jump_startup_time {
            core.body.vel.x = if input.joy_x.abs() > th.deadzone {
                0.8 * mv.dash_speed * ((input.joy_x - 0.2) / 0.6).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            core.body.vel.y = mv.second_jump_speed;
            self.jump_time = -1.0;
            core.air_jumps += 1;
            self.frame = "AirNormalSecondJump";
            core.puff(-0.1, cx.out);
        }

        if self.no_grab_time <= 0.0 {
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
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        if !collided || (platform && self.fall_through) {
            return None;
        }
        collision_helper(&mut core.body, ground, platform);
        if !ground.overlaps(&core.body.rect()) {
            return None;
        }

        core.body.halt();
        if let Some(attack) = core.attack.as_mut() {
            attack.cancel();
        }
        core.puff(-0.4, cx.out);
        core.puff(0.4, cx.out);

        let lag = core.config.movement.landing_cooldown_time;
        Some(FighterState::Ground(GroundState::new(core, lag, 0.0)))
    }

    pub(crate) fn frame_name(&self) -> &'static str {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outbox;
    use crate::moves::FighterKind;
    use crate::state::testing::{self, input, DT};

    fn step(state: &mut AirNormalState, core: &mut FighterCore, pad: &ControllerState) -> Option<FighterState> {
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        state.process_input(core, pad, DT, &mut cx)
    }

    fn airborne(kind: FighterKind) -> FighterCore {
        let mut core = testing::core(kind);
        core.body.pos.y = 300.0;
        core
    }

    #[test]
    fn test_air_jumps_are_limited() {
        let mut core = airborne(FighterKind::Charlie);
        let mut state = AirNormalState::new(false);
        let max = core.config.movement.max_air_jumps;
        let idle = ControllerState::default();

        for _ in 0..max + 2 {
            step(&mut state, &mut core, &input(|i| i.press_y = true));
            for _ in 0..30 {
                step(&mut state, &mut core, &idle);
            }
        }

        assert_eq!(core.air_jumps, max);
        assert_eq!(state.frame_name(), "AirNormalSecondJump");
    }

    #[test]
    fn test_aerial_picks_direction() {
        let mut core = airborne(FighterKind::Charlie);
        let mut state = AirNormalState::new(false);
        step(
            &mut state,
            &mut core,
            &input(|i| {
                i.press_a = true;
                i.joy_y = -1.0;
            }),
        );
        assert_eq!(core.attack.as_ref().map(|a| a.id()), Some(MoveId::AirDown));
    }

    #[test]
    fn test_fast_fall() {
        let mut core = airborne(FighterKind::Stickman);
        core.body.vel.y = -1.0;
        let mut state = AirNormalState::new(false);
        step(&mut state, &mut core, &input(|i| i.joy_y = -1.0));
        assert!(state.is_fast_falling());
        assert_eq!(state.frame_name(), "AirNormalFastFall");
    }

    #[test]
    fn test_landing_goes_to_ground_with_lag() {
        let mut core = testing::core(FighterKind::Charlie);
        core.body.vel = Vec2::new(20.0, -100.0);
        core.air_jumps = 1;
        let mut state = AirNormalState::new(false);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let next = state.collision_with_ground(&mut core, testing::stage().ground, true, false, &mut cx);

        assert!(matches!(next, Some(FighterState::Ground(_))));
        assert_eq!(core.body.vel, Vec2::ZERO);
        assert_eq!(core.air_jumps, 0);
    }

    #[test]
    fn test_fall_through_platform() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = AirNormalState::new(false);
        step(&mut state, &mut core, &input(|i| i.joy_y = -1.0));

        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let platform = Rect::new(0.0, 0.0, 100.0, 10.0);
        assert!(state
            .collision_with_ground(&mut core, platform, true, true, &mut cx)
            .is_none());
    }
}
