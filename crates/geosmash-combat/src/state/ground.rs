//! Standing, walking, dashing and ducking.

use geosmash_common::Rect;

use super::{perform_b_move, start_directional, AirNormalState, BlockingState, DodgeState, FighterState, FrameCtx, GrabbingState};
use crate::controller::{facing_of, ControllerState};
use crate::fighter::FighterCore;
use crate::hit::step_back_onto_ground;
use crate::moves::MoveId;

/// On the ground and in control.
///
/// `jump_time` and `dash_time` are startup timers; negative means idle.
/// `dash_time` keeps counting down while idle so the minimum dash length can
/// be measured from the moment the dash started.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundState {
    jump_time: f32,
    dash_time: f32,
    wait: f32,
    dashing: bool,
    ducking: bool,
    walking: bool,
    pub(crate) invinc: f32,
}

impl GroundState {
    /// Lands with `delay` seconds of lag and `invinc` seconds of invincibility.
    pub fn new(core: &mut FighterCore, delay: f32, invinc: f32) -> Self {
        core.air_jumps = 0;
        Self {
            jump_time: -1.0,
            dash_time: -1.0,
            wait: delay,
            dashing: false,
            ducking: false,
            walking: false,
            invinc,
        }
    }

    /// Lands with no lag.
    pub fn standing(core: &mut FighterCore) -> Self {
        Self::new(core, -1.0, 0.0)
    }

    /// Checks if the fighter is running.
    #[must_use]
    pub fn is_dashing(&self) -> bool {
        self.dashing
    }

    /// Checks if the fighter is ducking.
    #[must_use]
    pub fn is_ducking(&self) -> bool {
        self.ducking
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
        self.ducking = false;

        // A dash flicked in during landing lag still starts once the lag ends.
        if !self.dashing && self.wait >= 0.0 && self.dash_time < 0.0 && input.flicked_x(th.dash, &th) {
            self.dash_time = 0.0;
        }

        if self.jump_time >= 0.0 {
            self.jump_time += dt;
        }
        if self.wait >= 0.0 {
            self.wait -= dt;
        }
        if self.dash_time >= 0.0 {
            self.dash_time += dt;
        } else {
            self.dash_time -= dt;
        }

        if core.attack.is_some() {
            return None;
        }
        if self.jump_time > 0.0 && self.jump_time < mv.jump_startup_time {
            if !input.press_a {
                return None;
            }
            self.jump_time = -1.0;
        }
        if self.dash_time > 0.0 && self.dash_time < mv.dash_startup_time {
            return None;
        }
        if self.wait > 0.0 {
            return None;
        }

        if self.jump_time > mv.jump_startup_time {
            core.body.vel.x = if input.joy_x.abs() > th.deadzone {
                input.joy_x * 0.5 * mv.dash_speed
            } else {
                0.0
            };
            let short_hop = !input.button_y;
            core.body.vel.y = if short_hop { mv.hop_speed } else { mv.jump_speed };
            core.puff(-0.1, cx.out);
            return Some(FighterState::AirNormal(AirNormalState::new(short_hop)));
        }

        if input.press_a {
            if self.dashing {
                self.dashing = false;
                core.body.vel.x = core.dir * mv.dash_speed;
                core.start_attack(MoveId::Dash, cx.out);
            } else {
                core.body.halt();
                start_directional(
                    core,
                    input,
                    [MoveId::SideTilt, MoveId::DownTilt, MoveId::UpTilt, MoveId::NeutralTilt],
                    cx.out,
                );
            }
            return None;
        }
        if input.press_rb {
            if !self.dashing {
                core.body.halt();
            }
            core.face_stick(input);
            return Some(FighterState::Grabbing(GrabbingState::enter(core, cx.out)));
        }
        if input.trigger_held(&th) && input.flicked_x(th.dodge, &th) {
            core.dir = facing_of(input.joy_x);
            core.puff(0.4, cx.out);
            return Some(FighterState::Dodge(DodgeState::new(core)));
        }
        if input.trigger_held(&th) {
            core.face_stick(input);
            core.body.halt();
            cx.out.sound("shieldon");
            return Some(FighterState::Blocking(BlockingState::new(core)));
        }
        if input.press_b {
            let next = perform_b_move(core, input, true, cx);
            core.body.vel.x = 0.0;
            self.dashing = false;
            return Some(next);
        }
        if !self.dashing && (input.dpad_u || input.dpad_d) {
            let taunt = if input.dpad_u { MoveId::TauntUp } else { MoveId::TauntDown };
            core.start_attack(taunt, cx.out);
            return None;
        }
        if !self.dashing && input.press_x {
            core.body.halt();
            start_directional(
                core,
                input,
                [MoveId::SideSmash, MoveId::DownSmash, MoveId::UpSmash, MoveId::NeutralSmash],
                cx.out,
            );
            return None;
        }

        if self.dashing {
            self.run(core, input, cx);
        } else {
            self.walk(core, input, cx);
        }

        if input.press_y && self.jump_time < 0.0 {
            self.jump_time = 0.0;
        }
        self.walking = !self.dashing && core.body.vel.x != 0.0;
        None
    }

    fn run(&mut self, core: &mut FighterCore, input: &ControllerState, cx: &mut FrameCtx<'_>) {
        let th = core.config.input;
        let mv = core.config.movement;
        let new_dir = facing_of(input.joy_x);

        if core.dir != new_dir && input.flicked_x(th.dash_min, &th) {
            core.dir = new_dir;
            core.body.vel.x = 0.0;
            self.wait = mv.dash_change_time;
            core.puff(-0.4, cx.out);
            self.dash_time = -1.0 + mv.dash_change_time.min(0.99);
        } else if input.joy_x.abs() < th.dash_min
            && input.joy_xv.abs() < th.velocity
            && self.dash_time < -1.0 - mv.min_dash_time
        {
            self.dashing = false;
            self.wait = mv.dash_change_time;
            core.body.vel.x = 0.0;
            core.puff(0.4, cx.out);
        } else {
            core.body.vel.x = core.dir * mv.dash_speed;
        }
    }

    fn walk(&mut self, core: &mut FighterCore, input: &ControllerState, cx: &mut FrameCtx<'_>) {
        let th = core.config.input;
        let mv = core.config.movement;

        if input.joy_x.abs() > th.deadzone {
            core.body.vel.x = input.joy_x * mv.walk_speed;
            core.dir = facing_of(input.joy_x);
        } else {
            core.body.halt();
        }

        if self.dash_time > mv.dash_startup_time {
            self.dashing = true;
            self.dash_time = -1.0;
        } else if self.dash_time < 0.0 && input.flicked_x(th.dash, &th) {
            self.dash_time = 0.0;
            core.body.vel.x = 0.0;
            core.dir = facing_of(input.joy_x);
            core.puff(-0.4, cx.out);
        }

        if input.joy_y < th.duck {
            self.ducking = true;
        }
    }

    pub(crate) fn collision_with_ground(
        &mut self,
        core: &mut FighterCore,
        collided: bool,
        platform: bool,
    ) -> Option<FighterState> {
        if !collided {
            let Some(attack) = core.attack.as_mut() else {
                return Some(FighterState::AirNormal(AirNormalState::new(false)));
            };
            attack.cancel();
            self.dashing = false;
            step_back_onto_ground(core);
        }
        if collided && platform && self.ducking {
            return Some(FighterState::AirNormal(AirNormalState::new(false)));
        }
        None
    }

    pub(crate) fn rect(&self, core: &FighterCore) -> Rect {
        let mut rect = core.body.rect();
        if self.ducking {
            rect.y -= rect.h / 4.0;
            rect.h /= 2.0;
        }
        rect
    }

    pub(crate) fn frame_name(&self) -> &'static str {
        if self.ducking {
            "Ducking"
        } else if self.dashing && self.wait > 0.0 {
            "DashChange"
        } else if self.dashing {
            "GroundRunning"
        } else if self.walking {
            "GroundWalking"
        } else {
            "GroundNormal"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outbox;
    use crate::moves::FighterKind;
    use crate::state::testing::{self, input, DT};

    fn step(
        state: &mut GroundState,
        core: &mut FighterCore,
        pad: &ControllerState,
    ) -> Option<FighterState> {
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        state.process_input(core, pad, DT, &mut cx)
    }

    #[test]
    fn test_jump_after_startup() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);
        let idle = ControllerState::default();

        assert!(step(&mut state, &mut core, &input(|i| i.press_y = true)).is_none());
        let mut next = None;
        for _ in 0..120 {
            next = step(&mut state, &mut core, &idle);
            if next.is_some() {
                break;
            }
        }
        assert!(matches!(next, Some(FighterState::AirNormal(_))));
        assert_eq!(core.body.vel.y, core.config.movement.hop_speed);
    }

    #[test]
    fn test_attack_cancels_jump_startup() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);

        step(&mut state, &mut core, &input(|i| i.press_y = true));
        let next = step(&mut state, &mut core, &input(|i| i.press_a = true));

        assert!(next.is_none());
        assert_eq!(state.jump_time, -1.0);
        assert_eq!(core.attack.as_ref().map(|a| a.id()), Some(MoveId::NeutralTilt));
    }

    #[test]
    fn test_side_tilt_faces_stick() {
        let mut core = testing::core(FighterKind::Stickman);
        let mut state = GroundState::standing(&mut core);
        let pad = input(|i| {
            i.press_a = true;
            i.joy_x = -0.9;
        });

        step(&mut state, &mut core, &pad);

        assert_eq!(core.dir, -1.0);
        assert_eq!(core.attack.as_ref().map(|a| a.id()), Some(MoveId::SideTilt));
    }

    #[test]
    fn test_trigger_enters_shield() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);
        let next = step(&mut state, &mut core, &input(|i| i.r_trigger = -1.0));
        assert!(matches!(next, Some(FighterState::Blocking(_))));
    }

    #[test]
    fn test_landing_lag_blocks_input() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::new(&mut core, 0.5, 0.0);
        let next = step(&mut state, &mut core, &input(|i| i.press_a = true));
        assert!(next.is_none());
        assert!(core.attack.is_none());
    }

    #[test]
    fn test_walking_off_an_edge_falls() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);
        let next = state.collision_with_ground(&mut core, false, false);
        assert!(matches!(next, Some(FighterState::AirNormal(_))));
    }

    #[test]
    fn test_attacking_off_an_edge_steps_back() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);
        let mut out = Outbox::new();
        core.body.pos.x = 420.0;
        core.start_attack(MoveId::NeutralTilt, &mut out);

        let next = state.collision_with_ground(&mut core, false, false);

        assert!(next.is_none());
        assert!(core.body.pos.x - core.body.size.x / 2.0 < 400.0);
    }

    #[test]
    fn test_ducking_halves_hurtbox() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = GroundState::standing(&mut core);
        step(&mut state, &mut core, &input(|i| i.joy_y = -1.0));
        assert!(state.is_ducking());
        assert_eq!(state.rect(&core).h, core.body.size.y / 2.0);
        assert_eq!(state.frame_name(), "Ducking");
    }
}
