//! Hanging from a ledge.

use geosmash_common::Rect;
use glam::Vec2;

use super::{AirNormalState, DodgeState, FighterState, FrameCtx, GroundState};
use crate::controller::ControllerState;
use crate::fighter::FighterCore;
use crate::moves::MoveId;
use crate::stage::LedgeId;

/// Hanging from a ledge with a shrunken hurtbox.
///
/// The ledge stays occupied for as long as this state is active and is freed
/// by the exit hook, whatever ends the hang.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgeGrabState {
    ledge: LedgeId,
    hb_size: Vec2,
    jump_time: Option<f32>,
    wait: f32,
    pub(crate) invinc: f32,
}

impl LedgeGrabState {
    /// Occupies `ledge` and hangs the fighter from it.
    pub fn grab(core: &mut FighterCore, ledge: LedgeId, ledge_pos: Vec2, cx: &mut FrameCtx<'_>) -> Self {
        let params = core.config.ledge_grab;
        cx.stage.set_ledge_occupied(ledge, true);
        core.air_jumps = 0;

        let side = if ledge_pos.x > core.body.pos.x { 1.0 } else { -1.0 };
        core.body.pos = Vec2::new(
            ledge_pos.x - side * params.hb_size.x / 2.0,
            ledge_pos.y - params.hb_size.y / 2.0,
        );
        core.body.halt();
        core.dir = side;

        Self {
            ledge,
            hb_size: params.hb_size,
            jump_time: None,
            wait: params.input_delay,
            invinc: params.grab_invinc_time,
        }
    }

    /// Ledge being held.
    #[must_use]
    pub fn ledge(&self) -> LedgeId {
        self.ledge
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        self.wait -= dt;
        if self.wait > 0.0 {
            return None;
        }

        let mv = core.config.movement;
        let th = core.config.input;
        let params = core.config.ledge_grab;
        match self.jump_time {
            Some(t) if t > 0.0 => return None,
            Some(_) => {
                let speed = if input.button_y { mv.jump_speed } else { mv.hop_speed };
                core.body.vel = Vec2::new(0.0, speed);
                core.puff(-0.1, cx.out);
                return Some(FighterState::AirNormal(AirNormalState::new(false)));
            }
            None => {}
        }

        let dir = core.dir;
        if input.press_y {
            self.jump_time = Some(mv.jump_startup_time);
            None
        } else if input.press_a {
            self.climb(core);
            core.start_attack(MoveId::Ledge, cx.out);
            Some(FighterState::Ground(GroundState::new(core, -1.0, params.attack_invinc)))
        } else if input.joy_y < th.drop {
            Some(FighterState::AirNormal(
                AirNormalState::new(false).with_no_grab_time(params.drop_time),
            ))
        } else if input.trigger_held(&th) {
            self.climb(core);
            Some(FighterState::Dodge(DodgeState::new(core)))
        } else if (input.joy_x * dir > th.tilt && input.joy_xv * dir > th.velocity)
            || (input.joy_y > th.tilt && input.joy_yv > th.velocity)
        {
            self.climb(core);
            Some(FighterState::Ground(GroundState::new(
                core,
                params.wakeup_time,
                params.wake_up_invinc,
            )))
        } else {
            None
        }
    }

    fn climb(&self, core: &mut FighterCore) {
        core.body.push(Vec2::new(core.dir * self.hb_size.x / 2.0, core.body.size.y - 1.0));
    }

    pub(crate) fn update(&mut self, dt: f32) {
        self.invinc -= dt;
        if let Some(t) = self.jump_time.as_mut() {
            *t -= dt;
        }
    }

    pub(crate) fn rect(&self, core: &FighterCore) -> Rect {
        Rect::from_center(core.body.pos, self.hb_size)
    }

    pub(crate) fn on_exit(self, cx: &mut FrameCtx<'_>) {
        cx.stage.set_ledge_occupied(self.ledge, false);
    }
}
