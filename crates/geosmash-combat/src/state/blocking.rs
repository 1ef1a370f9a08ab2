//! Shielding.

use super::{DodgeState, FighterState, FrameCtx, GroundState};
use crate::attack::Attack;
use crate::controller::{facing_of, ControllerState};
use crate::fighter::FighterCore;
use crate::hit::{calculate_hit_result, hit_spark};

/// Shield up.
///
/// The shield only absorbs hits while no timer runs: during raise-up,
/// shield-break daze and step dodge recovery the fighter is exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockingState {
    wait: f32,
    daze: f32,
    hit_stun: f32,
    step: f32,
    step_cooldown: f32,
    pub(crate) invinc: f32,
}

impl BlockingState {
    /// Starts raising the shield.
    pub fn new(core: &FighterCore) -> Self {
        Self {
            wait: core.config.shield.startup,
            daze: 0.0,
            hit_stun: 0.0,
            step: 0.0,
            step_cooldown: core.config.step_dodge.cooldown,
            invinc: 0.0,
        }
    }

    /// Checks if a hit would land on the shield.
    #[must_use]
    pub fn is_shielding(&self) -> bool {
        !(self.wait > 0.0 || self.daze > 0.0 || self.step > 0.0)
    }

    /// Checks if the shield is broken.
    #[must_use]
    pub fn is_dazed(&self) -> bool {
        self.daze > 0.0
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        self.wait -= dt;
        self.daze -= dt;
        self.hit_stun -= dt;
        self.step -= dt;
        if self.wait > 0.0 || self.daze > 0.0 || self.hit_stun > 0.0 || self.step > 0.0 {
            return None;
        }

        let th = core.config.input;
        if !input.trigger_held(&th) {
            let lag = core.config.shield.cooldown;
            return Some(FighterState::Ground(GroundState::new(core, lag, 0.0)));
        }
        if input.flicked_x(th.dodge, &th) {
            core.dir = facing_of(input.joy_x);
            core.puff(0.4, cx.out);
            return Some(FighterState::Dodge(DodgeState::new(core)));
        }
        if input.joy_y < -th.dodge && input.joy_yv < -th.velocity {
            let step = core.config.step_dodge;
            self.invinc = step.invinc_time;
            self.step = step.invinc_time + step.cooldown;
        }

        let shield = core.config.shield;
        core.shield += shield.degen * dt;
        if core.shield < 0.0 {
            self.daze = shield.daze_time;
            core.shield = 0.0;
            cx.out.sound("shieldshatter");
        }
        None
    }

    pub(crate) fn hit_by_attack(
        &mut self,
        core: &mut FighterCore,
        attack: &dyn Attack,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        hit_spark(&core.body, attack.hitbox(), cx.out);

        if !self.is_shielding() {
            core.body.pos.y += 4.0;
            return Some(calculate_hit_result(core, attack, cx.out));
        }

        core.shield -= attack.damage();
        self.hit_stun = core.config.shield.stun_factor * attack.calc_stun(&core.body, core.damage);
        cx.out.sound("shieldhit");
        None
    }

    pub(crate) fn frame_name(&self) -> &'static str {
        if self.daze > 0.0 {
            "Dazed"
        } else if self.step > self.step_cooldown {
            "StepDodge"
        } else {
            "Blocking"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::SimpleAttack;
    use crate::events::{CombatEvent, Outbox};
    use crate::moves::FighterKind;
    use crate::state::testing::{self, input, DT};
    use geosmash_common::Rect;
    use glam::Vec2;

    fn shielded() -> (FighterCore, BlockingState) {
        let core = testing::core(FighterKind::Charlie);
        let mut state = BlockingState::new(&core);
        state.wait = 0.0;
        (core, state)
    }

    fn jab() -> SimpleAttack {
        SimpleAttack::new(Vec2::X, 40.0, 1.0, 8.0, 0.3)
            .with_hitbox(Rect::new(20.0, 20.0, 10.0, 10.0))
            .with_owner(testing::owner(2))
    }

    fn held() -> ControllerState {
        input(|i| i.l_trigger = -1.0)
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let (mut core, mut state) = shielded();
        let before = core.shield;
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let next = state.hit_by_attack(&mut core, &jab(), &mut cx);

        assert!(next.is_none());
        assert_eq!(core.shield, before - 8.0);
        assert_eq!(core.damage, 0.0);
        assert!(state.hit_stun > 0.0);
        assert!(out.events.iter().any(|e| matches!(e, CombatEvent::Sound { id, .. } if id == "shieldhit")));
    }

    #[test]
    fn test_hit_during_raise_lands() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = BlockingState::new(&core);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let next = state.hit_by_attack(&mut core, &jab(), &mut cx);

        assert!(matches!(next, Some(FighterState::AirStunned(_))));
        assert_eq!(core.damage, 8.0);
    }

    #[test]
    fn test_release_returns_to_ground() {
        let (mut core, mut state) = shielded();
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let next = state.process_input(&mut core, &ControllerState::default(), DT, &mut cx);
        assert!(matches!(next, Some(FighterState::Ground(_))));
    }

    #[test]
    fn test_shield_breaks_when_drained() {
        let (mut core, mut state) = shielded();
        core.shield = 0.001;
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        assert!(state.process_input(&mut core, &held(), DT, &mut cx).is_none());

        assert!(state.is_dazed());
        assert_eq!(core.shield, 0.0);
        assert_eq!(state.frame_name(), "Dazed");
    }

    #[test]
    fn test_step_dodge_grants_invincibility() {
        let (mut core, mut state) = shielded();
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let pad = input(|i| {
            i.l_trigger = -1.0;
            i.joy_y = -1.0;
            i.joy_yv = -1.0;
        });

        state.process_input(&mut core, &pad, DT, &mut cx);

        assert!(state.invinc > 0.0);
        assert!(!state.is_shielding());
        assert_eq!(state.frame_name(), "StepDodge");
    }
}
