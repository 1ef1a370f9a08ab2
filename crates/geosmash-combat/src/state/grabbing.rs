//! Grabs and throws.

use glam::Vec2;
use tracing::debug;

use super::{AirNormalState, FighterState, FrameCtx, GroundState};
use crate::controller::ControllerState;
use crate::entity::Entity;
use crate::events::Outbox;
use crate::fighter::FighterCore;
use crate::grab::{GrabId, LimpHandle};
use crate::hit::step_back_onto_ground;
use crate::moves::MoveId;

/// Grab attempt, then holding a limp victim until a throw or the hold timer
/// runs out.
///
/// The victim is only ever reached through its [`LimpHandle`]; leaving this
/// state with the handle still held releases the victim.
#[derive(Debug)]
pub struct GrabbingState {
    victim: Option<LimpHandle>,
    hold_left: f32,
    frame: &'static str,
}

impl GrabbingState {
    /// Starts the grab attack.
    pub fn enter(core: &mut FighterCore, out: &mut Outbox) -> Self {
        debug_assert!(core.attack.is_none(), "grab started over an attack");
        core.start_attack(MoveId::Grab, out);
        Self {
            victim: None,
            hold_left: -1.0,
            frame: "GrabAttempt",
        }
    }

    /// Checks if someone is being held.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.victim.is_some()
    }

    /// Forgets the victim after it broke free on its own.
    pub fn victim_disconnected(&mut self, grab: GrabId) {
        if self.victim.as_ref().is_some_and(|handle| handle.grab() == grab) {
            if let Some(handle) = self.victim.take() {
                handle.disconnected();
            }
        }
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        let params = core.config.grab;
        self.hold_left -= dt;
        core.body.accel = -params.speed_damping * core.body.vel;

        if core.attack.is_none() && self.victim.is_none() {
            core.body.accel = Vec2::ZERO;
            return Some(FighterState::Ground(GroundState::standing(core)));
        }

        let Some(handle) = self.victim.take() else {
            return None;
        };
        if self.hold_left < 0.0 {
            cx.out.limp_commands.push(handle.release());
            core.body.accel = Vec2::ZERO;
            return Some(FighterState::Ground(GroundState::new(core, params.release_cooldown, 0.0)));
        }

        let th = core.config.input;
        let throws = core.config.throws;
        let choice = if input.joy_x.abs() > th.throw
            && input.joy_xv.abs() > th.velocity
            && input.joy_xv * input.joy_x >= 0.0
        {
            if input.joy_x * core.dir >= 0.0 {
                Some((throws.front, "FrontThrow"))
            } else {
                Some((throws.back, "BackThrow"))
            }
        } else if input.joy_y > th.throw && input.joy_yv > th.velocity {
            Some((throws.up, "UpThrow"))
        } else {
            None
        };

        match choice {
            Some((spec, frame)) => {
                let attack = spec.attack(core.dir, core.body.rect(), core.body.owner);
                debug!("{} throws {} ({})", core.body.id, handle.victim(), frame);
                cx.out.limp_commands.push(handle.throw(attack));
                cx.out.sound("throw");
                self.frame = frame;
            }
            None => self.victim = Some(handle),
        }
        None
    }

    pub(crate) fn collision_with_ground(&mut self, core: &mut FighterCore, collided: bool) -> Option<FighterState> {
        if !collided {
            let Some(attack) = core.attack.as_mut() else {
                return Some(FighterState::AirNormal(AirNormalState::new(false)));
            };
            attack.cancel();
            step_back_onto_ground(core);
        }
        None
    }

    pub(crate) fn attack_connected(
        &mut self,
        core: &mut FighterCore,
        victim: &mut Entity,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        if self.victim.is_some() {
            return None;
        }
        let Some(fighter) = victim.as_fighter_mut() else {
            return None;
        };

        let size = fighter.body().size;
        let hold_at = Vec2::new(
            core.body.pos.x + core.dir * (core.body.size.x / 2.0 + size.x / 3.0),
            core.body.pos.y - core.body.size.y / 2.0 + size.y / 2.0,
        );
        self.victim = Some(fighter.go_limp(core.body.id, hold_at, -core.dir, cx));
        self.hold_left = core.config.grab.hold_time;

        if let Some(attack) = core.attack.as_mut() {
            attack.kill();
        }
        core.body.halt();
        self.frame = "Grabbing";
        None
    }

    pub(crate) fn frame_name(&self) -> &'static str {
        self.frame
    }

    pub(crate) fn on_exit(self, cx: &mut FrameCtx<'_>) {
        if let Some(handle) = self.victim {
            debug!("releasing {} on exit", handle.victim());
            cx.out.limp_commands.push(handle.release());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::Fighter;
    use crate::grab::LimpAction;
    use crate::moves::FighterKind;
    use crate::state::testing::{self, input, DT};
    use crate::config::testing as config;

    fn victim() -> Entity {
        let fighter = Fighter::new(config::config(FighterKind::Stickman), testing::owner(2), Vec2::new(30.0, 0.0), 3);
        Entity::Fighter(Box::new(fighter))
    }

    fn holding() -> (FighterCore, GrabbingState, Entity) {
        let mut core = testing::core(FighterKind::Charlie);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = GrabbingState::enter(&mut core, cx.out);
        let mut target = victim();

        assert!(state.attack_connected(&mut core, &mut target, &mut cx).is_none());
        (core, state, target)
    }

    #[test]
    fn test_connect_makes_victim_limp() {
        let (core, state, target) = holding();
        assert!(state.is_holding());
        assert_eq!(state.frame_name(), "Grabbing");
        assert!(core.attack.as_ref().is_some_and(|a| a.is_done()));

        let fighter = target.as_fighter().expect("fighter");
        assert!(matches!(fighter.state(), FighterState::Limp(_)));
        assert_eq!(fighter.dir(), -core.dir);
    }

    #[test]
    fn test_throw_consumes_handle() {
        let (mut core, mut state, _target) = holding();
        core.drop_attack();
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let pad = input(|i| {
            i.joy_y = 1.0;
            i.joy_yv = 1.0;
        });

        assert!(state.process_input(&mut core, &pad, DT, &mut cx).is_none());

        assert!(!state.is_holding());
        assert_eq!(state.frame_name(), "UpThrow");
        assert_eq!(out.limp_commands.len(), 1);
        assert!(matches!(out.limp_commands[0].action, LimpAction::Hit(_)));
    }

    #[test]
    fn test_hold_timeout_releases() {
        let (mut core, mut state, _target) = holding();
        core.drop_attack();
        state.hold_left = 0.0;
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let next = state.process_input(&mut core, &ControllerState::default(), DT, &mut cx);

        assert!(matches!(next, Some(FighterState::Ground(_))));
        assert!(matches!(out.limp_commands[0].action, LimpAction::Release));
    }

    #[test]
    fn test_exit_releases_held_victim() {
        let (_core, state, _target) = holding();
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        state.on_exit(&mut cx);

        assert_eq!(out.limp_commands.len(), 1);
    }

    #[test]
    fn test_whiffed_grab_returns_to_ground() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut out = Outbox::new();
        let mut state = GrabbingState::enter(&mut core, &mut out);
        core.drop_attack();
        let mut stage = testing::stage();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let next = state.process_input(&mut core, &ControllerState::default(), DT, &mut cx);
        assert!(matches!(next, Some(FighterState::Ground(_))));
    }
}
