//! Special moves.
//!
//! Both fighter types share the down special (a counter stance). The other
//! three slots depend on the type:
//!
//! | stick   | charlie                   | stickman                  |
//! |---------|---------------------------|---------------------------|
//! | up      | launch up, then helpless  | teleport, then helpless   |
//! | side    | rushing dash              | reflecting cape           |
//! | neutral | projectile throw          | charge, then hop          |

use geosmash_common::Rect;
use glam::Vec2;

use super::{strike, AirNormalState, AirStunnedState, FighterState, FrameCtx, GroundState};
use crate::attack::Attack;
use crate::config::SpecialParams;
use crate::controller::{ControllerState, Tilt};
use crate::entity::Entity;
use crate::fighter::FighterCore;
use crate::hit::{calculate_hit_result, check_for_ledge_grab, collision_helper, stick_direction};
use crate::moves::{FighterKind, MoveId};

/// Which special is running, with its progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpecialMove {
    /// Charlie up special
    LaunchUp,
    /// Charlie side special
    Rush,
    /// Charlie neutral special
    Throw,
    /// Down special; `t` is time in the stance
    Counter {
        /// Time since the stance started
        t: f32,
    },
    /// Stickman up special
    Teleport {
        /// Whether the jump already happened
        teleported: bool,
    },
    /// Stickman neutral special
    ChargeHop,
    /// Stickman side special
    Cape,
}

/// Performing a special move.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecialState {
    on_ground: bool,
    mv: SpecialMove,
}

impl SpecialState {
    /// Starts the special the stick selects for this fighter type.
    pub fn enter(core: &mut FighterCore, tilt: Tilt, on_ground: bool, cx: &mut FrameCtx<'_>) -> Self {
        let out = &mut *cx.out;
        let mv = match (tilt, core.kind()) {
            (Tilt::Down, _) => SpecialMove::Counter { t: 0.0 },
            (Tilt::Up, FighterKind::Charlie) => {
                core.start_attack(MoveId::UpSpecial, out);
                core.body.push(Vec2::new(0.0, 2.0));
                SpecialMove::LaunchUp
            }
            (Tilt::Side, FighterKind::Charlie) => {
                core.start_attack(MoveId::SideSpecial, out);
                SpecialMove::Rush
            }
            (Tilt::Neutral, FighterKind::Charlie) => {
                core.start_attack(MoveId::NeutralSpecial, out);
                SpecialMove::Throw
            }
            (Tilt::Up, FighterKind::Stickman) => {
                core.start_attack(MoveId::UpSpecial, out);
                SpecialMove::Teleport { teleported: false }
            }
            (Tilt::Side, FighterKind::Stickman) => {
                core.start_attack(MoveId::SideSpecial, out);
                SpecialMove::Cape
            }
            (Tilt::Neutral, FighterKind::Stickman) => {
                core.start_attack(MoveId::NeutralSpecial, out);
                SpecialMove::ChargeHop
            }
        };
        Self { on_ground, mv }
    }

    /// Running special.
    #[must_use]
    pub fn special_move(&self) -> SpecialMove {
        self.mv
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        let on_ground = self.on_ground;
        match &mut self.mv {
            SpecialMove::LaunchUp => {
                if core.attack.is_none() {
                    return Some(FighterState::AirStunned(AirStunnedState::helpless(core)));
                }
                if core.has_attack() {
                    if let SpecialParams::Charlie { launch, .. } = core.config.special {
                        core.body.vel = Vec2::new(core.dir * launch.x, launch.y);
                    }
                }
                check_for_ledge_grab(core, true, cx)
            }
            SpecialMove::Rush => {
                if core.attack.is_none() {
                    return Some(settle(core, on_ground));
                }
                check_for_ledge_grab(core, true, cx)
            }
            SpecialMove::Throw | SpecialMove::Cape => core.attack.is_none().then(|| settle(core, on_ground)),
            SpecialMove::Counter { t } => {
                *t += dt;
                (core.attack.is_none() && *t > core.config.counter.total()).then(|| settle(core, on_ground))
            }
            SpecialMove::Teleport { teleported } => {
                if core.has_attack() && !*teleported {
                    teleport(core, input, cx);
                    *teleported = true;
                }
                if core.attack.is_none() {
                    return Some(if on_ground {
                        core.body.vel = Vec2::ZERO;
                        FighterState::Ground(GroundState::standing(core))
                    } else {
                        FighterState::AirStunned(AirStunnedState::helpless(core))
                    });
                }
                check_for_ledge_grab(core, true, cx)
            }
            SpecialMove::ChargeHop => {
                if core.attack.is_some() {
                    return None;
                }
                let SpecialParams::Stickman { hop_speed, .. } = core.config.special else {
                    return Some(settle(core, on_ground));
                };
                let dir = stick_direction(input.joy_x, input.joy_y).unwrap_or(Vec2::Y);
                core.body.vel = dir * hop_speed;
                if dir.x != 0.0 {
                    core.dir = dir.x.signum();
                }
                if on_ground {
                    core.body.vel = Vec2::ZERO;
                    Some(FighterState::Ground(GroundState::standing(core)))
                } else {
                    core.air_jumps = core.config.movement.max_air_jumps;
                    Some(FighterState::AirNormal(AirNormalState::new(false)))
                }
            }
        }
    }

    pub(crate) fn update(&mut self, core: &mut FighterCore) {
        if self.mv != SpecialMove::Rush {
            return;
        }
        let SpecialParams::Charlie {
            dash_xvel,
            dash_end_xvel,
            ..
        } = core.config.special
        else {
            return;
        };
        if core.has_attack() {
            core.body.vel = Vec2::new(core.dir * dash_xvel, 0.0);
        } else if core.attack.is_some() && !self.on_ground {
            core.body.vel.x = dash_end_xvel * core.dir;
        } else {
            core.body.vel.x = 0.0;
        }
    }

    pub(crate) fn collision_with_ground(
        &mut self,
        core: &mut FighterCore,
        ground: Rect,
        collided: bool,
        platform: bool,
    ) -> Option<FighterState> {
        if collided {
            let xvel = core.body.vel.x;
            collision_helper(&mut core.body, ground, platform);
            core.body.halt();
            if self.mv == SpecialMove::Rush {
                core.body.vel.x = xvel;
            }
            self.on_ground = true;
        } else {
            self.on_ground = false;
            core.body.accel = Vec2::new(0.0, core.config.movement.air_accel);
        }
        None
    }

    pub(crate) fn hit_by_attack(
        &mut self,
        core: &mut FighterCore,
        attack: &dyn Attack,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        let SpecialMove::Counter { t } = self.mv else {
            return Some(calculate_hit_result(core, attack, cx.out));
        };
        if core.attack.is_some() {
            return None;
        }
        let counter = core.config.counter;
        if t < counter.startup || t > counter.window_end() {
            return Some(calculate_hit_result(core, attack, cx.out));
        }

        core.dir = attack.origin_direction(&core.body);
        core.start_attack(MoveId::CounterAttack, cx.out);
        if let Some(riposte) = core.attack.as_mut() {
            riposte.set_base_knockback(attack.damage() * counter.kb_scaling);
        }
        cx.out.sound("counterhit");
        None
    }

    pub(crate) fn attack_connected(
        &mut self,
        core: &mut FighterCore,
        victim: &mut Entity,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        match self.mv {
            // Lift the victim so the recovery hitbox carries it up.
            SpecialMove::LaunchUp => victim.push(Vec2::new(0.0, 20.0)),
            SpecialMove::Cape => {
                if let Some(fighter) = victim.as_fighter_mut() {
                    fighter.turn_around();
                }
            }
            _ => {}
        }
        strike(core, victim, cx);
        None
    }

    pub(crate) fn frame_name(&self) -> &'static str {
        match self.mv {
            SpecialMove::LaunchUp | SpecialMove::Teleport { .. } => "UpSpecial",
            SpecialMove::Rush => "SideSpecial",
            SpecialMove::Throw | SpecialMove::ChargeHop => "NeutralSpecial",
            SpecialMove::Counter { .. } => "Counter",
            SpecialMove::Cape => "Cape",
        }
    }
}

fn settle(core: &mut FighterCore, on_ground: bool) -> FighterState {
    if on_ground {
        core.body.vel = Vec2::ZERO;
        FighterState::Ground(GroundState::standing(core))
    } else {
        FighterState::AirNormal(AirNormalState::new(false))
    }
}

fn teleport(core: &mut FighterCore, input: &ControllerState, cx: &mut FrameCtx<'_>) {
    let SpecialParams::Stickman {
        teleport_dist,
        teleport_momentum,
        ..
    } = core.config.special
    else {
        return;
    };
    cx.out.puff(core.body.pos, 0.5);

    let dir = stick_direction(input.joy_x, input.joy_y).unwrap_or(Vec2::Y);
    core.body.pos += dir * teleport_dist;
    core.body.vel = dir * teleport_momentum;
    core.body.accel = Vec2::ZERO;
    if dir.x != 0.0 {
        core.dir = dir.x.signum();
    }
    cx.out.puff(core.body.pos, 0.4);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::SimpleAttack;
    use crate::config::testing as config;
    use crate::events::{CombatEvent, Outbox};
    use crate::fighter::Fighter;
    use crate::state::testing::{self, input, DT};

    /// One frame the way the fighter runs it: advance the attack, then input.
    fn tick(
        core: &mut FighterCore,
        state: &mut SpecialState,
        pad: &ControllerState,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        if let Some(attack) = core.attack.as_mut() {
            attack.update(DT, &mut core.body, core.dir, cx.out);
            if attack.is_done() {
                core.drop_attack();
            }
        }
        state.process_input(core, pad, DT, cx)
    }

    fn airborne(kind: FighterKind) -> FighterCore {
        let mut core = testing::core(kind);
        core.body.pos = Vec2::new(0.0, 300.0);
        core
    }

    fn jab() -> SimpleAttack {
        SimpleAttack::new(Vec2::X, 40.0, 1.0, 12.0, 0.3)
            .with_hitbox(Rect::new(-20.0, 20.0, 10.0, 10.0))
            .with_owner(testing::owner(2))
    }

    #[test]
    fn test_specials_follow_fighter_type() {
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        let mut charlie = testing::core(FighterKind::Charlie);
        let state = SpecialState::enter(&mut charlie, Tilt::Side, true, &mut cx);
        assert_eq!(state.special_move(), SpecialMove::Rush);
        assert_eq!(charlie.attack.as_ref().map(|a| a.id()), Some(MoveId::SideSpecial));

        let mut stickman = testing::core(FighterKind::Stickman);
        let state = SpecialState::enter(&mut stickman, Tilt::Side, true, &mut cx);
        assert_eq!(state.special_move(), SpecialMove::Cape);
        assert_eq!(state.frame_name(), "Cape");

        let state = SpecialState::enter(&mut testing::core(FighterKind::Stickman), Tilt::Down, true, &mut cx);
        assert_eq!(state.special_move(), SpecialMove::Counter { t: 0.0 });
    }

    #[test]
    fn test_launch_up_ends_helpless() {
        let mut core = airborne(FighterKind::Charlie);
        let SpecialParams::Charlie { launch, .. } = core.config.special else {
            panic!("charlie params");
        };
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Up, false, &mut cx);
        let idle = ControllerState::default();

        let mut launched = false;
        let mut next = None;
        for _ in 0..600 {
            next = tick(&mut core, &mut state, &idle, &mut cx);
            if core.has_attack() {
                launched = true;
                assert_eq!(core.body.vel, Vec2::new(launch.x, launch.y));
            }
            if next.is_some() {
                break;
            }
        }
        assert!(launched);
        match next {
            Some(FighterState::AirStunned(stunned)) => assert!(stunned.duration().is_infinite()),
            other => panic!("expected a helpless fall, got {other:?}"),
        }
    }

    #[test]
    fn test_rush_drives_the_fighter() {
        let mut core = testing::core(FighterKind::Charlie);
        let SpecialParams::Charlie { dash_xvel, .. } = core.config.special else {
            panic!("charlie params");
        };
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Side, true, &mut cx);
        let idle = ControllerState::default();

        while !core.has_attack() {
            assert!(tick(&mut core, &mut state, &idle, &mut cx).is_none());
        }
        state.update(&mut core);
        assert_eq!(core.body.vel, Vec2::new(dash_xvel, 0.0));
    }

    #[test]
    fn test_counter_window_ripostes() {
        let mut core = testing::core(FighterKind::Charlie);
        let counter = core.config.counter;
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Down, true, &mut cx);
        state.mv = SpecialMove::Counter {
            t: counter.startup + counter.duration / 2.0,
        };

        let next = state.hit_by_attack(&mut core, &jab(), &mut cx);

        assert!(next.is_none());
        assert_eq!(core.damage, 0.0);
        assert_eq!(core.attack.as_ref().map(|a| a.id()), Some(MoveId::CounterAttack));
        assert!(out
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::Sound { id, .. } if id == "counterhit")));
    }

    #[test]
    fn test_counter_outside_window_is_hit() {
        let mut core = testing::core(FighterKind::Stickman);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Down, true, &mut cx);
        state.mv = SpecialMove::Counter {
            t: core.config.counter.window_end() + 0.01,
        };

        let next = state.hit_by_attack(&mut core, &jab(), &mut cx);

        assert!(matches!(next, Some(FighterState::AirStunned(_))));
        assert_eq!(core.damage, 12.0);
    }

    #[test]
    fn test_teleport_follows_stick() {
        let mut core = airborne(FighterKind::Stickman);
        let SpecialParams::Stickman { teleport_dist, .. } = core.config.special else {
            panic!("stickman params");
        };
        core.dir = -1.0;
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Up, false, &mut cx);
        let right = input(|i| i.joy_x = 1.0);

        while state.special_move() == (SpecialMove::Teleport { teleported: false }) {
            assert!(tick(&mut core, &mut state, &right, &mut cx).is_none());
        }

        assert_eq!(core.body.pos, Vec2::new(teleport_dist, 300.0));
        assert_eq!(core.dir, 1.0);
        assert_eq!(core.body.accel, Vec2::ZERO);
    }

    #[test]
    fn test_air_hop_spends_air_jumps() {
        let mut core = airborne(FighterKind::Stickman);
        let SpecialParams::Stickman { hop_speed, .. } = core.config.special else {
            panic!("stickman params");
        };
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Neutral, false, &mut cx);
        let idle = ControllerState::default();

        let next = (0..600)
            .find_map(|_| tick(&mut core, &mut state, &idle, &mut cx))
            .expect("hop ends the special");

        assert!(matches!(next, FighterState::AirNormal(_)));
        assert_eq!(core.body.vel, Vec2::new(0.0, hop_speed));
        assert_eq!(core.air_jumps, core.config.movement.max_air_jumps);
    }

    #[test]
    fn test_cape_turns_victim_around() {
        let mut core = testing::core(FighterKind::Stickman);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);
        let mut state = SpecialState::enter(&mut core, Tilt::Side, true, &mut cx);
        let victim = Fighter::new(config::config(FighterKind::Charlie), testing::owner(2), Vec2::new(20.0, 0.0), 3);
        let mut victim = Entity::Fighter(Box::new(victim));

        state.attack_connected(&mut core, &mut victim, &mut cx);

        assert_eq!(victim.as_fighter().map(Fighter::dir), Some(-1.0));
    }
}
