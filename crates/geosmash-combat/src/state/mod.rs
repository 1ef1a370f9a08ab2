//! Fighter state machine.
//!
//! Exactly one [`FighterState`] drives a fighter at any time. Every callback
//! receives the shared [`FighterCore`] and may hand back the next state; the
//! owning [`Fighter`](crate::fighter::Fighter) installs it after the call
//! returns and runs the old state's [`FighterState::on_exit`].
//!
//! States:
//! - [`GroundState`]: walking, dashing, ducking, jump startup, ground attacks
//! - [`AirNormalState`]: drift, fast fall, air jumps, aerials, ledge grabs
//! - [`AirStunnedState`]: hitstun with one optional ground bounce
//! - [`BlockingState`]: shield, block stun, shield break and step dodge
//! - [`DodgeState`]: invincible roll
//! - [`GrabbingState`]: grab attempt, hold and throws
//! - [`LedgeGrabState`]: hanging from a ledge
//! - [`LimpState`]: held by a grabber
//! - [`RespawnState`]: invincible respawn platform
//! - `Dead`: out of lives, terminal
//! - [`SpecialState`]: per-fighter-type special moves

mod air;
mod blocking;
mod dodge;
mod grabbing;
mod ground;
mod ledge;
mod limp;
mod respawn;
mod special;
mod stunned;

pub use air::AirNormalState;
pub use blocking::BlockingState;
pub use dodge::DodgeState;
pub use grabbing::GrabbingState;
pub use ground::GroundState;
pub use ledge::LedgeGrabState;
pub use limp::LimpState;
pub use respawn::RespawnState;
pub use special::{SpecialMove, SpecialState};
pub use stunned::AirStunnedState;

use geosmash_common::Rect;
use glam::Vec2;

use crate::attack::Attack;
use crate::controller::{facing_of, ControllerState, Tilt};
use crate::entity::Entity;
use crate::events::Outbox;
use crate::fighter::FighterCore;
use crate::hit::calculate_hit_result;
use crate::moves::MoveId;
use crate::stage::StageQuery;

/// World access handed to fighter callbacks for one frame.
pub struct FrameCtx<'a> {
    /// Stage geometry and ledge occupancy
    pub stage: &'a mut dyn StageQuery,
    /// Side effects produced this frame
    pub out: &'a mut Outbox,
}

impl<'a> FrameCtx<'a> {
    /// Bundles the stage and the frame outbox.
    pub fn new(stage: &'a mut dyn StageQuery, out: &'a mut Outbox) -> Self {
        Self { stage, out }
    }
}

/// The active state of a fighter.
#[derive(Debug)]
pub enum FighterState {
    /// On the ground
    Ground(GroundState),
    /// Airborne and in control
    AirNormal(AirNormalState),
    /// Airborne in hitstun
    AirStunned(AirStunnedState),
    /// Shielding
    Blocking(BlockingState),
    /// Rolling
    Dodge(DodgeState),
    /// Grabbing or holding someone
    Grabbing(GrabbingState),
    /// Hanging from a ledge
    LedgeGrab(LedgeGrabState),
    /// Held by a grabber
    Limp(LimpState),
    /// On the respawn platform
    Respawn(RespawnState),
    /// Out of lives
    Dead,
    /// Performing a special move
    Special(SpecialState),
}

impl FighterState {
    /// Fresh respawn state.
    #[must_use]
    pub fn respawning() -> Self {
        Self::Respawn(RespawnState::new())
    }

    /// Terminal state; parks the fighter out of the world.
    pub fn dead(core: &mut FighterCore) -> Self {
        core.body.pos = Vec2::INFINITY;
        core.body.halt();
        Self::Dead
    }

    /// Reacts to this frame's controller input.
    pub fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        match self {
            Self::Ground(state) => state.process_input(core, input, dt, cx),
            Self::AirNormal(state) => state.process_input(core, input, dt, cx),
            Self::AirStunned(state) => state.process_input(core, input, dt, cx),
            Self::Blocking(state) => state.process_input(core, input, dt, cx),
            Self::Dodge(state) => state.process_input(core, dt),
            Self::Grabbing(state) => state.process_input(core, input, dt, cx),
            Self::LedgeGrab(state) => state.process_input(core, input, dt, cx),
            Self::Respawn(state) => state.process_input(core, input, dt),
            Self::Special(state) => state.process_input(core, input, dt, cx),
            Self::Limp(_) | Self::Dead => None,
        }
    }

    /// Ticks timers after the body has been integrated.
    pub fn update(&mut self, core: &mut FighterCore, dt: f32) {
        match self {
            Self::Ground(state) => state.invinc -= dt,
            Self::Blocking(state) => state.invinc -= dt,
            Self::Dodge(state) => state.invinc -= dt,
            Self::LedgeGrab(state) => state.update(dt),
            Self::Special(state) => state.update(core),
            _ => {}
        }
    }

    /// Reacts to this frame's ground contact.
    pub fn collision_with_ground(
        &mut self,
        core: &mut FighterCore,
        ground: Rect,
        collided: bool,
        platform: bool,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        match self {
            Self::Ground(state) => state.collision_with_ground(core, collided, platform),
            Self::AirNormal(state) => state.collision_with_ground(core, ground, collided, platform, cx),
            Self::AirStunned(state) => state.collision_with_ground(core, ground, collided, platform),
            Self::Dodge(state) => state.collision_with_ground(core, collided),
            Self::Grabbing(state) => state.collision_with_ground(core, collided),
            Self::Special(state) => state.collision_with_ground(core, ground, collided, platform),
            Self::Blocking(_) | Self::LedgeGrab(_) | Self::Limp(_) | Self::Respawn(_) | Self::Dead => None,
        }
    }

    /// Reacts to an incoming attack. The caller has already checked
    /// [`can_be_hit`](Self::can_be_hit) and ownership.
    pub fn hit_by_attack(
        &mut self,
        core: &mut FighterCore,
        attack: &dyn Attack,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        match self {
            Self::Blocking(state) => state.hit_by_attack(core, attack, cx),
            Self::Limp(state) => Some(state.hit_by_attack(core, attack, cx)),
            Self::Special(state) => state.hit_by_attack(core, attack, cx),
            Self::Respawn(_) => None,
            Self::Dead => {
                debug_assert!(false, "dead fighters cannot be hit");
                None
            }
            _ => Some(calculate_hit_result(core, attack, cx.out)),
        }
    }

    /// Lands the running attack on `victim`.
    pub fn attack_connected(
        &mut self,
        core: &mut FighterCore,
        victim: &mut Entity,
        cx: &mut FrameCtx<'_>,
    ) -> Option<FighterState> {
        match self {
            Self::Grabbing(state) => state.attack_connected(core, victim, cx),
            Self::Special(state) => state.attack_connected(core, victim, cx),
            _ => {
                strike(core, victim, cx);
                None
            }
        }
    }

    /// Checks if attacks can connect.
    #[must_use]
    pub fn can_be_hit(&self) -> bool {
        match self {
            Self::Ground(state) => state.invinc <= 0.0,
            Self::Blocking(state) => state.invinc <= 0.0,
            Self::Dodge(state) => state.invinc <= 0.0,
            Self::LedgeGrab(state) => state.invinc <= 0.0,
            Self::Limp(state) => state.can_be_hit(),
            Self::Respawn(_) | Self::Dead => false,
            _ => true,
        }
    }

    /// Current hurtbox.
    #[must_use]
    pub fn rect(&self, core: &FighterCore) -> Rect {
        match self {
            Self::Ground(state) => state.rect(core),
            Self::LedgeGrab(state) => state.rect(core),
            _ => core.body.rect(),
        }
    }

    /// Frame the renderer should draw when no attack runs.
    #[must_use]
    pub fn frame_name(&self) -> &'static str {
        match self {
            Self::Ground(state) => state.frame_name(),
            Self::AirNormal(state) => state.frame_name(),
            Self::AirStunned(_) => "AirStunned",
            Self::Blocking(state) => state.frame_name(),
            Self::Dodge(_) => "GroundRoll",
            Self::Grabbing(state) => state.frame_name(),
            Self::LedgeGrab(_) => "LedgeGrab",
            Self::Limp(_) => "Grabbed",
            Self::Respawn(_) => "Respawn",
            Self::Dead => "Dead",
            Self::Special(state) => state.frame_name(),
        }
    }

    /// Checks if this is the terminal state.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Exit hook, run once when the fighter leaves this state.
    pub fn on_exit(self, cx: &mut FrameCtx<'_>) {
        match self {
            Self::Grabbing(state) => state.on_exit(cx),
            Self::LedgeGrab(state) => state.on_exit(cx),
            Self::Limp(state) => state.on_exit(cx),
            _ => {}
        }
    }
}

/// Default connect: hit `victim` with the running attack and remember it.
pub(crate) fn strike(core: &mut FighterCore, victim: &mut Entity, cx: &mut FrameCtx<'_>) {
    let frame = core.owner_frame();
    let Some(attack) = core.attack.as_ref() else {
        return;
    };
    victim.hit_by_attack(&attack.bind(frame), cx);
    if let Some(attack) = core.attack.as_mut() {
        attack.record_hit(victim.id());
    }
}

/// Starts the attack picked by the stick, facing a side attack toward it.
pub(crate) fn start_directional(
    core: &mut FighterCore,
    input: &ControllerState,
    [side, down, up, neutral]: [MoveId; 4],
    out: &mut Outbox,
) {
    let id = match input.tilt(&core.config.input) {
        Tilt::Side => {
            core.dir = facing_of(input.joy_x);
            side
        }
        Tilt::Down => down,
        Tilt::Up => up,
        Tilt::Neutral => neutral,
    };
    core.start_attack(id, out);
}

/// Picks and enters the special move selected by the stick.
pub(crate) fn perform_b_move(
    core: &mut FighterCore,
    input: &ControllerState,
    on_ground: bool,
    cx: &mut FrameCtx<'_>,
) -> FighterState {
    debug_assert!(core.attack.is_none(), "special started over an attack");
    let tilt = input.tilt(&core.config.input);
    let next = SpecialState::enter(core, tilt, on_ground, cx);
    core.face_stick(input);
    FighterState::Special(next)
}

/// Horizontal air control shared by the airborne states.
pub(crate) fn air_drift(core: &mut FighterCore, input: &ControllerState, force: f32, dt: f32) -> bool {
    if input.joy_x.abs() <= core.config.input.deadzone {
        return false;
    }
    let vel = core.body.vel.x;
    if vel * input.joy_x <= 0.0 || vel.abs() < core.config.movement.jump_air_speed {
        core.body.vel.x += input.joy_x * force * dt;
    }
    true
}

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures for state tests.

    use geosmash_common::{Ownership, PlayerId, Rect, TeamId};
    use glam::Vec2;

    use super::*;
    use crate::config::testing;
    use crate::fighter::Fighter;
    use crate::moves::FighterKind;
    use crate::stage::StageLayout;

    pub(crate) const DT: f32 = 1.0 / 60.0;

    pub(crate) fn stage() -> StageLayout {
        StageLayout::from_ground(
            Rect::new(0.0, -50.0, 800.0, 100.0),
            Rect::new(0.0, 200.0, 2400.0, 1600.0),
        )
    }

    pub(crate) fn owner(player: i32) -> Ownership {
        Ownership::new(PlayerId::new(player), TeamId::new(player))
    }

    /// A core standing on the test stage.
    pub(crate) fn core(kind: FighterKind) -> FighterCore {
        let fighter = Fighter::new(testing::config(kind), owner(1), Vec2::ZERO, 3);
        let mut core = fighter.core().clone();
        core.body.pos = Vec2::new(0.0, core.body.size.y / 2.0 - 1.0);
        core.last_ground = Some(stage().ground);
        core
    }

    /// Input with only the given fields changed.
    pub(crate) fn input(edit: impl FnOnce(&mut ControllerState)) -> ControllerState {
        let mut input = ControllerState::default();
        edit(&mut input);
        input
    }
}
