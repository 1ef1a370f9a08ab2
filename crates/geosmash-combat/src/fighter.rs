//! The fighter aggregate.
//!
//! A [`Fighter`] is split in two halves:
//! - [`FighterCore`]: body, facing, damage, shield, lives, the running attack
//!   and the per-airborne-period bookkeeping. Every state reads and writes it.
//! - [`FighterState`]: the single active state, which owns the per-frame
//!   control logic and hands back the next state when it wants to leave.
//!
//! Transitions are installed by [`Fighter`] only, after the state call that
//! produced them returns, so a state never replaces itself mid-call. Leaving a
//! state runs its exit hook, which is where held grabs are released and
//! occupied ledges are freed.

use std::sync::Arc;

use geosmash_common::{EntityId, Ownership, PlayerId, Rect, TeamId};
use glam::Vec2;
use tracing::{debug, error, info, warn};

use crate::attack::{Attack, ClashInfo};
use crate::body::Body;
use crate::config::FighterConfig;
use crate::controller::ControllerState;
use crate::entity::Entity;
use crate::events::{Outbox, Stat, StatChange};
use crate::fighter_attack::{BoundAttack, FighterAttack, OwnerFrame};
use crate::grab::{GrabId, LimpAction, LimpCommand, LimpHandle};
use crate::hit;
use crate::moves::{FighterKind, MoveId};
use crate::state::{AirNormalState, FighterState, FrameCtx, LimpState};

/// Fighter data shared by every state.
#[derive(Debug, Clone)]
pub struct FighterCore {
    /// Physical body
    pub body: Body,
    /// Facing, -1 or +1
    pub dir: f32,
    /// Accumulated damage percentage
    pub damage: f32,
    /// Shield health
    pub shield: f32,
    /// Remaining lives
    pub lives: u32,
    /// Running attack
    pub attack: Option<FighterAttack>,
    /// Player credited if this fighter is knocked out. Landing keeps it;
    /// only a respawn clears it.
    pub last_hit_by: PlayerId,
    /// Last ground or platform touched
    pub last_ground: Option<Rect>,
    /// Air jumps used since the last landing
    pub air_jumps: u32,
    /// Where respawns place the fighter
    pub respawn_point: Vec2,
    /// Resolved tunables
    pub config: Arc<FighterConfig>,
}

impl FighterCore {
    /// Fighter type.
    #[must_use]
    pub fn kind(&self) -> FighterKind {
        self.config.kind
    }

    /// Checks if the running attack has its hitbox out.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        self.attack.as_ref().is_some_and(FighterAttack::has_hitbox)
    }

    /// Snapshot of the owner data an attack needs.
    #[must_use]
    pub fn owner_frame(&self) -> OwnerFrame {
        OwnerFrame::of(&self.body, self.dir)
    }

    /// The running attack, bound to this fighter.
    #[must_use]
    pub fn bound_attack(&self) -> Option<BoundAttack<'_>> {
        let frame = self.owner_frame();
        self.attack.as_ref().map(|attack| attack.bind(frame))
    }

    /// Replaces any running attack with a fresh copy of `id`.
    pub fn start_attack(&mut self, id: MoveId, out: &mut Outbox) {
        self.drop_attack();
        match self.config.instantiate(id) {
            Ok(mut attack) => {
                attack.start(&mut self.body, self.dir, out);
                debug!("{} starts {}", self.body.id, id);
                self.attack = Some(attack);
            }
            Err(err) => error!("{} cannot start {}: {}", self.body.id, id, err),
        }
    }

    /// Finishes and discards the running attack.
    pub fn drop_attack(&mut self) {
        if let Some(mut attack) = self.attack.take() {
            attack.finish(&mut self.body);
        }
    }

    /// Dust puff at the feet, `along` body widths toward the facing.
    pub fn puff(&self, along: f32, out: &mut Outbox) {
        out.puff(
            Vec2::new(
                self.body.pos.x + self.body.size.x * self.dir * along,
                self.body.pos.y - self.body.size.y * 0.45,
            ),
            0.3,
        );
    }

    /// Turns toward the stick when it is outside the deadzone.
    pub fn face_stick(&mut self, input: &ControllerState) {
        if let Some(dir) = input.stick_facing(&self.config.input) {
            self.dir = dir;
        }
    }
}

/// A playable fighter.
#[derive(Debug)]
pub struct Fighter {
    core: FighterCore,
    state: FighterState,
}

impl Fighter {
    /// Creates a fighter on its respawn platform.
    #[must_use]
    pub fn new(config: Arc<FighterConfig>, owner: Ownership, respawn_point: Vec2, lives: u32) -> Self {
        let body = Body::new(owner, respawn_point, config.size);
        let mut core = FighterCore {
            body,
            dir: 1.0,
            damage: 0.0,
            shield: config.shield.max_health,
            lives,
            attack: None,
            last_hit_by: PlayerId::NONE,
            last_ground: None,
            air_jumps: 0,
            respawn_point,
            config,
        };
        let state = if lives == 0 {
            FighterState::dead(&mut core)
        } else {
            FighterState::respawning()
        };
        Self { core, state }
    }

    /// Entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.core.body.id
    }

    /// Owning player.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.core.body.owner.player
    }

    /// Team.
    #[must_use]
    pub fn team(&self) -> TeamId {
        self.core.body.owner.team
    }

    /// Shared fighter data.
    #[must_use]
    pub fn core(&self) -> &FighterCore {
        &self.core
    }

    /// Physical body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.core.body
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> &FighterState {
        &self.state
    }

    /// Accumulated damage.
    #[must_use]
    pub fn damage(&self) -> f32 {
        self.core.damage
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(&self) -> u32 {
        self.core.lives
    }

    /// Shield health.
    #[must_use]
    pub fn shield(&self) -> f32 {
        self.core.shield
    }

    /// Facing.
    #[must_use]
    pub fn dir(&self) -> f32 {
        self.core.dir
    }

    /// Player credited with the next knockout.
    #[must_use]
    pub fn last_hit_by(&self) -> PlayerId {
        self.core.last_hit_by
    }

    /// Checks if the fighter still has lives.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.core.lives > 0
    }

    /// Frame the renderer should draw: the attack's if one runs.
    #[must_use]
    pub fn frame_name(&self) -> &'static str {
        match &self.core.attack {
            Some(attack) => attack.frame_name(),
            None => self.state.frame_name(),
        }
    }

    /// Current hurtbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.state.rect(&self.core)
    }

    /// Checks if attacks can currently connect.
    #[must_use]
    pub fn can_be_hit(&self) -> bool {
        self.state.can_be_hit()
    }

    /// Checks if the running attack has its hitbox out.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        self.core.has_attack()
    }

    /// The running attack, bound to this fighter.
    #[must_use]
    pub fn attack(&self) -> Option<BoundAttack<'_>> {
        self.core.bound_attack()
    }

    /// Advances the running attack, then lets the state react to input.
    pub fn process_input(&mut self, input: &ControllerState, dt: f32, cx: &mut FrameCtx<'_>) {
        let core = &mut self.core;
        if let Some(attack) = core.attack.as_mut() {
            attack.update(dt, &mut core.body, core.dir, cx.out);
            if attack.is_done() {
                core.drop_attack();
            }
        }

        let next = self.state.process_input(&mut self.core, input, dt, cx);
        self.install(next, cx);
    }

    /// Integrates the body, regenerates shield and ticks state timers.
    pub fn update(&mut self, dt: f32) {
        self.core.body.integrate(dt);
        let shield = &self.core.config.shield;
        self.core.shield = (self.core.shield + shield.regen * dt).min(shield.max_health);
        self.state.update(&mut self.core, dt);
    }

    /// Reports this frame's ground contact.
    pub fn collision_with_ground(&mut self, ground: Rect, collided: bool, platform: bool, cx: &mut FrameCtx<'_>) {
        if collided {
            self.core.last_ground = Some(ground);
        }
        let next = self.state.collision_with_ground(&mut self.core, ground, collided, platform, cx);
        self.install(next, cx);
    }

    /// Resolves a clash against another hitbox.
    pub fn attack_collision(&mut self, other: &ClashInfo) {
        if let Some(attack) = self.core.attack.as_mut() {
            attack.attack_collision(other);
        }
    }

    /// Applies an incoming attack. Attacks owned by the same player are ignored.
    pub fn hit_by_attack(&mut self, attack: &dyn Attack, cx: &mut FrameCtx<'_>) {
        let attacker = attack.owner().player;
        if attacker == self.player() {
            return;
        }
        let next = self.state.hit_by_attack(&mut self.core, attack, cx);
        self.install(next, cx);
        self.core.last_hit_by = attacker;
    }

    /// Lands the running attack on `victim`.
    pub fn attack_connected(&mut self, victim: &mut Entity, cx: &mut FrameCtx<'_>) {
        debug_assert!(self.core.attack.is_some(), "connect without an attack");
        if self.core.attack.is_none() || victim.owner().player == self.player() {
            return;
        }
        let next = self.state.attack_connected(&mut self.core, victim, cx);
        self.install(next, cx);
    }

    /// Resets the fighter after a fall or at match start.
    ///
    /// A kill costs a life; the last life leaves the fighter dead.
    pub fn respawn(&mut self, killed: bool, cx: &mut FrameCtx<'_>) {
        let core = &mut self.core;
        core.drop_attack();
        core.body.pos = core.respawn_point;
        core.body.halt();
        core.damage = 0.0;
        core.last_hit_by = PlayerId::NONE;
        core.air_jumps = 0;

        let player = core.body.owner.player;
        cx.out.stat(player, Stat::CurKillStreak, StatChange::Set(0.0));
        cx.out.stat(player, Stat::DamageStreak, StatChange::Set(0.0));

        if killed {
            core.lives = core.lives.saturating_sub(1);
            cx.out.sound("ko");
            cx.out.stat(player, Stat::Deaths, StatChange::Add(1.0));
            info!("{} lost a life, {} left", player, core.lives);
        }

        let next = if core.lives == 0 {
            FighterState::dead(core)
        } else {
            FighterState::respawning()
        };
        self.install(Some(next), cx);
    }

    /// Gives control to a grabber.
    ///
    /// The returned handle is the only way to release or throw the fighter.
    pub fn go_limp(&mut self, grabber: EntityId, pos: Vec2, facing: f32, cx: &mut FrameCtx<'_>) -> LimpHandle {
        self.core.drop_attack();
        let grab = GrabId::new();
        self.install(Some(FighterState::Limp(LimpState::new(grabber, grab))), cx);

        self.core.body.pos = pos;
        self.core.body.halt();
        self.core.dir = facing;
        debug!("{} grabbed by {} ({})", self.id(), grabber, grab);
        LimpHandle::new(grab, self.id())
    }

    /// Applies a release or throw from the current grabber.
    pub fn apply_limp_command(&mut self, command: LimpCommand, cx: &mut FrameCtx<'_>) {
        let id = self.id();
        let FighterState::Limp(limp) = &mut self.state else {
            warn!("{} ignores stale {} command: not limp", id, command.grab);
            return;
        };
        if limp.grab() != command.grab {
            warn!("{} ignores stale {} command", id, command.grab);
            return;
        }
        limp.settle();

        let next = match command.action {
            LimpAction::Release => FighterState::AirNormal(AirNormalState::new(false)),
            LimpAction::Hit(attack) => {
                let attacker = attack.owner().player;
                if attacker.is_player() {
                    self.core.last_hit_by = attacker;
                }
                hit::calculate_hit_result(&mut self.core, &*attack, cx.out)
            }
        };
        self.install(Some(next), cx);
    }

    /// Forgets a victim that broke free.
    pub fn grab_disconnected(&mut self, grab: GrabId) {
        let id = self.id();
        match &mut self.state {
            FighterState::Grabbing(grabbing) => grabbing.victim_disconnected(grab),
            _ => debug!("{} got a disconnect for {} while not grabbing", id, grab),
        }
    }

    /// Moves the fighter without touching its velocity.
    pub fn push(&mut self, offset: Vec2) {
        self.core.body.push(offset);
    }

    /// Faces the other way.
    pub fn turn_around(&mut self) {
        self.core.dir = -self.core.dir;
    }

    /// Gives one life to a teammate. Only possible with lives to spare.
    pub fn steal_life(&mut self) -> bool {
        if self.core.lives > 1 {
            self.core.lives -= 1;
            true
        } else {
            false
        }
    }

    /// Adds lives; a dead fighter comes back on its respawn platform.
    pub fn add_lives(&mut self, delta: u32, cx: &mut FrameCtx<'_>) {
        debug_assert!(delta > 0);
        let was_dead = self.core.lives == 0;
        self.core.lives += delta;
        if was_dead && delta > 0 {
            info!("{} revived with {} lives", self.player(), self.core.lives);
            self.respawn(false, cx);
        }
    }

    fn install(&mut self, next: Option<FighterState>, cx: &mut FrameCtx<'_>) {
        if let Some(next) = next {
            debug!(
                "{}: {} -> {}",
                self.core.body.id,
                self.state.frame_name(),
                next.frame_name()
            );
            let old = std::mem::replace(&mut self.state, next);
            old.on_exit(cx);
        }
    }
}
