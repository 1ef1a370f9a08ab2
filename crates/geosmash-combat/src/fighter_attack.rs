//! Attacks performed by fighters.
//!
//! A [`FighterAttack`] is cloned from its fighter's catalog whenever a move
//! starts and runs on a `startup -> active -> cooldown` timeline. Its hitbox
//! and knockback depend on where the owner stands and which way it faces, so
//! victims never see the attack directly: the owner binds it to an
//! [`OwnerFrame`] snapshot first, producing a [`BoundAttack`] that implements
//! [`Attack`].
//!
//! Some shapes also steer their owner while active (dash, moving and
//! recovery attacks); those effects go through the `&mut Body` handed to
//! [`FighterAttack::start`] and [`FighterAttack::update`].

use geosmash_common::{EntityId, Ownership, ParamResult, ParamScope, Rect};
use glam::Vec2;

use crate::attack::{knockback_magnitude, scaled_stun, Attack, AttackParams, ClashInfo, HitSet};
use crate::body::Body;
use crate::events::Outbox;
use crate::moves::{move_spec, FighterKind, MoveId, MoveShape};
use crate::projectile::{Projectile, ProjectileParams};

/// Shape-specific data and progress of a fighter attack.
#[derive(Debug, Clone, PartialEq)]
pub enum AttackKind {
    /// Plain timed hitbox
    Standard,
    /// Launch forward then slow down
    Dash {
        /// Acceleration against the facing during the active window
        deceleration: f32,
        /// Speed given to the owner at start
        initial_speed: f32,
    },
    /// Carries the owner during the active window
    Moving {
        /// Owner velocity, facing right
        velocity: Vec2,
        /// Whether the owner is currently being carried
        started: bool,
    },
    /// Recovery hitbox that re-hits periodically
    UpSpecial {
        /// Time between hit-set clears
        repeat_interval: f32,
        /// Time since the last clear
        repeat_t: f32,
        /// Whether the launch puffs were emitted
        started: bool,
    },
    /// Hitbox that re-hits periodically
    Repeating {
        /// Time between hit-set clears
        interval: f32,
        /// Time since the last clear
        repeat_t: f32,
    },
    /// Hitbox sliding between two offsets over the active window
    MovingHitbox {
        /// Offset when the window opens
        from: Vec2,
        /// Offset when the window closes
        to: Vec2,
    },
    /// Knockback away from the hitbox center
    VaryingDirection,
    /// Knockback along the owner's velocity
    VelocityDirection,
    /// Throws a projectile once startup ends
    ProjectileThrow {
        /// Projectile to spawn
        projectile: ProjectileParams,
        /// Whether it has been thrown
        released: bool,
    },
    /// Reflects projectiles
    Reflect,
}

/// Owner data an attack needs at hit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnerFrame {
    /// Owning entity
    pub id: EntityId,
    /// Owner tags
    pub owner: Ownership,
    /// Owner center
    pub pos: Vec2,
    /// Owner velocity
    pub vel: Vec2,
    /// Owner facing
    pub dir: f32,
}

impl OwnerFrame {
    /// Snapshot of `body` facing `dir`.
    #[must_use]
    pub fn of(body: &Body, dir: f32) -> Self {
        Self {
            id: body.id,
            owner: body.owner,
            pos: body.pos,
            vel: body.vel,
            dir,
        }
    }
}

/// A running (or prototype) fighter attack.
#[derive(Debug, Clone)]
pub struct FighterAttack {
    id: MoveId,
    frame: &'static str,
    audio: &'static str,
    start_sound: Option<&'static str>,
    twinkle: bool,
    params: AttackParams,
    kind: AttackKind,
    t: f32,
    hits: HitSet,
}

impl FighterAttack {
    /// Builds the catalog prototype of `id` for a fighter type.
    ///
    /// `fighter` is the fighter's parameter scope (`charlie`, `stickman`).
    pub fn load(kind: FighterKind, id: MoveId, fighter: &ParamScope<'_>) -> ParamResult<Self> {
        let spec = move_spec(kind, id);
        let scope = fighter.scoped(spec.prefix);

        let (params, kind) = match spec.shape {
            MoveShape::ProjectileThrow => {
                let projectile = ProjectileParams::load(&scope)?;
                let params = AttackParams {
                    startup: scope.param("startup")?,
                    duration: 0.0,
                    cooldown: scope.param("cooldown")?,
                    damage: projectile.damage,
                    stun: projectile.stun,
                    kb_dir: projectile.kb_dir,
                    kb_base: projectile.kb_base,
                    kb_scaling: projectile.kb_scaling,
                    hitbox_offset: Vec2::ZERO,
                    hitbox_size: projectile.size,
                    priority: projectile.priority,
                };
                let kind = AttackKind::ProjectileThrow {
                    projectile,
                    released: false,
                };
                (params, kind)
            }
            shape => (AttackParams::load(&scope)?, Self::shape_kind(shape, &scope)?),
        };

        Ok(Self {
            id,
            frame: spec.frame,
            audio: spec.audio,
            start_sound: spec.start_sound,
            twinkle: spec.twinkle,
            params,
            kind,
            t: 0.0,
            hits: HitSet::new(),
        })
    }

    fn shape_kind(shape: MoveShape, scope: &ParamScope<'_>) -> ParamResult<AttackKind> {
        Ok(match shape {
            MoveShape::Standard | MoveShape::ProjectileThrow => AttackKind::Standard,
            MoveShape::Dash => AttackKind::Dash {
                deceleration: scope.param("deceleration")?,
                initial_speed: scope.param("initialSpeed")?,
            },
            MoveShape::Moving => AttackKind::Moving {
                velocity: scope.vec2("xvel", "yvel")?,
                started: false,
            },
            MoveShape::UpSpecial => AttackKind::UpSpecial {
                repeat_interval: scope.positive("repeatInterval")?,
                repeat_t: 0.0,
                started: false,
            },
            MoveShape::Repeating => AttackKind::Repeating {
                interval: scope.positive("repeatT")?,
                repeat_t: 0.0,
            },
            MoveShape::MovingHitbox => AttackKind::MovingHitbox {
                from: scope.vec2("hitboxx", "hitboxy")?,
                to: scope.vec2("hitboxx1", "hitboxy1")?,
            },
            MoveShape::VaryingDirection => AttackKind::VaryingDirection,
            MoveShape::VelocityDirection => AttackKind::VelocityDirection,
            MoveShape::Reflect => AttackKind::Reflect,
        })
    }

    /// Builds an attack straight from its parts.
    #[must_use]
    pub fn from_parts(id: MoveId, frame: &'static str, params: AttackParams, kind: AttackKind) -> Self {
        Self {
            id,
            frame,
            audio: "",
            start_sound: None,
            twinkle: false,
            params,
            kind,
            t: 0.0,
            hits: HitSet::new(),
        }
    }

    /// Catalog slot of the attack.
    #[must_use]
    pub fn id(&self) -> MoveId {
        self.id
    }

    /// Frame shown while the attack runs.
    #[must_use]
    pub fn frame_name(&self) -> &'static str {
        self.frame
    }

    /// Timeline and damage tunables.
    #[must_use]
    pub fn params(&self) -> &AttackParams {
        &self.params
    }

    /// Shape and progress.
    #[must_use]
    pub fn kind(&self) -> &AttackKind {
        &self.kind
    }

    /// Time since start.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.t
    }

    /// Clash priority.
    #[must_use]
    pub fn priority(&self) -> f32 {
        self.params.priority
    }

    /// Resets the timeline and applies start-of-attack effects.
    pub fn start(&mut self, body: &mut Body, dir: f32, out: &mut Outbox) {
        self.t = 0.0;
        self.hits.clear();
        if let Some(sound) = self.start_sound {
            out.sound(sound);
        }

        match &mut self.kind {
            AttackKind::Dash { initial_speed, .. } => body.vel.x = *initial_speed * dir,
            AttackKind::Moving { started, .. } => *started = false,
            AttackKind::UpSpecial {
                repeat_t, started, ..
            } => {
                *repeat_t = 0.0;
                *started = false;
            }
            AttackKind::Repeating { repeat_t, .. } => *repeat_t = 0.0,
            AttackKind::ProjectileThrow { released, .. } => *released = false,
            _ => {}
        }
    }

    /// Advances the timeline by `dt`.
    pub fn update(&mut self, dt: f32, body: &mut Body, dir: f32, out: &mut Outbox) {
        self.t += dt;
        let active = self.has_hitbox();
        let window_open = self.t > self.params.startup && self.t < self.params.active_end();

        match &mut self.kind {
            AttackKind::Dash { deceleration, .. } => {
                if active {
                    body.accel = Vec2::new(*deceleration, 0.0) * dir;
                }
            }
            AttackKind::Moving { velocity, started } => {
                if window_open && !*started {
                    body.vel = Vec2::new(dir * velocity.x, velocity.y);
                    launch_puffs(body, dir, out);
                    *started = true;
                }
                if self.t > self.params.active_end() && *started {
                    body.vel = Vec2::ZERO;
                    *started = false;
                }
            }
            AttackKind::UpSpecial {
                repeat_interval,
                repeat_t,
                started,
            } => {
                if window_open {
                    if !*started {
                        launch_puffs(body, dir, out);
                        *started = true;
                    }
                    *repeat_t += dt;
                }
                if *repeat_t > *repeat_interval {
                    self.hits.clear();
                    *repeat_t -= *repeat_interval;
                }
            }
            AttackKind::Repeating { interval, repeat_t } => {
                if active {
                    *repeat_t += dt;
                    if *repeat_t > *interval {
                        *repeat_t -= *interval;
                        self.hits.clear();
                    }
                }
            }
            AttackKind::ProjectileThrow {
                projectile,
                released,
            } => {
                if self.t > self.params.startup && !*released {
                    *released = true;
                    out.sound("projectile");
                    out.spawns
                        .push(Projectile::launch(projectile, body.pos, dir, body.owner));
                }
            }
            _ => {}
        }
    }

    /// Applies end-of-attack effects. Called once, when the attack is dropped.
    pub fn finish(&mut self, body: &mut Body) {
        if let AttackKind::Dash { .. } = self.kind {
            body.vel.x = 0.0;
            body.accel = Vec2::ZERO;
        }
    }

    /// Checks if the hitbox is out.
    #[must_use]
    pub fn has_hitbox(&self) -> bool {
        if let AttackKind::ProjectileThrow { .. } = self.kind {
            return false;
        }
        self.t > self.params.startup && self.t < self.params.active_end()
    }

    /// Checks if the whole timeline has elapsed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.t > self.params.total()
    }

    /// Checks if the charge twinkle shows.
    #[must_use]
    pub fn has_twinkle(&self) -> bool {
        self.twinkle && self.t < self.params.startup
    }

    /// Skips straight to cooldown.
    pub fn cancel(&mut self) {
        self.t = self.t.max(self.params.active_end());
    }

    /// Ends the attack outright.
    pub fn kill(&mut self) {
        self.t = f32::INFINITY;
    }

    /// Resolves a hitbox clash: lose or tie and the attack is cancelled.
    pub fn attack_collision(&mut self, other: &ClashInfo) {
        if matches!(self.kind, AttackKind::Reflect) && other.projectile {
            return;
        }
        if self.params.priority <= other.priority {
            self.cancel();
        }
    }

    /// Checks if `victim` has not been struck yet.
    #[must_use]
    pub fn can_hit(&self, victim: EntityId) -> bool {
        self.hits.can_hit(victim)
    }

    /// Records a struck victim.
    pub fn record_hit(&mut self, victim: EntityId) {
        self.hits.record(victim);
    }

    /// Forgets every struck victim.
    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }

    /// Overrides the base knockback.
    pub fn set_base_knockback(&mut self, kb_base: f32) {
        self.params.kb_base = kb_base;
    }

    /// Binds the attack to its owner's current position and facing.
    #[must_use]
    pub fn bind(&self, owner: OwnerFrame) -> BoundAttack<'_> {
        BoundAttack {
            attack: self,
            owner,
        }
    }
}

fn launch_puffs(body: &Body, dir: f32, out: &mut Outbox) {
    for along in [0.1, 0.3] {
        out.puff(
            Vec2::new(
                body.pos.x - body.size.x * dir * along,
                body.pos.y - body.size.y * 0.45,
            ),
            0.3,
        );
    }
}

/// A fighter attack seen from the outside.
#[derive(Debug, Clone, Copy)]
pub struct BoundAttack<'a> {
    attack: &'a FighterAttack,
    owner: OwnerFrame,
}

impl BoundAttack<'_> {
    fn fixed_direction(&self) -> Vec2 {
        Vec2::new(self.owner.dir, 1.0) * self.attack.params.kb_dir
    }
}

impl Attack for BoundAttack<'_> {
    fn hitbox(&self) -> Rect {
        let params = &self.attack.params;
        let offset = match self.attack.kind {
            AttackKind::MovingHitbox { from, to } => {
                let u = if params.duration > 0.0 {
                    (self.attack.t - params.startup).max(0.0).min(params.duration) / params.duration
                } else {
                    1.0
                };
                from.lerp(to, u)
            }
            _ => params.hitbox_offset,
        };
        Rect::new(
            offset.x * self.owner.dir + self.owner.pos.x,
            offset.y + self.owner.pos.y,
            params.hitbox_size.x,
            params.hitbox_size.y,
        )
    }

    fn priority(&self) -> f32 {
        self.attack.params.priority
    }

    fn damage(&self) -> f32 {
        self.attack.params.damage
    }

    fn owner(&self) -> Ownership {
        self.owner.owner
    }

    fn audio_id(&self) -> &str {
        self.attack.audio
    }

    fn calc_stun(&self, _victim: &Body, damage: f32) -> f32 {
        scaled_stun(self.attack.params.stun, damage)
    }

    fn calc_knockback(&self, victim: &Body, damage: f32) -> Vec2 {
        let params = &self.attack.params;
        let magnitude = knockback_magnitude(params.kb_base, params.kb_scaling, damage);
        let direction = match self.attack.kind {
            AttackKind::VaryingDirection => (victim.pos - self.hitbox().center())
                .try_normalize()
                .unwrap_or_else(|| self.fixed_direction()),
            AttackKind::VelocityDirection => self
                .owner
                .vel
                .try_normalize()
                .unwrap_or_else(|| self.fixed_direction()),
            _ => self.fixed_direction(),
        };
        direction * magnitude
    }

    fn origin_direction(&self, victim: &Body) -> f32 {
        if victim.pos.x - self.owner.pos.x > 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    fn can_hit(&self, victim: EntityId) -> bool {
        self.attack.can_hit(victim)
    }

    fn reflects(&self) -> bool {
        matches!(self.attack.kind, AttackKind::Reflect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosmash_common::{PlayerId, TeamId};
    use proptest::prelude::*;

    fn params(startup: f32, duration: f32, cooldown: f32, priority: f32) -> AttackParams {
        AttackParams {
            startup,
            duration,
            cooldown,
            damage: 10.0,
            stun: 0.2,
            kb_dir: Vec2::new(1.0, 1.0).normalize(),
            kb_base: 5.0,
            kb_scaling: 0.05,
            hitbox_offset: Vec2::new(20.0, 0.0),
            hitbox_size: Vec2::new(20.0, 20.0),
            priority,
        }
    }

    fn owner_body() -> Body {
        Body::new(
            Ownership::new(PlayerId::new(0), TeamId::new(0)),
            Vec2::new(100.0, 50.0),
            Vec2::new(30.0, 50.0),
        )
    }

    fn standard(priority: f32) -> FighterAttack {
        FighterAttack::from_parts(
            MoveId::NeutralTilt,
            "GroundNeutral",
            params(0.1, 0.2, 0.1, priority),
            AttackKind::Standard,
        )
    }

    #[test]
    fn test_timeline() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let mut attack = standard(1.0);
        attack.start(&mut body, 1.0, &mut out);

        assert!(!attack.has_hitbox());
        attack.update(0.15, &mut body, 1.0, &mut out);
        assert!(attack.has_hitbox());
        attack.update(0.2, &mut body, 1.0, &mut out);
        assert!(!attack.has_hitbox() && !attack.is_done());
        attack.update(0.1, &mut body, 1.0, &mut out);
        assert!(attack.is_done());
    }

    #[test]
    fn test_hitbox_mirrors_with_facing() {
        let body = owner_body();
        let attack = standard(1.0);

        let right = attack.bind(OwnerFrame::of(&body, 1.0)).hitbox();
        let left = attack.bind(OwnerFrame::of(&body, -1.0)).hitbox();
        assert_eq!(right.x, 120.0);
        assert_eq!(left.x, 80.0);
        assert_eq!(right.y, 50.0);
    }

    #[test]
    fn test_knockback_follows_facing() {
        let body = owner_body();
        let victim = Body::new(Ownership::default(), Vec2::new(90.0, 50.0), Vec2::ONE);
        let attack = standard(1.0);

        let kb = attack.bind(OwnerFrame::of(&body, -1.0)).calc_knockback(&victim, 10.0);
        assert!(kb.x < 0.0 && kb.y > 0.0);
        assert!((kb.length() - 5.5).abs() < 1e-4);
        assert_eq!(attack.bind(OwnerFrame::of(&body, -1.0)).origin_direction(&victim), 1.0);
    }

    #[test]
    fn test_varying_direction_points_away_from_hitbox() {
        let body = owner_body();
        let attack = FighterAttack::from_parts(
            MoveId::DownSmash,
            "DownSmash",
            params(0.0, 1.0, 0.0, 1.0),
            AttackKind::VaryingDirection,
        );
        let below = Body::new(Ownership::default(), Vec2::new(120.0, 0.0), Vec2::ONE);

        let kb = attack.bind(OwnerFrame::of(&body, 1.0)).calc_knockback(&below, 0.0);
        assert!(kb.y < 0.0);
        assert!(kb.x.abs() < 1e-4);
    }

    #[test]
    fn test_velocity_direction_falls_back_when_still() {
        let mut body = owner_body();
        let attack = FighterAttack::from_parts(
            MoveId::AirDown,
            "AirDowntilt",
            params(0.0, 1.0, 0.0, 1.0),
            AttackKind::VelocityDirection,
        );
        let victim = Body::new(Ownership::default(), Vec2::ZERO, Vec2::ONE);

        let still = attack.bind(OwnerFrame::of(&body, 1.0)).calc_knockback(&victim, 0.0);
        assert!(still.x > 0.0 && still.y > 0.0);

        body.vel = Vec2::new(0.0, -300.0);
        let falling = attack.bind(OwnerFrame::of(&body, 1.0)).calc_knockback(&victim, 0.0);
        assert!(falling.y < 0.0 && falling.x.abs() < 1e-4);
    }

    #[test]
    fn test_moving_hitbox_interpolates() {
        let body = owner_body();
        let mut out = Outbox::new();
        let mut owner = owner_body();
        let mut attack = FighterAttack::from_parts(
            MoveId::UpSmash,
            "UpSmash",
            params(0.0, 1.0, 0.0, 1.0),
            AttackKind::MovingHitbox {
                from: Vec2::new(0.0, 0.0),
                to: Vec2::new(0.0, 40.0),
            },
        );
        attack.start(&mut owner, 1.0, &mut out);
        attack.update(0.5, &mut owner, 1.0, &mut out);

        let hitbox = attack.bind(OwnerFrame::of(&body, 1.0)).hitbox();
        assert!((hitbox.y - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_dash_launches_and_stops_owner() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let mut attack = FighterAttack::from_parts(
            MoveId::Dash,
            "DashAttack",
            params(0.1, 0.2, 0.1, 1.0),
            AttackKind::Dash {
                deceleration: -100.0,
                initial_speed: 300.0,
            },
        );
        attack.start(&mut body, -1.0, &mut out);
        assert_eq!(body.vel.x, -300.0);

        attack.update(0.15, &mut body, -1.0, &mut out);
        assert_eq!(body.accel.x, 100.0);

        attack.finish(&mut body);
        assert_eq!(body.vel.x, 0.0);
        assert_eq!(body.accel, Vec2::ZERO);
    }

    #[test]
    fn test_moving_attack_carries_owner_once() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let mut attack = FighterAttack::from_parts(
            MoveId::Dash,
            "DashAttack",
            params(0.1, 0.2, 0.1, 1.0),
            AttackKind::Moving {
                velocity: Vec2::new(250.0, 10.0),
                started: false,
            },
        );
        attack.start(&mut body, 1.0, &mut out);
        attack.update(0.15, &mut body, 1.0, &mut out);
        assert_eq!(body.vel, Vec2::new(250.0, 10.0));
        assert_eq!(out.events.len(), 2);

        attack.update(0.2, &mut body, 1.0, &mut out);
        assert_eq!(body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_repeating_attack_rehits_once_per_interval() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let mut attack = FighterAttack::from_parts(
            MoveId::UpSmash,
            "UpSmash",
            params(0.125, 1.0, 0.125, 1.0),
            AttackKind::Repeating {
                interval: 0.25,
                repeat_t: 0.0,
            },
        );
        let victim = EntityId::new();
        let dt = 1.0 / 64.0;
        attack.start(&mut body, 1.0, &mut out);

        let mut hit_frames = Vec::new();
        for frame in 1..=96 {
            attack.update(dt, &mut body, 1.0, &mut out);
            if attack.has_hitbox() && attack.can_hit(victim) {
                attack.record_hit(victim);
                hit_frames.push(frame);
            }
        }
        assert_eq!(hit_frames, vec![9, 25, 41, 57]);
    }

    #[test]
    fn test_projectile_throw_spawns_once() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let projectile = ProjectileParams {
            speed: 100.0,
            damage: 5.0,
            stun: 0.1,
            kb_dir: Vec2::X,
            kb_base: 10.0,
            kb_scaling: 0.1,
            size: Vec2::splat(8.0),
            priority: 1.0,
            lifetime: 2.0,
        };
        let mut attack = FighterAttack::from_parts(
            MoveId::NeutralSpecial,
            "NeutralSpecial",
            params(0.1, 0.0, 0.3, 1.0),
            AttackKind::ProjectileThrow {
                projectile,
                released: false,
            },
        );
        attack.start(&mut body, 1.0, &mut out);
        for _ in 0..10 {
            attack.update(0.05, &mut body, 1.0, &mut out);
            assert!(!attack.has_hitbox());
        }
        assert_eq!(out.spawns.len(), 1);
    }

    #[test]
    fn test_clash_ties_cancel_both() {
        let mut body = owner_body();
        let mut out = Outbox::new();
        let mut a = standard(3.0);
        let mut b = standard(3.0);
        a.start(&mut body, 1.0, &mut out);
        b.start(&mut body, 1.0, &mut out);
        a.update(0.15, &mut body, 1.0, &mut out);
        b.update(0.15, &mut body, 1.0, &mut out);

        let info_a = ClashInfo::of(&a.bind(OwnerFrame::of(&body, 1.0)), false);
        let info_b = ClashInfo::of(&b.bind(OwnerFrame::of(&body, 1.0)), false);
        a.attack_collision(&info_b);
        b.attack_collision(&info_a);

        assert!(!a.has_hitbox());
        assert!(!b.has_hitbox());
    }

    #[test]
    fn test_reflector_ignores_projectile_clash() {
        let mut cape = FighterAttack::from_parts(
            MoveId::SideSpecial,
            "SideSpecial",
            params(0.0, 1.0, 0.0, 0.0),
            AttackKind::Reflect,
        );
        let mut body = owner_body();
        let mut out = Outbox::new();
        cape.start(&mut body, 1.0, &mut out);
        cape.update(0.1, &mut body, 1.0, &mut out);
        cape.attack_collision(&ClashInfo {
            priority: 5.0,
            reflects: false,
            projectile: true,
        });
        assert!(cape.has_hitbox());
    }

    proptest! {
        #[test]
        fn prop_clash_loser_is_cancelled(p1 in 0.0f32..10.0, p2 in 0.0f32..10.0, t in 0.11f32..0.29) {
            let mut body = owner_body();
            let mut out = Outbox::new();
            let mut a = standard(p1);
            let mut b = standard(p2);
            a.start(&mut body, 1.0, &mut out);
            b.start(&mut body, 1.0, &mut out);
            a.update(t, &mut body, 1.0, &mut out);
            b.update(t, &mut body, 1.0, &mut out);

            let info_a = ClashInfo::of(&a.bind(OwnerFrame::of(&body, 1.0)), false);
            let info_b = ClashInfo::of(&b.bind(OwnerFrame::of(&body, 1.0)), false);
            a.attack_collision(&info_b);
            b.attack_collision(&info_a);

            prop_assert_eq!(a.has_hitbox(), p1 > p2);
            prop_assert_eq!(b.has_hitbox(), p2 > p1);
        }
    }
}
