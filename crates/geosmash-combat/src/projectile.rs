//! Projectiles thrown by neutral specials.

use geosmash_common::{EntityId, Ownership, ParamResult, ParamScope, Rect};
use glam::Vec2;
use tracing::debug;

use crate::attack::{unit_direction, Attack, ClashInfo, SimpleAttack};
use crate::body::Body;

/// Tunables of a projectile, read from the neutral special block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileParams {
    /// Horizontal speed
    pub speed: f32,
    /// Damage dealt
    pub damage: f32,
    /// Base stun
    pub stun: f32,
    /// Unit knockback direction, travelling right
    pub kb_dir: Vec2,
    /// Knockback at zero damage
    pub kb_base: f32,
    /// Knockback added per point of damage
    pub kb_scaling: f32,
    /// Hitbox and body size
    pub size: Vec2,
    /// Clash priority
    pub priority: f32,
    /// Seconds before the projectile fizzles
    pub lifetime: f32,
}

impl ProjectileParams {
    /// Reads `speed`, `damage`, `stun`, `knockbackx/y`, `kbbase`,
    /// `kbscaling`, `hitboxw/h`, `priority` and `lifetime`.
    pub fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            speed: scope.param("speed")?,
            damage: scope.param("damage")?,
            stun: scope.param("stun")?,
            kb_dir: unit_direction(scope, "knockbackx", "knockbacky")?,
            kb_base: scope.param("kbbase")?,
            kb_scaling: scope.param("kbscaling")?,
            size: scope.vec2("hitboxw", "hitboxh")?,
            priority: scope.param("priority")?,
            lifetime: scope.positive("lifetime")?,
        })
    }
}

/// A flying hitbox.
///
/// Finished after its first hit, after losing a clash, or once `lifetime`
/// runs out. A reflecting attack turns it around and takes it over instead.
#[derive(Debug, Clone)]
pub struct Projectile {
    body: Body,
    attack: SimpleAttack,
    t: f32,
    lifetime: f32,
    done: bool,
}

impl Projectile {
    /// Spawns a projectile at `pos` travelling in `dir`.
    #[must_use]
    pub fn launch(params: &ProjectileParams, pos: Vec2, dir: f32, owner: Ownership) -> Self {
        let mut body = Body::new(owner, pos, params.size);
        body.vel = Vec2::new(dir * params.speed, 0.0);

        let attack = SimpleAttack::new(
            params.kb_dir * Vec2::new(dir, 1.0),
            params.kb_base,
            params.kb_scaling,
            params.damage,
            params.stun,
        )
        .with_priority(params.priority)
        .with_hitbox(Rect::from_center(pos, params.size))
        .with_origin(-dir)
        .with_owner(owner)
        .with_audio("projectilehit");

        Self {
            body,
            attack,
            t: 0.0,
            lifetime: params.lifetime,
            done: false,
        }
    }

    /// Physical body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The projectile's hitbox.
    #[must_use]
    pub fn attack(&self) -> &SimpleAttack {
        &self.attack
    }

    /// Checks if the projectile should be removed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Checks if the hitbox is live.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        !self.done
    }

    /// Moves the projectile and ages it.
    pub fn update(&mut self, dt: f32) {
        self.t += dt;
        self.body.integrate(dt);
        self.attack.set_position(self.body.pos);
        if self.t > self.lifetime {
            self.done = true;
        }
    }

    /// Reacts to a clashing hitbox; reflectors are left to the connect pass.
    pub fn attack_collision(&mut self, other: &ClashInfo) {
        if other.reflects {
            return;
        }
        if self.attack.priority() <= other.priority {
            self.done = true;
        }
    }

    /// Reacts to being struck.
    pub fn hit_by_attack(&mut self, attack: &dyn Attack) {
        if attack.reflects() {
            let owner = attack.owner();
            debug!("{} reflected to {}", self.body.id, owner.player);
            self.body.reflect();
            self.body.owner = owner;
            self.attack.kb_dir.x = -self.attack.kb_dir.x;
            self.attack.origin_dir = -self.attack.origin_dir;
            self.attack.reown(owner);
            self.attack.clear_hits();
            self.t = 0.0;
        } else {
            self.done = true;
        }
    }

    /// Records a landed hit; a projectile only ever lands one.
    pub fn connected(&mut self, victim: EntityId) {
        self.attack.record_hit(victim);
        self.done = true;
    }
}
