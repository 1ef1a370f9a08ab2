//! Everything the arena simulates.
//!
//! The set of entity kinds is closed, so [`Entity`] is an enum rather than a
//! trait object. Collision code only talks to entities through the methods
//! below; fighter-specific behavior is reached through
//! [`Entity::as_fighter_mut`].

use geosmash_common::{EntityId, Ownership, Rect};
use glam::Vec2;

use crate::attack::{Attack, ClashInfo, SimpleAttack};
use crate::body::Body;
use crate::events::Outbox;
use crate::fighter::Fighter;
use crate::fighter_attack::BoundAttack;
use crate::hazard::VolcanoHazard;
use crate::projectile::Projectile;
use crate::state::FrameCtx;

/// An arena entity.
#[derive(Debug)]
pub enum Entity {
    /// Player-controlled fighter
    Fighter(Box<Fighter>),
    /// Thrown projectile
    Projectile(Projectile),
    /// Stage hazard
    Hazard(VolcanoHazard),
}

/// The attack an entity currently carries.
#[derive(Debug, Clone, Copy)]
pub enum EntityAttack<'a> {
    /// A fighter's running move
    Fighter(BoundAttack<'a>),
    /// A projectile or hazard hitbox
    Simple(&'a SimpleAttack),
}

impl Attack for EntityAttack<'_> {
    fn hitbox(&self) -> Rect {
        match self {
            Self::Fighter(attack) => attack.hitbox(),
            Self::Simple(attack) => attack.hitbox(),
        }
    }

    fn priority(&self) -> f32 {
        match self {
            Self::Fighter(attack) => attack.priority(),
            Self::Simple(attack) => attack.priority(),
        }
    }

    fn damage(&self) -> f32 {
        match self {
            Self::Fighter(attack) => attack.damage(),
            Self::Simple(attack) => attack.damage(),
        }
    }

    fn owner(&self) -> Ownership {
        match self {
            Self::Fighter(attack) => attack.owner(),
            Self::Simple(attack) => attack.owner(),
        }
    }

    fn audio_id(&self) -> &str {
        match self {
            Self::Fighter(attack) => attack.audio_id(),
            Self::Simple(attack) => attack.audio_id(),
        }
    }

    fn calc_stun(&self, victim: &Body, damage: f32) -> f32 {
        match self {
            Self::Fighter(attack) => attack.calc_stun(victim, damage),
            Self::Simple(attack) => attack.calc_stun(victim, damage),
        }
    }

    fn calc_knockback(&self, victim: &Body, damage: f32) -> Vec2 {
        match self {
            Self::Fighter(attack) => attack.calc_knockback(victim, damage),
            Self::Simple(attack) => attack.calc_knockback(victim, damage),
        }
    }

    fn origin_direction(&self, victim: &Body) -> f32 {
        match self {
            Self::Fighter(attack) => attack.origin_direction(victim),
            Self::Simple(attack) => attack.origin_direction(victim),
        }
    }

    fn can_hit(&self, victim: EntityId) -> bool {
        match self {
            Self::Fighter(attack) => attack.can_hit(victim),
            Self::Simple(attack) => attack.can_hit(victim),
        }
    }

    fn reflects(&self) -> bool {
        match self {
            Self::Fighter(attack) => attack.reflects(),
            Self::Simple(attack) => attack.reflects(),
        }
    }
}

impl Entity {
    /// Entity id.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.body().id
    }

    /// Owning player and team.
    #[must_use]
    pub fn owner(&self) -> Ownership {
        self.body().owner
    }

    /// Physical body.
    #[must_use]
    pub fn body(&self) -> &Body {
        match self {
            Self::Fighter(fighter) => fighter.body(),
            Self::Projectile(shot) => shot.body(),
            Self::Hazard(hazard) => hazard.body(),
        }
    }

    /// Hurtbox.
    #[must_use]
    pub fn rect(&self) -> Rect {
        match self {
            Self::Fighter(fighter) => fighter.rect(),
            _ => self.body().rect(),
        }
    }

    /// Checks if attacks can connect with this entity. Hazards never can.
    #[must_use]
    pub fn can_be_hit(&self) -> bool {
        match self {
            Self::Fighter(fighter) => fighter.can_be_hit(),
            Self::Projectile(shot) => !shot.is_done(),
            Self::Hazard(_) => false,
        }
    }

    /// Checks if the entity's hitbox is live.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        match self {
            Self::Fighter(fighter) => fighter.has_attack(),
            Self::Projectile(shot) => shot.has_attack(),
            Self::Hazard(hazard) => hazard.has_attack(),
        }
    }

    /// The live attack, if any.
    #[must_use]
    pub fn attack(&self) -> Option<EntityAttack<'_>> {
        if !self.has_attack() {
            return None;
        }
        match self {
            Self::Fighter(fighter) => fighter.attack().map(EntityAttack::Fighter),
            Self::Projectile(shot) => Some(EntityAttack::Simple(shot.attack())),
            Self::Hazard(hazard) => Some(EntityAttack::Simple(hazard.attack())),
        }
    }

    /// What a clashing hitbox learns about this entity's attack.
    #[must_use]
    pub fn clash_info(&self) -> Option<ClashInfo> {
        let projectile = matches!(self, Self::Projectile(_));
        self.attack().map(|attack| ClashInfo::of(&attack, projectile))
    }

    /// Resolves a clash against another hitbox. Hazards ignore clashes.
    pub fn attack_collision(&mut self, other: &ClashInfo) {
        match self {
            Self::Fighter(fighter) => fighter.attack_collision(other),
            Self::Projectile(shot) => shot.attack_collision(other),
            Self::Hazard(_) => {}
        }
    }

    /// Applies an incoming attack.
    pub fn hit_by_attack(&mut self, attack: &dyn Attack, cx: &mut FrameCtx<'_>) {
        match self {
            Self::Fighter(fighter) => fighter.hit_by_attack(attack, cx),
            Self::Projectile(shot) => shot.hit_by_attack(attack),
            Self::Hazard(_) => {}
        }
    }

    /// Lands this entity's attack on `victim`.
    pub fn attack_connected(&mut self, victim: &mut Entity, cx: &mut FrameCtx<'_>) {
        match self {
            Self::Fighter(fighter) => fighter.attack_connected(victim, cx),
            Self::Projectile(shot) => {
                victim.hit_by_attack(shot.attack(), cx);
                shot.connected(victim.id());
            }
            Self::Hazard(hazard) => {
                victim.hit_by_attack(hazard.attack(), cx);
                hazard.connected(victim.id());
            }
        }
    }

    /// Checks if the arena should drop this entity.
    #[must_use]
    pub fn is_done(&self) -> bool {
        match self {
            Self::Fighter(_) => false,
            Self::Projectile(shot) => shot.is_done(),
            Self::Hazard(hazard) => hazard.is_done(),
        }
    }

    /// Integrates motion and ticks timers.
    pub fn update(&mut self, dt: f32, out: &mut Outbox) {
        match self {
            Self::Fighter(fighter) => fighter.update(dt),
            Self::Projectile(shot) => shot.update(dt),
            Self::Hazard(hazard) => hazard.update(dt, out),
        }
    }

    /// Moves a fighter without changing its velocity; other entities stay put.
    pub fn push(&mut self, offset: Vec2) {
        if let Self::Fighter(fighter) = self {
            fighter.push(offset);
        }
    }

    /// The fighter, if this is one.
    #[must_use]
    pub fn as_fighter(&self) -> Option<&Fighter> {
        match self {
            Self::Fighter(fighter) => Some(fighter.as_ref()),
            _ => None,
        }
    }

    /// The fighter, if this is one.
    pub fn as_fighter_mut(&mut self) -> Option<&mut Fighter> {
        match self {
            Self::Fighter(fighter) => Some(fighter.as_mut()),
            _ => None,
        }
    }
}

impl From<Fighter> for Entity {
    fn from(fighter: Fighter) -> Self {
        Self::Fighter(Box::new(fighter))
    }
}

impl From<Projectile> for Entity {
    fn from(shot: Projectile) -> Self {
        Self::Projectile(shot)
    }
}

impl From<VolcanoHazard> for Entity {
    fn from(hazard: VolcanoHazard) -> Self {
        Self::Hazard(hazard)
    }
}
