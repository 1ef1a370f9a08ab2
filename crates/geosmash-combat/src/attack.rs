//! Attacks and their knockback model.
//!
//! This module provides:
//! - The [`Attack`] trait every damaging hitbox implements
//! - [`ClashInfo`], what a clashing hitbox learns about its opponent
//! - [`HitSet`], the per-attack record of victims already struck
//! - [`SimpleAttack`], a free-standing attack with a fixed hitbox (throws,
//!   projectiles, stage hazards)
//! - [`AttackParams`], the tunables shared by all fighter attacks
//!
//! Knockback always scales with the victim's damage *after* the hit:
//! `direction * (kb_base + damage * kb_scaling)`. Stun follows the same
//! pattern, `stun * (damage * 1.2 / 33 + 1.5)`.

use ahash::AHashSet;
use geosmash_common::{EntityId, Ownership, ParamError, ParamResult, ParamScope, Rect};
use glam::Vec2;

use crate::body::Body;

/// Scales stun with the victim's damage.
#[must_use]
pub fn scaled_stun(stun: f32, damage: f32) -> f32 {
    stun * (damage * 1.2 / 33.0 + 1.5)
}

/// Knockback magnitude for a victim at `damage`.
#[must_use]
pub fn knockback_magnitude(kb_base: f32, kb_scaling: f32, damage: f32) -> f32 {
    kb_base + damage * kb_scaling
}

/// A damaging hitbox as seen by its victims.
pub trait Attack {
    /// World-space hitbox for the current frame.
    fn hitbox(&self) -> Rect;

    /// Clash priority; higher wins.
    fn priority(&self) -> f32;

    /// Damage added to the victim.
    fn damage(&self) -> f32;

    /// Player and team that own the attack.
    fn owner(&self) -> Ownership;

    /// Sound played when the attack lands.
    fn audio_id(&self) -> &str;

    /// Stun duration for a victim at `damage`.
    fn calc_stun(&self, victim: &Body, damage: f32) -> f32;

    /// Knockback vector for a victim at `damage`.
    fn calc_knockback(&self, victim: &Body, damage: f32) -> Vec2;

    /// Side the hit came from, from the victim's point of view.
    fn origin_direction(&self, victim: &Body) -> f32;

    /// Checks if `victim` has not been struck yet.
    fn can_hit(&self, victim: EntityId) -> bool;

    /// Whether this attack turns projectiles back instead of destroying them.
    fn reflects(&self) -> bool {
        false
    }
}

/// What one side of a hitbox clash knows about the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClashInfo {
    /// Priority of the opposing attack
    pub priority: f32,
    /// Whether the opposing attack reflects projectiles
    pub reflects: bool,
    /// Whether the opposing attack belongs to a projectile
    pub projectile: bool,
}

impl ClashInfo {
    /// Describes `attack` as a clash opponent.
    #[must_use]
    pub fn of(attack: &dyn Attack, projectile: bool) -> Self {
        Self {
            priority: attack.priority(),
            reflects: attack.reflects(),
            projectile,
        }
    }
}

/// Victims an attack instance has already struck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HitSet {
    ids: AHashSet<EntityId>,
}

impl HitSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if `victim` can still be hit.
    #[must_use]
    pub fn can_hit(&self, victim: EntityId) -> bool {
        !self.ids.contains(&victim)
    }

    /// Records a hit. Recording the same victim twice is a driver bug.
    pub fn record(&mut self, victim: EntityId) {
        let fresh = self.ids.insert(victim);
        debug_assert!(fresh, "{victim} hit twice by the same attack");
    }

    /// Forgets every victim.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of victims struck.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks if nobody has been struck.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Attack with a fixed hitbox and fixed knockback direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleAttack {
    /// Unit knockback direction
    pub kb_dir: Vec2,
    /// Knockback at zero damage
    pub kb_base: f32,
    /// Knockback added per point of damage
    pub kb_scaling: f32,
    /// Damage dealt
    pub damage: f32,
    /// Base stun
    pub stun: f32,
    /// Clash priority
    pub priority: f32,
    /// World-space hitbox
    pub hitbox: Rect,
    /// Fixed origin direction
    pub origin_dir: f32,
    /// Owner tags
    pub owner: Ownership,
    /// Hit sound
    pub audio: String,
    hits: HitSet,
}

impl SimpleAttack {
    /// Creates an attack with an empty hitbox owned by nobody.
    #[must_use]
    pub fn new(kb_dir: Vec2, kb_base: f32, kb_scaling: f32, damage: f32, stun: f32) -> Self {
        Self {
            kb_dir: kb_dir.normalize_or_zero(),
            kb_base,
            kb_scaling,
            damage,
            stun,
            priority: 0.0,
            hitbox: Rect::default(),
            origin_dir: 1.0,
            owner: Ownership::default(),
            audio: String::new(),
            hits: HitSet::new(),
        }
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the hitbox.
    #[must_use]
    pub fn with_hitbox(mut self, hitbox: Rect) -> Self {
        self.hitbox = hitbox;
        self
    }

    /// Sets the origin direction.
    #[must_use]
    pub fn with_origin(mut self, origin_dir: f32) -> Self {
        self.origin_dir = origin_dir;
        self
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_owner(mut self, owner: Ownership) -> Self {
        self.owner = owner;
        self
    }

    /// Sets the hit sound.
    #[must_use]
    pub fn with_audio(mut self, audio: &str) -> Self {
        self.audio = audio.to_string();
        self
    }

    /// Moves the hitbox center.
    pub fn set_position(&mut self, pos: Vec2) {
        self.hitbox.x = pos.x;
        self.hitbox.y = pos.y;
    }

    /// Records a struck victim.
    pub fn record_hit(&mut self, victim: EntityId) {
        self.hits.record(victim);
    }

    /// Forgets every struck victim.
    pub fn clear_hits(&mut self) {
        self.hits.clear();
    }

    /// Hands the attack to another owner.
    pub fn reown(&mut self, owner: Ownership) {
        self.owner = owner;
    }
}

impl Attack for SimpleAttack {
    fn hitbox(&self) -> Rect {
        self.hitbox
    }

    fn priority(&self) -> f32 {
        self.priority
    }

    fn damage(&self) -> f32 {
        self.damage
    }

    fn owner(&self) -> Ownership {
        self.owner
    }

    fn audio_id(&self) -> &str {
        &self.audio
    }

    fn calc_stun(&self, _victim: &Body, damage: f32) -> f32 {
        scaled_stun(self.stun, damage)
    }

    fn calc_knockback(&self, _victim: &Body, damage: f32) -> Vec2 {
        self.kb_dir * knockback_magnitude(self.kb_base, self.kb_scaling, damage)
    }

    fn origin_direction(&self, _victim: &Body) -> f32 {
        self.origin_dir
    }

    fn can_hit(&self, victim: EntityId) -> bool {
        self.hits.can_hit(victim)
    }
}

/// Timeline, damage and hitbox tunables of a fighter attack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackParams {
    /// Time before the hitbox appears
    pub startup: f32,
    /// Time the hitbox is active
    pub duration: f32,
    /// Recovery after the hitbox closes
    pub cooldown: f32,
    /// Damage dealt
    pub damage: f32,
    /// Base stun
    pub stun: f32,
    /// Unit knockback direction, facing right
    pub kb_dir: Vec2,
    /// Knockback at zero damage
    pub kb_base: f32,
    /// Knockback added per point of damage
    pub kb_scaling: f32,
    /// Hitbox center relative to the owner, facing right
    pub hitbox_offset: Vec2,
    /// Hitbox size
    pub hitbox_size: Vec2,
    /// Clash priority
    pub priority: f32,
}

impl AttackParams {
    /// Reads an attack block (`startup`, `duration`, `cooldown`, `damage`,
    /// `stun`, `knockbackx/y`, `kbbase`, `kbscaling`, `hitboxx/y/w/h`,
    /// `priority`).
    pub fn load(scope: &ParamScope<'_>) -> ParamResult<Self> {
        Ok(Self {
            startup: scope.param("startup")?,
            duration: scope.param("duration")?,
            cooldown: scope.param("cooldown")?,
            damage: scope.param("damage")?,
            stun: scope.param("stun")?,
            kb_dir: unit_direction(scope, "knockbackx", "knockbacky")?,
            kb_base: scope.param("kbbase")?,
            kb_scaling: scope.param("kbscaling")?,
            hitbox_offset: scope.vec2("hitboxx", "hitboxy")?,
            hitbox_size: scope.vec2("hitboxw", "hitboxh")?,
            priority: scope.param("priority")?,
        })
    }

    /// End of the active window.
    #[must_use]
    pub fn active_end(&self) -> f32 {
        self.startup + self.duration
    }

    /// Total length of the attack.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.startup + self.duration + self.cooldown
    }
}

/// Reads and normalizes a direction; a zero vector is a configuration error.
pub fn unit_direction(scope: &ParamScope<'_>, x: &str, y: &str) -> ParamResult<Vec2> {
    let raw = scope.vec2(x, y)?;
    raw.try_normalize().ok_or_else(|| ParamError::Invalid {
        key: format!("{}.{x}", scope.prefix()),
        reason: "knockback direction must be non-zero".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geosmash_common::{ParamTable, PlayerId, TeamId};
    use proptest::prelude::*;

    fn victim() -> Body {
        Body::new(Ownership::default(), Vec2::ZERO, Vec2::new(30.0, 50.0))
    }

    #[test]
    fn test_stun_formula() {
        let attack = SimpleAttack::new(Vec2::X, 5.0, 0.05, 10.0, 0.2);
        let expected = 0.2 * (33.0 * 1.2 / 33.0 + 1.5);
        assert!((attack.calc_stun(&victim(), 33.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_knockback_at_ten_percent() {
        let attack = SimpleAttack::new(Vec2::new(0.0, 2.0), 5.0, 0.05, 10.0, 0.2);
        let kb = attack.calc_knockback(&victim(), 10.0);
        assert!((kb.length() - 5.5).abs() < 1e-5);
        assert!(kb.x.abs() < 1e-6);
    }

    #[test]
    fn test_hit_set_membership() {
        let mut attack = SimpleAttack::new(Vec2::X, 1.0, 1.0, 1.0, 1.0);
        let id = EntityId::new();
        assert!(attack.can_hit(id));

        attack.record_hit(id);
        assert!(!attack.can_hit(id));

        attack.clear_hits();
        assert!(attack.can_hit(id));
    }

    #[test]
    #[should_panic(expected = "hit twice")]
    #[cfg(debug_assertions)]
    fn test_double_hit_is_rejected() {
        let mut hits = HitSet::new();
        let id = EntityId::new();
        hits.record(id);
        hits.record(id);
    }

    #[test]
    fn test_reown() {
        let mut attack = SimpleAttack::new(Vec2::X, 1.0, 1.0, 1.0, 1.0).with_owner(Ownership::STAGE);
        attack.reown(Ownership::new(PlayerId::new(2), TeamId::new(1)));
        assert_eq!(attack.owner().player, PlayerId::new(2));
    }

    #[test]
    fn test_params_reject_zero_direction() {
        let table = ParamTable::parse_text(
            "a.startup 0.1\na.duration 0.1\na.cooldown 0.1\na.damage 1\na.stun 1\n\
             a.knockbackx 0\na.knockbacky 0\na.kbbase 1\na.kbscaling 1\n\
             a.hitboxx 0\na.hitboxy 0\na.hitboxw 1\na.hitboxh 1\na.priority 1\n",
        )
        .expect("valid");
        let err = AttackParams::load(&table.scoped("a")).expect_err("zero direction");
        assert!(matches!(err, ParamError::Invalid { key, .. } if key == "a.knockbackx"));
    }

    proptest! {
        #[test]
        fn prop_knockback_non_decreasing(
            base in 0.0f32..50.0,
            scaling in 0.0f32..2.0,
            d1 in 0.0f32..300.0,
            delta in 0.0f32..300.0,
        ) {
            let attack = SimpleAttack::new(Vec2::new(1.0, 1.0), base, scaling, 10.0, 0.2);
            let low = attack.calc_knockback(&victim(), d1).length();
            let high = attack.calc_knockback(&victim(), d1 + delta).length();
            prop_assert!(high + 1e-3 >= low);
        }

        #[test]
        fn prop_hit_then_cannot_hit(count in 1usize..16) {
            let mut attack = SimpleAttack::new(Vec2::X, 1.0, 1.0, 1.0, 1.0);
            let ids: Vec<EntityId> = (0..count).map(|_| EntityId::new()).collect();
            for id in &ids {
                prop_assert!(attack.can_hit(*id));
                attack.record_hit(*id);
                prop_assert!(!attack.can_hit(*id));
            }
            attack.clear_hits();
            for id in &ids {
                prop_assert!(attack.can_hit(*id));
            }
        }
    }
}
