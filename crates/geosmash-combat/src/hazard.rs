//! Stage hazards.

use geosmash_common::{EntityId, Ownership, ParamResult, ParamTable, Rect};
use glam::Vec2;
use tracing::info;

use crate::attack::{unit_direction, SimpleAttack};
use crate::body::Body;
use crate::events::Outbox;

/// Tunables of the volcano hazard (`volcanoHazard.*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardParams {
    /// Knockback direction; only the vertical part is kept
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
    /// Eruption column size
    pub size: Vec2,
    /// Warning time before the eruption
    pub startup: f32,
    /// Eruption length
    pub duration: f32,
    /// Time the hazard lingers afterwards
    pub cooldown: f32,
}

impl HazardParams {
    /// Reads the `volcanoHazard.*` section.
    pub fn load(table: &ParamTable) -> ParamResult<Self> {
        let scope = table.scoped("volcanoHazard");
        let dir = unit_direction(&scope, "knockbackx", "knockbacky")?;
        Ok(Self {
            kb_dir: Vec2::new(0.0, dir.y),
            kb_base: scope.param("kbbase")?,
            kb_scaling: scope.param("kbscaling")?,
            damage: scope.param("damage")?,
            stun: scope.param("stun")?,
            priority: scope.param("priority")?,
            size: scope.vec2("hitboxx", "hitboxy")?,
            startup: scope.param("startup")?,
            duration: scope.param("duration")?,
            cooldown: scope.param("cooldown")?,
        })
    }

    fn active_end(&self) -> f32 {
        self.startup + self.duration
    }

    fn total(&self) -> f32 {
        self.startup + self.duration + self.cooldown
    }
}

/// An eruption column rising from a stage site.
///
/// Owned by the stage. Its attack is live only between `startup` and
/// `startup + duration`; it ignores clashes, the ground and every hit.
#[derive(Debug, Clone)]
pub struct VolcanoHazard {
    body: Body,
    attack: SimpleAttack,
    params: HazardParams,
    t: f32,
    erupted: bool,
}

impl VolcanoHazard {
    /// Places a hazard at `site` and sounds the warning.
    pub fn erupt(params: &HazardParams, site: Vec2, out: &mut Outbox) -> Self {
        let body = Body::new(Ownership::STAGE, site, params.size);

        let column = Rect::new(
            site.x,
            site.y + params.size.y / 2.0,
            params.size.x,
            params.size.y,
        );
        let mut attack = SimpleAttack::new(
            Vec2::Y,
            params.kb_base,
            params.kb_scaling,
            params.damage,
            params.stun,
        )
        .with_priority(params.priority)
        .with_hitbox(column)
        .with_origin(1.0)
        .with_owner(Ownership::STAGE)
        .with_audio("hazardhit");
        // Vertical part only, not renormalized.
        attack.kb_dir = params.kb_dir;

        out.sound_at("hazardwarn", site, 0.0);
        info!("Volcano hazard {} at ({:.0}, {:.0})", body.id, site.x, site.y);

        Self {
            body,
            attack,
            params: *params,
            t: 0.0,
            erupted: false,
        }
    }

    /// Physical body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The eruption attack.
    #[must_use]
    pub fn attack(&self) -> &SimpleAttack {
        &self.attack
    }

    /// Checks if the eruption is live.
    #[must_use]
    pub fn has_attack(&self) -> bool {
        self.t > self.params.startup && self.t < self.params.active_end()
    }

    /// Checks if the hazard should be removed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.t > self.params.total()
    }

    /// Advances the timeline.
    pub fn update(&mut self, dt: f32, out: &mut Outbox) {
        self.t += dt;
        if self.has_attack() && !self.erupted {
            self.erupted = true;
            out.sound_at("hazardactive", self.body.pos, 0.0);
        }
    }

    /// Records a struck victim.
    pub fn connected(&mut self, victim: EntityId) {
        self.attack.record_hit(victim);
    }
}
