//! The per-frame collision driver.
//!
//! [`Arena`] owns every entity of a match together with the stage, and
//! advances them one frame at a time in a fixed order:
//!
//! 1. queued spawns join, finished entities leave, hazards erupt
//! 2. fighters process input
//! 3. grab commands and disconnect notices are routed
//! 4. physics and state timers
//! 5. ground and platform contact
//! 6. hitbox-vs-hitbox clashes
//! 7. hitbox-vs-hurtbox connects
//! 8. kill box, respawns and KO credit
//! 9. side-channel events go to the [`EventBus`]
//!
//! Entities live in a `Vec` with an id-to-index map beside it. Pairs are
//! borrowed through `split_at_mut`, so no entity ever holds a reference to
//! another between calls.

use std::sync::Arc;

use ahash::AHashMap;
use geosmash_common::{EntityId, Ownership, PlayerId, Rect};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::attack::Attack;
use crate::config::FighterConfig;
use crate::controller::ControllerState;
use crate::entity::Entity;
use crate::events::{EventBus, Outbox, Stat, StatBook, StatChange};
use crate::fighter::Fighter;
use crate::hazard::{HazardParams, VolcanoHazard};
use crate::stage::StageLayout;
use crate::state::{FighterState, FrameCtx};

/// Upper bound on grab routing rounds per pass.
const MAX_ROUTING_ROUNDS: usize = 8;

/// Match-wide rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    /// Lives each fighter starts with
    pub lives: u32,
    /// Capacity of the side-channel event bus
    pub bus_capacity: usize,
    /// Seconds between volcano eruptions; zero disables hazards
    pub hazard_interval: f32,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            lives: 3,
            bus_capacity: 1024,
            hazard_interval: 0.0,
        }
    }
}

/// One attack landing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HitRecord {
    /// Entity whose hitbox connected
    pub attacker: EntityId,
    /// Entity that was struck
    pub victim: EntityId,
    /// Player owning the attacker
    pub attacker_player: PlayerId,
}

/// One fighter leaving the kill box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnockOut {
    /// Fighter that fell
    pub victim: EntityId,
    /// Its player
    pub player: PlayerId,
    /// Player credited with the kill, `NONE` for a self-destruct
    pub credited: PlayerId,
    /// Lives remaining after the fall
    pub lives_left: u32,
}

/// What happened during one [`Arena::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameReport {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Attacks that landed
    pub hits: Vec<HitRecord>,
    /// Hitbox pairs that clashed
    pub clashes: Vec<(EntityId, EntityId)>,
    /// Fighters knocked out
    pub kos: Vec<KnockOut>,
}

impl FrameReport {
    /// Checks if nothing notable happened.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.hits.is_empty() && self.clashes.is_empty() && self.kos.is_empty()
    }
}

/// A running match.
#[derive(Debug)]
pub struct Arena {
    stage: StageLayout,
    rules: MatchRules,
    /// Live entities in update order
    entities: Vec<Entity>,
    /// Map from EntityId to index in `entities`
    index: AHashMap<EntityId, usize>,
    /// Entities joining at the start of the next frame
    pending: Vec<Entity>,
    bus: EventBus,
    stats: StatBook,
    hazard: Option<HazardParams>,
    hazard_t: f32,
    next_site: usize,
    fighters_added: usize,
    frame: u64,
}

impl Arena {
    /// Creates an empty arena on `stage`.
    #[must_use]
    pub fn new(stage: StageLayout, rules: MatchRules) -> Self {
        Self {
            stage,
            rules,
            entities: Vec::new(),
            index: AHashMap::new(),
            pending: Vec::new(),
            bus: EventBus::new(rules.bus_capacity),
            stats: StatBook::new(),
            hazard: None,
            hazard_t: 0.0,
            next_site: 0,
            fighters_added: 0,
            frame: 0,
        }
    }

    /// Enables volcano eruptions at the stage's hazard sites.
    #[must_use]
    pub fn with_hazards(mut self, params: HazardParams) -> Self {
        self.hazard = Some(params);
        self
    }

    /// Adds a fighter on the next respawn point, starting on its platform.
    pub fn add_fighter(&mut self, config: Arc<FighterConfig>, owner: Ownership) -> EntityId {
        let point = self.stage.respawn_point(self.fighters_added);
        self.fighters_added += 1;
        let fighter = Fighter::new(config, owner, point, self.rules.lives);
        let id = fighter.id();
        info!("{} joins as {} ({})", owner.player, fighter.core().kind(), id);
        self.insert(fighter.into());
        id
    }

    /// Adds an arbitrary entity right away.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        self.insert(entity);
        id
    }

    fn insert(&mut self, entity: Entity) {
        self.index.insert(entity.id(), self.entities.len());
        self.entities.push(entity);
    }

    /// Returns the number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the arena holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index.get(&id).map(|&i| &self.entities[i])
    }

    /// Fighter by entity id.
    #[must_use]
    pub fn fighter(&self, id: EntityId) -> Option<&Fighter> {
        self.get(id).and_then(Entity::as_fighter)
    }

    /// Mutable fighter by entity id.
    pub fn fighter_mut(&mut self, id: EntityId) -> Option<&mut Fighter> {
        let i = *self.index.get(&id)?;
        self.entities[i].as_fighter_mut()
    }

    /// Iterates over all live entities in update order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Iterates over the fighters.
    pub fn fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.entities.iter().filter_map(Entity::as_fighter)
    }

    /// Stage, including current ledge occupancy.
    #[must_use]
    pub fn stage(&self) -> &StageLayout {
        &self.stage
    }

    /// Match rules.
    #[must_use]
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Accumulated per-player statistics.
    #[must_use]
    pub fn stats(&self) -> &StatBook {
        &self.stats
    }

    /// Side-channel events not yet drained by a consumer.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Frames simulated so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Checks if at most one team still has fighters with lives.
    #[must_use]
    pub fn is_over(&self) -> bool {
        let mut teams = self.fighters().filter(|f| f.is_alive()).map(Fighter::team);
        match teams.next() {
            Some(first) => teams.all(|team| team == first),
            None => true,
        }
    }

    /// Moves one life from `donor` to a teammate `receiver`.
    ///
    /// A dead receiver comes back on its respawn platform. Returns false when
    /// the two are not teammates or the donor has no life to spare.
    pub fn share_life(&mut self, donor: EntityId, receiver: EntityId) -> bool {
        let (Some(&d), Some(&r)) = (self.index.get(&donor), self.index.get(&receiver)) else {
            return false;
        };
        if d == r {
            return false;
        }
        let (giver, taker) = pair_mut(&mut self.entities, d, r);
        let (Some(giver), Some(taker)) = (giver.as_fighter_mut(), taker.as_fighter_mut()) else {
            return false;
        };
        if giver.team() != taker.team() || !giver.steal_life() {
            return false;
        }

        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut self.stage, &mut out);
        taker.add_lives(1, &mut cx);
        info!("{} gives a life to {}", giver.player(), taker.player());
        self.flush_events(&mut out);
        true
    }

    /// Advances the match by one frame.
    ///
    /// Players without an entry in `inputs` are treated as idle.
    pub fn step(&mut self, inputs: &AHashMap<PlayerId, ControllerState>, dt: f32) -> FrameReport {
        self.frame += 1;
        let mut report = FrameReport {
            frame: self.frame,
            ..FrameReport::default()
        };
        let mut out = Outbox::new();

        self.join_and_reap(dt, &mut out);
        self.process_inputs(inputs, dt, &mut out);
        self.route_grabs(&mut out);
        for entity in &mut self.entities {
            entity.update(dt, &mut out);
        }
        self.ground_collisions(dt, &mut out);
        self.clashes(&mut report);
        self.connects(&mut out, &mut report);
        self.kill_box(&mut out, &mut report);
        self.route_grabs(&mut out);

        self.pending
            .extend(out.spawns.drain(..).map(Entity::Projectile));
        self.flush_events(&mut out);

        if !report.is_quiet() {
            debug!(
                "frame {}: {} hits, {} clashes, {} KOs",
                report.frame,
                report.hits.len(),
                report.clashes.len(),
                report.kos.len()
            );
        }
        report
    }

    fn join_and_reap(&mut self, dt: f32, out: &mut Outbox) {
        for entity in self.pending.drain(..) {
            debug!("{} joins the arena", entity.id());
            self.entities.push(entity);
        }

        if let Some(params) = self.hazard {
            if self.rules.hazard_interval > 0.0 && !self.stage.hazard_sites.is_empty() {
                self.hazard_t += dt;
                if self.hazard_t >= self.rules.hazard_interval {
                    self.hazard_t = 0.0;
                    let site = self.stage.hazard_sites[self.next_site % self.stage.hazard_sites.len()];
                    self.next_site += 1;
                    let hazard = VolcanoHazard::erupt(&params, site, out);
                    self.entities.push(hazard.into());
                }
            }
        }

        self.entities.retain(|entity| !entity.is_done());
        self.index = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, entity)| (entity.id(), i))
            .collect();
    }

    fn process_inputs(&mut self, inputs: &AHashMap<PlayerId, ControllerState>, dt: f32, out: &mut Outbox) {
        let idle = ControllerState::default();
        let mut cx = FrameCtx::new(&mut self.stage, out);
        for fighter in self.entities.iter_mut().filter_map(Entity::as_fighter_mut) {
            let input = inputs.get(&fighter.player()).unwrap_or(&idle);
            fighter.process_input(input, dt, &mut cx);
        }
    }

    /// Delivers limp commands to victims and disconnect notices to grabbers.
    ///
    /// Delivering one may produce another (a throw that ends a grab), so this
    /// runs until both queues are empty.
    fn route_grabs(&mut self, out: &mut Outbox) {
        for _ in 0..MAX_ROUTING_ROUNDS {
            if out.limp_commands.is_empty() && out.grab_notices.is_empty() {
                return;
            }
            let commands = std::mem::take(&mut out.limp_commands);
            let notices = std::mem::take(&mut out.grab_notices);
            let mut cx = FrameCtx::new(&mut self.stage, out);

            for command in commands {
                let victim = self
                    .index
                    .get(&command.victim)
                    .and_then(|&i| self.entities[i].as_fighter_mut());
                match victim {
                    Some(victim) => victim.apply_limp_command(command, &mut cx),
                    None => warn!("{} command for missing victim {}", command.grab, command.victim),
                }
            }
            for notice in notices {
                let crate::grab::GrabNotice::Disconnected { grabber, grab } = notice;
                let fighter = self
                    .index
                    .get(&grabber)
                    .and_then(|&i| self.entities[i].as_fighter_mut());
                match fighter {
                    Some(fighter) => fighter.grab_disconnected(grab),
                    None => debug!("{} notice for missing grabber {}", grab, grabber),
                }
            }
        }
        if out.limp_commands.is_empty() && out.grab_notices.is_empty() {
            return;
        }
        warn!(
            "grab routing did not settle: {} commands, {} notices left",
            out.limp_commands.len(),
            out.grab_notices.len()
        );
    }

    fn ground_collisions(&mut self, dt: f32, out: &mut Outbox) {
        let ground = self.stage.ground;
        let platforms = self.stage.platforms.clone();
        let mut cx = FrameCtx::new(&mut self.stage, out);

        for fighter in self.entities.iter_mut().filter_map(Entity::as_fighter_mut) {
            if matches!(fighter.state(), FighterState::Respawn(_) | FighterState::Dead) {
                continue;
            }
            let body = fighter.body();
            let rect = body.rect();
            let (contact, collided, platform) = if rect.overlaps(&ground) {
                (ground, true, false)
            } else if let Some(top) = platforms
                .iter()
                .find(|p| lands_on_platform(rect, body.vel, **p, dt))
            {
                (*top, true, true)
            } else {
                (ground, false, false)
            };
            fighter.collision_with_ground(contact, collided, platform, &mut cx);
        }
    }

    fn clashes(&mut self, report: &mut FrameReport) {
        let n = self.entities.len();
        for i in 0..n {
            for j in i + 1..n {
                let (a, b) = pair_mut(&mut self.entities, i, j);
                if matches!(a, Entity::Hazard(_)) || matches!(b, Entity::Hazard(_)) {
                    continue;
                }
                if a.owner().player == b.owner().player {
                    continue;
                }
                let (Some(info_a), Some(info_b)) = (a.clash_info(), b.clash_info()) else {
                    continue;
                };
                let overlap = match (a.attack(), b.attack()) {
                    (Some(x), Some(y)) => x.hitbox().overlaps(&y.hitbox()),
                    _ => false,
                };
                if !overlap {
                    continue;
                }
                debug!("{} and {} clash", a.id(), b.id());
                report.clashes.push((a.id(), b.id()));
                a.attack_collision(&info_b);
                b.attack_collision(&info_a);
            }
        }
    }

    fn connects(&mut self, out: &mut Outbox, report: &mut FrameReport) {
        let n = self.entities.len();
        let mut cx = FrameCtx::new(&mut self.stage, out);
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (attacker, victim) = pair_mut(&mut self.entities, i, j);
                if !victim.can_be_hit() || attacker.owner().player == victim.owner().player {
                    continue;
                }
                let lands = attacker.attack().is_some_and(|attack| {
                    attack.can_hit(victim.id()) && attack.hitbox().overlaps(&victim.rect())
                });
                if !lands {
                    continue;
                }
                report.hits.push(HitRecord {
                    attacker: attacker.id(),
                    victim: victim.id(),
                    attacker_player: attacker.owner().player,
                });
                attacker.attack_connected(victim, &mut cx);
            }
        }
    }

    fn kill_box(&mut self, out: &mut Outbox, report: &mut FrameReport) {
        let kill_box = self.stage.kill_box;
        let fallen: Vec<usize> = self
            .entities
            .iter()
            .enumerate()
            .filter_map(|(i, entity)| {
                let fighter = entity.as_fighter()?;
                let out_of_bounds = !fighter.state().is_dead()
                    && !kill_box.contains_point(fighter.body().pos);
                out_of_bounds.then_some(i)
            })
            .collect();

        for i in fallen {
            let Some(victim) = self.entities[i].as_fighter() else {
                continue;
            };
            let player = victim.player();
            let credited = Some(victim.last_hit_by())
                .filter(|&by| by.is_player() && by != player)
                .unwrap_or(PlayerId::NONE);
            let credited_team = self
                .fighters()
                .find(|f| f.player() == credited)
                .map(Fighter::team);
            let victim_team = victim.team();

            if credited.is_player() {
                if credited_team == Some(victim_team) {
                    out.stat(credited, Stat::TeamKills, StatChange::Add(1.0));
                } else {
                    out.stat(credited, Stat::Kills, StatChange::Add(1.0));
                    out.stat(credited, Stat::CurKillStreak, StatChange::Add(1.0));
                    out.stat(
                        credited,
                        Stat::MaxKillStreak,
                        StatChange::RaiseTo(Stat::CurKillStreak),
                    );
                }
            } else {
                out.stat(player, Stat::Suicides, StatChange::Add(1.0));
            }

            let mut cx = FrameCtx::new(&mut self.stage, out);
            let Some(victim) = self.entities[i].as_fighter_mut() else {
                continue;
            };
            let id = victim.id();
            victim.respawn(true, &mut cx);
            let lives_left = victim.lives();
            info!("{} knocked out, credited to {}", player, credited);

            if lives_left == 0 {
                let still_alive = self
                    .fighters()
                    .filter(|f| f.id() != id && f.is_alive())
                    .count();
                let place = (still_alive + 1) as f32;
                out.stat(player, Stat::Place, StatChange::Set(place));
                info!("{} is out in place {}", player, still_alive + 1);
            }

            report.kos.push(KnockOut {
                victim: id,
                player,
                credited,
                lives_left,
            });
        }
    }

    fn flush_events(&mut self, out: &mut Outbox) {
        for event in out.events.drain(..) {
            self.stats.apply(&event);
            self.bus.publish(event);
        }
    }
}

/// Checks if a body falling onto `platform` should land on it this frame.
///
/// Platforms are one-way: only a body moving down (or resting) whose bottom
/// was at or above the top one frame ago lands.
fn lands_on_platform(rect: Rect, vel: Vec2, platform: Rect, dt: f32) -> bool {
    if vel.y > 0.0 || !rect.overlaps(&platform) {
        return false;
    }
    let previous_bottom = rect.bottom() - vel.y * dt;
    previous_bottom >= platform.top() - 1.0
}

/// Borrows two distinct entities at once.
fn pair_mut(entities: &mut [Entity], i: usize, j: usize) -> (&mut Entity, &mut Entity) {
    debug_assert_ne!(i, j, "an entity cannot pair with itself");
    if i < j {
        let (head, tail) = entities.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = entities.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
