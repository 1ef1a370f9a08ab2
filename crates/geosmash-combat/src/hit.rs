//! Hit resolution and the ground-contact helpers shared by fighter states.
//!
//! - [`calculate_hit_result`]: damage, stats, knockback and the transition
//!   into [`AirStunnedState`]
//! - [`collision_helper`]: snaps a body out of a ground or platform box
//! - [`check_for_ledge_grab`]: the common ledge-grab test of airborne states

use geosmash_common::Rect;
use glam::Vec2;
use tracing::debug;

use crate::attack::Attack;
use crate::body::Body;
use crate::events::{Outbox, Stat, StatChange};
use crate::fighter::FighterCore;
use crate::state::{AirStunnedState, FighterState, FrameCtx, LedgeGrabState};

/// Applies `attack` to a fighter and returns the stunned state it lands in.
///
/// Any running attack is dropped first. Damage accumulates before knockback
/// and stun are computed, so a fighter is always launched at its new damage.
pub fn calculate_hit_result(core: &mut FighterCore, attack: &dyn Attack, out: &mut Outbox) -> FighterState {
    core.drop_attack();

    let dealt = attack.damage();
    core.damage += dealt;
    record_damage_stats(core, attack, dealt, out);

    let knockback = attack.calc_knockback(&core.body, core.damage);
    core.body.vel = core.config.movement.kb_scaling * knockback;

    hit_spark(&core.body, attack.hitbox(), out);
    let audio = attack.audio_id();
    if !audio.is_empty() {
        out.sound_at(audio, core.body.pos, core.damage);
    }

    // Clear the ground so the launch is not eaten by a landing.
    core.body.pos.y += 4.0;

    let launch = core.body.vel.length();
    let stun = attack.calc_stun(&core.body, core.damage);
    debug!(
        "{} hit for {:.1} (now {:.1}), stunned {:.2}s",
        core.body.id, dealt, core.damage, stun
    );
    FighterState::AirStunned(AirStunnedState::new(core, stun, (launch > 0.0).then_some(launch)))
}

fn record_damage_stats(core: &FighterCore, attack: &dyn Attack, dealt: f32, out: &mut Outbox) {
    let victim = core.body.owner;
    let attacker = attack.owner();
    out.stat(victim.player, Stat::DamageTaken, StatChange::Add(dealt));
    if attacker.team == victim.team {
        out.stat(attacker.player, Stat::TeamDamageGiven, StatChange::Add(dealt));
    } else {
        out.stat(attacker.player, Stat::DamageGiven, StatChange::Add(dealt));
        out.stat(attacker.player, Stat::DamageStreak, StatChange::Add(dealt));
        out.stat(
            attacker.player,
            Stat::MaxDamageStreak,
            StatChange::RaiseTo(Stat::DamageStreak),
        );
    }
}

/// Small explosion on the side of `body` facing the hitbox.
pub fn hit_spark(body: &Body, hitbox: Rect, out: &mut Outbox) {
    let from = (body.pos - hitbox.center()).normalize_or_zero();
    out.explosion(body.pos - from * body.size / 2.0, 0.2);
}

/// Moves `body` out of `ground`.
///
/// Platforms and grounds the body is mostly above put it on top, one unit
/// sunk in so it keeps overlapping next frame. Below the top it is pushed
/// under or beside the box.
pub fn collision_helper(body: &mut Body, ground: Rect, platform: bool) {
    let on_top = ground.top() + body.size.y / 2.0 - 1.0;
    if platform || ground.contains(&body.rect()) || body.pos.y > ground.top() {
        body.pos.y = on_top;
    } else if body.pos.x < ground.right() && body.pos.x > ground.left() {
        body.pos.y = ground.bottom() - body.size.y / 2.0;
    } else {
        let gap = ground.x - body.pos.x;
        let dir = gap.signum();
        body.pos.x += dir * (gap.abs() - (ground.w / 2.0 + body.size.x / 2.0));
    }
}

/// Walks a fighter that slid off an edge back onto its last ground.
pub fn step_back_onto_ground(core: &mut FighterCore) {
    let Some(ground) = core.last_ground else {
        return;
    };
    let gap = ground.x - core.body.pos.x;
    let dir = if gap > 0.0 { 1.0 } else { -1.0 };
    core.body.pos.x += dir * (gap.abs() - ground.w / 2.0 - core.body.size.x / 2.0 + 2.0);
}

/// Grabs the nearest free ledge if the fighter is in reach of it.
///
/// The fighter must hang below the ledge, within `ledgeGrab.dist`, on its
/// outer side, and must not be attacking unless `attack_ok`.
pub fn check_for_ledge_grab(core: &mut FighterCore, attack_ok: bool, cx: &mut FrameCtx<'_>) -> Option<FighterState> {
    let pos = core.body.pos;
    let (id, ledge) = cx.stage.nearest_free_ledge(pos)?;
    debug_assert!(!ledge.occupied, "stage offered an occupied ledge");

    let reachable = (core.attack.is_none() || attack_ok)
        && ledge.pos.y > pos.y + core.body.size.y / 2.0
        && pos.distance(ledge.pos) <= core.config.ledge_grab.dist
        && ledge.dir * (pos.x - ledge.pos.x) >= 1.0;
    if !reachable {
        return None;
    }

    cx.out.sound("ledgegrab");
    if let Some(attack) = core.attack.as_mut() {
        attack.kill();
    }
    Some(FighterState::LedgeGrab(LedgeGrabState::grab(core, id, ledge.pos, cx)))
}

/// Unit stick direction, if the stick is off center.
pub(crate) fn stick_direction(x: f32, y: f32) -> Option<Vec2> {
    let dir = Vec2::new(x, y).normalize_or_zero();
    (dir != Vec2::ZERO).then_some(dir)
}
