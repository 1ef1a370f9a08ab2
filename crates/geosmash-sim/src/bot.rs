//! Scripted controller input.
//!
//! Bots are deterministic: the same match with the same arguments always
//! produces the same frames. Each bot walks toward the closest opponent,
//! jabs when in reach and throws a special every few swings.

use geosmash_combat::{Arena, ControllerState, Fighter, FighterState, PadSample};
use geosmash_common::{EntityId, PlayerId};

/// Horizontal gap under which a bot stops walking and swings.
const REACH: f32 = 55.0;
/// Frames between attack presses.
const SWING_EVERY: u64 = 24;
/// Every this many swings the bot uses its special instead.
const SPECIAL_EVERY: u64 = 4;
/// Walking stick deflection, under the dash threshold.
const WALK: f32 = 0.6;

/// One scripted player.
#[derive(Debug, Clone)]
pub struct Bot {
    entity: EntityId,
    player: PlayerId,
    /// Offsets the swing timer so bots do not mirror each other.
    phase: u64,
    pad: ControllerState,
}

impl Bot {
    /// Creates a bot driving `entity`.
    #[must_use]
    pub fn new(entity: EntityId, player: PlayerId, phase: u64) -> Self {
        Self {
            entity,
            player,
            phase,
            pad: ControllerState::default(),
        }
    }

    /// Player slot this bot plays as.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Samples the virtual pad for this frame and folds it into the
    /// controller state.
    pub fn think(&mut self, arena: &Arena) -> &ControllerState {
        let sample = arena
            .fighter(self.entity)
            .map(|me| self.sample(me, arena))
            .unwrap_or_default();
        self.pad.advance(&sample);
        &self.pad
    }

    fn sample(&self, me: &Fighter, arena: &Arena) -> PadSample {
        let mut pad = PadSample::default();
        match me.state() {
            FighterState::Dead => return pad,
            FighterState::Respawn(_) => {
                pad.joy_y = -1.0;
                return pad;
            }
            FighterState::LedgeGrab(_) => {
                pad.joy_y = 1.0;
                return pad;
            }
            _ => {}
        }

        let pos = me.body().pos;
        let ground = arena.stage().ground;
        if pos.x < ground.left() || pos.x > ground.right() {
            // Off stage: steer home and use the air jump when falling.
            pad.joy_x = if pos.x < ground.x { 1.0 } else { -1.0 };
            pad.y = me.body().vel.y < 0.0 && pos.y < ground.top() + 40.0;
            return pad;
        }

        let Some(target) = closest_opponent(me, arena) else {
            return pad;
        };
        let dx = target.body().pos.x - pos.x;
        if dx.abs() > REACH {
            pad.joy_x = dx.signum() * WALK;
            return pad;
        }

        let tick = arena.frame() + self.phase;
        if tick % SWING_EVERY == 0 {
            if (tick / SWING_EVERY) % SPECIAL_EVERY == 0 {
                pad.b = true;
            } else {
                pad.a = true;
            }
        }
        pad
    }
}

fn closest_opponent<'a>(me: &Fighter, arena: &'a Arena) -> Option<&'a Fighter> {
    let pos = me.body().pos;
    arena
        .fighters()
        .filter(|f| f.team() != me.team() && f.is_alive())
        .filter(|f| !matches!(f.state(), FighterState::Respawn(_)))
        .min_by(|a, b| {
            a.body()
                .pos
                .distance(pos)
                .total_cmp(&b.body().pos.distance(pos))
        })
}
