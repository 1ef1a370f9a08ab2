//! Side-channel output of the combat core.
//!
//! Combat code never calls audio, particle or stats systems directly. It
//! appends to a per-frame [`Outbox`], which the arena drains once per frame:
//! - [`CombatEvent`]s go to the [`EventBus`] for whatever subscribers exist
//! - spawned projectiles join the entity list
//! - grab commands and disconnect notices are routed between fighters

use ahash::AHashMap;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use geosmash_common::PlayerId;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::grab::{GrabNotice, LimpCommand};
use crate::projectile::Projectile;

/// Particle effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Small dust cloud (jumps, landings, dashes)
    Puff,
    /// Hit spark
    Explosion,
}

/// Per-player statistics touched by the combat core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    /// Damage received
    DamageTaken,
    /// Damage dealt to opponents
    DamageGiven,
    /// Damage dealt to teammates
    TeamDamageGiven,
    /// Damage dealt since the attacker last died
    DamageStreak,
    /// Best damage streak
    MaxDamageStreak,
    /// Opponents knocked out
    Kills,
    /// Teammates knocked out
    TeamKills,
    /// Knockouts since the attacker last died
    CurKillStreak,
    /// Best kill streak
    MaxKillStreak,
    /// Times knocked out
    Deaths,
    /// Falls with nobody to credit
    Suicides,
    /// Finishing place, set when the last life is lost
    Place,
}

/// How a stat event modifies its stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StatChange {
    /// Adds to the stat
    Add(f32),
    /// Overwrites the stat
    Set(f32),
    /// Raises the stat to the current value of another stat of the same player
    RaiseTo(Stat),
}

/// One-way notification produced by the combat core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Play a sound
    Sound {
        /// Sound id
        id: String,
        /// World position, if the sound is positional
        position: Option<Vec2>,
        /// Victim damage, used to pitch hit sounds
        damage: Option<f32>,
    },
    /// Spawn particles
    Particles {
        /// Effect kind
        effect: Effect,
        /// World position
        position: Vec2,
        /// Size of the burst
        scale: f32,
    },
    /// Record a statistic
    Stat {
        /// Player the stat belongs to
        player: PlayerId,
        /// Which stat
        stat: Stat,
        /// Modification
        change: StatChange,
    },
}

/// Event bus for broadcasting combat events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<CombatEvent>,
    /// Receiver for collecting events
    receiver: Receiver<CombatEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    ///
    /// Never blocks; when the channel is full the event is dropped.
    pub fn publish(&self, event: CombatEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            warn!("Event bus full, dropping {:?}", event);
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<CombatEvent> {
        self.sender.clone()
    }
}

/// Everything combat code produced during one frame.
#[derive(Debug, Default)]
pub struct Outbox {
    /// Side-channel events
    pub events: Vec<CombatEvent>,
    /// Entities to add at the start of the next frame
    pub spawns: Vec<Projectile>,
    /// Grabber-to-victim commands
    pub limp_commands: Vec<LimpCommand>,
    /// Victim-to-grabber notices
    pub grab_notices: Vec<GrabNotice>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a non-positional sound.
    pub fn sound(&mut self, id: &str) {
        self.events.push(CombatEvent::Sound {
            id: id.to_string(),
            position: None,
            damage: None,
        });
    }

    /// Queues a positional hit sound.
    pub fn sound_at(&mut self, id: &str, position: Vec2, damage: f32) {
        self.events.push(CombatEvent::Sound {
            id: id.to_string(),
            position: Some(position),
            damage: Some(damage),
        });
    }

    /// Queues a dust puff.
    pub fn puff(&mut self, position: Vec2, scale: f32) {
        self.events.push(CombatEvent::Particles {
            effect: Effect::Puff,
            position,
            scale,
        });
    }

    /// Queues a hit spark.
    pub fn explosion(&mut self, position: Vec2, scale: f32) {
        self.events.push(CombatEvent::Particles {
            effect: Effect::Explosion,
            position,
            scale,
        });
    }

    /// Queues a stat change. Stats for non-players are dropped.
    pub fn stat(&mut self, player: PlayerId, stat: Stat, change: StatChange) {
        if player.is_player() {
            self.events.push(CombatEvent::Stat {
                player,
                stat,
                change,
            });
        }
    }

    /// Checks if nothing has been queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.spawns.is_empty()
            && self.limp_commands.is_empty()
            && self.grab_notices.is_empty()
    }
}

/// Accumulates [`CombatEvent::Stat`] events into totals.
#[derive(Debug, Clone, Default)]
pub struct StatBook {
    totals: AHashMap<PlayerId, AHashMap<Stat, f32>>,
}

impl StatBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a stat event; other events are ignored.
    pub fn apply(&mut self, event: &CombatEvent) {
        let CombatEvent::Stat {
            player,
            stat,
            change,
        } = event
        else {
            return;
        };
        let stats = self.totals.entry(*player).or_default();
        let value = match change {
            StatChange::Add(delta) => stats.get(stat).copied().unwrap_or(0.0) + delta,
            StatChange::Set(value) => *value,
            StatChange::RaiseTo(other) => {
                let current = stats.get(stat).copied().unwrap_or(0.0);
                current.max(stats.get(other).copied().unwrap_or(0.0))
            }
        };
        stats.insert(*stat, value);
    }

    /// Reads a stat, defaulting to zero.
    #[must_use]
    pub fn get(&self, player: PlayerId, stat: Stat) -> f32 {
        self.totals
            .get(&player)
            .and_then(|stats| stats.get(&stat))
            .copied()
            .unwrap_or(0.0)
    }

    /// Players with at least one recorded stat.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.totals.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_drops_when_full() {
        let bus = EventBus::new(2);
        let mut out = Outbox::new();
        out.sound("a");
        out.sound("b");
        out.sound("c");
        for event in out.events.drain(..) {
            bus.publish(event);
        }

        assert_eq!(bus.pending_count(), 2);
        let drained = bus.drain();
        assert!(matches!(&drained[1], CombatEvent::Sound { id, .. } if id == "b"));
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_stats_for_stage_are_dropped() {
        let mut out = Outbox::new();
        out.stat(PlayerId::STAGE, Stat::DamageGiven, StatChange::Add(5.0));
        assert!(out.is_empty());
    }

    #[test]
    fn test_stat_book_streaks() {
        let p = PlayerId::new(0);
        let mut out = Outbox::new();
        out.stat(p, Stat::DamageStreak, StatChange::Add(12.0));
        out.stat(p, Stat::MaxDamageStreak, StatChange::RaiseTo(Stat::DamageStreak));
        out.stat(p, Stat::DamageStreak, StatChange::Set(0.0));
        out.stat(p, Stat::DamageStreak, StatChange::Add(3.0));
        out.stat(p, Stat::MaxDamageStreak, StatChange::RaiseTo(Stat::DamageStreak));

        let mut book = StatBook::new();
        for event in &out.events {
            book.apply(event);
        }
        assert_eq!(book.get(p, Stat::MaxDamageStreak), 12.0);
        assert_eq!(book.get(p, Stat::DamageStreak), 3.0);
        assert_eq!(book.get(PlayerId::new(1), Stat::Kills), 0.0);
    }
}
