//! ID types for entities and their owners.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// First ID handed out; low values are left free for tooling.
const FIRST_ENTITY_ID: u64 = 100;

/// Global counter for entity IDs.
static ENTITY_COUNTER: AtomicU64 = AtomicU64::new(FIRST_ENTITY_ID);

/// Unique identifier for an entity in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new unique entity ID.
    #[must_use]
    pub fn new() -> Self {
        Self(ENTITY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an entity ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of the player controlling an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(i32);

impl PlayerId {
    /// No player owns the entity.
    pub const NONE: Self = Self(-1);

    /// The stage itself (hazards).
    pub const STAGE: Self = Self(-2);

    /// Creates a player ID for a controller slot.
    #[must_use]
    pub const fn new(slot: i32) -> Self {
        Self(slot)
    }

    /// Returns the raw slot value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Checks if this refers to an actual player slot.
    #[must_use]
    pub const fn is_player(self) -> bool {
        self.0 >= 0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => write!(f, "nobody"),
            Self::STAGE => write!(f, "stage"),
            Self(slot) => write!(f, "P{}", slot + 1),
        }
    }
}

/// Identifier of the team an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(i32);

impl TeamId {
    /// Not on any team.
    pub const NONE: Self = Self(-1);

    /// The stage itself (hazards).
    pub const STAGE: Self = Self(-2);

    /// Creates a team ID.
    #[must_use]
    pub const fn new(team: i32) -> Self {
        Self(team)
    }

    /// Returns the raw team value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl Default for TeamId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Player and team an entity or attack belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ownership {
    /// Owning player
    pub player: PlayerId,
    /// Owning team
    pub team: TeamId,
}

impl Ownership {
    /// Ownership of entities spawned by the stage.
    pub const STAGE: Self = Self {
        player: PlayerId::STAGE,
        team: TeamId::STAGE,
    };

    /// Creates an ownership tag.
    #[must_use]
    pub const fn new(player: PlayerId, team: TeamId) -> Self {
        Self { player, team }
    }

    /// Checks if both tags belong to the same player.
    #[must_use]
    pub fn same_player(&self, other: &Ownership) -> bool {
        self.player.is_player() && self.player == other.player
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_are_unique_and_start_high() {
        let ids: Vec<EntityId> = (0..64).map(|_| EntityId::new()).collect();
        for (i, a) in ids.iter().enumerate() {
            assert!(a.raw() >= FIRST_ENTITY_ID);
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_same_player() {
        let p1 = Ownership::new(PlayerId::new(0), TeamId::new(0));
        let p1_again = Ownership::new(PlayerId::new(0), TeamId::new(1));
        let p2 = Ownership::new(PlayerId::new(1), TeamId::new(0));

        assert!(p1.same_player(&p1_again));
        assert!(!p1.same_player(&p2));
        assert!(!Ownership::STAGE.same_player(&Ownership::STAGE));
    }

    #[test]
    fn test_player_display() {
        assert_eq!(PlayerId::new(0).to_string(), "P1");
        assert_eq!(PlayerId::STAGE.to_string(), "stage");
    }
}
