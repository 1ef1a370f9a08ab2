//! Move catalog: which attacks a fighter type has and how each one behaves.
//!
//! Every fighter type carries the same set of [`MoveId`]s. What differs is
//! the [`MoveShape`] behind a move (a stickman dash attack carries the owner
//! along, a charlie dash attack decelerates) and the special-move states the
//! B button leads to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CombatError;

/// Playable fighter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FighterKind {
    /// Projectile thrower with a launching recovery
    Charlie,
    /// Teleporter with a reflecting cape
    Stickman,
}

impl FighterKind {
    /// Parameter namespace of the fighter type.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Charlie => "charlie",
            Self::Stickman => "stickman",
        }
    }

    /// Looks a fighter type up by name.
    pub fn from_name(name: &str) -> Result<Self, CombatError> {
        match name {
            "charlie" => Ok(Self::Charlie),
            "stickman" => Ok(Self::Stickman),
            _ => Err(CombatError::UnknownFighter {
                name: name.to_string(),
            }),
        }
    }
}

impl FromStr for FighterKind {
    type Err = CombatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for FighterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Named attack slots shared by every fighter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum MoveId {
    Dash,
    Ledge,
    NeutralTilt,
    SideTilt,
    DownTilt,
    UpTilt,
    AirNeutral,
    AirFront,
    AirDown,
    AirUp,
    UpSpecial,
    NeutralSpecial,
    SideSpecial,
    TauntUp,
    TauntDown,
    NeutralSmash,
    SideSmash,
    DownSmash,
    UpSmash,
    Grab,
    CounterAttack,
}

impl MoveId {
    /// Every move, in catalog order.
    pub const ALL: [MoveId; 21] = [
        MoveId::Dash,
        MoveId::Ledge,
        MoveId::NeutralTilt,
        MoveId::SideTilt,
        MoveId::DownTilt,
        MoveId::UpTilt,
        MoveId::AirNeutral,
        MoveId::AirFront,
        MoveId::AirDown,
        MoveId::AirUp,
        MoveId::UpSpecial,
        MoveId::NeutralSpecial,
        MoveId::SideSpecial,
        MoveId::TauntUp,
        MoveId::TauntDown,
        MoveId::NeutralSmash,
        MoveId::SideSmash,
        MoveId::DownSmash,
        MoveId::UpSmash,
        MoveId::Grab,
        MoveId::CounterAttack,
    ];

    /// Catalog key of the move.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Dash => "dash",
            Self::Ledge => "ledge",
            Self::NeutralTilt => "neutralTilt",
            Self::SideTilt => "sideTilt",
            Self::DownTilt => "downTilt",
            Self::UpTilt => "upTilt",
            Self::AirNeutral => "airNeutral",
            Self::AirFront => "airFront",
            Self::AirDown => "airDown",
            Self::AirUp => "airUp",
            Self::UpSpecial => "upSpecial",
            Self::NeutralSpecial => "neutralSpecial",
            Self::SideSpecial => "sideSpecial",
            Self::TauntUp => "tauntUp",
            Self::TauntDown => "tauntDown",
            Self::NeutralSmash => "neutralSmash",
            Self::SideSmash => "sideSmash",
            Self::DownSmash => "downSmash",
            Self::UpSmash => "upSmash",
            Self::Grab => "grab",
            Self::CounterAttack => "counterAttack",
        }
    }

    /// Looks a move up by catalog key.
    pub fn from_key(key: &str) -> Result<Self, CombatError> {
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.key() == key)
            .ok_or_else(|| CombatError::UnknownAttack {
                name: key.to_string(),
            })
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Behavior family of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveShape {
    /// Fixed hitbox and knockback direction
    Standard,
    /// Launches the owner forward, then decelerates (`deceleration`, `initialSpeed`)
    Dash,
    /// Sets the owner's velocity for the active window (`xvel`, `yvel`)
    Moving,
    /// Recovery hitbox that re-hits every `repeatInterval`
    UpSpecial,
    /// Re-hits every `repeatT` while active
    Repeating,
    /// Hitbox slides from `hitboxx/y` to `hitboxx1/y1`
    MovingHitbox,
    /// Knockback points away from the hitbox center
    VaryingDirection,
    /// Knockback follows the owner's velocity
    VelocityDirection,
    /// Never has its own hitbox; throws a projectile after startup
    ProjectileThrow,
    /// Turns projectiles around and flips fighters
    Reflect,
}

/// Static description of one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSpec {
    /// Parameter block under the fighter prefix
    pub prefix: &'static str,
    /// Frame shown while the attack runs
    pub frame: &'static str,
    /// Sound played on hit
    pub audio: &'static str,
    /// Sound played when the attack starts
    pub start_sound: Option<&'static str>,
    /// Shows the charge twinkle during startup
    pub twinkle: bool,
    /// Behavior family
    pub shape: MoveShape,
}

const GROUND_HIT: &str = "groundhit";
const AIR_HIT: &str = "airhit";
const SMASH_HIT: &str = "smashhit";

const fn spec(prefix: &'static str, audio: &'static str, frame: &'static str) -> MoveSpec {
    MoveSpec {
        prefix,
        frame,
        audio,
        start_sound: None,
        twinkle: false,
        shape: MoveShape::Standard,
    }
}

impl MoveSpec {
    const fn shaped(mut self, shape: MoveShape) -> Self {
        self.shape = shape;
        self
    }

    const fn twinkling(mut self) -> Self {
        self.twinkle = true;
        self
    }

    const fn starting_with(mut self, sound: &'static str) -> Self {
        self.start_sound = Some(sound);
        self
    }
}

/// Catalog entry for a move of a fighter type.
#[must_use]
pub fn move_spec(kind: FighterKind, id: MoveId) -> MoveSpec {
    let stickman = kind == FighterKind::Stickman;
    match id {
        MoveId::Dash if stickman => {
            spec("dashAttack", GROUND_HIT, "DashAttack").shaped(MoveShape::Moving)
        }
        MoveId::Dash => spec("dashAttack", GROUND_HIT, "DashAttack").shaped(MoveShape::Dash),
        MoveId::Ledge => spec("ledgeAttack", GROUND_HIT, "LedgeAttack"),
        MoveId::NeutralTilt => spec("neutralTiltAttack", GROUND_HIT, "GroundNeutral"),
        MoveId::SideTilt => spec("sideTiltAttack", GROUND_HIT, "GroundSidetilt"),
        MoveId::DownTilt => spec("downTiltAttack", GROUND_HIT, "GroundDowntilt"),
        MoveId::UpTilt => spec("upTiltAttack", GROUND_HIT, "GroundUptilt"),
        MoveId::AirNeutral => spec("airNeutralAttack", AIR_HIT, "AirNeutral"),
        MoveId::AirFront => spec("airFrontAttack", AIR_HIT, "AirFronttilt").twinkling(),
        MoveId::AirDown if stickman => {
            spec("airDownAttack", AIR_HIT, "AirDowntilt").shaped(MoveShape::VelocityDirection)
        }
        MoveId::AirDown => spec("airDownAttack", AIR_HIT, "AirDowntilt"),
        MoveId::AirUp => spec("airUpAttack", AIR_HIT, "AirUptilt"),
        MoveId::UpSpecial => spec("upSpecialAttack", AIR_HIT, "UpSpecial")
            .shaped(MoveShape::UpSpecial)
            .starting_with("upspecial"),
        MoveId::NeutralSpecial if stickman => {
            spec("neutralSpecialAttack", AIR_HIT, "NeutralSpecial")
        }
        MoveId::NeutralSpecial => spec("neutralSpecialAttack", "", "NeutralSpecial")
            .shaped(MoveShape::ProjectileThrow),
        MoveId::SideSpecial if stickman => spec("sideSpecialAttack", GROUND_HIT, "SideSpecial")
            .shaped(MoveShape::Reflect)
            .starting_with("cape"),
        MoveId::SideSpecial => spec("dashSpecialAttack", "dashspecialhit", "DashSpecial")
            .starting_with("dashspecialhit"),
        MoveId::TauntUp => spec("tauntAttack", AIR_HIT, "TauntAttack"),
        MoveId::TauntDown => spec("tauntAttack", AIR_HIT, "Bong"),
        MoveId::NeutralSmash => spec("neutralSmashAttack", SMASH_HIT, "NeutralSmash")
            .shaped(MoveShape::VaryingDirection)
            .twinkling(),
        MoveId::SideSmash => spec("sideSmashAttack", SMASH_HIT, "SideSmash").twinkling(),
        MoveId::DownSmash => spec("downSmashAttack", SMASH_HIT, "DownSmash")
            .shaped(MoveShape::VaryingDirection)
            .twinkling(),
        MoveId::UpSmash if stickman => spec("upSmashAttack", SMASH_HIT, "UpSmash")
            .shaped(MoveShape::Repeating)
            .twinkling(),
        MoveId::UpSmash => spec("upSmashAttack", SMASH_HIT, "UpSmash")
            .shaped(MoveShape::MovingHitbox)
            .twinkling(),
        MoveId::Grab => spec("grabAttack", "", "GrabAttempt").starting_with("grabattempt"),
        MoveId::CounterAttack => spec("counterAttack", GROUND_HIT, "CounterAttack"),
    }
}
