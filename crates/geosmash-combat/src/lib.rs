//! # GeoSmash Combat
//!
//! The combat core of GeoSmash, a 2D platform fighter.
//!
//! This crate provides everything that happens between controller input and
//! the rendered frame:
//! - Controller state with press edges and stick velocity
//! - Attacks, hitboxes, knockback and stun
//! - The fighter state machine and the fighter aggregate
//! - Hit resolution, ground contact and ledge grabs
//! - Grabs and throws with exclusive limp handles
//! - Projectiles and stage hazards
//! - Side-channel events (sounds, particles, stats) and the event bus
//! - The per-frame collision driver ([`Arena`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod arena;
pub mod attack;
pub mod body;
pub mod config;
pub mod controller;
pub mod entity;
pub mod error;
pub mod events;
pub mod fighter;
pub mod fighter_attack;
pub mod grab;
pub mod hazard;
pub mod hit;
pub mod moves;
pub mod projectile;
pub mod stage;
pub mod state;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::arena::*;
    pub use crate::attack::*;
    pub use crate::body::*;
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::entity::*;
    pub use crate::error::*;
    pub use crate::events::*;
    pub use crate::fighter::*;
    pub use crate::fighter_attack::*;
    pub use crate::grab::*;
    pub use crate::hazard::*;
    pub use crate::moves::*;
    pub use crate::projectile::*;
    pub use crate::stage::*;
    pub use crate::state::{
        AirNormalState, AirStunnedState, BlockingState, DodgeState, FighterState, FrameCtx,
        GrabbingState, GroundState, LedgeGrabState, LimpState, RespawnState, SpecialMove,
        SpecialState,
    };
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ahash::AHashMap;
    use geosmash_common::{Ownership, ParamTable, PlayerId, Rect, TeamId};
    use glam::Vec2;

    const PARAMS: &str = include_str!("../../../assets/params.toml");
    const STAGE: &str = include_str!("../../../assets/stage.toml");

    #[test]
    fn test_shipped_assets_load() {
        let table = ParamTable::from_toml_str(PARAMS).expect("params parse");
        let stage = StageLayout::from_toml_str(STAGE).expect("stage parses");
        stage.validate().expect("stage is consistent");

        for kind in [FighterKind::Charlie, FighterKind::Stickman] {
            FighterConfig::load(&table, kind).expect("fighter params are complete");
        }
        HazardParams::load(&table).expect("hazard params are complete");
        assert!(!stage.ledges.is_empty());
        assert!(!stage.hazard_sites.is_empty());
    }

    #[test]
    fn test_idle_match_stays_quiet() {
        let table = ParamTable::from_toml_str(PARAMS).expect("params parse");
        let config = Arc::new(FighterConfig::load(&table, FighterKind::Stickman).expect("stickman"));
        let stage = StageLayout::from_ground(
            Rect::new(0.0, -50.0, 800.0, 100.0),
            Rect::new(0.0, 200.0, 2400.0, 1600.0),
        )
        .with_respawn_point(Vec2::new(0.0, 100.0));
        let mut arena = Arena::new(stage, MatchRules::default());
        let id = arena.add_fighter(config, Ownership::new(PlayerId::new(0), TeamId::new(0)));

        let inputs = AHashMap::new();
        for _ in 0..600 {
            let report = arena.step(&inputs, 1.0 / 60.0);
            assert!(report.is_quiet());
        }

        let fighter = arena.fighter(id).expect("fighter");
        assert_eq!(fighter.lives(), 3);
        assert!(matches!(fighter.state(), FighterState::Ground(_)));
        let feet = fighter.body().rect().bottom();
        assert!(feet < 0.0 && feet > -5.0, "standing on the ground, feet at {feet}");
    }
}
