//! # GeoSmash Common
//!
//! Common types and shared abstractions for GeoSmash.
//!
//! This crate provides foundational types used across the combat core and
//! the tools built around it:
//! - ID types (EntityId, PlayerId, TeamId)
//! - Center-based rectangle geometry
//! - Tunable parameter tables loaded from TOML or plain text
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;
pub mod params;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
    pub use crate::params::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id1.raw() >= 100);
    }

    #[test]
    fn test_scoped_param_lookup() {
        let table = ParamTable::parse_text("charlie.walkSpeed 150\ninput.deadzone 0.2\n")
            .expect("valid table");
        let charlie = table.scoped("charlie");

        assert_eq!(charlie.param("walkSpeed").ok(), Some(150.0));
        assert_eq!(table.get("input.deadzone").ok(), Some(0.2));
    }
}
