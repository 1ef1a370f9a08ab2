//! Grab ownership tokens.
//!
//! A grabber that catches a fighter receives a [`LimpHandle`]. The handle is
//! the only way to drive the limp victim, and it is consumed by whatever ends
//! the grab: a release, a throw, or the victim-side [`GrabNotice`] when a
//! third party breaks the hold. Commands travel through the frame
//! [`Outbox`](crate::events::Outbox) and are routed by the arena, so neither
//! fighter ever holds a reference into the other.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use geosmash_common::EntityId;

use crate::attack::SimpleAttack;

static GRAB_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a single grab, so stale commands can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GrabId(u64);

impl GrabId {
    /// Allocates a fresh grab id.
    #[must_use]
    pub fn new() -> Self {
        Self(GRAB_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GrabId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GrabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grab#{}", self.0)
    }
}

/// Exclusive right to command a limp fighter.
///
/// Not `Clone`: every exit path has to give it up exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a limp victim stays limp until its handle is released"]
pub struct LimpHandle {
    grab: GrabId,
    victim: EntityId,
}

impl LimpHandle {
    pub(crate) fn new(grab: GrabId, victim: EntityId) -> Self {
        Self { grab, victim }
    }

    /// Grab this handle belongs to.
    #[must_use]
    pub fn grab(&self) -> GrabId {
        self.grab
    }

    /// Entity being held.
    #[must_use]
    pub fn victim(&self) -> EntityId {
        self.victim
    }

    /// Lets the victim go.
    pub fn release(self) -> LimpCommand {
        LimpCommand {
            grab: self.grab,
            victim: self.victim,
            action: LimpAction::Release,
        }
    }

    /// Hits the victim with a throw, which also ends the grab.
    pub fn throw(self, attack: SimpleAttack) -> LimpCommand {
        LimpCommand {
            grab: self.grab,
            victim: self.victim,
            action: LimpAction::Hit(Box::new(attack)),
        }
    }

    /// Drops the handle after the victim reported a disconnect.
    pub fn disconnected(self) {}
}

/// What to do with a limp fighter.
#[derive(Debug, Clone)]
pub enum LimpAction {
    /// Return control to the victim
    Release,
    /// Apply a throw
    Hit(Box<SimpleAttack>),
}

/// Grabber-to-victim message produced by consuming a [`LimpHandle`].
#[derive(Debug, Clone)]
pub struct LimpCommand {
    /// Grab being ended
    pub grab: GrabId,
    /// Victim entity
    pub victim: EntityId,
    /// Action to apply
    pub action: LimpAction,
}

/// Victim-to-grabber message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabNotice {
    /// The victim left the limp state on its own (hit by someone else, killed)
    Disconnected {
        /// Grabbing entity
        grabber: EntityId,
        /// Grab that ended
        grab: GrabId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grab_ids_are_unique() {
        assert_ne!(GrabId::new(), GrabId::new());
    }

    #[test]
    fn test_release_consumes_handle() {
        let grab = GrabId::new();
        let victim = EntityId::new();
        let handle = LimpHandle::new(grab, victim);

        let command = handle.release();
        assert_eq!(command.grab, grab);
        assert_eq!(command.victim, victim);
        assert!(matches!(command.action, LimpAction::Release));
    }
}
