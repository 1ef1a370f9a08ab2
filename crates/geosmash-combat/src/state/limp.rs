//! Being held.

use geosmash_common::EntityId;

use super::{FighterState, FrameCtx};
use crate::attack::Attack;
use crate::fighter::FighterCore;
use crate::grab::{GrabId, GrabNotice};
use crate::hit::calculate_hit_result;

/// Held by a grabber, which drives the fighter through its `LimpHandle`.
///
/// A limp fighter can still be hit by third parties; that breaks the grab and
/// the exit hook tells the grabber. Once the grabber has released or thrown
/// the fighter the state is settled and no notice is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct LimpState {
    grabber: EntityId,
    grab: GrabId,
    settled: bool,
    hittable: bool,
}

impl LimpState {
    /// Held by `grabber` under `grab`.
    #[must_use]
    pub fn new(grabber: EntityId, grab: GrabId) -> Self {
        Self {
            grabber,
            grab,
            settled: false,
            hittable: true,
        }
    }

    /// The grab holding this fighter.
    #[must_use]
    pub fn grab(&self) -> GrabId {
        self.grab
    }

    /// The grabbing entity.
    #[must_use]
    pub fn grabber(&self) -> EntityId {
        self.grabber
    }

    /// Marks the grab as ended by the grabber.
    pub fn settle(&mut self) {
        self.settled = true;
    }

    pub(crate) fn can_be_hit(&self) -> bool {
        !self.settled && self.hittable
    }

    pub(crate) fn hit_by_attack(
        &mut self,
        core: &mut FighterCore,
        attack: &dyn Attack,
        cx: &mut FrameCtx<'_>,
    ) -> FighterState {
        calculate_hit_result(core, attack, cx.out)
    }

    pub(crate) fn on_exit(self, cx: &mut FrameCtx<'_>) {
        if !self.settled {
            cx.out.grab_notices.push(GrabNotice::Disconnected {
                grabber: self.grabber,
                grab: self.grab,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outbox;
    use crate::state::testing;

    #[test]
    fn test_third_party_hit_notifies_grabber() {
        let grabber = EntityId::new();
        let grab = GrabId::new();
        let state = LimpState::new(grabber, grab);
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        assert!(state.can_be_hit());
        state.on_exit(&mut cx);

        assert_eq!(out.grab_notices, vec![GrabNotice::Disconnected { grabber, grab }]);
    }

    #[test]
    fn test_settled_grab_is_silent() {
        let mut state = LimpState::new(EntityId::new(), GrabId::new());
        state.settle();
        let mut stage = testing::stage();
        let mut out = Outbox::new();
        let mut cx = FrameCtx::new(&mut stage, &mut out);

        assert!(!state.can_be_hit());
        state.on_exit(&mut cx);

        assert!(out.grab_notices.is_empty());
    }
}
