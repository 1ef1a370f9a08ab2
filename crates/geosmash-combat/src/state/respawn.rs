//! Respawn platform.

use super::{AirNormalState, FighterState};
use crate::controller::ControllerState;
use crate::fighter::FighterCore;

/// Invincible wait on the respawn platform.
///
/// Pulling the stick down after `minRespawnTime` drops the fighter early;
/// after `maxRespawnTime` it drops on its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RespawnState {
    t: f32,
}

impl RespawnState {
    /// Fresh platform timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Time spent on the platform.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.t
    }

    pub(crate) fn process_input(
        &mut self,
        core: &mut FighterCore,
        input: &ControllerState,
        dt: f32,
    ) -> Option<FighterState> {
        self.t += dt;
        let rules = core.config.rules;
        let dropped = self.t > rules.max_respawn_time
            || (self.t > rules.min_respawn_time && input.joy_y < -core.config.input.tilt);
        dropped.then(|| FighterState::AirNormal(AirNormalState::new(false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::FighterKind;
    use crate::state::testing::{self, input, DT};

    fn frames_until_drop(pad: &ControllerState) -> usize {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = RespawnState::new();
        (1..10_000)
            .find(|_| state.process_input(&mut core, pad, DT).is_some())
            .expect("platform always times out")
    }

    #[test]
    fn test_platform_times_out() {
        let core = testing::core(FighterKind::Charlie);
        let frames = frames_until_drop(&ControllerState::default());
        assert!(frames as f32 * DT > core.config.rules.max_respawn_time);
    }

    #[test]
    fn test_stick_down_drops_early() {
        let early = frames_until_drop(&input(|i| i.joy_y = -1.0));
        let late = frames_until_drop(&ControllerState::default());
        assert!(early < late);
    }
}
