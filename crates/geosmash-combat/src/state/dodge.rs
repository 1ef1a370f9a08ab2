//! Rolling dodge.

use super::{FighterState, GroundState};
use crate::fighter::FighterCore;
use crate::hit::step_back_onto_ground;

/// Invincible roll in the facing direction, ending turned around.
#[derive(Debug, Clone, PartialEq)]
pub struct DodgeState {
    t: f32,
    duration: f32,
    cooldown: f32,
    speed: f32,
    pub(crate) invinc: f32,
}

impl DodgeState {
    /// Starts a roll.
    pub fn new(core: &FighterCore) -> Self {
        let params = core.config.dodge;
        Self {
            t: 0.0,
            duration: params.duration,
            cooldown: params.cooldown,
            speed: params.speed,
            invinc: params.invinc_time,
        }
    }

    pub(crate) fn process_input(&mut self, core: &mut FighterCore, dt: f32) -> Option<FighterState> {
        self.t += dt;
        core.body.vel.x = core.dir * self.speed;

        if self.t > self.duration {
            core.body.vel.x = 0.0;
            if self.t - dt < self.duration {
                core.dir = -core.dir;
            }
        }
        if self.t > self.duration + self.cooldown {
            return Some(FighterState::Ground(GroundState::standing(core)));
        }
        None
    }

    pub(crate) fn collision_with_ground(&mut self, core: &mut FighterCore, collided: bool) -> Option<FighterState> {
        if !collided {
            step_back_onto_ground(core);
            core.body.vel.x = 0.0;
            self.t = self.t.max(self.invinc);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::FighterKind;
    use crate::state::testing::{self, DT};

    #[test]
    fn test_roll_turns_around_and_lands() {
        let mut core = testing::core(FighterKind::Charlie);
        let mut state = DodgeState::new(&core);
        let params = core.config.dodge;

        assert!(state.process_input(&mut core, DT).is_none());
        assert_eq!(core.body.vel.x, params.speed);

        let mut next = None;
        for _ in 0..600 {
            next = state.process_input(&mut core, DT);
            if next.is_some() {
                break;
            }
        }
        assert!(matches!(next, Some(FighterState::Ground(_))));
        assert_eq!(core.dir, -1.0);
        assert_eq!(core.body.vel.x, 0.0);
    }

    #[test]
    fn test_rolling_off_stage_stops_at_edge() {
        let mut core = testing::core(FighterKind::Stickman);
        let mut state = DodgeState::new(&core);
        core.body.pos.x = 430.0;
        core.body.vel.x = 300.0;

        assert!(state.collision_with_ground(&mut core, false).is_none());

        assert_eq!(core.body.vel.x, 0.0);
        assert!(core.body.pos.x - core.body.size.x / 2.0 < 400.0);
    }
}
