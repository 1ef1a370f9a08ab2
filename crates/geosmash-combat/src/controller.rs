//! Decoded controller input.
//!
//! The combat core never polls hardware. Each frame it receives a
//! [`ControllerState`] per fighter: stick position and per-frame stick delta,
//! held and pressed-this-frame buttons, analog triggers and the d-pad.
//! [`ControllerState::advance`] derives the edge-triggered fields from two
//! successive [`PadSample`]s, which is all the headless runner and the tests
//! need.

use geosmash_common::{ParamResult, ParamTable};
use serde::{Deserialize, Serialize};

/// Per-frame decoded controller state.
///
/// Stick axes are in `[-1, 1]` with positive y pointing up. Triggers rest at
/// `0` and go negative when pulled.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControllerState {
    /// Main stick X position
    pub joy_x: f32,
    /// Main stick Y position
    pub joy_y: f32,
    /// Change of the stick X position since the previous frame
    pub joy_xv: f32,
    /// Change of the stick Y position since the previous frame
    pub joy_yv: f32,

    /// Attack button held
    pub button_a: bool,
    /// Special button held
    pub button_b: bool,
    /// Smash button held
    pub button_x: bool,
    /// Jump button held
    pub button_y: bool,
    /// Start held
    pub button_start: bool,
    /// Back held
    pub button_back: bool,

    /// Attack button pressed this frame
    pub press_a: bool,
    /// Special button pressed this frame
    pub press_b: bool,
    /// Smash button pressed this frame
    pub press_x: bool,
    /// Jump button pressed this frame
    pub press_y: bool,
    /// Start pressed this frame
    pub press_start: bool,
    /// Back pressed this frame
    pub press_back: bool,

    /// Right trigger
    pub r_trigger: f32,
    /// Left trigger
    pub l_trigger: f32,
    /// Left bumper held
    pub l_bumper: bool,
    /// Right bumper held
    pub r_bumper: bool,
    /// Left bumper pressed this frame
    pub press_lb: bool,
    /// Right bumper pressed this frame
    pub press_rb: bool,

    /// D-pad left
    pub dpad_l: bool,
    /// D-pad right
    pub dpad_r: bool,
    /// D-pad up
    pub dpad_u: bool,
    /// D-pad down
    pub dpad_d: bool,
}

/// Raw level-triggered controller sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PadSample {
    /// Stick X
    pub joy_x: f32,
    /// Stick Y
    pub joy_y: f32,
    /// Attack button
    pub a: bool,
    /// Special button
    pub b: bool,
    /// Smash button
    pub x: bool,
    /// Jump button
    pub y: bool,
    /// Start button
    pub start: bool,
    /// Back button
    pub back: bool,
    /// Right trigger
    pub r_trigger: f32,
    /// Left trigger
    pub l_trigger: f32,
    /// Left bumper
    pub l_bumper: bool,
    /// Right bumper
    pub r_bumper: bool,
    /// D-pad left
    pub dpad_l: bool,
    /// D-pad right
    pub dpad_r: bool,
    /// D-pad up
    pub dpad_u: bool,
    /// D-pad down
    pub dpad_d: bool,
}

impl ControllerState {
    /// Folds a new raw sample into this state.
    ///
    /// Press flags are set only on the frame a button goes down; stick
    /// velocities are the per-frame position delta.
    pub fn advance(&mut self, sample: &PadSample) {
        self.joy_xv = sample.joy_x - self.joy_x;
        self.joy_yv = sample.joy_y - self.joy_y;
        self.joy_x = sample.joy_x;
        self.joy_y = sample.joy_y;

        self.press_a = sample.a && !self.button_a;
        self.press_b = sample.b && !self.button_b;
        self.press_x = sample.x && !self.button_x;
        self.press_y = sample.y && !self.button_y;
        self.press_start = sample.start && !self.button_start;
        self.press_back = sample.back && !self.button_back;
        self.press_lb = sample.l_bumper && !self.l_bumper;
        self.press_rb = sample.r_bumper && !self.r_bumper;

        self.button_a = sample.a;
        self.button_b = sample.b;
        self.button_x = sample.x;
        self.button_y = sample.y;
        self.button_start = sample.start;
        self.button_back = sample.back;
        self.l_bumper = sample.l_bumper;
        self.r_bumper = sample.r_bumper;

        self.r_trigger = sample.r_trigger;
        self.l_trigger = sample.l_trigger;
        self.dpad_l = sample.dpad_l;
        self.dpad_r = sample.dpad_r;
        self.dpad_u = sample.dpad_u;
        self.dpad_d = sample.dpad_d;
    }

    /// Clears every pressed-this-frame flag.
    pub fn clear_presses(&mut self) {
        self.press_a = false;
        self.press_b = false;
        self.press_x = false;
        self.press_y = false;
        self.press_start = false;
        self.press_back = false;
        self.press_lb = false;
        self.press_rb = false;
    }

    /// Classifies the stick into one of four attack directions.
    #[must_use]
    pub fn tilt(&self, thresholds: &InputThresholds) -> Tilt {
        let (ax, ay) = (self.joy_x.abs(), self.joy_y.abs());
        if ax > thresholds.tilt && ax > ay {
            Tilt::Side
        } else if self.joy_y < -thresholds.tilt && ax < ay {
            Tilt::Down
        } else if self.joy_y > thresholds.tilt && ax < ay {
            Tilt::Up
        } else {
            Tilt::Neutral
        }
    }

    /// Facing implied by the stick, if it is outside the deadzone.
    #[must_use]
    pub fn stick_facing(&self, thresholds: &InputThresholds) -> Option<f32> {
        (self.joy_x.abs() > thresholds.deadzone).then_some(facing_of(self.joy_x))
    }

    /// Checks if either trigger is pulled past the threshold.
    #[must_use]
    pub fn trigger_held(&self, thresholds: &InputThresholds) -> bool {
        self.r_trigger < -thresholds.trigger || self.l_trigger < -thresholds.trigger
    }

    /// Checks for a fast horizontal flick past `position`.
    #[must_use]
    pub fn flicked_x(&self, position: f32, thresholds: &InputThresholds) -> bool {
        self.joy_x.abs() > position && self.joy_xv.abs() > thresholds.velocity
    }
}

/// Facing (+1 or -1) for a horizontal value; zero counts as right.
#[must_use]
pub fn facing_of(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Stick direction used to pick attacks and special moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tilt {
    /// Stick up
    Up,
    /// Stick down
    Down,
    /// Stick left or right
    Side,
    /// Stick centered or diagonal
    Neutral,
}

/// Stick and trigger thresholds shared by all fighters (`input.*`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputThresholds {
    /// Below this the stick counts as centered
    pub deadzone: f32,
    /// Stick magnitude for a directional attack
    pub tilt: f32,
    /// Stick X magnitude that starts a dash
    pub dash: f32,
    /// Stick delta that counts as a flick
    pub velocity: f32,
    /// Stick X magnitude that sustains a dash
    pub dash_min: f32,
    /// Stick Y below which the fighter ducks
    pub duck: f32,
    /// Trigger pull for shield and dodge
    pub trigger: f32,
    /// Stick X magnitude for a dodge
    pub dodge: f32,
    /// Stick Y below which the fighter fast falls
    pub fall: f32,
    /// Stick Y below which a ledge is released
    pub drop: f32,
    /// Stick magnitude for a throw
    pub throw: f32,
}

impl InputThresholds {
    /// Reads the `input.*` section.
    pub fn load(table: &ParamTable) -> ParamResult<Self> {
        let input = table.scoped("input");
        Ok(Self {
            deadzone: input.param("deadzone")?,
            tilt: input.param("tiltThresh")?,
            dash: input.param("dashThresh")?,
            velocity: input.param("velThresh")?,
            dash_min: input.param("dashMin")?,
            duck: input.param("duckThresh")?,
            trigger: input.param("trigThresh")?,
            dodge: input.param("dodgeThresh")?,
            fall: input.param("fallThresh")?,
            drop: input.param("dropThresh")?,
            throw: input.param("throwThresh")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> InputThresholds {
        InputThresholds {
            deadzone: 0.2,
            tilt: 0.3,
            dash: 0.8,
            velocity: 0.1,
            dash_min: 0.5,
            duck: -0.5,
            trigger: 0.3,
            dodge: 0.5,
            fall: -0.5,
            drop: -0.5,
            throw: 0.5,
        }
    }

    #[test]
    fn test_press_is_edge_triggered() {
        let mut state = ControllerState::default();
        let held = PadSample {
            a: true,
            ..PadSample::default()
        };

        state.advance(&held);
        assert!(state.press_a && state.button_a);

        state.advance(&held);
        assert!(!state.press_a && state.button_a);
    }

    #[test]
    fn test_stick_velocity_is_frame_delta() {
        let mut state = ControllerState::default();
        state.advance(&PadSample {
            joy_x: 0.9,
            ..PadSample::default()
        });
        assert!((state.joy_xv - 0.9).abs() < 1e-6);

        state.advance(&PadSample {
            joy_x: 1.0,
            ..PadSample::default()
        });
        assert!((state.joy_xv - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_tilt_classification() {
        let t = thresholds();
        let mut state = ControllerState::default();
        assert_eq!(state.tilt(&t), Tilt::Neutral);

        state.joy_x = -0.9;
        state.joy_y = 0.2;
        assert_eq!(state.tilt(&t), Tilt::Side);

        state.joy_x = 0.1;
        state.joy_y = -0.9;
        assert_eq!(state.tilt(&t), Tilt::Down);

        state.joy_y = 0.9;
        assert_eq!(state.tilt(&t), Tilt::Up);
    }

    #[test]
    fn test_load_thresholds() {
        let table = ParamTable::parse_text(
            "input.deadzone 0.2\ninput.tiltThresh 0.3\ninput.dashThresh 0.8\n\
             input.velThresh 0.1\ninput.dashMin 0.5\ninput.duckThresh -0.5\n\
             input.trigThresh 0.3\ninput.dodgeThresh 0.5\ninput.fallThresh -0.5\n\
             input.dropThresh -0.5\ninput.throwThresh 0.5\n",
        )
        .expect("valid");

        assert_eq!(InputThresholds::load(&table).ok(), Some(thresholds()));
    }
}
