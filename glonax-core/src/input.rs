use serde::{Deserialize, Serialize};

use crate::algorithm::fk::Joint;

/// Button state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonState {
    /// Button pressed.
    #[serde(rename = "press")]
    Pressed,
    /// Button released.
    #[serde(rename = "release")]
    Released,
    /// Button held, repeated by the input device.
    #[serde(rename = "repeat")]
    Repeat,
}

/// Rotation direction of a joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Increase the joint angle.
    Increase,
    /// Decrease the joint angle.
    Decrease,
}

impl Direction {
    /// Sign of the angle delta.
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Increase => 1.0,
            Direction::Decrease => -1.0,
        }
    }
}

/// Input device scancode.
///
/// Scancodes are indirectly mapped to input pheripherials. Any
/// input device can emit these codes. Their effect is left to
/// the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scancode {
    /// Rotate a joint.
    Rotate(Joint, Direction, ButtonState),
    /// Toggle the descent of the target.
    Descent(ButtonState),
    /// Capture trigger.
    Capture(ButtonState),
    /// Request application exit.
    Exit(ButtonState),
}

impl std::fmt::Display for Scancode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scancode::Rotate(joint, direction, state) => {
                write!(f, "Rotate {} {:?} {:?}", joint, direction, state)
            }
            Scancode::Descent(state) => write!(f, "Descent {:?}", state),
            Scancode::Capture(state) => write!(f, "Capture {:?}", state),
            Scancode::Exit(state) => write!(f, "Exit {:?}", state),
        }
    }
}
