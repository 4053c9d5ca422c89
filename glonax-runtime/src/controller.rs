use glonax_core::{
    input::{ButtonState, Scancode},
    nalgebra::Point3,
    ForwardKinematics, JointAngles, LinkDimensions,
};

use crate::{config::Config, render::Frame};

/// Joint rotation per key press in degrees, scaled by the rotation speed.
const ROTATION_INCREMENT: f32 = 10.0;

/// Capture state evaluated on each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde_derive::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    /// Target is left in place.
    #[default]
    Idle,
    /// Target follows the end effector.
    Following,
    /// Target is descending.
    Descending,
    /// Target rests on the floor with descent enabled.
    Resting,
}

impl std::fmt::Display for CaptureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureState::Idle => write!(f, "idle"),
            CaptureState::Following => write!(f, "following"),
            CaptureState::Descending => write!(f, "descending"),
            CaptureState::Resting => write!(f, "resting"),
        }
    }
}

/// Target object state.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetState {
    /// World position of the target center.
    pub position: Point3<f32>,
    /// Let the target descend when not captured.
    pub descent_enabled: bool,
}

/// Input flags latched from key events.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// Capture trigger is held down.
    pub capture_held: bool,
    /// Exit was requested.
    pub shutdown_requested: bool,
}

/// Interaction controller.
///
/// The controller owns all mutable simulation state. Key events are applied
/// as they arrive, the capture and descent policy is evaluated once per
/// tick.
pub struct Controller {
    kinematics: ForwardKinematics,
    angles: JointAngles,
    target: TargetState,
    input: InputState,
    rotation_speed: f32,
    descent_step: f32,
    state: CaptureState,
    iteration: u64,
}

impl Controller {
    /// Construct a new controller with the default rotation speed and descent step.
    pub fn new(dimensions: LinkDimensions, target: Point3<f32>) -> Self {
        let arm = crate::config::ArmConfig::default();

        Self {
            kinematics: ForwardKinematics::new(dimensions),
            angles: JointAngles::default(),
            target: TargetState {
                position: target,
                descent_enabled: false,
            },
            input: InputState::default(),
            rotation_speed: arm.rotation_speed,
            descent_step: arm.descent_step,
            state: CaptureState::Idle,
            iteration: 0,
        }
    }

    pub fn with_rotation_speed(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn with_descent_step(mut self, descent_step: f32) -> Self {
        self.descent_step = descent_step;
        self
    }

    /// Current joint angles.
    #[inline]
    pub fn angles(&self) -> &JointAngles {
        &self.angles
    }

    /// Current target state.
    #[inline]
    pub fn target(&self) -> &TargetState {
        &self.target
    }

    /// Current input flags.
    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Capture state of the last tick.
    #[inline]
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Number of ticks so far.
    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    #[inline]
    pub fn kinematics(&self) -> &ForwardKinematics {
        &self.kinematics
    }

    #[inline]
    pub fn is_shutdown_requested(&self) -> bool {
        self.input.shutdown_requested
    }

    /// Apply a key event.
    ///
    /// Rotations act on the press edge, the descent toggle on the release
    /// edge. Repeat events are ignored.
    pub fn handle_key_event(&mut self, scancode: Scancode) {
        log::trace!("Scancode: {}", scancode);

        match scancode {
            Scancode::Rotate(joint, direction, ButtonState::Pressed) => {
                let delta = direction.sign() * ROTATION_INCREMENT * self.rotation_speed;
                self.angles.rotate(joint, delta);

                log::debug!("Joint angles: {}", self.angles);
            }
            Scancode::Descent(ButtonState::Released) => {
                self.target.descent_enabled = !self.target.descent_enabled;

                if self.target.descent_enabled {
                    log::info!("Descent enabled");
                } else {
                    log::info!("Descent disabled");
                }
            }
            Scancode::Capture(ButtonState::Pressed) => {
                self.input.capture_held = true;
            }
            Scancode::Capture(ButtonState::Released) => {
                self.input.capture_held = false;
            }
            Scancode::Exit(ButtonState::Pressed) => {
                log::debug!("Exit requested");
                self.input.shutdown_requested = true;
            }
            _ => {}
        }
    }

    /// Evaluate the capture and descent policy.
    ///
    /// A held trigger with the end effector in range snaps the target to the
    /// end effector. Otherwise an enabled descent lowers the target by one
    /// step. Capture takes priority. The target never drops below the
    /// target floor, not even when the end effector does.
    pub fn tick(&mut self) -> CaptureState {
        let dimensions = self.kinematics.dimensions();
        let tolerance = dimensions.tolerance;
        let floor = dimensions.target_floor();

        let effector = self.kinematics.solve(&self.angles);
        let distance = glonax_core::nalgebra::distance(&effector, &self.target.position);

        let state = if self.input.capture_held && distance <= tolerance {
            self.target.position = Point3::new(effector.x, effector.y.max(floor), effector.z);
            CaptureState::Following
        } else if self.target.descent_enabled && self.target.position.y > 0.0 {
            let y = self.target.position.y - self.descent_step;
            self.target.position.y = if y < floor { floor } else { y };

            if self.target.position.y <= floor {
                CaptureState::Resting
            } else {
                CaptureState::Descending
            }
        } else if self.target.descent_enabled {
            CaptureState::Resting
        } else {
            CaptureState::Idle
        };

        if state != self.state {
            log::debug!("Capture state: {} -> {}", self.state, state);
            self.state = state;
        }

        self.iteration += 1;

        state
    }

    /// Snapshot of the current state for the renderer.
    pub fn frame(&self) -> Frame {
        Frame {
            iteration: self.iteration,
            angles: self.angles,
            target: self.target.position,
            descent_enabled: self.target.descent_enabled,
            state: self.state,
            pose: self.kinematics.pose(&self.angles),
        }
    }
}

impl From<&Config> for Controller {
    fn from(config: &Config) -> Self {
        let [x, y, z] = config.target.position;

        Controller::new(config.arm.dimensions.clone(), Point3::new(x, y, z))
            .with_rotation_speed(config.arm.rotation_speed)
            .with_descent_step(config.arm.descent_step)
    }
}

#[cfg(test)]
mod tests {
    use glonax_core::{input::Direction, nalgebra::Vector3, Joint};

    use super::*;

    fn controller() -> Controller {
        Controller::from(&Config::default())
    }

    fn press(controller: &mut Controller, scancode: fn(ButtonState) -> Scancode) {
        controller.handle_key_event(scancode(ButtonState::Pressed));
        controller.handle_key_event(scancode(ButtonState::Released));
    }

    #[test]
    fn test_initial_state() {
        let controller = controller();

        assert_eq!(controller.angles(), &JointAngles::default());
        assert_eq!(controller.target().position, Point3::new(0.0, 0.05, 1.0));
        assert!(!controller.target().descent_enabled);
        assert!(!controller.input().capture_held);
        assert_eq!(controller.state(), CaptureState::Idle);
    }

    #[test]
    fn test_rotate_press_edge() {
        let mut controller = controller();

        controller.handle_key_event(Scancode::Rotate(
            Joint::Slew,
            Direction::Increase,
            ButtonState::Pressed,
        ));
        assert!((controller.angles().get(Joint::Slew) - 3.0).abs() < 1e-6);

        controller.handle_key_event(Scancode::Rotate(
            Joint::Slew,
            Direction::Increase,
            ButtonState::Repeat,
        ));
        controller.handle_key_event(Scancode::Rotate(
            Joint::Slew,
            Direction::Increase,
            ButtonState::Released,
        ));
        assert!((controller.angles().get(Joint::Slew) - 3.0).abs() < 1e-6);

        controller.handle_key_event(Scancode::Rotate(
            Joint::Arm,
            Direction::Decrease,
            ButtonState::Pressed,
        ));
        assert!((controller.angles().get(Joint::Arm) + 3.0).abs() < 1e-6);
        assert_eq!(controller.angles().get(Joint::Boom), 0.0);
    }

    #[test]
    fn test_rotation_speed() {
        let mut controller = controller().with_rotation_speed(1.5);

        for _ in 0..4 {
            press(&mut controller, |state| {
                Scancode::Rotate(Joint::Boom, Direction::Increase, state)
            });
        }

        assert!((controller.angles().get(Joint::Boom) - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_descent_toggle_on_release() {
        let mut controller = controller();

        controller.handle_key_event(Scancode::Descent(ButtonState::Pressed));
        assert!(!controller.target().descent_enabled);

        controller.handle_key_event(Scancode::Descent(ButtonState::Released));
        assert!(controller.target().descent_enabled);

        controller.handle_key_event(Scancode::Descent(ButtonState::Repeat));
        assert!(controller.target().descent_enabled);

        press(&mut controller, Scancode::Descent);
        assert!(!controller.target().descent_enabled);
    }

    #[test]
    fn test_capture_held() {
        let mut controller = controller();

        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));
        assert!(controller.input().capture_held);

        controller.handle_key_event(Scancode::Capture(ButtonState::Repeat));
        assert!(controller.input().capture_held);

        controller.handle_key_event(Scancode::Capture(ButtonState::Released));
        assert!(!controller.input().capture_held);
    }

    #[test]
    fn test_exit() {
        let mut controller = controller();

        controller.handle_key_event(Scancode::Exit(ButtonState::Released));
        assert!(!controller.is_shutdown_requested());

        controller.handle_key_event(Scancode::Exit(ButtonState::Pressed));
        assert!(controller.is_shutdown_requested());
    }

    #[test]
    fn test_idle_tick() {
        let mut controller = controller();
        let target = controller.target().clone();

        for _ in 0..10 {
            assert_eq!(controller.tick(), CaptureState::Idle);
        }

        assert_eq!(controller.target(), &target);
        assert_eq!(controller.iteration(), 10);
    }

    #[test]
    fn test_capture_snap() {
        let mut controller = controller();
        let effector = controller.kinematics().solve(controller.angles());

        controller.target.position = effector + Vector3::new(0.05, 0.0, 0.0);

        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));

        assert_eq!(controller.tick(), CaptureState::Following);
        assert_eq!(controller.target().position, effector);
    }

    #[test]
    fn test_capture_out_of_range() {
        let mut controller = controller();
        let effector = controller.kinematics().solve(controller.angles());

        let position = effector + Vector3::new(0.0, -0.5, 0.0);
        controller.target.position = position;

        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));

        assert_eq!(controller.tick(), CaptureState::Idle);
        assert_eq!(controller.target().position, position);
    }

    #[test]
    fn test_capture_follows_effector() {
        let mut controller = controller();
        controller.target.position = controller.kinematics().solve(controller.angles());

        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));

        for _ in 0..5 {
            controller.handle_key_event(Scancode::Rotate(
                Joint::Arm,
                Direction::Increase,
                ButtonState::Pressed,
            ));
            assert_eq!(controller.tick(), CaptureState::Following);
            assert_eq!(
                controller.target().position,
                controller.kinematics().solve(controller.angles())
            );
        }
    }

    #[test]
    fn test_descent_floor_clamp() {
        let mut controller = controller();
        controller.target.position = Point3::new(0.0, 1.0, 1.0);

        press(&mut controller, Scancode::Descent);

        let floor = controller.kinematics().dimensions().target_floor();
        let mut ticks = 0;

        while controller.target().position.y > floor {
            let y = controller.target().position.y;
            controller.tick();
            ticks += 1;

            let next = controller.target().position.y;
            assert!(next < y);
            assert!(next == floor || (y - next - 0.005).abs() < 1e-4);
            assert!(next >= floor);
            assert!(ticks < 1000);
        }

        assert_eq!(controller.target().position.y, 0.05);
        assert!((189..=191).contains(&ticks));

        for _ in 0..10 {
            assert_eq!(controller.tick(), CaptureState::Resting);
            assert_eq!(controller.target().position.y, 0.05);
        }

        assert_eq!(controller.target().position.x, 0.0);
        assert_eq!(controller.target().position.z, 1.0);
    }

    #[test]
    fn test_descent_state() {
        let mut controller = controller();
        controller.target.position = Point3::new(0.0, 0.5, 1.0);

        press(&mut controller, Scancode::Descent);

        assert_eq!(controller.tick(), CaptureState::Descending);
        assert_eq!(controller.state(), CaptureState::Descending);
    }

    #[test]
    fn test_capture_priority() {
        let mut controller = controller();
        let effector = controller.kinematics().solve(controller.angles());

        controller.target.position = effector + Vector3::new(0.0, 0.05, 0.0);

        press(&mut controller, Scancode::Descent);
        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));

        assert_eq!(controller.tick(), CaptureState::Following);
        assert_eq!(controller.target().position, effector);

        controller.handle_key_event(Scancode::Capture(ButtonState::Released));

        assert_eq!(controller.tick(), CaptureState::Descending);
        assert!((controller.target().position.y - (effector.y - 0.005)).abs() < 1e-5);
    }

    #[test]
    fn test_capture_below_floor() {
        let mut controller = controller();
        let floor = controller.kinematics().dimensions().target_floor();

        for _ in 0..36 {
            press(&mut controller, |state| {
                Scancode::Rotate(Joint::Boom, Direction::Increase, state)
            });
        }

        let effector = controller.kinematics().solve(controller.angles());
        assert!(effector.y > floor);

        controller.target.position = effector;
        controller.handle_key_event(Scancode::Capture(ButtonState::Pressed));

        let mut clamped = 0;
        let mut underground = false;

        for _ in 0..20 {
            press(&mut controller, |state| {
                Scancode::Rotate(Joint::Arm, Direction::Increase, state)
            });

            let effector = controller.kinematics().solve(controller.angles());

            if controller.tick() == CaptureState::Following {
                let target = controller.target().position;

                assert_eq!(target.x, effector.x);
                assert_eq!(target.z, effector.z);
                if effector.y >= floor {
                    assert_eq!(target, effector);
                } else {
                    assert_eq!(target.y, floor);
                    clamped += 1;
                    underground |= effector.y < 0.0;
                }
            }

            assert!(controller.target().position.y >= floor);
        }

        assert!(clamped > 0);
        assert!(underground);

        controller.handle_key_event(Scancode::Capture(ButtonState::Released));
        press(&mut controller, Scancode::Descent);

        for _ in 0..100 {
            assert_eq!(controller.tick(), CaptureState::Resting);
            assert_eq!(controller.target().position.y, floor);
        }
    }

    #[test]
    fn test_frame() {
        let mut controller = controller();

        press(&mut controller, |state| {
            Scancode::Rotate(Joint::Slew, Direction::Increase, state)
        });
        controller.tick();

        let frame = controller.frame();

        assert_eq!(frame.iteration, 1);
        assert_eq!(frame.angles, *controller.angles());
        assert_eq!(frame.target, controller.target().position);
        assert_eq!(frame.state, CaptureState::Idle);
        assert_eq!(
            frame.pose.effector(),
            controller.kinematics().solve(controller.angles())
        );
    }
}
