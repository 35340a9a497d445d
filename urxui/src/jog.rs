//! Jog axes, jog parameters and the press / hold / release state machine.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use urx::Vector6;

use crate::error::PanelError;
use crate::intent::RobotCommand;

/// Delay before a pressed button starts a velocity jog.
pub const HOLD_DELAY: Duration = Duration::from_millis(500);
/// Period of the velocity commands while a button is held.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
/// Extra time a velocity command stays active past the next tick.
const MIN_TIME_SLACK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
    J0,
    J1,
    J2,
    J3,
    J4,
    J5,
}

impl Axis {
    pub const LINEAR: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::Rx, Axis::Ry, Axis::Rz];
    pub const JOINTS: [Axis; 6] = [Axis::J0, Axis::J1, Axis::J2, Axis::J3, Axis::J4, Axis::J5];

    /// Position of this axis in a pose or joint vector.
    pub fn index(self) -> usize {
        match self {
            Axis::X | Axis::J0 => 0,
            Axis::Y | Axis::J1 => 1,
            Axis::Z | Axis::J2 => 2,
            Axis::Rx | Axis::J3 => 3,
            Axis::Ry | Axis::J4 => 4,
            Axis::Rz | Axis::J5 => 5,
        }
    }

    pub fn is_joint(self) -> bool {
        matches!(self, Axis::J0 | Axis::J1 | Axis::J2 | Axis::J3 | Axis::J4 | Axis::J5)
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Axis::Rx | Axis::Ry | Axis::Rz)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::Rx => "RX",
            Axis::Ry => "RY",
            Axis::Rz => "RZ",
            Axis::J0 => "J0",
            Axis::J1 => "J1",
            Axis::J2 => "J2",
            Axis::J3 => "J3",
            Axis::J4 => "J4",
            Axis::J5 => "J5",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

/// One direction button: an axis paired with a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JogButton {
    pub axis: Axis,
    pub direction: Direction,
}

impl JogButton {
    pub const fn new(axis: Axis, direction: Direction) -> Self {
        Self { axis, direction }
    }

    /// Vector with `magnitude` on this button's axis, signed by its direction,
    /// and zero everywhere else.
    pub fn vector(&self, magnitude: f64) -> Vector6 {
        let mut vector = [0.0; 6];
        vector[self.axis.index()] = self.direction.sign() * magnitude;
        vector
    }
}

impl fmt::Display for JogButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.direction {
            Direction::Positive => '+',
            Direction::Negative => '-',
        };
        write!(f, "{}{}", sign, self.axis)
    }
}

/// Jog parameters exactly as the operator typed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JogTexts {
    pub linear_velocity: String,
    pub linear_acceleration: String,
    pub joint_velocity: String,
    pub joint_acceleration: String,
    pub linear_step: String,
    pub angular_step: String,
    pub joint_step: String,
}

impl Default for JogTexts {
    fn default() -> Self {
        Self {
            linear_velocity: "0.1".to_string(),
            linear_acceleration: "0.5".to_string(),
            joint_velocity: "0.2".to_string(),
            joint_acceleration: "0.5".to_string(),
            linear_step: "0.01".to_string(),
            angular_step: "0.05".to_string(),
            joint_step: "0.05".to_string(),
        }
    }
}

impl JogTexts {
    pub fn parse(&self) -> Result<JogParams, PanelError> {
        Ok(JogParams {
            linear_velocity: parse_number("Linear velocity", &self.linear_velocity)?,
            linear_acceleration: parse_number("Linear acceleration", &self.linear_acceleration)?,
            joint_velocity: parse_number("Joint velocity", &self.joint_velocity)?,
            joint_acceleration: parse_number("Joint acceleration", &self.joint_acceleration)?,
            linear_step: parse_number("Linear step", &self.linear_step)?,
            angular_step: parse_number("Angular step", &self.angular_step)?,
            joint_step: parse_number("Joint step", &self.joint_step)?,
        })
    }
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, PanelError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PanelError::InvalidNumber {
            field,
            text: text.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JogParams {
    pub linear_velocity: f64,
    pub linear_acceleration: f64,
    pub joint_velocity: f64,
    pub joint_acceleration: f64,
    pub linear_step: f64,
    pub angular_step: f64,
    pub joint_step: f64,
}

impl JogParams {
    /// One relative move of a single step along `button`.
    pub fn step_command(&self, button: JogButton, tool_frame: bool) -> RobotCommand {
        let axis = button.axis;
        if axis.is_joint() {
            RobotCommand::MoveJointRelative {
                vector: button.vector(self.joint_step),
                velocity: self.joint_velocity,
                acceleration: self.joint_acceleration,
            }
        } else {
            let step = if axis.is_rotation() {
                self.angular_step
            } else {
                self.linear_step
            };
            RobotCommand::MoveLinear {
                vector: button.vector(step),
                velocity: self.linear_velocity,
                acceleration: self.linear_acceleration,
                tool_frame,
            }
        }
    }

    /// Velocity command along `button` that expires after `min_time` seconds.
    pub fn velocity_command(&self, button: JogButton, tool_frame: bool, min_time: f64) -> RobotCommand {
        if button.axis.is_joint() {
            RobotCommand::SpeedJoint {
                vector: button.vector(self.joint_velocity),
                acceleration: self.joint_acceleration,
                min_time,
            }
        } else {
            RobotCommand::SpeedLinear {
                vector: button.vector(self.linear_velocity),
                acceleration: self.linear_acceleration,
                min_time,
                tool_frame,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressState {
    Idle,
    Pressed { button: JogButton, since: Instant },
    Held { button: JogButton, next_tick: Instant },
}

/// What the jog state machine wants sent to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogAction {
    Step(JogButton),
    Velocity(JogButton),
    Stop,
}

/// Turns press, release and clock ticks of direction buttons into steps,
/// velocity commands and stops.
#[derive(Debug, Clone)]
pub struct JogController {
    state: PressState,
    hold_delay: Duration,
    tick_interval: Duration,
}

impl Default for JogController {
    fn default() -> Self {
        Self::new(HOLD_DELAY, TICK_INTERVAL)
    }
}

impl JogController {
    pub fn new(hold_delay: Duration, tick_interval: Duration) -> Self {
        Self {
            state: PressState::Idle,
            hold_delay,
            tick_interval,
        }
    }

    pub fn state(&self) -> PressState {
        self.state
    }

    pub fn active(&self) -> Option<JogButton> {
        match self.state {
            PressState::Idle => None,
            PressState::Pressed { button, .. } | PressState::Held { button, .. } => Some(button),
        }
    }

    /// Lifetime of each velocity command, in seconds.
    pub fn min_time(&self) -> f64 {
        (self.tick_interval + MIN_TIME_SLACK).as_secs_f64()
    }

    /// Starts tracking `button`. Ignored while another press is active.
    pub fn press(&mut self, button: JogButton, now: Instant) -> bool {
        if self.state != PressState::Idle {
            return false;
        }
        self.state = PressState::Pressed { button, since: now };
        true
    }

    /// A release before the hold delay is a short click and yields one
    /// step; a release after it yields one stop.
    pub fn release(&mut self, button: JogButton) -> Option<JogAction> {
        match self.state {
            PressState::Pressed { button: active, .. } if active == button => {
                self.state = PressState::Idle;
                Some(JogAction::Step(button))
            }
            PressState::Held { button: active, .. } if active == button => {
                self.state = PressState::Idle;
                Some(JogAction::Stop)
            }
            _ => None,
        }
    }

    pub fn tick(&mut self, now: Instant) -> Option<JogAction> {
        match self.state {
            PressState::Idle => None,
            PressState::Pressed { button, since } => {
                if now.duration_since(since) < self.hold_delay {
                    return None;
                }
                self.state = PressState::Held {
                    button,
                    next_tick: now + self.tick_interval,
                };
                Some(JogAction::Velocity(button))
            }
            PressState::Held { button, next_tick } => {
                if now < next_tick {
                    return None;
                }
                // a stalled loop does not cause a burst of catch-up commands
                let mut next = next_tick + self.tick_interval;
                if next <= now {
                    next = now + self.tick_interval;
                }
                self.state = PressState::Held { button, next_tick: next };
                Some(JogAction::Velocity(button))
            }
        }
    }

    /// Ends the current press when its release can no longer arrive, such
    /// as on focus loss. A held jog yields one stop; a press still inside
    /// the hold delay has sent nothing and yields nothing.
    pub fn cancel(&mut self) -> Option<JogAction> {
        let held = matches!(self.state, PressState::Held { .. });
        self.state = PressState::Idle;
        held.then_some(JogAction::Stop)
    }

    /// Forgets any press without emitting an action.
    pub fn reset(&mut self) {
        self.state = PressState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUS_Z: JogButton = JogButton::new(Axis::Z, Direction::Positive);
    const MINUS_J2: JogButton = JogButton::new(Axis::J2, Direction::Negative);

    fn params() -> JogParams {
        JogTexts::default().parse().unwrap()
    }

    #[test]
    fn step_vectors_have_one_entry() {
        for axis in Axis::LINEAR.into_iter().chain(Axis::JOINTS) {
            for direction in [Direction::Positive, Direction::Negative] {
                let vector = JogButton::new(axis, direction).vector(0.25);
                let nonzero: Vec<f64> = vector.iter().copied().filter(|v| *v != 0.0).collect();
                assert_eq!(nonzero, vec![direction.sign() * 0.25]);
                assert_eq!(vector[axis.index()], direction.sign() * 0.25);
            }
        }
    }

    #[test]
    fn step_uses_the_matching_step_size() {
        let p = params();
        match p.step_command(PLUS_Z, true) {
            RobotCommand::MoveLinear { vector, velocity, acceleration, tool_frame } => {
                assert_eq!(vector, [0.0, 0.0, 0.01, 0.0, 0.0, 0.0]);
                assert_eq!((velocity, acceleration, tool_frame), (0.1, 0.5, true));
            }
            other => panic!("unexpected {other:?}"),
        }
        match p.step_command(JogButton::new(Axis::Rx, Direction::Negative), false) {
            RobotCommand::MoveLinear { vector, .. } => assert_eq!(vector[3], -0.05),
            other => panic!("unexpected {other:?}"),
        }
        match p.step_command(MINUS_J2, false) {
            RobotCommand::MoveJointRelative { vector, velocity, .. } => {
                assert_eq!(vector, [0.0, 0.0, -0.05, 0.0, 0.0, 0.0]);
                assert_eq!(velocity, 0.2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn velocity_commands_follow_the_axis_kind() {
        let p = params();
        assert_eq!(
            p.velocity_command(MINUS_J2, true, 0.15),
            RobotCommand::SpeedJoint {
                vector: [0.0, 0.0, -0.2, 0.0, 0.0, 0.0],
                acceleration: 0.5,
                min_time: 0.15,
            }
        );
        assert_eq!(
            p.velocity_command(PLUS_Z, true, 0.15),
            RobotCommand::SpeedLinear {
                vector: [0.0, 0.0, 0.1, 0.0, 0.0, 0.0],
                acceleration: 0.5,
                min_time: 0.15,
                tool_frame: true,
            }
        );
    }

    #[test]
    fn bad_text_names_the_field() {
        let texts = JogTexts {
            joint_velocity: "fast".to_string(),
            ..JogTexts::default()
        };
        let err = texts.parse().unwrap_err();
        assert_eq!(err.to_string(), "Joint velocity: 'fast' is not a number");
    }

    #[test]
    fn short_press_is_one_step() {
        let t0 = Instant::now();
        let mut jog = JogController::default();
        assert!(jog.press(PLUS_Z, t0));
        assert_eq!(jog.tick(t0 + Duration::from_millis(200)), None);
        assert_eq!(jog.release(PLUS_Z), Some(JogAction::Step(PLUS_Z)));
        assert_eq!(jog.state(), PressState::Idle);
        assert_eq!(jog.tick(t0 + Duration::from_millis(900)), None);
    }

    #[test]
    fn hold_sends_velocity_every_tick_then_one_stop() {
        let t0 = Instant::now();
        let mut jog = JogController::default();
        jog.press(MINUS_J2, t0);

        let mut actions = Vec::new();
        for ms in (0..=1000).step_by(20) {
            if let Some(action) = jog.tick(t0 + Duration::from_millis(ms)) {
                actions.push(action);
            }
        }
        // velocity at 500 ms and then every 100 ms up to 1000 ms
        assert_eq!(actions, vec![JogAction::Velocity(MINUS_J2); 6]);

        assert_eq!(jog.release(MINUS_J2), Some(JogAction::Stop));
        assert_eq!(jog.tick(t0 + Duration::from_millis(1200)), None);
        assert_eq!(jog.release(MINUS_J2), None);
    }

    #[test]
    fn other_buttons_are_ignored_while_active() {
        let t0 = Instant::now();
        let mut jog = JogController::default();
        jog.press(PLUS_Z, t0);
        assert!(!jog.press(MINUS_J2, t0));
        assert_eq!(jog.release(MINUS_J2), None);
        assert_eq!(jog.active(), Some(PLUS_Z));
    }

    #[test]
    fn stalled_loop_does_not_burst() {
        let t0 = Instant::now();
        let mut jog = JogController::default();
        jog.press(PLUS_Z, t0);
        assert!(jog.tick(t0 + HOLD_DELAY).is_some());
        assert!(jog.tick(t0 + Duration::from_secs(3)).is_some());
        assert_eq!(jog.tick(t0 + Duration::from_millis(3050)), None);
    }

    #[test]
    fn cancel_stops_only_a_held_jog() {
        let t0 = Instant::now();
        let mut jog = JogController::default();
        jog.press(PLUS_Z, t0);
        assert_eq!(jog.cancel(), None);
        assert_eq!(jog.state(), PressState::Idle);

        jog.press(PLUS_Z, t0);
        jog.tick(t0 + HOLD_DELAY);
        assert_eq!(jog.cancel(), Some(JogAction::Stop));
        assert_eq!(jog.release(PLUS_Z), None);
        assert_eq!(jog.cancel(), None);
    }

    #[test]
    fn min_time_outlives_the_tick() {
        assert!((JogController::default().min_time() - 0.15).abs() < 1e-9);
    }
}
