use std::fmt;

use urx::drivers::RobotHandle;
use urx::{LinkError, Vector6};

use crate::jog::JogButton;

/// Robot commands the panel can issue from the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotCommand {
    MoveLinear {
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
        tool_frame: bool,
    },
    MoveJointRelative {
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
    },
    SpeedLinear {
        vector: Vector6,
        acceleration: f64,
        min_time: f64,
        tool_frame: bool,
    },
    SpeedJoint {
        vector: Vector6,
        acceleration: f64,
        min_time: f64,
    },
    Stop,
    SetDigitalOutput {
        index: u8,
        value: bool,
    },
}

impl RobotCommand {
    /// Sends the command without waiting for any motion to finish.
    pub async fn execute<H: RobotHandle>(&self, robot: &H) -> Result<(), LinkError> {
        match *self {
            RobotCommand::MoveLinear {
                vector,
                velocity,
                acceleration,
                tool_frame,
            } => robot.move_linear(vector, velocity, acceleration, tool_frame, false).await,
            RobotCommand::MoveJointRelative {
                vector,
                velocity,
                acceleration,
            } => robot.move_joint_relative(vector, velocity, acceleration, false).await,
            RobotCommand::SpeedLinear {
                vector,
                acceleration,
                min_time,
                tool_frame,
            } => robot.move_linear_velocity(vector, acceleration, min_time, tool_frame).await,
            RobotCommand::SpeedJoint {
                vector,
                acceleration,
                min_time,
            } => robot.move_joint_velocity(vector, acceleration, min_time).await,
            RobotCommand::Stop => robot.stop().await,
            RobotCommand::SetDigitalOutput { index, value } => robot.set_digital_output(index, value).await,
        }
    }
}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotCommand::MoveLinear { .. } => write!(f, "Linear step"),
            RobotCommand::MoveJointRelative { .. } => write!(f, "Joint step"),
            RobotCommand::SpeedLinear { .. } => write!(f, "Linear jog"),
            RobotCommand::SpeedJoint { .. } => write!(f, "Joint jog"),
            RobotCommand::Stop => write!(f, "Stop"),
            RobotCommand::SetDigitalOutput { index, value } => {
                write!(f, "Setting output {} to {}", index, value)
            }
        }
    }
}

/// Requests from the UI to the robot worker.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Connect(String),
    Disconnect,
    /// `text` is what the operator typed; it goes into the history on success.
    SetCsys { transform: Vector6, text: String },
    Command(RobotCommand),
    Shutdown,
}

/// Text fields the operator can edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Endpoint,
    Csys,
    LinearVelocity,
    LinearAcceleration,
    JointVelocity,
    JointAcceleration,
    LinearStep,
    AngularStep,
    JointStep,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Endpoint,
        Field::Csys,
        Field::LinearVelocity,
        Field::LinearAcceleration,
        Field::JointVelocity,
        Field::JointAcceleration,
        Field::LinearStep,
        Field::AngularStep,
        Field::JointStep,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Endpoint => "Address",
            Field::Csys => "Csys",
            Field::LinearVelocity => "Lin vel",
            Field::LinearAcceleration => "Lin acc",
            Field::JointVelocity => "Joint vel",
            Field::JointAcceleration => "Joint acc",
            Field::LinearStep => "Lin step",
            Field::AngularStep => "Ang step",
            Field::JointStep => "Joint step",
        }
    }

    pub fn next(self) -> Field {
        let index = Field::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Field::ALL[(index + 1) % Field::ALL.len()]
    }

    /// Whether Up/Down browse a history for this field.
    pub fn has_history(self) -> bool {
        matches!(self, Field::Endpoint | Field::Csys)
    }
}

/// Editing inside a focused text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    Focus(Field),
    FocusNext,
    Leave,
    Insert(char),
    Backspace,
    HistoryOlder,
    HistoryNewer,
    Submit,
}

/// Everything the operator can do to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Press on a terminal that cannot report releases.
    JogClick(JogButton),
    JogPress(JogButton),
    JogRelease(JogButton),
    Stop,
    ToggleOutput(u8),
    Connect,
    Disconnect,
    ApplyCsys,
    ToggleToolFrame,
    Edit(EditEvent),
    /// The terminal lost keyboard focus; pending releases will not arrive.
    FocusLost,
    Quit,
}
