use serde::{Deserialize, Serialize};
use crate::Vector6;

/// Relative linear move of the TCP by `vector`.
///
/// With `tool_frame` the offset is applied in the tool's own frame, otherwise in
/// the active coordinate frame. Without `wait` the controller answers as soon as
/// the move is accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveLinear {
    #[serde(rename = "Vector")]
    pub vector: Vector6,
    #[serde(rename = "Velocity")]
    pub velocity: f64,
    #[serde(rename = "Acceleration")]
    pub acceleration: f64,
    #[serde(rename = "ToolFrame")]
    pub tool_frame: bool,
    #[serde(rename = "Wait")]
    pub wait: bool,
}

impl MoveLinear {
    pub fn new(vector: Vector6, velocity: f64, acceleration: f64, tool_frame: bool, wait: bool) -> Self {
        Self {
            vector,
            velocity,
            acceleration,
            tool_frame,
            wait,
        }
    }
}

/// Relative joint move, `vector` holds one offset per joint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveJointRelative {
    #[serde(rename = "Vector")]
    pub vector: Vector6,
    #[serde(rename = "Velocity")]
    pub velocity: f64,
    #[serde(rename = "Acceleration")]
    pub acceleration: f64,
    #[serde(rename = "Wait")]
    pub wait: bool,
}

impl MoveJointRelative {
    pub fn new(vector: Vector6, velocity: f64, acceleration: f64, wait: bool) -> Self {
        Self {
            vector,
            velocity,
            acceleration,
            wait,
        }
    }
}

/// Cartesian velocity command. The controller keeps moving for at least
/// `min_time` seconds and then decelerates unless a new command arrives.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpeedLinear {
    #[serde(rename = "Vector")]
    pub vector: Vector6,
    #[serde(rename = "Acceleration")]
    pub acceleration: f64,
    #[serde(rename = "MinTime")]
    pub min_time: f64,
    #[serde(rename = "ToolFrame")]
    pub tool_frame: bool,
}

impl SpeedLinear {
    pub fn new(vector: Vector6, acceleration: f64, min_time: f64, tool_frame: bool) -> Self {
        Self {
            vector,
            acceleration,
            min_time,
            tool_frame,
        }
    }
}

/// Joint velocity command, same timing rules as [`SpeedLinear`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpeedJoint {
    #[serde(rename = "Vector")]
    pub vector: Vector6,
    #[serde(rename = "Acceleration")]
    pub acceleration: f64,
    #[serde(rename = "MinTime")]
    pub min_time: f64,
}

impl SpeedJoint {
    pub fn new(vector: Vector6, acceleration: f64, min_time: f64) -> Self {
        Self {
            vector,
            acceleration,
            min_time,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stop {
    #[serde(rename = "Acceleration")]
    pub acceleration: f64,
}

impl Default for Stop {
    fn default() -> Self {
        Self { acceleration: 0.5 }
    }
}
