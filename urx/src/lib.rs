use serde::{Deserialize, Serialize};

pub mod drivers;

pub mod packets;
pub mod commands;
pub mod errors;
pub use errors::*;

/// Six values in controller order: `[x, y, z, rx, ry, rz]` for poses and
/// transforms, `[j0, ..., j5]` for joints.
pub type Vector6 = [f64; 6];

/// Number of digital output lines on the controller.
pub const DIGITAL_OUTPUT_COUNT: u8 = 8;

/// TCP pose: position in metres, orientation as a rotation vector in radians.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
    #[serde(rename = "RX")]
    pub rx: f64,
    #[serde(rename = "RY")]
    pub ry: f64,
    #[serde(rename = "RZ")]
    pub rz: f64,
}

impl Pose {
    pub fn to_array(&self) -> Vector6 {
        [self.x, self.y, self.z, self.rx, self.ry, self.rz]
    }
}

impl From<Vector6> for Pose {
    fn from(v: Vector6) -> Self {
        Self {
            x: v[0],
            y: v[1],
            z: v[2],
            rx: v[3],
            ry: v[4],
            rz: v[5],
        }
    }
}

/// Joint positions in radians.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct JointPositions {
    pub j0: f64,
    pub j1: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j5: f64,
}

impl JointPositions {
    pub fn to_array(&self) -> Vector6 {
        [self.j0, self.j1, self.j2, self.j3, self.j4, self.j5]
    }
}

impl From<Vector6> for JointPositions {
    fn from(v: Vector6) -> Self {
        Self {
            j0: v[0],
            j1: v[1],
            j2: v[2],
            j3: v[3],
            j4: v[4],
            j5: v[5],
        }
    }
}
