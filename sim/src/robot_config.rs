//! Arm models the simulator can impersonate.
//!
//! Standard Denavit-Hartenberg parameters as published by the arm vendor
//! for the e-Series. Lengths in metres, twists in radians.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RobotModel {
    UR3e,
    #[default]
    UR5e,
    UR10e,
}

impl fmt::Display for RobotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotModel::UR3e => write!(f, "ur3e"),
            RobotModel::UR5e => write!(f, "ur5e"),
            RobotModel::UR10e => write!(f, "ur10e"),
        }
    }
}

impl FromStr for RobotModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ur3e" => Ok(RobotModel::UR3e),
            "ur5e" => Ok(RobotModel::UR5e),
            "ur10e" => Ok(RobotModel::UR10e),
            other => Err(format!("unknown robot model '{}' (expected ur3e, ur5e or ur10e)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    pub model: RobotModel,

    /// Maximum reach in m
    pub max_reach: f64,

    /// Link offsets along z (d_i)
    pub d: [f64; 6],
    /// Link lengths along x (a_i)
    pub a: [f64; 6],
    /// Link twists (alpha_i)
    pub alpha: [f64; 6],
}

impl RobotConfig {
    pub fn ur3e() -> Self {
        Self {
            model: RobotModel::UR3e,
            max_reach: 0.5,
            d: [0.15185, 0.0, 0.0, 0.13105, 0.08535, 0.0921],
            a: [0.0, -0.24355, -0.2132, 0.0, 0.0, 0.0],
            alpha: Self::TWISTS,
        }
    }

    pub fn ur5e() -> Self {
        Self {
            model: RobotModel::UR5e,
            max_reach: 0.85,
            d: [0.1625, 0.0, 0.0, 0.1333, 0.0997, 0.0996],
            a: [0.0, -0.425, -0.3922, 0.0, 0.0, 0.0],
            alpha: Self::TWISTS,
        }
    }

    pub fn ur10e() -> Self {
        Self {
            model: RobotModel::UR10e,
            max_reach: 1.3,
            d: [0.1807, 0.0, 0.0, 0.17415, 0.11985, 0.11655],
            a: [0.0, -0.6127, -0.57155, 0.0, 0.0, 0.0],
            alpha: Self::TWISTS,
        }
    }

    /// The three e-Series arms share their twist angles.
    const TWISTS: [f64; 6] = [FRAC_PI_2, 0.0, 0.0, FRAC_PI_2, -FRAC_PI_2, 0.0];

    pub fn from_model(model: RobotModel) -> Self {
        match model {
            RobotModel::UR3e => Self::ur3e(),
            RobotModel::UR5e => Self::ur5e(),
            RobotModel::UR10e => Self::ur10e(),
        }
    }
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self::from_model(RobotModel::default())
    }
}
