// Forward kinematics for six-axis arms described by standard DH parameters.

use nalgebra::{Isometry3, Vector3};

use crate::robot_config::RobotConfig;

#[derive(Debug, Clone)]
pub struct ArmKinematics {
    config: RobotConfig,
}

impl ArmKinematics {
    pub fn from_config(config: RobotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RobotConfig {
        &self.config
    }

    /// Link transform `Rz(theta) * Tz(d) * Tx(a) * Rx(alpha)`.
    fn link_transform(theta: f64, d: f64, a: f64, alpha: f64) -> Isometry3<f64> {
        Isometry3::rotation(Vector3::z() * theta)
            * Isometry3::translation(a, 0.0, d)
            * Isometry3::rotation(Vector3::x() * alpha)
    }

    /// Flange pose in the base frame for the given joint angles (radians).
    pub fn forward_kinematics(&self, joints: &[f64; 6]) -> Isometry3<f64> {
        let c = &self.config;
        (0..6).fold(Isometry3::identity(), |acc, i| {
            acc * Self::link_transform(joints[i], c.d[i], c.a[i], c.alpha[i])
        })
    }
}

impl Default for ArmKinematics {
    fn default() -> Self {
        Self::from_config(RobotConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn zero_pose_stretches_along_negative_x() {
        // all joints at zero: arm lies flat, flange offset by the wrist links
        let kin = ArmKinematics::default();
        let c = kin.config().clone();
        let flange = kin.forward_kinematics(&[0.0; 6]);
        let t = flange.translation.vector;

        assert!((t.x - (c.a[1] + c.a[2])).abs() < EPS);
        assert!((t.y - -(c.d[3] + c.d[5])).abs() < EPS);
        assert!((t.z - (c.d[0] - c.d[4])).abs() < EPS);
    }

    #[test]
    fn base_rotation_turns_the_whole_arm() {
        let kin = ArmKinematics::default();
        let straight = kin.forward_kinematics(&[0.0; 6]).translation.vector;
        let turned = kin.forward_kinematics(&[FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, 0.0]).translation.vector;

        // a quarter turn about z maps (x, y) to (-y, x)
        assert!((turned.x + straight.y).abs() < EPS);
        assert!((turned.y - straight.x).abs() < EPS);
        assert!((turned.z - straight.z).abs() < EPS);
    }

    #[test]
    fn reach_stays_within_model_limit() {
        let kin = ArmKinematics::default();
        let t = kin.forward_kinematics(&[0.3, -1.2, 1.1, -0.5, 1.4, 0.2]).translation.vector;
        let from_shoulder = Vector3::new(t.x, t.y, t.z - kin.config().d[0]);
        assert!(from_shoulder.norm() < kin.config().max_reach + 0.2);
    }
}
