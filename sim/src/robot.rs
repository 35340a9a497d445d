//! State of the simulated arm and the effect of each command on it.
//!
//! Cartesian motion moves the TCP without solving inverse kinematics, so the
//! joint readout only follows joint motion. Joint motion re-derives the TCP
//! from forward kinematics.

use std::time::{Duration, Instant};

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use tracing::debug;
use urx::commands::*;
use urx::packets::{Command, CommandResponse};
use urx::{ControllerErrorCode, Vector6, DIGITAL_OUTPUT_COUNT};

use crate::kinematics::ArmKinematics;
use crate::robot_config::RobotConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
enum MotionKind {
    Linear { tool_frame: bool },
    Joint,
}

#[derive(Debug, Clone, Copy)]
struct VelocityMotion {
    kind: MotionKind,
    vector: Vector6,
    until: Instant,
}

#[derive(Debug, Clone)]
pub struct SimRobot {
    kinematics: ArmKinematics,
    joints: Vector6,
    /// TCP in the base frame.
    tcp: Isometry3<f64>,
    /// Active coordinate frame in the base frame.
    csys: Isometry3<f64>,
    outputs: u32,
    running: bool,
    motion: Option<VelocityMotion>,
    last_update: Instant,
}

impl SimRobot {
    pub fn new(config: RobotConfig) -> Self {
        let kinematics = ArmKinematics::from_config(config);
        // shoulder lifted and elbow bent, a comfortable mid-workspace start
        let joints = [0.0, -1.57, 1.57, -1.57, -1.57, 0.0];
        let tcp = kinematics.forward_kinematics(&joints);
        Self {
            kinematics,
            joints,
            tcp,
            csys: Isometry3::identity(),
            outputs: 0,
            running: true,
            motion: None,
            last_update: Instant::now(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Simulates a protective stop (`false`) or its release (`true`).
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        if !running {
            self.motion = None;
        }
    }

    pub fn joints(&self) -> Vector6 {
        self.joints
    }

    pub fn outputs(&self) -> u32 {
        self.outputs
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// TCP pose in the active coordinate frame.
    pub fn pose(&self) -> Vector6 {
        isometry_to_vector(&(self.csys.inverse() * self.tcp))
    }

    pub fn csys(&self) -> Vector6 {
        isometry_to_vector(&self.csys)
    }

    /// Integrates the active velocity command up to `now`.
    pub fn advance(&mut self, now: Instant) {
        let from = self.last_update;
        self.last_update = now;
        let Some(motion) = self.motion else {
            return;
        };
        let end = now.min(motion.until);
        if end > from {
            let dt = (end - from).as_secs_f64();
            let delta = motion.vector.map(|v| v * dt);
            match motion.kind {
                MotionKind::Linear { tool_frame } => self.offset_tcp(delta, tool_frame),
                MotionKind::Joint => self.offset_joints(delta),
            }
        }
        if now >= motion.until {
            debug!("Velocity command expired");
            self.motion = None;
        }
    }

    /// Applies `command` and returns the controller's answer.
    pub fn handle(&mut self, command: &Command, now: Instant) -> CommandResponse {
        self.advance(now);
        match self.apply(command, now) {
            Ok(response) => response,
            Err(code) => CommandResponse::rejection(command, code.id()),
        }
    }

    fn apply(&mut self, command: &Command, now: Instant) -> Result<CommandResponse, ControllerErrorCode> {
        let ok = AckResponse::default();
        let response = match command {
            Command::GetStatus => CommandResponse::GetStatus(GetStatusResponse {
                error_id: 0,
                running: self.running,
            }),
            Command::ReadPose => CommandResponse::ReadPose(ReadPoseResponse {
                error_id: 0,
                pose: self.pose().into(),
            }),
            Command::ReadJoints => CommandResponse::ReadJoints(ReadJointsResponse {
                error_id: 0,
                joints: self.joints.into(),
            }),
            Command::ReadDigitalOutputs => CommandResponse::ReadDigitalOutputs(ReadDigitalOutputsResponse {
                error_id: 0,
                bits: self.outputs,
            }),
            Command::WriteDigitalOutput(w) => {
                if w.port >= DIGITAL_OUTPUT_COUNT {
                    return Err(ControllerErrorCode::InvalidPort);
                }
                if w.value {
                    self.outputs |= 1u32 << w.port;
                } else {
                    self.outputs &= !(1u32 << w.port);
                }
                CommandResponse::WriteDigitalOutput(ok)
            }
            Command::MoveLinear(m) => {
                self.check_motion(&m.vector, &[m.velocity, m.acceleration])?;
                self.motion = None;
                self.offset_tcp(m.vector, m.tool_frame);
                CommandResponse::MoveLinear(ok)
            }
            Command::MoveJointRelative(m) => {
                self.check_motion(&m.vector, &[m.velocity, m.acceleration])?;
                self.motion = None;
                self.offset_joints(m.vector);
                CommandResponse::MoveJointRelative(ok)
            }
            Command::SpeedLinear(s) => {
                self.check_motion(&s.vector, &[s.acceleration, s.min_time])?;
                self.start_velocity(MotionKind::Linear { tool_frame: s.tool_frame }, s.vector, s.min_time, now)?;
                CommandResponse::SpeedLinear(ok)
            }
            Command::SpeedJoint(s) => {
                self.check_motion(&s.vector, &[s.acceleration, s.min_time])?;
                self.start_velocity(MotionKind::Joint, s.vector, s.min_time, now)?;
                CommandResponse::SpeedJoint(ok)
            }
            Command::Stop(_) => {
                self.motion = None;
                CommandResponse::Stop(ok)
            }
            Command::SetCsys(s) => {
                if s.transform.iter().any(|v| !v.is_finite()) {
                    return Err(ControllerErrorCode::InvalidValue);
                }
                self.csys = vector_to_isometry(&s.transform);
                CommandResponse::SetCsys(ok)
            }
            Command::ReadCsys => CommandResponse::ReadCsys(ReadCsysResponse {
                error_id: 0,
                transform: self.csys(),
            }),
            Command::Disconnect => {
                self.motion = None;
                CommandResponse::Disconnect(ok)
            }
        };
        Ok(response)
    }

    fn check_motion(&self, vector: &Vector6, positive: &[f64]) -> Result<(), ControllerErrorCode> {
        if !self.running {
            return Err(ControllerErrorCode::RobotNotRunning);
        }
        let finite = vector.iter().all(|v| v.is_finite());
        let valid = positive.iter().all(|v| v.is_finite() && *v > 0.0);
        if finite && valid {
            Ok(())
        } else {
            Err(ControllerErrorCode::InvalidValue)
        }
    }

    fn start_velocity(
        &mut self,
        kind: MotionKind,
        vector: Vector6,
        min_time: f64,
        now: Instant,
    ) -> Result<(), ControllerErrorCode> {
        let until = Duration::try_from_secs_f64(min_time)
            .ok()
            .and_then(|d| now.checked_add(d))
            .ok_or(ControllerErrorCode::InvalidValue)?;
        self.motion = Some(VelocityMotion { kind, vector, until });
        Ok(())
    }

    /// Moves the TCP by `delta`, expressed in the active coordinate frame or,
    /// with `tool_frame`, in the TCP's own frame.
    fn offset_tcp(&mut self, delta: Vector6, tool_frame: bool) {
        let pose = self.csys.inverse() * self.tcp;
        let translation = Vector3::new(delta[0], delta[1], delta[2]);
        let rotation = Vector3::new(delta[3], delta[4], delta[5]);
        let moved = if tool_frame {
            pose * Isometry3::new(translation, rotation)
        } else {
            Isometry3::from_parts(
                Translation3::from(pose.translation.vector + translation),
                UnitQuaternion::new(rotation) * pose.rotation,
            )
        };
        self.tcp = self.csys * moved;
    }

    fn offset_joints(&mut self, delta: Vector6) {
        for (joint, d) in self.joints.iter_mut().zip(delta) {
            *joint += d;
        }
        self.tcp = self.kinematics.forward_kinematics(&self.joints);
    }
}

impl Default for SimRobot {
    fn default() -> Self {
        Self::new(RobotConfig::default())
    }
}

fn vector_to_isometry(v: &Vector6) -> Isometry3<f64> {
    Isometry3::new(Vector3::new(v[0], v[1], v[2]), Vector3::new(v[3], v[4], v[5]))
}

fn isometry_to_vector(iso: &Isometry3<f64>) -> Vector6 {
    let t = iso.translation.vector;
    let r = iso.rotation.scaled_axis();
    [t.x, t.y, t.z, r.x, r.y, r.z]
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: &Vector6, b: &Vector6) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn base_frame_step_moves_only_position() {
        let mut robot = SimRobot::default();
        let before = robot.pose();
        let command = Command::MoveLinear(MoveLinear::new([0.0, 0.0, 0.01, 0.0, 0.0, 0.0], 0.1, 0.5, false, false));
        let response = robot.handle(&command, Instant::now());

        assert_eq!(response.error_id(), 0);
        let after = robot.pose();
        assert!((after[2] - before[2] - 0.01).abs() < EPS);
        assert!((after[0] - before[0]).abs() < EPS);
        assert!(close(&[after[3], after[4], after[5], 0.0, 0.0, 0.0], &[before[3], before[4], before[5], 0.0, 0.0, 0.0]));
    }

    #[test]
    fn joint_step_changes_one_joint_and_the_tcp() {
        let mut robot = SimRobot::default();
        let joints = robot.joints();
        let pose = robot.pose();
        let command = Command::MoveJointRelative(MoveJointRelative::new([0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0.2, 0.5, false));
        robot.handle(&command, Instant::now());

        assert!((robot.joints()[0] - joints[0] - 0.1).abs() < EPS);
        assert_eq!(&robot.joints()[1..], &joints[1..]);
        assert!(!close(&robot.pose(), &pose));
    }

    #[test]
    fn outputs_set_and_clear_bits() {
        let mut robot = SimRobot::default();
        let now = Instant::now();
        robot.handle(&Command::WriteDigitalOutput(WriteDigitalOutput::new(3, true)), now);
        robot.handle(&Command::WriteDigitalOutput(WriteDigitalOutput::new(0, true)), now);
        assert_eq!(robot.outputs(), 0b1001);
        robot.handle(&Command::WriteDigitalOutput(WriteDigitalOutput::new(3, false)), now);
        assert_eq!(robot.outputs(), 0b0001);

        let rejected = robot.handle(&Command::WriteDigitalOutput(WriteDigitalOutput::new(8, true)), now);
        assert_eq!(rejected.error_id(), ControllerErrorCode::InvalidPort.id());
    }

    #[test]
    fn velocity_runs_until_min_time_then_stops() {
        let mut robot = SimRobot::default();
        let start = Instant::now();
        let before = robot.pose();
        let command = Command::SpeedLinear(SpeedLinear::new([0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0.5, 0.2, false));
        robot.handle(&command, start);
        assert!(robot.is_moving());

        robot.advance(start + Duration::from_millis(100));
        assert!((robot.pose()[0] - before[0] - 0.01).abs() < 1e-6);

        // past min_time the arm has covered exactly 0.2 s worth of motion
        robot.advance(start + Duration::from_millis(500));
        assert!(!robot.is_moving());
        assert!((robot.pose()[0] - before[0] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn stop_cancels_velocity() {
        let mut robot = SimRobot::default();
        let start = Instant::now();
        robot.handle(&Command::SpeedJoint(SpeedJoint::new([0.0, 0.5, 0.0, 0.0, 0.0, 0.0], 0.5, 1.0)), start);
        robot.handle(&Command::Stop(Stop::default()), start + Duration::from_millis(100));
        let joints = robot.joints();
        robot.advance(start + Duration::from_millis(600));
        assert_eq!(robot.joints(), joints);
    }

    #[test]
    fn pose_is_reported_in_the_active_csys() {
        let mut robot = SimRobot::default();
        let base_pose = robot.pose();
        let csys = [0.1, 0.2, 0.0, 0.0, 0.0, 0.0];
        robot.handle(&Command::SetCsys(SetCsys::new(csys)), Instant::now());

        let pose = robot.pose();
        assert!((pose[0] - (base_pose[0] - 0.1)).abs() < EPS);
        assert!((pose[1] - (base_pose[1] - 0.2)).abs() < EPS);
        assert!(close(&robot.csys(), &csys));
    }

    #[test]
    fn stopped_robot_rejects_motion() {
        let mut robot = SimRobot::default();
        robot.set_running(false);
        let command = Command::MoveLinear(MoveLinear::new([0.01, 0.0, 0.0, 0.0, 0.0, 0.0], 0.1, 0.5, false, false));
        let response = robot.handle(&command, Instant::now());
        assert_eq!(response.error_id(), ControllerErrorCode::RobotNotRunning.id());
        assert_eq!(response.name(), "MoveLinear");
    }

    #[test]
    fn non_positive_velocity_is_invalid() {
        let mut robot = SimRobot::default();
        let command = Command::MoveLinear(MoveLinear::new([0.01, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0, 0.5, false, false));
        let response = robot.handle(&command, Instant::now());
        assert_eq!(response.error_id(), ControllerErrorCode::InvalidValue.id());
    }

    #[test]
    fn min_time_beyond_any_instant_is_invalid() {
        let mut robot = SimRobot::default();
        for min_time in [1e300, f64::MAX] {
            let command = Command::SpeedLinear(SpeedLinear::new([0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0.5, min_time, false));
            let response = robot.handle(&command, Instant::now());
            assert_eq!(response.error_id(), ControllerErrorCode::InvalidValue.id());
            assert_eq!(response.name(), "SpeedLinear");
            assert!(!robot.is_moving());
        }
    }
}
