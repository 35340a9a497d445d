use std::future::Future;

use crate::{LinkError, Vector6};

/// Operations a connected robot offers to its callers.
///
/// Every call may fail; the caller decides whether a failure is shown,
/// logged or ignored. Motion calls with `wait == false` return once the
/// controller has accepted the command, not when the motion completes.
pub trait RobotHandle: Send + Sync + 'static {
    fn is_running(&self) -> impl Future<Output = Result<bool, LinkError>> + Send;

    /// TCP pose in the active coordinate frame.
    fn get_pose(&self) -> impl Future<Output = Result<Vector6, LinkError>> + Send;

    fn get_joints(&self) -> impl Future<Output = Result<Vector6, LinkError>> + Send;

    /// Bit `n` is the state of digital output `n`.
    fn get_digital_output_bits(&self) -> impl Future<Output = Result<u32, LinkError>> + Send;

    fn set_digital_output(&self, index: u8, value: bool) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn move_linear(
        &self,
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
        tool_frame: bool,
        wait: bool,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn move_joint_relative(
        &self,
        vector: Vector6,
        velocity: f64,
        acceleration: f64,
        wait: bool,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn move_linear_velocity(
        &self,
        vector: Vector6,
        acceleration: f64,
        min_time: f64,
        tool_frame: bool,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn move_joint_velocity(
        &self,
        vector: Vector6,
        acceleration: f64,
        min_time: f64,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn stop(&self) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn set_coordinate_frame(&self, transform: Vector6) -> impl Future<Output = Result<(), LinkError>> + Send;

    fn get_coordinate_frame(&self) -> impl Future<Output = Result<Vector6, LinkError>> + Send;

    /// Ends the session. The handle is consumed whether or not the controller
    /// acknowledged the disconnect.
    fn close(self) -> impl Future<Output = Result<(), LinkError>> + Send
    where
        Self: Sized;
}

/// Opens robot handles from operator supplied endpoints.
pub trait Connector: Send + Sync + 'static {
    type Handle: RobotHandle;

    fn connect(&self, endpoint: &str) -> impl Future<Output = Result<Self::Handle, LinkError>> + Send;
}
