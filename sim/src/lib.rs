// Library exports for the urx controller simulator

pub mod robot_config;
pub mod kinematics;
pub mod robot;
pub mod server;

pub use robot_config::{RobotConfig, RobotModel};
pub use kinematics::ArmKinematics;
pub use robot::SimRobot;
pub use server::{serve, spawn_motion_clock, SharedRobot};
