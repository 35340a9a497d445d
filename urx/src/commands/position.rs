use serde::{Deserialize, Serialize};
use crate::{JointPositions, Pose};

/// Pose of the TCP expressed in the active coordinate frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadPoseResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
    #[serde(rename = "Pose", default)]
    pub pose: Pose,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadJointsResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
    #[serde(rename = "Joints", default)]
    pub joints: JointPositions,
}
