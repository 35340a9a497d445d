use serde::{Deserialize, Serialize};
use crate::Vector6;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetCsys {
    #[serde(rename = "Transform")]
    pub transform: Vector6,
}

impl SetCsys {
    pub fn new(transform: Vector6) -> Self {
        Self { transform }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReadCsysResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
    #[serde(rename = "Transform", default)]
    pub transform: Vector6,
}
