use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GetStatusResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
    /// Robot powered, brakes released and not in a protective stop.
    #[serde(rename = "Running", default)]
    pub running: bool,
}
