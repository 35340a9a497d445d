mod status;
mod position;
mod digital_io;
mod motion;
mod csys;

pub use status::*;
pub use position::*;
pub use digital_io::*;
pub use motion::*;
pub use csys::*;

use serde::{Deserialize, Serialize};

/// Response to commands that only report success or failure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct AckResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
}

impl AckResponse {
    pub fn error(error_id: u32) -> Self {
        Self { error_id }
    }
}
