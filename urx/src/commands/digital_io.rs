use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WriteDigitalOutput {
    #[serde(rename = "Port")]
    pub port: u8,
    #[serde(rename = "Value")]
    pub value: bool,
}

impl WriteDigitalOutput {
    pub fn new(port: u8, value: bool) -> Self {
        Self { port, value }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReadDigitalOutputsResponse {
    #[serde(rename = "ErrorID")]
    pub error_id: u32,
    /// Bit `n` is the state of output `n`.
    #[serde(rename = "Bits", default)]
    pub bits: u32,
}
