mod command;

pub use command::*;

use serde::Serialize;

use crate::LinkError;

/// Serializes a packet as one protocol line, `\r\n` terminated.
pub fn to_line<T: Serialize>(packet: &T) -> Result<String, LinkError> {
    serde_json::to_string(packet)
        .map(|s| s + "\r\n")
        .map_err(|e| LinkError::Serialization(e.to_string()))
}

/// Drains every complete line from `buffer`, leaving a trailing partial line in place.
pub fn extract_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let mut chunk = buffer.drain(..=pos).collect::<Vec<_>>();
        chunk.pop();
        if chunk.last() == Some(&b'\r') {
            chunk.pop();
        }
        if chunk.is_empty() {
            continue;
        }
        if let Ok(s) = String::from_utf8(chunk) {
            lines.push(s);
        }
    }
    lines
}
