use int_enum::IntEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum LinkError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Controller answered with an unexpected packet: {0}")]
    UnexpectedResponse(String),
    #[error("Controller returned error #{}: {}", .0.id(), .0.message())]
    Controller(ControllerErrorCode),
    #[error("SendError: {0}")]
    FailedToSend(String),
    #[error("No answer to {0} within the request timeout")]
    Timeout(&'static str),
    #[error("Controller appears to be disconnected")]
    Disconnected,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LinkError {
    /// Maps a non-zero `ErrorID` from a response packet to an error.
    pub fn from_error_id(error_id: u32) -> Self {
        LinkError::Controller(
            ControllerErrorCode::try_from(error_id).unwrap_or(ControllerErrorCode::Unrecognized),
        )
    }
}

#[repr(u32)]
#[derive(Debug, Serialize, Deserialize, IntEnum, Clone, Copy, PartialEq, Eq)]
pub enum ControllerErrorCode {
    InvalidPort = 1,
    InvalidValue = 2,
    RobotNotRunning = 3,
    UnknownCommand = 4,
    Unrecognized = 99,
}

impl ControllerErrorCode {
    pub fn id(&self) -> u32 {
        *self as u32
    }

    pub fn message(&self) -> &'static str {
        match self {
            ControllerErrorCode::InvalidPort => "Invalid digital output port.",
            ControllerErrorCode::InvalidValue => "Invalid value in command.",
            ControllerErrorCode::RobotNotRunning => "Robot is not running.",
            ControllerErrorCode::UnknownCommand => "Unknown command.",
            ControllerErrorCode::Unrecognized => "Unrecognized controller error ID.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_error_ids_map_to_codes() {
        match LinkError::from_error_id(1) {
            LinkError::Controller(code) => assert_eq!(code, ControllerErrorCode::InvalidPort),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_error_ids_are_unrecognized() {
        let err = LinkError::from_error_id(12345);
        assert!(matches!(
            err,
            LinkError::Controller(ControllerErrorCode::Unrecognized)
        ));
        assert!(err.to_string().contains("#99"));
    }
}
