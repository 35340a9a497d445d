use serde::{Deserialize, Serialize};
use crate::commands::*;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Command")]
pub enum Command {
    GetStatus,
    ReadPose,
    ReadJoints,
    ReadDigitalOutputs,
    WriteDigitalOutput(WriteDigitalOutput),
    MoveLinear(MoveLinear),
    MoveJointRelative(MoveJointRelative),
    SpeedLinear(SpeedLinear),
    SpeedJoint(SpeedJoint),
    Stop(Stop),
    SetCsys(SetCsys),
    ReadCsys,
    Disconnect,
}

impl Command {
    /// Value of the `Command` tag on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetStatus => "GetStatus",
            Command::ReadPose => "ReadPose",
            Command::ReadJoints => "ReadJoints",
            Command::ReadDigitalOutputs => "ReadDigitalOutputs",
            Command::WriteDigitalOutput(_) => "WriteDigitalOutput",
            Command::MoveLinear(_) => "MoveLinear",
            Command::MoveJointRelative(_) => "MoveJointRelative",
            Command::SpeedLinear(_) => "SpeedLinear",
            Command::SpeedJoint(_) => "SpeedJoint",
            Command::Stop(_) => "Stop",
            Command::SetCsys(_) => "SetCsys",
            Command::ReadCsys => "ReadCsys",
            Command::Disconnect => "Disconnect",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Command")]
pub enum CommandResponse {
    GetStatus(GetStatusResponse),
    ReadPose(ReadPoseResponse),
    ReadJoints(ReadJointsResponse),
    ReadDigitalOutputs(ReadDigitalOutputsResponse),
    WriteDigitalOutput(AckResponse),
    MoveLinear(AckResponse),
    MoveJointRelative(AckResponse),
    SpeedLinear(AckResponse),
    SpeedJoint(AckResponse),
    Stop(AckResponse),
    SetCsys(AckResponse),
    ReadCsys(ReadCsysResponse),
    Disconnect(AckResponse),
    /// Sent by the controller for lines it could not parse.
    Unknown(AckResponse),
}

impl CommandResponse {
    pub fn name(&self) -> &'static str {
        match self {
            CommandResponse::GetStatus(_) => "GetStatus",
            CommandResponse::ReadPose(_) => "ReadPose",
            CommandResponse::ReadJoints(_) => "ReadJoints",
            CommandResponse::ReadDigitalOutputs(_) => "ReadDigitalOutputs",
            CommandResponse::WriteDigitalOutput(_) => "WriteDigitalOutput",
            CommandResponse::MoveLinear(_) => "MoveLinear",
            CommandResponse::MoveJointRelative(_) => "MoveJointRelative",
            CommandResponse::SpeedLinear(_) => "SpeedLinear",
            CommandResponse::SpeedJoint(_) => "SpeedJoint",
            CommandResponse::Stop(_) => "Stop",
            CommandResponse::SetCsys(_) => "SetCsys",
            CommandResponse::ReadCsys(_) => "ReadCsys",
            CommandResponse::Disconnect(_) => "Disconnect",
            CommandResponse::Unknown(_) => "Unknown",
        }
    }

    pub fn error_id(&self) -> u32 {
        match self {
            CommandResponse::GetStatus(r) => r.error_id,
            CommandResponse::ReadPose(r) => r.error_id,
            CommandResponse::ReadJoints(r) => r.error_id,
            CommandResponse::ReadDigitalOutputs(r) => r.error_id,
            CommandResponse::ReadCsys(r) => r.error_id,
            CommandResponse::WriteDigitalOutput(r)
            | CommandResponse::MoveLinear(r)
            | CommandResponse::MoveJointRelative(r)
            | CommandResponse::SpeedLinear(r)
            | CommandResponse::SpeedJoint(r)
            | CommandResponse::Stop(r)
            | CommandResponse::SetCsys(r)
            | CommandResponse::Disconnect(r)
            | CommandResponse::Unknown(r) => r.error_id,
        }
    }

    /// Builds the error answer to `command`, used by controllers that reject it.
    pub fn rejection(command: &Command, error_id: u32) -> Self {
        let ack = AckResponse::error(error_id);
        match command {
            Command::GetStatus => CommandResponse::GetStatus(GetStatusResponse { error_id, running: false }),
            Command::ReadPose => CommandResponse::ReadPose(ReadPoseResponse { error_id, pose: Default::default() }),
            Command::ReadJoints => CommandResponse::ReadJoints(ReadJointsResponse { error_id, joints: Default::default() }),
            Command::ReadDigitalOutputs => CommandResponse::ReadDigitalOutputs(ReadDigitalOutputsResponse { error_id, bits: 0 }),
            Command::ReadCsys => CommandResponse::ReadCsys(ReadCsysResponse { error_id, transform: [0.0; 6] }),
            Command::WriteDigitalOutput(_) => CommandResponse::WriteDigitalOutput(ack),
            Command::MoveLinear(_) => CommandResponse::MoveLinear(ack),
            Command::MoveJointRelative(_) => CommandResponse::MoveJointRelative(ack),
            Command::SpeedLinear(_) => CommandResponse::SpeedLinear(ack),
            Command::SpeedJoint(_) => CommandResponse::SpeedJoint(ack),
            Command::Stop(_) => CommandResponse::Stop(ack),
            Command::SetCsys(_) => CommandResponse::SetCsys(ack),
            Command::Disconnect => CommandResponse::Disconnect(ack),
        }
    }
}

/// A command as written to the controller. The controller copies
/// `SequenceID` into its reply so late answers can be told apart.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    #[serde(rename = "SequenceID", default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<u32>,
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    pub fn new(sequence_id: u32, command: Command) -> Self {
        Self { sequence_id: Some(sequence_id), command }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Reply {
    #[serde(rename = "SequenceID", default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<u32>,
    #[serde(flatten)]
    pub response: CommandResponse,
}

impl Reply {
    /// Answers `request`, echoing its sequence id.
    pub fn to(request: &Request, response: CommandResponse) -> Self {
        Self { sequence_id: request.sequence_id, response }
    }
}
