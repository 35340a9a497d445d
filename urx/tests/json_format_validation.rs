/// Checks the JSON produced for each packet against the field names the
/// controller expects.
use serde_json::{json, Value};
use urx::commands::*;
use urx::packets::{Command, CommandResponse, Reply, Request};

fn to_value(command: &Command) -> Value {
    serde_json::to_value(command).unwrap()
}

#[test]
fn test_unit_commands_only_carry_the_tag() {
    assert_eq!(to_value(&Command::GetStatus), json!({"Command": "GetStatus"}));
    assert_eq!(to_value(&Command::ReadPose), json!({"Command": "ReadPose"}));
    assert_eq!(to_value(&Command::ReadJoints), json!({"Command": "ReadJoints"}));
    assert_eq!(to_value(&Command::ReadCsys), json!({"Command": "ReadCsys"}));
    assert_eq!(to_value(&Command::Disconnect), json!({"Command": "Disconnect"}));
}

#[test]
fn test_move_linear_json_format() {
    let command = Command::MoveLinear(MoveLinear::new([0.0, 0.0, 0.01, 0.0, 0.0, 0.0], 0.1, 0.5, true, false));
    let value = to_value(&command);

    assert_eq!(value["Command"], "MoveLinear");
    assert_eq!(value["Vector"], json!([0.0, 0.0, 0.01, 0.0, 0.0, 0.0]));
    assert_eq!(value["Velocity"], 0.1);
    assert_eq!(value["Acceleration"], 0.5);
    assert_eq!(value["ToolFrame"], true);
    assert_eq!(value["Wait"], false);
}

#[test]
fn test_speed_commands_json_format() {
    let linear = to_value(&Command::SpeedLinear(SpeedLinear::new([0.1, 0.0, 0.0, 0.0, 0.0, 0.0], 0.5, 0.15, false)));
    assert_eq!(linear["Command"], "SpeedLinear");
    assert_eq!(linear["MinTime"], 0.15);
    assert_eq!(linear["ToolFrame"], false);

    let joint = to_value(&Command::SpeedJoint(SpeedJoint::new([0.0, -0.2, 0.0, 0.0, 0.0, 0.0], 0.5, 0.15)));
    assert_eq!(joint["Command"], "SpeedJoint");
    assert_eq!(joint["Vector"][1], -0.2);
    assert!(joint.get("ToolFrame").is_none());
}

#[test]
fn test_write_digital_output_json_format() {
    let value = to_value(&Command::WriteDigitalOutput(WriteDigitalOutput::new(3, true)));
    assert_eq!(value, json!({"Command": "WriteDigitalOutput", "Port": 3, "Value": true}));
}

#[test]
fn test_commands_parse_back() {
    let line = r#"{"Command":"SetCsys","Transform":[0.1,0.2,0.3,0.0,0.0,1.57]}"#;
    let command: Command = serde_json::from_str(line).unwrap();
    assert_eq!(command, Command::SetCsys(SetCsys::new([0.1, 0.2, 0.3, 0.0, 0.0, 1.57])));
    assert_eq!(command.name(), "SetCsys");
}

#[test]
fn test_pose_response_parses() {
    let line = r#"{"Command":"ReadPose","ErrorID":0,"Pose":{"X":0.1,"Y":-0.2,"Z":0.3,"RX":0.0,"RY":3.14,"RZ":0.0}}"#;
    let response: CommandResponse = serde_json::from_str(line).unwrap();
    match response {
        CommandResponse::ReadPose(r) => {
            assert_eq!(r.error_id, 0);
            assert_eq!(r.pose.to_array(), [0.1, -0.2, 0.3, 0.0, 3.14, 0.0]);
        }
        other => panic!("unexpected response {other:?}"),
    }
}

#[test]
fn test_joint_response_field_names() {
    let response = CommandResponse::ReadJoints(ReadJointsResponse {
        error_id: 0,
        joints: [0.0, 1.0, 2.0, 3.0, 4.0, 5.0].into(),
    });
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["Command"], "ReadJoints");
    assert_eq!(value["Joints"]["J0"], 0.0);
    assert_eq!(value["Joints"]["J5"], 5.0);
}

#[test]
fn test_error_response_without_payload_parses() {
    // rejected reads carry only the error id
    let line = r#"{"Command":"ReadDigitalOutputs","ErrorID":3}"#;
    let response: CommandResponse = serde_json::from_str(line).unwrap();
    assert_eq!(response.error_id(), 3);
    assert_eq!(response.name(), "ReadDigitalOutputs");
}

#[test]
fn test_rejection_matches_command_tag() {
    let command = Command::MoveJointRelative(MoveJointRelative::new([0.0; 6], 0.1, 0.5, false));
    let response = CommandResponse::rejection(&command, 2);
    assert_eq!(response.name(), command.name());
    assert_eq!(response.error_id(), 2);
}

#[test]
fn test_sequence_id_sits_next_to_the_tag() {
    let request = Request::new(7, Command::Stop(Stop::default()));
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["SequenceID"], 7);
    assert_eq!(value["Command"], "Stop");

    let line = r#"{"Command":"GetStatus","SequenceID":7,"ErrorID":0,"Running":true}"#;
    let reply: Reply = serde_json::from_str(line).unwrap();
    assert_eq!(reply.sequence_id, Some(7));
    assert_eq!(
        reply.response,
        CommandResponse::GetStatus(GetStatusResponse { error_id: 0, running: true })
    );
}

#[test]
fn test_sequence_id_is_optional() {
    let request: Request = serde_json::from_str(r#"{"Command":"ReadPose"}"#).unwrap();
    assert_eq!(request.sequence_id, None);
    assert_eq!(request.command, Command::ReadPose);
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({"Command": "ReadPose"}));
}
