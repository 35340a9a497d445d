//! Telemetry polling and the display strings derived from it.

use tracing::{debug, warn};
use urx::drivers::RobotHandle;
use urx::{LinkError, Vector6};

pub const NOT_CONNECTED: &str = "Not connected";
pub const UNKNOWN: &str = "Unknown";

/// One poll cycle's worth of display values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub running: String,
    pub pose: String,
    pub joints: String,
    pub output_bits: u32,
}

impl Snapshot {
    pub fn disconnected() -> Self {
        Self::blank(NOT_CONNECTED.to_string())
    }

    fn blank(running: String) -> Self {
        Self {
            running,
            pose: String::new(),
            joints: String::new(),
            output_bits: 0,
        }
    }
}

/// Rounds to 4 decimals, folding `-0.0` into `0.0`.
pub fn round4(value: f64) -> f64 {
    let rounded = (value * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `[0.1, -0.2, 0.0, ...]`
pub fn format_vector(values: &Vector6) -> String {
    format!("{:?}", values.map(round4))
}

/// Queries `robot` once. Running-state is read first and survives a failure
/// of the later reads, which blank pose, joints and bits for this cycle.
pub async fn poll_snapshot<H: RobotHandle>(robot: Option<&H>) -> Snapshot {
    let Some(robot) = robot else {
        return Snapshot::disconnected();
    };

    let running = match robot.is_running().await {
        Ok(running) => running.to_string(),
        Err(e) => {
            warn!("Failed to read running state: {}", e);
            UNKNOWN.to_string()
        }
    };

    match read_motion_state(robot).await {
        Ok((pose, joints, output_bits)) => Snapshot {
            running,
            pose: format_vector(&pose),
            joints: format_vector(&joints),
            output_bits,
        },
        Err(e) => {
            warn!("Telemetry read failed: {}", e);
            Snapshot::blank(running)
        }
    }
}

async fn read_motion_state<H: RobotHandle>(robot: &H) -> Result<(Vector6, Vector6, u32), LinkError> {
    let pose = robot.get_pose().await?;
    let joints = robot.get_joints().await?;
    let bits = robot.get_digital_output_bits().await?;
    Ok((pose, joints, bits))
}

/// Which display fields a snapshot changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changed {
    pub running: bool,
    pub pose: bool,
    pub joints: bool,
    pub output_bits: bool,
}

impl Changed {
    pub fn any(&self) -> bool {
        self.running || self.pose || self.joints || self.output_bits
    }
}

/// The telemetry fields as currently rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFields {
    current: Snapshot,
}

impl Default for DisplayFields {
    fn default() -> Self {
        Self {
            current: Snapshot::disconnected(),
        }
    }
}

impl DisplayFields {
    pub fn running(&self) -> &str {
        &self.current.running
    }

    pub fn pose(&self) -> &str {
        &self.current.pose
    }

    pub fn joints(&self) -> &str {
        &self.current.joints
    }

    pub fn output_bits(&self) -> u32 {
        self.current.output_bits
    }

    /// Takes over the fields of `snapshot` that differ from what is shown.
    pub fn apply(&mut self, snapshot: Snapshot) -> Changed {
        let mut changed = Changed::default();
        if self.current.running != snapshot.running {
            self.current.running = snapshot.running;
            changed.running = true;
        }
        if self.current.pose != snapshot.pose {
            self.current.pose = snapshot.pose;
            changed.pose = true;
        }
        if self.current.joints != snapshot.joints {
            self.current.joints = snapshot.joints;
            changed.joints = true;
        }
        if self.current.output_bits != snapshot.output_bits {
            self.current.output_bits = snapshot.output_bits;
            changed.output_bits = true;
        }
        if changed.any() {
            debug!("Telemetry changed: {:?}", changed);
        }
        changed
    }
}

/// Terminal title for the given endpoint text and running-state.
pub fn window_title(endpoint: &str, running: &str) -> String {
    format!("Urx ( address:{}, running:{} )", endpoint, running)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_normalises_negative_zero() {
        assert_eq!(round4(-0.00001).to_string(), "0");
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(-1.99999), -2.0);
    }

    #[test]
    fn vectors_format_as_lists() {
        let text = format_vector(&[0.1, -0.2, -0.00004, 1.0, 0.12344, 3.0]);
        assert_eq!(text, "[0.1, -0.2, 0.0, 1.0, 0.1234, 3.0]");
    }

    #[test]
    fn apply_reports_only_changes() {
        let mut fields = DisplayFields::default();
        assert_eq!(fields.running(), NOT_CONNECTED);

        let snapshot = Snapshot {
            running: "true".to_string(),
            pose: "[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]".to_string(),
            joints: String::new(),
            output_bits: 4,
        };
        let changed = fields.apply(snapshot.clone());
        assert_eq!(
            changed,
            Changed {
                running: true,
                pose: true,
                joints: false,
                output_bits: true,
            }
        );
        assert!(!fields.apply(snapshot).any());
        assert_eq!(fields.output_bits(), 4);
    }

    #[test]
    fn title_names_endpoint_and_state() {
        assert_eq!(
            window_title("localhost", NOT_CONNECTED),
            "Urx ( address:localhost, running:Not connected )"
        );
    }
}
