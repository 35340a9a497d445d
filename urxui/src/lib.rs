//! Core of the urx control panel: everything except the terminal itself.
//!
//! The [`panel::Panel`] holds UI state and turns operator events into
//! [`intent::Intent`]s. A single [`worker::RobotWorker`] task owns the robot
//! handle, executes intents and polls telemetry.

pub mod error;
pub mod frame;
pub mod intent;
pub mod jog;
pub mod keymap;
pub mod mru;
pub mod panel;
pub mod settings;
pub mod telemetry;
pub mod ui;
pub mod worker;

pub use error::PanelError;
pub use intent::{EditEvent, Field, Intent, RobotCommand, UiEvent};
pub use panel::Panel;
pub use settings::PanelSettings;
pub use telemetry::Snapshot;
pub use worker::{RobotWorker, WorkerEvent, WorkerHandle};
