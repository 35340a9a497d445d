//! UI-side state of the control panel.
//!
//! The panel never talks to the robot. UI events turn into [`Intent`]s for
//! the worker, and [`WorkerEvent`]s coming back update what is displayed.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use urx::DIGITAL_OUTPUT_COUNT;

use crate::frame::{format_transform, parse_transform};
use crate::intent::{EditEvent, Field, Intent, RobotCommand, UiEvent};
use crate::jog::{JogAction, JogButton, JogController};
use crate::settings::PanelSettings;
use crate::telemetry::{window_title, DisplayFields};
use crate::worker::WorkerEvent;

/// How long a status message stays visible.
pub const STATUS_DURATION: Duration = Duration::from_millis(1500);

const OUTPUTS: usize = DIGITAL_OUTPUT_COUNT as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub until: Instant,
}

#[derive(Debug)]
pub struct Panel {
    pub settings: PanelSettings,
    pub endpoint: String,
    pub csys: String,
    pub fields: DisplayFields,
    pub outputs: [bool; OUTPUTS],
    pub connected: Option<String>,
    pub editing: Option<Field>,
    pub should_quit: bool,
    jog: JogController,
    redraw: bool,
    status: Option<StatusMessage>,
    history_cursor: Option<usize>,
}

impl Panel {
    pub fn new(settings: PanelSettings) -> Self {
        Self::with_jog(settings, JogController::default())
    }

    pub fn with_jog(settings: PanelSettings, jog: JogController) -> Self {
        let endpoint = settings.endpoints.first().unwrap_or_default().to_string();
        let csys = settings.csys.first().unwrap_or_default().to_string();
        Self {
            settings,
            endpoint,
            csys,
            fields: DisplayFields::default(),
            outputs: [false; OUTPUTS],
            connected: None,
            editing: None,
            should_quit: false,
            jog,
            redraw: true,
            status: None,
            history_cursor: None,
        }
    }

    pub fn title(&self) -> String {
        window_title(&self.endpoint, self.fields.running())
    }

    pub fn active_jog(&self) -> Option<JogButton> {
        self.jog.active()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    /// Whether anything shown changed since the last call. Clears the flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Forces the next frame, e.g. after a terminal resize.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.redraw = true;
        self.status = Some(StatusMessage {
            text: text.into(),
            until: now + STATUS_DURATION,
        });
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Endpoint => &self.endpoint,
            Field::Csys => &self.csys,
            Field::LinearVelocity => &self.settings.jog.linear_velocity,
            Field::LinearAcceleration => &self.settings.jog.linear_acceleration,
            Field::JointVelocity => &self.settings.jog.joint_velocity,
            Field::JointAcceleration => &self.settings.jog.joint_acceleration,
            Field::LinearStep => &self.settings.jog.linear_step,
            Field::AngularStep => &self.settings.jog.angular_step,
            Field::JointStep => &self.settings.jog.joint_step,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Endpoint => &mut self.endpoint,
            Field::Csys => &mut self.csys,
            Field::LinearVelocity => &mut self.settings.jog.linear_velocity,
            Field::LinearAcceleration => &mut self.settings.jog.linear_acceleration,
            Field::JointVelocity => &mut self.settings.jog.joint_velocity,
            Field::JointAcceleration => &mut self.settings.jog.joint_acceleration,
            Field::LinearStep => &mut self.settings.jog.linear_step,
            Field::AngularStep => &mut self.settings.jog.angular_step,
            Field::JointStep => &mut self.settings.jog.joint_step,
        }
    }

    /// Applies one operator action. Returns the intent to forward to the
    /// robot worker, if any.
    pub fn handle(&mut self, event: UiEvent, now: Instant) -> Option<Intent> {
        self.redraw = true;
        match event {
            UiEvent::JogClick(button) => {
                if self.jog.active().is_some() {
                    return None;
                }
                self.jog_command(JogAction::Step(button), now)
            }
            UiEvent::JogPress(button) => {
                self.jog.press(button, now);
                None
            }
            UiEvent::JogRelease(button) => {
                let action = self.jog.release(button)?;
                self.jog_command(action, now)
            }
            UiEvent::Stop => {
                self.jog.reset();
                Some(Intent::Command(RobotCommand::Stop))
            }
            UiEvent::ToggleOutput(index) => {
                let state = self.outputs.get_mut(usize::from(index))?;
                *state = !*state;
                Some(Intent::Command(RobotCommand::SetDigitalOutput { index, value: *state }))
            }
            UiEvent::Connect => self.connect_intent(now),
            UiEvent::Disconnect => {
                self.jog.reset();
                Some(Intent::Disconnect)
            }
            UiEvent::ApplyCsys => self.csys_intent(now),
            UiEvent::ToggleToolFrame => {
                self.settings.tool_frame = !self.settings.tool_frame;
                None
            }
            UiEvent::Edit(edit) => self.edit(edit, now),
            UiEvent::FocusLost => self.cancel_jog(now),
            UiEvent::Quit => {
                self.should_quit = true;
                None
            }
        }
    }

    /// Advances the jog state machine and expires the status line.
    pub fn tick(&mut self, now: Instant) -> Option<Intent> {
        if self.status.as_ref().is_some_and(|s| now >= s.until) {
            self.status = None;
            self.redraw = true;
        }
        let action = self.jog.tick(now)?;
        self.jog_command(action, now)
    }

    /// Folds a worker report into the displayed state. A snapshot equal to
    /// what is shown leaves the redraw flag alone.
    pub fn apply(&mut self, event: WorkerEvent, now: Instant) {
        match event {
            WorkerEvent::Telemetry(snapshot) => {
                let changed = self.fields.apply(snapshot);
                let bits = self.fields.output_bits();
                let outputs: [bool; OUTPUTS] = std::array::from_fn(|i| bits & (1 << i) != 0);
                if changed.any() || outputs != self.outputs {
                    self.outputs = outputs;
                    self.redraw = true;
                }
                return;
            }
            WorkerEvent::Connected { endpoint, csys } => {
                self.settings.endpoints.push(endpoint.clone());
                if let Some(transform) = csys {
                    self.csys = format_transform(&transform);
                }
                self.endpoint = endpoint.clone();
                self.connected = Some(endpoint);
            }
            WorkerEvent::Disconnected => {
                self.jog.reset();
                self.connected = None;
            }
            WorkerEvent::CsysApplied(text) => {
                self.settings.csys.push(text);
            }
            WorkerEvent::Failed(message) => {
                self.set_status(message, now);
            }
        }
        self.redraw = true;
    }

    fn cancel_jog(&mut self, now: Instant) -> Option<Intent> {
        let action = self.jog.cancel()?;
        self.jog_command(action, now)
    }

    fn jog_command(&mut self, action: JogAction, now: Instant) -> Option<Intent> {
        let command = match action {
            JogAction::Stop => RobotCommand::Stop,
            JogAction::Step(button) | JogAction::Velocity(button) => {
                let params = match self.settings.jog.parse() {
                    Ok(params) => params,
                    Err(e) => {
                        warn!("Jog {} not sent: {}", button, e);
                        self.jog.reset();
                        self.set_status(e.to_string(), now);
                        return None;
                    }
                };
                let tool_frame = self.settings.tool_frame;
                match action {
                    JogAction::Velocity(_) => params.velocity_command(button, tool_frame, self.jog.min_time()),
                    _ => params.step_command(button, tool_frame),
                }
            }
        };
        Some(Intent::Command(command))
    }

    fn connect_intent(&mut self, now: Instant) -> Option<Intent> {
        let endpoint = self.endpoint.trim().to_string();
        if endpoint.is_empty() {
            self.set_status("Enter an address to connect to", now);
            return None;
        }
        self.jog.reset();
        info!("Connecting to {}", endpoint);
        Some(Intent::Connect(endpoint))
    }

    fn csys_intent(&mut self, now: Instant) -> Option<Intent> {
        match parse_transform(&self.csys) {
            Ok(transform) => Some(Intent::SetCsys {
                transform,
                text: self.csys.trim().to_string(),
            }),
            Err(e) => {
                error!("{}", e);
                self.set_status(e.to_string(), now);
                None
            }
        }
    }

    fn edit(&mut self, edit: EditEvent, now: Instant) -> Option<Intent> {
        match edit {
            // jog keys type into the field from here on, so a held jog ends now
            EditEvent::Focus(field) => {
                self.focus(Some(field));
                return self.cancel_jog(now);
            }
            EditEvent::FocusNext => {
                let next = self.editing.map_or(Field::Endpoint, Field::next);
                self.focus(Some(next));
                return self.cancel_jog(now);
            }
            EditEvent::Leave => self.focus(None),
            EditEvent::Insert(c) => {
                let field = self.editing?;
                self.text_mut(field).push(c);
                self.history_cursor = None;
            }
            EditEvent::Backspace => {
                let field = self.editing?;
                self.text_mut(field).pop();
                self.history_cursor = None;
            }
            EditEvent::HistoryOlder => self.browse_history(1),
            EditEvent::HistoryNewer => self.browse_history(-1),
            EditEvent::Submit => {
                let field = self.editing?;
                self.focus(None);
                return match field {
                    Field::Endpoint => self.connect_intent(now),
                    Field::Csys => self.csys_intent(now),
                    _ => None,
                };
            }
        }
        None
    }

    fn focus(&mut self, field: Option<Field>) {
        self.editing = field;
        self.history_cursor = None;
    }

    fn browse_history(&mut self, step: isize) {
        let Some(field) = self.editing.filter(|f| f.has_history()) else {
            return;
        };
        let history = match field {
            Field::Endpoint => &self.settings.endpoints,
            _ => &self.settings.csys,
        };
        if history.is_empty() {
            return;
        }
        let last = history.len() as isize - 1;
        let cursor = match self.history_cursor {
            None if step > 0 => 0,
            None => return,
            Some(c) => (c as isize + step).clamp(0, last),
        };
        let entry = history.get(cursor as usize).unwrap_or_default().to_string();
        *self.text_mut(field) = entry;
        self.history_cursor = Some(cursor as usize);
    }
}
