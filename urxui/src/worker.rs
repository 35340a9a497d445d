//! The robot worker: the one task that owns the robot handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use urx::drivers::{Connector, RobotHandle};
use urx::Vector6;

use crate::intent::Intent;
use crate::telemetry::{poll_snapshot, Snapshot};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const EVENT_CAPACITY: usize = 64;

/// Reports from the worker to the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    Telemetry(Snapshot),
    /// `csys` is the controller's frame at connect time, if it could be read.
    Connected { endpoint: String, csys: Option<Vector6> },
    Disconnected,
    CsysApplied(String),
    /// Something the operator should see in the status line.
    Failed(String),
}

/// UI side of a running worker.
#[derive(Debug)]
pub struct WorkerHandle {
    intents: mpsc::UnboundedSender<Intent>,
    stop: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Queues `intent`. Returns `false` once the worker has exited.
    pub fn send(&self, intent: Intent) -> bool {
        self.intents.send(intent).is_ok()
    }

    /// Stops the worker and waits up to `wait` for it to close the robot
    /// handle. A worker still busy after that is aborted.
    pub async fn shutdown(self, wait: Duration) {
        self.stop.store(true, Ordering::Release);
        let _ = self.intents.send(Intent::Shutdown);
        let abort = self.task.abort_handle();
        match timeout(wait, self.task).await {
            Ok(Ok(())) => debug!("Robot worker finished"),
            Ok(Err(e)) => warn!("Robot worker ended abnormally: {}", e),
            Err(_) => {
                warn!("Robot worker did not stop within {:?}, aborting", wait);
                abort.abort();
            }
        }
    }
}

pub struct RobotWorker<C: Connector> {
    connector: C,
    robot: Option<C::Handle>,
    events: mpsc::Sender<WorkerEvent>,
    stop: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl<C: Connector> RobotWorker<C> {
    /// Spawns the worker on the current runtime. Telemetry is polled every
    /// `poll_interval`; the receiver yields everything the worker reports.
    pub fn spawn(connector: C, poll_interval: Duration) -> (WorkerHandle, mpsc::Receiver<WorkerEvent>) {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));

        let worker = RobotWorker {
            connector,
            robot: None,
            events: event_tx,
            stop: Arc::clone(&stop),
            poll_interval,
        };
        let task = tokio::spawn(worker.run(intent_rx));

        let handle = WorkerHandle {
            intents: intent_tx,
            stop,
            task,
        };
        (handle, event_rx)
    }

    async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>) {
        let mut poll = interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // queued intents run before the next poll
            tokio::select! {
                biased;
                intent = intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.execute(intent).await,
                },
                _ = poll.tick() => {
                    if self.stop.load(Ordering::Acquire) {
                        break;
                    }
                    let snapshot = poll_snapshot(self.robot.as_ref()).await;
                    self.emit(WorkerEvent::Telemetry(snapshot)).await;
                }
            }
        }

        self.close().await;
        debug!("Robot worker stopped");
    }

    async fn execute(&mut self, intent: Intent) {
        match intent {
            Intent::Connect(endpoint) => self.connect(endpoint).await,
            Intent::Disconnect => {
                self.close().await;
                self.emit(WorkerEvent::Disconnected).await;
            }
            Intent::SetCsys { transform, text } => {
                let Some(robot) = self.robot.as_ref() else {
                    error!("Cannot set coordinate frame: not connected");
                    self.emit(WorkerEvent::Failed("Not connected".to_string())).await;
                    return;
                };
                match robot.set_coordinate_frame(transform).await {
                    Ok(()) => {
                        info!("Coordinate frame set to {}", text);
                        self.emit(WorkerEvent::CsysApplied(text)).await;
                    }
                    Err(e) => {
                        error!("Failed to set coordinate frame {}: {}", text, e);
                        self.emit(WorkerEvent::Failed(format!("Setting csys failed: {}", e))).await;
                    }
                }
            }
            Intent::Command(command) => {
                let Some(robot) = self.robot.as_ref() else {
                    warn!("{} ignored: not connected", command);
                    self.emit(WorkerEvent::Failed("Not connected".to_string())).await;
                    return;
                };
                if let Err(e) = command.execute(robot).await {
                    warn!("{} failed: {}", command, e);
                    self.emit(WorkerEvent::Failed(format!("{} failed: {}", command, e))).await;
                }
            }
            Intent::Shutdown => {}
        }
    }

    async fn connect(&mut self, endpoint: String) {
        if self.robot.is_some() {
            self.close().await;
            self.emit(WorkerEvent::Disconnected).await;
        }

        match self.connector.connect(&endpoint).await {
            Ok(robot) => {
                let csys = match robot.get_coordinate_frame().await {
                    Ok(csys) => Some(csys),
                    Err(e) => {
                        warn!("Could not read coordinate frame from {}: {}", endpoint, e);
                        None
                    }
                };
                info!("Connected to {}", endpoint);
                self.robot = Some(robot);
                self.emit(WorkerEvent::Connected { endpoint, csys }).await;
            }
            Err(e) => {
                error!("Failed to connect to {}: {}", endpoint, e);
                self.emit(WorkerEvent::Failed(format!("Connecting to {} failed: {}", endpoint, e))).await;
            }
        }
    }

    async fn close(&mut self) {
        if let Some(robot) = self.robot.take() {
            match robot.close().await {
                Ok(()) => info!("Disconnected"),
                Err(e) => warn!("Error while disconnecting: {}", e),
            }
        }
    }

    /// Telemetry is dropped while the UI is behind; everything else waits
    /// for room in the channel.
    async fn emit(&self, event: WorkerEvent) {
        let closed = match event {
            WorkerEvent::Telemetry(_) => match self.events.try_send(event) {
                Ok(()) => false,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!("UI is behind, dropping telemetry");
                    false
                }
                Err(mpsc::error::TrySendError::Closed(_)) => true,
            },
            event => self.events.send(event).await.is_err(),
        };
        if closed {
            self.stop.store(true, Ordering::Release);
        }
    }
}
