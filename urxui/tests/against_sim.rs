//! Panel and worker driving the simulated controller over TCP.
use std::sync::Arc;
use std::time::{Duration, Instant};

use sim::{serve, spawn_motion_clock, SharedRobot, SimRobot};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use urx::drivers::UrxConnector;
use urxui::jog::{Axis, Direction, JogButton};
use urxui::telemetry::NOT_CONNECTED;
use urxui::{Panel, PanelSettings, RobotWorker, UiEvent, WorkerEvent, WorkerHandle};

const WAIT: Duration = Duration::from_secs(5);

async fn start_sim() -> (String, SharedRobot) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = listener.local_addr().unwrap().to_string();
    let robot: SharedRobot = Arc::new(Mutex::new(SimRobot::default()));
    spawn_motion_clock(Arc::clone(&robot));
    tokio::spawn(serve(listener, Arc::clone(&robot)));
    (endpoint, robot)
}

/// Feeds worker events into the panel until `done` holds.
async fn pump(panel: &mut Panel, rx: &mut mpsc::Receiver<WorkerEvent>, done: impl Fn(&Panel) -> bool) {
    timeout(WAIT, async {
        while !done(panel) {
            let event = rx.recv().await.expect("worker stopped");
            panel.apply(event, Instant::now());
        }
    })
    .await
    .expect("timed out waiting for the panel");
}

fn send(panel: &mut Panel, worker: &WorkerHandle, event: UiEvent) {
    if let Some(intent) = panel.handle(event, Instant::now()) {
        assert!(worker.send(intent));
    }
}

#[tokio::test]
async fn connect_jog_toggle_and_disconnect() {
    let (endpoint, robot) = start_sim().await;
    let (worker, mut rx) = RobotWorker::spawn(UrxConnector::default(), Duration::from_millis(20));
    let mut panel = Panel::new(PanelSettings::default());

    panel.endpoint = endpoint.clone();
    send(&mut panel, &worker, UiEvent::Connect);
    pump(&mut panel, &mut rx, |p| p.connected.is_some()).await;
    assert_eq!(panel.settings.endpoints.items(), [endpoint.as_str(), "localhost"]);
    assert_eq!(panel.csys, "[0.0, 0.0, 0.0, 0.0, 0.0, 0.0]");

    pump(&mut panel, &mut rx, |p| p.fields.running() == "true").await;
    assert!(!panel.fields.pose().is_empty());

    // one step of +Z moves the simulated TCP by the linear step
    let z_before = robot.lock().await.pose()[2];
    send(&mut panel, &worker, UiEvent::JogClick(JogButton::new(Axis::Z, Direction::Positive)));
    send(&mut panel, &worker, UiEvent::ToggleOutput(1));
    pump(&mut panel, &mut rx, |p| p.fields.output_bits() == 0b10).await;
    let z_after = robot.lock().await.pose()[2];
    assert!((z_after - z_before - 0.01).abs() < 1e-6);
    assert!(panel.outputs[1]);

    send(&mut panel, &worker, UiEvent::Disconnect);
    pump(&mut panel, &mut rx, |p| p.fields.running() == NOT_CONNECTED).await;
    assert_eq!(panel.title(), format!("Urx ( address:{}, running:Not connected )", endpoint));

    worker.shutdown(WAIT).await;
}

#[tokio::test]
async fn csys_changes_reported_pose() {
    let (endpoint, robot) = start_sim().await;
    let (worker, mut rx) = RobotWorker::spawn(UrxConnector::default(), Duration::from_millis(20));
    let mut panel = Panel::new(PanelSettings::default());

    panel.endpoint = endpoint;
    send(&mut panel, &worker, UiEvent::Connect);
    pump(&mut panel, &mut rx, |p| p.connected.is_some()).await;

    panel.csys = "[0, 0, 0.5, 0, 0, 0]".to_string();
    send(&mut panel, &worker, UiEvent::ApplyCsys);
    pump(&mut panel, &mut rx, |p| !p.settings.csys.is_empty()).await;
    assert_eq!(robot.lock().await.csys(), [0.0, 0.0, 0.5, 0.0, 0.0, 0.0]);

    worker.shutdown(WAIT).await;
}

#[tokio::test]
async fn unreachable_endpoint_shows_status() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let connector = UrxConnector {
        connect_retries: 1,
        ..UrxConnector::default()
    };
    let (worker, mut rx) = RobotWorker::spawn(connector, Duration::from_millis(20));
    let mut panel = Panel::new(PanelSettings::default());

    panel.endpoint = format!("127.0.0.1:{}", port);
    send(&mut panel, &worker, UiEvent::Connect);
    pump(&mut panel, &mut rx, |p| p.status().is_some()).await;
    assert!(panel.status().unwrap().contains("failed"));
    assert_eq!(panel.connected, None);
    assert_eq!(panel.settings.endpoints.items(), ["localhost"]);

    worker.shutdown(WAIT).await;
}
